use crate::cli::TemplatesArgs;
use anyhow::Result;
use slidecraft_core::{ModuleType, TemplateLibrary};

pub async fn run(args: TemplatesArgs) -> Result<()> {
    let library = TemplateLibrary::builtin();
    let module = args.module.as_deref().map(parse_module).transpose()?;

    let modules: Vec<ModuleType> = match module {
        Some(m) => vec![m],
        None => ModuleType::ALL.to_vec(),
    };

    println!();
    for module in modules {
        let templates: Vec<_> = library.by_module(module).collect();
        println!("{} ({})", module, templates.len());
        println!("{}", "─".repeat(70));
        for t in templates {
            println!(
                "  {:<6} {:>3}-{:<3} {:<14} {}",
                t.id, t.length_range.0, t.length_range.1, t.tone, t.function
            );
            if args.verbose {
                println!("         structure: {}", t.structure);
                println!("         example:   {}", t.example);
            }
        }
        println!();
    }
    println!("{} templates total", library.len());

    Ok(())
}

fn parse_module(name: &str) -> Result<ModuleType> {
    let wanted = name.trim().to_lowercase().replace('-', "_");
    ModuleType::ALL
        .into_iter()
        .find(|m| m.as_str() == wanted)
        .ok_or_else(|| {
            let known: Vec<&str> = ModuleType::ALL.iter().map(|m| m.as_str()).collect();
            anyhow::anyhow!("Unknown module '{}'. Expected one of: {}", name, known.join(", "))
        })
}
