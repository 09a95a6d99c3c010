use crate::cli::ShowArgs;
use crate::config::SlidecraftConfig;
use anyhow::Result;
use slidecraft_core::{DocumentStore, RedbStore};

pub async fn run(args: ShowArgs, config: &SlidecraftConfig) -> Result<()> {
    let db_path = config.db_path();
    if !db_path.exists() {
        anyhow::bail!("No database at {}. Run `slidecraft run` first.", db_path.display());
    }
    let store = RedbStore::open(&db_path)?;
    show(&store, &args)
}

fn show(store: &dyn DocumentStore, args: &ShowArgs) -> Result<()> {
    if args.list || args.key.is_empty() {
        let keys = store.keys(&args.key)?;
        if keys.is_empty() {
            println!("(no artifacts under '{}')", args.key);
            return Ok(());
        }
        for key in &keys {
            println!("{}", key);
        }
        println!("{}", "─".repeat(50));
        println!("{} keys", keys.len());
        return Ok(());
    }

    match store.load(&args.key)? {
        Some(doc) => println!("{}", serde_json::to_string_pretty(&doc)?),
        None => anyhow::bail!("No artifact '{}'. Try `slidecraft show --list`.", args.key),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use slidecraft_core::MemoryStore;

    fn args(key: &str, list: bool) -> ShowArgs {
        ShowArgs {
            key: key.to_string(),
            list,
        }
    }

    #[test]
    fn missing_key_is_an_error() {
        let store = MemoryStore::new();
        store.save("p1/caption", &json!({"text": "hi"})).unwrap();

        assert!(show(&store, &args("p1/caption", false)).is_ok());
        assert!(show(&store, &args("p1/nope", false)).is_err());
        assert!(show(&store, &args("p1/", true)).is_ok());
        assert!(show(&store, &args("", false)).is_ok());
    }
}
