pub mod config_cmd;
pub mod run;
pub mod show;
pub mod templates;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "slidecraft")]
#[command(version, about = "Coherent carousel generation from long-form articles")]
pub struct Cli {
    /// Path to slidecraft.toml
    #[arg(
        long,
        global = true,
        env = "SLIDECRAFT_CONFIG",
        default_value = "slidecraft.toml"
    )]
    pub config: PathBuf,

    /// Path to data directory (overrides config file)
    #[arg(long, global = true, env = "SLIDECRAFT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an article through the five-phase pipeline
    Run(RunArgs),
    /// List the template library
    Templates(TemplatesArgs),
    /// Print stored artifacts
    Show(ShowArgs),
    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Article file: plain text/Markdown, or JSON with `title` and `text`
    pub article: PathBuf,

    /// Article title (defaults to the file's first line)
    #[arg(long)]
    pub title: Option<String>,

    /// Number of ideas to turn into posts
    #[arg(long)]
    pub posts: Option<usize>,

    /// Chat model override
    #[arg(long, env = "SLIDECRAFT_MODEL")]
    pub model: Option<String>,

    /// API base URL override
    #[arg(long, env = "SLIDECRAFT_API_BASE")]
    pub api_base: Option<String>,

    /// Use the offline hashing embedder instead of FastEmbed
    #[arg(long)]
    pub hashing_embedder: bool,

    /// Also write every artifact of the run as JSON under this directory
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct TemplatesArgs {
    /// Only this module type (e.g. hook, valor_dado, cta)
    #[arg(long)]
    pub module: Option<String>,

    /// Print structure and example for each template
    #[arg(long, short)]
    pub verbose: bool,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Artifact key (`<post_id>/<name>`) or, with --list, a key prefix
    #[arg(default_value = "")]
    pub key: String,

    /// List keys under the prefix instead of printing a document
    #[arg(long, short)]
    pub list: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate slidecraft.toml
    Validate,
    /// Print the effective configuration
    Show,
}
