use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Telegram bot that turns text prompts into images", long_about = None)]
pub struct Args {
    /// Path to a YAML config file (defaults to ~/.pixbot/config.yaml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    pub verbose: bool,
}
