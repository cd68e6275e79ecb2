use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Opening message, sent once when the session starts
    pub message: Option<String>,

    /// Model to start with (see --list-models)
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Request timeout in seconds, 0 to wait indefinitely
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// List the available models and exit
    #[arg(short, long)]
    pub list_models: bool,

    /// Print the reply to the opening message and exit
    #[arg(short, long)]
    pub once: bool,
}
