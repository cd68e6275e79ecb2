use clap::Parser;
use polychat::ChatError;
use polychat::app::Application;
use polychat::cli::Args;
use polychat::config::Config;
use std::process;
use tracing_subscriber::EnvFilter;

async fn run(args: Args) -> Result<(), ChatError> {
    let config = Config::load()?;
    let mut app = Application::new(args, config)?;
    app.run().await
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Args::parse()).await {
        eprintln!("{}", console::style(format!("Error: {}", e)).bold().red());
        process::exit(1);
    }
}
