use clap::Parser;
use slack_export::Cli;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Err(e) = slack_export::commands::run_export(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
