use clap::Parser;
use dllama::cli::{handle_completions, handle_config_init, Cli, Commands, ConfigCommands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Chat(args) => dllama::cli::chat::run_chat(args).await,
        Commands::Status(args) => dllama::cli::status::run_status(args).await,
        Commands::Workers(args) => dllama::cli::status::run_workers(args).await,
        Commands::Metrics(args) => dllama::cli::status::run_metrics(args).await,
        Commands::System(args) => dllama::cli::status::run_system(args).await,
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => handle_config_init(&args),
        },
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
