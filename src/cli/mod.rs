//! CLI module for the dllama console
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `chat` - Stream a reply for a prompt, or start an interactive session
//! - `status` - Show worker network status (once, or continuously with `--watch`)
//! - `workers` - Show worker availability as reported by the backend
//! - `metrics` - Show per-worker performance metrics
//! - `system` - Show inference server state and worker status
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # One-shot prompt
//! dllama chat "Explain pipeline parallelism" --max-tokens 128
//!
//! # Live worker dashboard
//! dllama status --watch
//! ```

pub mod chat;
pub mod completions;
pub mod config;
pub mod output;
pub mod status;

pub use completions::handle_completions;
pub use config::handle_config_init;

use crate::config::DllamaConfig;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// dllama - distributed inference console
#[derive(Parser, Debug)]
#[command(
    name = "dllama",
    version,
    about = "Chat with a distributed-llama backend and watch its workers"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a prompt and stream the reply
    Chat(ChatArgs),
    /// Show worker network status
    Status(StatusArgs),
    /// Show worker availability
    Workers(WorkersArgs),
    /// Show per-worker performance metrics
    Metrics(ReportArgs),
    /// Show inference server state
    System(ReportArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options shared by every command that talks to the backend.
#[derive(Args, Debug, Clone)]
pub struct ClientArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "dllama.toml")]
    pub config: PathBuf,

    /// Override backend base URL
    #[arg(short, long, env = "DLLAMA_API_URL")]
    pub url: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "DLLAMA_LOG_LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Prompt to send; starts an interactive session when omitted
    pub prompt: Option<String>,

    /// Maximum tokens to generate (1-1024)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=1024))]
    pub max_tokens: Option<u32>,

    /// Use the non-streaming generate endpoint
    #[arg(long)]
    pub no_stream: bool,

    /// Print the transcript as JSON instead of streaming text
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub client: ClientArgs,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Keep polling and redraw on every update
    #[arg(short, long)]
    pub watch: bool,

    /// Override poll interval in seconds
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub client: ClientArgs,
}

#[derive(Args, Debug)]
pub struct WorkersArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub client: ClientArgs,
}

/// Arguments for one-shot backend reports (`metrics`, `system`).
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub client: ClientArgs,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "dllama.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Load configuration with env and CLI overrides applied.
///
/// A missing config file falls back to defaults; an unreadable one is an error.
pub fn load_config_with_overrides(
    args: &ClientArgs,
) -> Result<DllamaConfig, Box<dyn std::error::Error>> {
    let mut config = DllamaConfig::load_or_default(&args.config)?;

    config = config.with_env_overrides();

    if let Some(ref url) = args.url {
        config.api.base_url = url.clone();
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::NamedTempFile;

    #[test]
    fn test_cli_parse_chat_prompt() {
        let cli = Cli::try_parse_from(["dllama", "chat", "hello there"]).unwrap();
        match cli.command {
            Commands::Chat(args) => {
                assert_eq!(args.prompt.as_deref(), Some("hello there"));
                assert!(args.max_tokens.is_none());
                assert!(!args.no_stream);
                assert_eq!(args.client.config, PathBuf::from("dllama.toml"));
            }
            _ => panic!("Expected Chat command"),
        }
    }

    #[test]
    fn test_cli_parse_chat_interactive() {
        let cli = Cli::try_parse_from(["dllama", "chat"]).unwrap();
        match cli.command {
            Commands::Chat(args) => assert!(args.prompt.is_none()),
            _ => panic!("Expected Chat command"),
        }
    }

    #[test]
    fn test_cli_parse_chat_max_tokens() {
        let cli = Cli::try_parse_from(["dllama", "chat", "-m", "512", "hi"]).unwrap();
        match cli.command {
            Commands::Chat(args) => assert_eq!(args.max_tokens, Some(512)),
            _ => panic!("Expected Chat command"),
        }
    }

    #[test]
    fn test_cli_rejects_out_of_range_max_tokens() {
        assert!(Cli::try_parse_from(["dllama", "chat", "-m", "0", "hi"]).is_err());
        assert!(Cli::try_parse_from(["dllama", "chat", "-m", "1025", "hi"]).is_err());
    }

    #[test]
    fn test_cli_parse_status_watch() {
        let cli = Cli::try_parse_from(["dllama", "status", "--watch", "-i", "2"]).unwrap();
        match cli.command {
            Commands::Status(args) => {
                assert!(args.watch);
                assert_eq!(args.interval, Some(2));
            }
            _ => panic!("Expected Status command"),
        }
    }

    #[test]
    fn test_cli_rejects_zero_interval() {
        assert!(Cli::try_parse_from(["dllama", "status", "-i", "0"]).is_err());
    }

    #[test]
    fn test_cli_parse_workers_json() {
        let cli = Cli::try_parse_from(["dllama", "workers", "--json"]).unwrap();
        match cli.command {
            Commands::Workers(args) => assert!(args.json),
            _ => panic!("Expected Workers command"),
        }
    }

    #[test]
    fn test_cli_parse_metrics_and_system() {
        let cli = Cli::try_parse_from(["dllama", "metrics", "--json"]).unwrap();
        match cli.command {
            Commands::Metrics(args) => assert!(args.json),
            _ => panic!("Expected Metrics command"),
        }

        let cli = Cli::try_parse_from(["dllama", "system", "-u", "http://gw:3000"]).unwrap();
        match cli.command {
            Commands::System(args) => {
                assert!(!args.json);
                assert_eq!(args.client.url.as_deref(), Some("http://gw:3000"));
            }
            _ => panic!("Expected System command"),
        }
    }

    #[test]
    fn test_cli_parse_url_override() {
        let cli =
            Cli::try_parse_from(["dllama", "status", "--url", "http://backend:8000"]).unwrap();
        match cli.command {
            Commands::Status(args) => {
                assert_eq!(args.client.url.as_deref(), Some("http://backend:8000"))
            }
            _ => panic!("Expected Status command"),
        }
    }

    #[test]
    fn test_load_config_reads_file() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[status]\ntimeout_seconds = 9\nworkers = [4, 5]").unwrap();

        let args = ClientArgs {
            config: temp.path().to_path_buf(),
            url: None,
            log_level: None,
        };

        let config = load_config_with_overrides(&args).unwrap();
        assert_eq!(config.status.workers, vec![4, 5]);
        assert_eq!(config.status.timeout_seconds, 9);
    }

    #[test]
    fn test_load_config_cli_overrides_file() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[api]\nbase_url = \"http://from-file:1\"").unwrap();

        let args = ClientArgs {
            config: temp.path().to_path_buf(),
            url: Some("http://from-cli:2".to_string()),
            log_level: Some("debug".to_string()),
        };

        let config = load_config_with_overrides(&args).unwrap();
        assert_eq!(config.api.base_url, "http://from-cli:2"); // CLI wins
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_config_without_file() {
        let args = ClientArgs {
            config: PathBuf::from("nonexistent-dllama.toml"),
            url: None,
            log_level: None,
        };

        let config = load_config_with_overrides(&args).unwrap();
        assert_eq!(config.status.workers, vec![1, 2, 3]); // Default
    }
}
