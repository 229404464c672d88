//! CLI for the tooldeck binary
//!
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod commands;
pub mod output;

use crate::mcp::ServerKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tooldeck - MCP tool servers, a tool-calling agent and a turf booking dashboard
#[derive(Parser, Debug)]
#[command(
    name = "tooldeck",
    author = "Dirmacs <build@dirmacs.com>",
    version,
    about = "MCP tool servers, a tool-calling agent and a turf booking dashboard",
    after_help = "EXAMPLES:\n    \
                  tooldeck serve booking                     # Booking MCP server on stdio\n    \
                  tooldeck dashboard --port 8501             # Booking dashboard\n    \
                  tooldeck chat --once \"Show me all turfs\"   # One question to the agent\n    \
                  tooldeck client calculator call add '{\"a\":2,\"b\":3}'\n    \
                  tooldeck init-db                           # Create and seed the database"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "tooldeck.toml", global = true, env = "TOOLDECK_CONFIG")]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one MCP server on stdin/stdout
    Serve {
        #[arg(value_enum)]
        kind: ServerKind,
    },

    /// Start the booking dashboard
    Dashboard {
        /// Overrides server.host
        #[arg(long)]
        host: Option<String>,

        /// Overrides server.port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Talk to the agent interactively, or send a single message
    Chat {
        /// Send one message, print the reply and exit
        #[arg(long)]
        once: Option<String>,
    },

    /// Connect to a configured MCP server and inspect or call it
    Client {
        /// Server name from [servers]
        server: String,

        #[command(subcommand)]
        action: Option<ClientCommands>,
    },

    /// Create the booking database and seed it when empty
    InitDb {
        /// Overrides database.url
        #[arg(long)]
        database: Option<String>,
    },

    /// Show configuration information
    Config {
        /// Print the full configuration as TOML
        #[arg(short = 'f', long)]
        full: bool,

        /// Validate the configuration file
        #[arg(long)]
        validate: bool,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ClientCommands {
    /// List tools, resources, resource templates and prompts (default)
    List,

    /// Call a tool with JSON arguments
    Call {
        tool: String,

        #[arg(default_value = "{}")]
        args: String,
    },

    /// Read a resource by URI
    Read { uri: String },

    /// Render a prompt with key=value arguments
    Prompt {
        name: String,

        #[arg(value_parser = parse_key_val)]
        args: Vec<(String, String)>,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{}'", s))
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["tooldeck", "serve", "booking"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Serve {
                kind: ServerKind::Booking
            }
        ));
        assert_eq!(cli.config, PathBuf::from("tooldeck.toml"));
    }

    #[test]
    fn test_parse_unknown_server_kind() {
        assert!(Cli::try_parse_from(["tooldeck", "serve", "search"]).is_err());
    }

    #[test]
    fn test_parse_client_prompt_args() {
        let cli = Cli::try_parse_from([
            "tooldeck",
            "--no-color",
            "client",
            "booking",
            "prompt",
            "check-availability",
            "turf_id=1",
            "date=2030-01-02",
        ])
        .unwrap();

        assert!(cli.no_color);
        match cli.command {
            Commands::Client { server, action } => {
                assert_eq!(server, "booking");
                assert_eq!(
                    action,
                    Some(ClientCommands::Prompt {
                        name: "check-availability".into(),
                        args: vec![
                            ("turf_id".into(), "1".into()),
                            ("date".into(), "2030-01-02".into())
                        ],
                    })
                );
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_chat_once() {
        let cli = Cli::try_parse_from(["tooldeck", "chat", "--once", "hi"]).unwrap();
        assert!(matches!(cli.command, Commands::Chat { once: Some(ref m) } if m == "hi"));
    }

    #[test]
    fn test_key_val_parser() {
        assert_eq!(
            parse_key_val("a=b=c").unwrap(),
            ("a".to_string(), "b=c".to_string())
        );
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
    }
}
