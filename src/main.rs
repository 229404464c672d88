use std::process::ExitCode;
use std::sync::Arc;

use tooldeck::cli::{commands, output::Output, ClientCommands, Cli, Commands};
use tooldeck::render::render_error;
use tooldeck::utils::logging::{init_logging, LogTarget};
use tooldeck::{AppError, ConfigManager};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    let config_manager = match ConfigManager::new(&cli.config) {
        Ok(manager) => Arc::new(manager),
        Err(e) => {
            output.error(&format!("Failed to load {}: {}", cli.config.display(), e));
            return ExitCode::FAILURE;
        }
    };
    let config = config_manager.config();

    // stdout belongs to the protocol for stdio servers
    let target = match cli.command {
        Commands::Serve { .. } => LogTarget::Stderr,
        _ => LogTarget::Stdout,
    };
    init_logging(&config.server, cli.verbose, target);

    let result = match cli.command {
        Commands::Serve { kind } => commands::serve(kind, &config).await,
        Commands::Dashboard { host, port } => {
            commands::dashboard(Arc::clone(&config_manager), host, port, &output).await
        }
        Commands::Chat { once } => {
            commands::chat(Arc::clone(&config), once, !cli.no_color).await
        }
        Commands::Client { server, action } => {
            let action = action.unwrap_or(ClientCommands::List);
            commands::client(&config, &server, action, &output).await
        }
        Commands::InitDb { database } => commands::init_db(&config, database, &output).await,
        Commands::Config { full, validate } => {
            commands::show_config(&config_manager, full, validate, &output)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            output.error(&error_text(&e));
            ExitCode::FAILURE
        }
    }
}

fn error_text(err: &AppError) -> String {
    render_error(err).trim_start_matches("❌ ").to_string()
}
