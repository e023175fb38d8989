// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Leadline - lead-qualification inbox server.
//!
//! This is the binary entry point.

mod doctor;
mod serve;
mod shutdown;
mod user;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use leadline_config::LeadlineConfig;

/// Leadline - lead-qualification inbox server.
#[derive(Parser, Debug)]
#[command(name = "leadline", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API and webhook server.
    Serve,
    /// Inspect configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
    /// Manage dashboard users.
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
    /// Run diagnostic checks against the environment.
    Doctor,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Validate the configuration and print the effective values.
    Check,
}

#[derive(Subcommand, Debug)]
enum UserCommands {
    /// Create a user that conversations can be owned by.
    Add {
        email: String,
        #[arg(long)]
        name: Option<String>,
    },
}

fn load_config(path: Option<&std::path::Path>) -> LeadlineConfig {
    let loaded = match path {
        Some(path) => leadline_config::load_and_validate_path(path),
        None => leadline_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            leadline_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Config {
            action: ConfigCommands::Check,
        }) => {
            println!("leadline: configuration is valid");
            println!("{config:#?}");
            Ok(())
        }
        Some(Commands::User {
            action: UserCommands::Add { email, name },
        }) => user::run_user_add(&config, &email, name.as_deref()).await,
        Some(Commands::Doctor) => doctor::run_doctor(&config).await,
        None => {
            println!("leadline: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_user_add() {
        let cli = Cli::parse_from(["leadline", "user", "add", "ana@example.com", "--name", "Ana"]);
        match cli.command {
            Some(Commands::User {
                action: UserCommands::Add { email, name },
            }) => {
                assert_eq!(email, "ana@example.com");
                assert_eq!(name.as_deref(), Some("Ana"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::parse_from(["leadline", "doctor", "--config", "/etc/leadline.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/leadline.toml")));
    }
}
