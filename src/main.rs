// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Config --> Logging --> Command Dispatch
//!   Options | Inis | List --aliases           (config only)
//!   everything else                            (open_synchronizer first)
//! ```

use std::process::ExitCode;

use transync::cli::global::{GlobalOptions, parse_override};
use transync::cli::{self, Command};
use transync::cmd::addon::run_addon_command;
use transync::cmd::component::{
    RepositoryAction, run_add_language_command, run_delete_command, run_repository_command,
    run_status_command, run_translate_command,
};
use transync::cmd::config::{run_inis_command, run_options_command};
use transync::cmd::discover::run_discover_command;
use transync::cmd::list::{run_list_aliases, run_list_command};
use transync::cmd::open_synchronizer;
use transync::cmd::worker::{run_daily_command, run_worker_command};
use transync::config::Config;
use transync::config::loader::ConfigLoader;
use transync::error::Result;
use transync::logging::init_logging;
use transync::logging::{LogConfig, LogLevel};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::parse();

    let config = match &cli.command {
        Some(Command::Version | Command::Inis) | None => None,
        Some(_) => match load_config(&cli.global) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("Failed to load config: {e:#}");
                return ExitCode::FAILURE;
            }
        },
    };

    let log_config = build_log_config(&cli.global, config.as_ref());
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    match dispatch_command(&cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn build_log_config(global: &GlobalOptions, config: Option<&Config>) -> LogConfig {
    let Some(config) = config else {
        let console_level = global
            .log_level
            .and_then(LogLevel::from_u8)
            .unwrap_or(LogLevel::INFO);
        return LogConfig::builder()
            .with_console_level(console_level)
            .build();
    };

    // the loader already folded the CLI flags into [global]
    let file_level = config.global.file_log_level;
    let log_file = &config.global.log_file;
    LogConfig::builder()
        .with_console_level(config.global.output_log_level)
        .with_file_level(file_level)
        .maybe_with_log_file(
            (file_level != LogLevel::SILENT && !log_file.as_os_str().is_empty())
                .then(|| log_file.display().to_string()),
        )
        .with_json_file(global.json_log)
        .build()
}

async fn dispatch_command(cli: &cli::Cli, config: Option<Config>) -> Result<()> {
    let Some(command) = &cli.command else {
        eprintln!("No command specified. Use --help for usage information.");
        anyhow::bail!("No command specified");
    };

    match command {
        Command::Version => {
            handle_version_command();
            return Ok(());
        }
        Command::Inis => {
            let loader = build_config_loader(&cli.global);
            run_inis_command(&loader.format_loaded_files());
            return Ok(());
        }
        _ => {}
    }

    let Some(config) = config else {
        anyhow::bail!("configuration not loaded");
    };
    match command {
        Command::Options => {
            run_options_command(&config);
            return Ok(());
        }
        Command::List(args) if args.aliases => {
            run_list_aliases(&config);
            return Ok(());
        }
        _ => {}
    }

    let sync = open_synchronizer(config).await?;
    match command {
        Command::Setup(args) => {
            run_repository_command(&sync, &args.components, RepositoryAction::Setup).await
        }
        Command::List(args) => run_list_command(args, &sync).await,
        Command::Status(args) => run_status_command(args, &sync).await,
        Command::Update(args) => {
            let action = RepositoryAction::Update { force: args.force };
            run_repository_command(&sync, &args.select.components, action).await
        }
        Command::Commit(args) => {
            run_repository_command(&sync, &args.components, RepositoryAction::Commit).await
        }
        Command::Push(args) => {
            run_repository_command(&sync, &args.components, RepositoryAction::Push).await
        }
        Command::Reset(args) => {
            run_repository_command(&sync, &args.components, RepositoryAction::Reset).await
        }
        Command::Cleanup(args) => {
            run_repository_command(&sync, &args.components, RepositoryAction::Cleanup).await
        }
        Command::Lock(args) => {
            run_repository_command(&sync, &args.components, RepositoryAction::Lock(true)).await
        }
        Command::Unlock(args) => {
            run_repository_command(&sync, &args.components, RepositoryAction::Lock(false)).await
        }
        Command::AddLanguage(args) => run_add_language_command(args, &sync).await,
        Command::Translate(args) => run_translate_command(args, &sync).await,
        Command::Delete(args) => run_delete_command(args, &sync).await,
        Command::Discover(args) => run_discover_command(args, &sync).await,
        Command::Addon(args) => run_addon_command(args, &sync).await,
        Command::Daily(args) => run_daily_command(args, &sync).await,
        Command::Worker(args) => run_worker_command(args, sync).await,
        Command::Version | Command::Inis | Command::Options => Ok(()),
    }
}

fn handle_version_command() {
    println!("{}", env!("CARGO_PKG_VERSION"));
}

fn build_config_loader(global: &GlobalOptions) -> ConfigLoader {
    let mut loader = ConfigLoader::new();
    if !global.no_default_inis {
        loader = loader.add_toml_file_optional("transync.toml");
    }
    for ini_path in &global.inis {
        loader = loader.add_toml_file(ini_path);
    }
    loader.with_env_prefix("TRANSYNC")
}

fn load_config(global: &GlobalOptions) -> Result<Config> {
    let mut loader = build_config_loader(global);
    for option in global.to_config_overrides() {
        let Some((key, value)) = parse_override(&option) else {
            anyhow::bail!("invalid option '{option}', expected section/key=value");
        };
        loader = loader.set(&key, value)?;
    }
    loader.build()
}
