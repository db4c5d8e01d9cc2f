use std::{env, fs, process::Command};

use addon_config::{
    config::{config_path, generate_default_config, set_config_path, Config},
    error::ConfigError,
};
use addon_core::{
    error::{AddOnError, ErrorContext},
    AddOnResult,
};
use addon_utils::path::resolve_path;
use clap::Parser;
use cli::Args;
use export::export_lists;
use logging::setup_logging;
use parse::{import_profile, parse_lists};
use tracing::{info, warn};

mod cli;
mod events;
mod export;
mod logging;
mod parse;
mod simulate;
mod utils;

fn handle_cli() -> AddOnResult<()> {
    let args = Args::parse();

    setup_logging(&args);

    if args.no_color {
        utils::set_color(false);
    }

    if let Some(ref c) = args.config {
        let path = resolve_path(c).map_err(ConfigError::from)?;
        let path = if path.is_absolute() {
            path
        } else {
            env::current_dir()
                .with_context(|| "retrieving current directory".into())?
                .join(path)
        };
        set_config_path(path);
    }

    match args.command {
        cli::Commands::DefConfig => generate_default_config()?,
        cli::Commands::Config {
            edit,
        } => {
            let config_path = config_path();
            match edit {
                Some(editor) => {
                    let editor = editor
                        .or_else(|| env::var("EDITOR").ok())
                        .unwrap_or_else(|| "vi".to_string());
                    Command::new(&editor)
                        .arg(&config_path)
                        .status()
                        .with_context(|| {
                            format!("executing command {} {}", editor, config_path.display())
                        })?;
                }
                None => {
                    let content = match fs::read_to_string(&config_path) {
                        Ok(v) => v,
                        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                            warn!("Config file {} not found", config_path.display());
                            Config::default_config().to_annotated_string()?
                        }
                        Err(err) => {
                            return Err(AddOnError::IoError {
                                action: "reading config".to_string(),
                                source: err,
                            });
                        }
                    };
                    info!("{}", content);
                }
            }
        }
        cli::Commands::Parse {
            files,
            kind,
        } => parse_lists(&files, kind.as_deref(), args.json)?,
        cli::Commands::Import {
            profile,
        } => import_profile(&profile, args.json)?,
        cli::Commands::Export {
            files,
            kind,
            yes,
        } => {
            let config = Config::new()?;
            export_lists(config, &files, kind.as_deref(), yes, args.json)?;
        }
    }

    Ok(())
}

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli() {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}
