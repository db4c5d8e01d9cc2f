use addon_events::{AddOnEvent, EventSink, LogLevel};
use nu_ansi_term::Color::{Green, Red, Yellow};
use tracing::{debug, error, info, warn};

use crate::utils::{Colored, Icons};

/// Turns workflow events into terminal output.
pub struct TerminalSink;

impl EventSink for TerminalSink {
    fn emit(&self, event: AddOnEvent) {
        match event {
            AddOnEvent::Report {
                level,
                message,
            }
            | AddOnEvent::Log {
                level,
                message,
            } => {
                match level {
                    LogLevel::Error => error!("{}", message),
                    LogLevel::Warning => warn!("{}", message),
                    LogLevel::Info => info!("{}", message),
                    LogLevel::Debug => debug!("{}", message),
                }
            }
            AddOnEvent::Processing {
                url,
                name,
                ..
            } => {
                info!(
                    "{} {}",
                    Icons::ARROW,
                    name.map_or(url.clone(), |name| format!("{name} ({url})"))
                )
            }
            AddOnEvent::AddOnIntegrated {
                repo_id,
                product,
                ..
            } => {
                info!(
                    "{} Integrated {} as repository {}",
                    Colored(Green, Icons::CHECK),
                    Colored(Green, product),
                    repo_id
                )
            }
            AddOnEvent::AddOnFailed {
                url,
                error,
                ..
            } => info!("{} {}: {}", Colored(Red, Icons::CROSS), url, error),
            AddOnEvent::RepositoryRemoved {
                repo_id,
                reason,
                ..
            } => {
                info!(
                    "{} Removed repository {} ({})",
                    Colored(Yellow, Icons::WARNING),
                    repo_id,
                    reason
                )
            }
            other => debug!("{:?}", other),
        }
    }
}
