//! Fallback after a repository could not be added.
//!
//! Removable media get an operator prompt for a different medium. Network URLs get a
//! reachability check instead, which never leads to a retry.

use addon_events::{AddOnEvent, LogLevel, MediaStage};
use addon_utils::url::redact_credentials;
use tracing::debug;

use crate::{session::WorkflowEnv, types::AddOnDescriptor};

/// Result of one media resolution step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaOutcome {
    /// Operator supplied a new URL to try.
    Retry(String),
    /// Operator declined the prompt.
    Cancelled,
    /// A network URL failed; the network check ran with the given result.
    NetworkChecked { reachable: bool },
}

/// Decides how to continue after `failed_url` could not be used.
///
/// The prompt always receives the descriptor's original URL and display name, so a
/// retry never derives anything from an earlier replacement URL. `attempt` counts the
/// prompts already shown for this descriptor.
pub fn resolve_media(
    env: &WorkflowEnv,
    descriptor: &AddOnDescriptor,
    failed_url: &str,
    attempt: u32,
) -> MediaOutcome {
    if env.config.is_network_url(failed_url) {
        debug!(url = %redact_credentials(failed_url), "network repository failed, checking network");
        let reachable = env.caps.prompt.check_network();
        env.emit(AddOnEvent::Media {
            op_id: env.op_id,
            url: redact_credentials(failed_url),
            stage: MediaStage::NetworkCheck {
                reachable,
            },
        });
        if !reachable {
            env.report(
                LogLevel::Warning,
                "The network is not configured, network repositories cannot be used.",
            );
        }
        return MediaOutcome::NetworkChecked {
            reachable,
        };
    }

    env.emit(AddOnEvent::Media {
        op_id: env.op_id,
        url: redact_credentials(&descriptor.url),
        stage: MediaStage::Requested {
            attempt: attempt + 1,
        },
    });

    match env
        .caps
        .prompt
        .ask_for_alternate_media(&descriptor.url, descriptor.display_name())
    {
        Some(url) if !url.trim().is_empty() => {
            debug!(attempt = attempt + 1, url = %redact_credentials(&url), "retrying with new medium");
            env.emit(AddOnEvent::Media {
                op_id: env.op_id,
                url: redact_credentials(&descriptor.url),
                stage: MediaStage::Replaced {
                    url: redact_credentials(&url),
                },
            });
            MediaOutcome::Retry(url)
        }
        _ => {
            debug!(attempt = attempt + 1, "media request cancelled");
            env.emit(AddOnEvent::Media {
                op_id: env.op_id,
                url: redact_credentials(&descriptor.url),
                stage: MediaStage::Cancelled,
            });
            MediaOutcome::Cancelled
        }
    }
}
