use addon_events::{AddOnEvent, LogLevel, RegistrationStage};
use addon_utils::url::redact_credentials;
use tracing::{debug, warn};

use crate::{
    error::AddOnError,
    session::WorkflowEnv,
    types::{RepositoryHandle, RepositoryRequest},
    AddOnResult,
};

/// Adds a repository and makes its packages visible.
///
/// On success the repository set is saved, the new repository refreshed and the
/// resolvable pool reloaded. On failure an error naming the redacted URL is reported.
/// No retry happens here.
pub fn add_repo(
    env: &WorkflowEnv,
    url: &str,
    product_dir: &str,
    priority: i32,
) -> AddOnResult<RepositoryHandle> {
    let package_manager = &env.caps.package_manager;
    let redacted = redact_credentials(url);
    let request = RepositoryRequest::new(url, product_dir, priority);

    debug!(
        url = url,
        product_dir = product_dir,
        priority = ?request.priority,
        "adding repository"
    );
    env.emit(AddOnEvent::Registration {
        op_id: env.op_id,
        url: redacted.clone(),
        stage: RegistrationStage::Adding,
    });

    let Some(handle) = package_manager.repository_add(&request) else {
        env.emit(AddOnEvent::Registration {
            op_id: env.op_id,
            url: redacted.clone(),
            stage: RegistrationStage::Failed,
        });
        let err = AddOnError::RegistrationFailure {
            url: redacted,
        };
        env.report(LogLevel::Error, err.to_string());
        return Err(err);
    };

    if !package_manager.save_all() {
        warn!(repo = %handle, "failed to save repositories");
    }
    if !package_manager.refresh_now(handle) {
        warn!(repo = %handle, "failed to refresh repository metadata");
    }
    if !package_manager.reload_resolvables() {
        warn!(repo = %handle, "failed to reload resolvables");
    }

    debug!(repo = %handle, url = %redacted, "repository added");
    env.emit(AddOnEvent::Registration {
        op_id: env.op_id,
        url: redacted,
        stage: RegistrationStage::Added {
            repo_id: handle.id(),
        },
    });
    Ok(handle)
}

/// Deletes a repository that failed verification, logging why.
pub fn remove_repo(env: &WorkflowEnv, handle: RepositoryHandle, reason: &str) {
    debug!(repo = %handle, reason = reason, "removing repository");
    if !env.caps.package_manager.repository_delete(handle) {
        warn!(repo = %handle, "repository was already gone");
    }
    env.emit(AddOnEvent::RepositoryRemoved {
        op_id: env.op_id,
        repo_id: handle.id(),
        reason: reason.to_string(),
    });
}
