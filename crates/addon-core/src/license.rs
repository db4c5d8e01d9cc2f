use addon_events::{AddOnEvent, LicenseStage};
use tracing::debug;

use crate::{session::WorkflowEnv, types::RepositoryHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseDecision {
    NotRequired,
    Accepted,
    Rejected,
}

impl LicenseDecision {
    pub fn allows_integration(self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

/// Whether the operator has to confirm the license.
///
/// An explicit setting always wins; unset means "ask unless unattended".
pub fn license_required(confirm_license: Option<bool>, unattended: bool) -> bool {
    confirm_license.unwrap_or(!unattended)
}

/// Runs the license gate for a registered repository.
///
/// Deleting a rejected repository is left to the caller.
pub fn check_license(
    env: &WorkflowEnv,
    handle: RepositoryHandle,
    confirm_license: Option<bool>,
) -> LicenseDecision {
    let unattended = env.config.is_unattended();
    if !license_required(confirm_license, unattended) {
        debug!(
            repo = %handle,
            confirm_license = ?confirm_license,
            unattended = unattended,
            "license confirmation not required"
        );
        emit(env, handle, LicenseStage::NotRequired);
        return LicenseDecision::NotRequired;
    }

    emit(env, handle, LicenseStage::Prompting);
    if env.caps.prompt.confirm_license(handle) {
        emit(env, handle, LicenseStage::Accepted);
        LicenseDecision::Accepted
    } else {
        debug!(repo = %handle, "license rejected");
        emit(env, handle, LicenseStage::Rejected);
        LicenseDecision::Rejected
    }
}

fn emit(env: &WorkflowEnv, handle: RepositoryHandle, stage: LicenseStage) {
    env.emit(AddOnEvent::License {
        op_id: env.op_id,
        repo_id: handle.id(),
        stage,
    });
}
