use crate::{OperationId, RepositoryId};

/// All event types emitted while integrating add-on repositories.
#[derive(Debug, Clone)]
pub enum AddOnEvent {
    /// A descriptor entered the workflow.
    Processing {
        op_id: OperationId,
        url: String,
        name: Option<String>,
    },
    /// Repository registration stage.
    Registration {
        op_id: OperationId,
        url: String,
        stage: RegistrationStage,
    },
    /// Alternate media or network fallback after a failed registration.
    Media {
        op_id: OperationId,
        url: String,
        stage: MediaStage,
    },
    /// Product name verification against the added repository.
    Verification {
        op_id: OperationId,
        repo_id: RepositoryId,
        stage: VerifyStage,
    },
    /// License confirmation stage.
    License {
        op_id: OperationId,
        repo_id: RepositoryId,
        stage: LicenseStage,
    },
    /// Installer extension integration stage.
    Extension {
        op_id: OperationId,
        repo_id: RepositoryId,
        stage: ExtensionStage,
    },
    /// A repository was deleted again (rollback or revert).
    RepositoryRemoved {
        op_id: OperationId,
        repo_id: RepositoryId,
        reason: String,
    },
    /// Descriptor fully integrated.
    AddOnIntegrated {
        op_id: OperationId,
        repo_id: RepositoryId,
        product: String,
    },
    /// Descriptor ended without an integrated add-on.
    AddOnFailed {
        op_id: OperationId,
        url: String,
        error: String,
    },
    /// Message meant for the operator (error popups, warnings).
    Report { level: LogLevel, message: String },
    /// Overall progress over a descriptor list.
    BatchProgress {
        completed: u32,
        total: u32,
        failed: u32,
    },
    /// Log message.
    Log { level: LogLevel, message: String },
}

/// Repository registration stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationStage {
    /// Sending the add request to the package manager.
    Adding,
    /// Repository added and its metadata refreshed.
    Added { repo_id: RepositoryId },
    /// The package manager rejected the repository.
    Failed,
}

/// Media fallback stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaStage {
    /// Operator asked for a different medium.
    Requested { attempt: u32 },
    /// Operator supplied a replacement URL.
    Replaced { url: String },
    /// Operator cancelled the prompt.
    Cancelled,
    /// Network scheme: reachability check was run instead of a prompt.
    NetworkCheck { reachable: bool },
}

/// Product name verification stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyStage {
    /// No expected name, or checking disabled.
    Skipped,
    /// Label read back from the repository matches.
    Matched { label: String },
    /// Label differs from the expected product name.
    Mismatch {
        expected: String,
        found: Option<String>,
    },
}

/// License confirmation stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseStage {
    /// Confirmation not required for this descriptor.
    NotRequired,
    /// Waiting for the operator.
    Prompting,
    /// Operator accepted.
    Accepted,
    /// Operator declined.
    Rejected,
}

/// Installer extension integration stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionStage {
    /// A requested product was marked for installation.
    ProductSelected(String),
    /// A requested product does not exist on the medium.
    ProductMissing(String),
    /// Unpacking the extension archive over the installer root.
    UpdatingInstSys,
    /// Re-registering configuration agents after an update.
    RereadingAgents,
    /// Registering the add-on workflow definition.
    RegisteringWorkflow,
    /// Running the add-on registration.
    RegisteringAddOn,
    /// Integration finished.
    Complete,
}

/// Log levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}
