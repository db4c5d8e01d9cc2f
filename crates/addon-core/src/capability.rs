//! Interfaces to the collaborators the workflow drives.
//!
//! The package manager, the operator, the running installer and repository file access
//! are all external to this crate. Implementations are shared as `Arc<dyn Trait>` and
//! only ever called from one thread at a time.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::types::{
    RepositoryHandle, RepositoryInfo, RepositoryRequest, Resolvable, ResolvableFilter,
    ResolvableKind,
};

/// Package manager bindings.
pub trait PackageManager: Send + Sync {
    /// Adds a repository, returning its handle or `None` when the manager rejects it.
    fn repository_add(&self, request: &RepositoryRequest) -> Option<RepositoryHandle>;

    fn repository_delete(&self, handle: RepositoryHandle) -> bool;

    /// All repositories currently known, enabled or not.
    fn repositories(&self) -> Vec<RepositoryInfo>;

    /// Persists repository metadata.
    fn save_all(&self) -> bool;

    /// Forces a metadata refresh of a single repository.
    fn refresh_now(&self, handle: RepositoryHandle) -> bool;

    /// Label of the product shipped by the repository.
    fn product_label(&self, handle: RepositoryHandle) -> Option<String>;

    fn resolvable_find(&self, kind: ResolvableKind, filter: &ResolvableFilter) -> Vec<Resolvable>;

    /// Marks a resolvable for installation; `false` when it does not exist.
    fn resolvable_mark_install(&self, name: &str, kind: ResolvableKind) -> bool;

    /// Reloads the resolvable pool from all enabled repositories.
    fn reload_resolvables(&self) -> bool;
}

/// Blocking questions to the operator.
pub trait OperatorPrompt: Send + Sync {
    /// Asks for a different medium; `None` when the operator cancels.
    fn ask_for_alternate_media(&self, original_url: &str, name: Option<&str>) -> Option<String>;

    /// Shows license and info files of a repository; `true` when accepted.
    fn confirm_license(&self, handle: RepositoryHandle) -> bool;

    /// Runs the network check dialog; `true` when the network is usable.
    fn check_network(&self) -> bool;
}

/// Outcome of asking the installer to register an add-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Registered,
    /// Registration client missing and could not be installed.
    ClientUnavailable,
}

/// The running installer.
pub trait InstallerRuntime: Send + Sync {
    /// Workflow definition cached from the repository, if it ships one.
    fn cached_workflow_path(&self, handle: RepositoryHandle) -> Option<PathBuf>;

    fn register_workflow(&self, handle: RepositoryHandle, path: &Path) -> bool;

    fn workflow_requires_registration(&self, handle: RepositoryHandle) -> bool;

    fn register_addon(&self, handle: RepositoryHandle) -> RegistrationOutcome;

    /// Re-registers configuration agents below `root`.
    fn reread_agents(&self, root: &Path) -> bool;
}

/// File retrieval from a registered repository.
pub trait MediaFiles: Send + Sync {
    /// Fetches `path` (relative to the repository root) into a local file.
    fn provide_file(&self, handle: RepositoryHandle, path: &str) -> Option<PathBuf>;
}

/// Bundle of collaborator handles.
#[derive(Clone)]
pub struct Capabilities {
    pub package_manager: Arc<dyn PackageManager>,
    pub prompt: Arc<dyn OperatorPrompt>,
    pub installer: Arc<dyn InstallerRuntime>,
    pub files: Arc<dyn MediaFiles>,
}

impl Capabilities {
    pub fn new(
        package_manager: Arc<dyn PackageManager>,
        prompt: Arc<dyn OperatorPrompt>,
        installer: Arc<dyn InstallerRuntime>,
        files: Arc<dyn MediaFiles>,
    ) -> Self {
        Self {
            package_manager,
            prompt,
            installer,
            files,
        }
    }
}
