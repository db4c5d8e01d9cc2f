//! Collaborators that simulate an installation without touching the system.

use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use addon_core::{
    capability::{
        InstallerRuntime, MediaFiles, OperatorPrompt, PackageManager, RegistrationOutcome,
    },
    types::{
        RepositoryHandle, RepositoryInfo, RepositoryRequest, Resolvable, ResolvableFilter,
        ResolvableKind,
    },
};
use tracing::{debug, error};

use crate::utils::{confirm_action, interactive_ask};

/// Accepts every repository and every product.
///
/// The `alias` query parameter of a repository URL doubles as its product label.
#[derive(Default)]
pub struct SimulatedPackageManager {
    repositories: Mutex<Vec<RepositoryInfo>>,
}

impl PackageManager for SimulatedPackageManager {
    fn repository_add(&self, request: &RepositoryRequest) -> Option<RepositoryHandle> {
        let mut repositories = self.repositories.lock().ok()?;
        let id = repositories
            .iter()
            .map(|repo| repo.handle.id())
            .max()
            .unwrap_or(0)
            + 1;
        let handle = RepositoryHandle::new(id);
        repositories.push(RepositoryInfo {
            handle,
            url: request.base_urls.first().cloned().unwrap_or_default(),
            product_dir: request.prod_dir.clone(),
            enabled: request.enabled,
        });
        debug!(repo = %handle, "simulated repository added");
        Some(handle)
    }

    fn repository_delete(&self, handle: RepositoryHandle) -> bool {
        let Ok(mut repositories) = self.repositories.lock() else {
            return false;
        };
        let before = repositories.len();
        repositories.retain(|repo| repo.handle != handle);
        before != repositories.len()
    }

    fn repositories(&self) -> Vec<RepositoryInfo> {
        self.repositories
            .lock()
            .map(|repositories| repositories.clone())
            .unwrap_or_default()
    }

    fn save_all(&self) -> bool {
        true
    }

    fn refresh_now(&self, _: RepositoryHandle) -> bool {
        true
    }

    fn product_label(&self, handle: RepositoryHandle) -> Option<String> {
        self.repositories()
            .into_iter()
            .find(|repo| repo.handle == handle)
            .and_then(|repo| url_alias(&repo.url))
    }

    fn resolvable_find(&self, _: ResolvableKind, _: &ResolvableFilter) -> Vec<Resolvable> {
        Vec::new()
    }

    fn resolvable_mark_install(&self, _: &str, _: ResolvableKind) -> bool {
        true
    }

    fn reload_resolvables(&self) -> bool {
        true
    }
}

/// Asks on the terminal, or answers on its own with `assume_yes`.
pub struct TerminalPrompt {
    assume_yes: bool,
}

impl TerminalPrompt {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
        }
    }
}

impl OperatorPrompt for TerminalPrompt {
    fn ask_for_alternate_media(&self, original_url: &str, name: Option<&str>) -> Option<String> {
        if self.assume_yes {
            return None;
        }
        let label = name.unwrap_or(original_url);
        match interactive_ask(&format!(
            "Insert the medium for {label} and enter its URL (empty to skip): "
        )) {
            Ok(answer) if !answer.is_empty() => Some(answer),
            Ok(_) => None,
            Err(err) => {
                error!("{}", err);
                None
            }
        }
    }

    fn confirm_license(&self, handle: RepositoryHandle) -> bool {
        if self.assume_yes {
            return true;
        }
        confirm_action(&format!("Accept the license of repository {handle}?")).unwrap_or(false)
    }

    fn check_network(&self) -> bool {
        true
    }
}

/// Installer without workflows or a registration client.
pub struct SimulatedInstaller;

impl InstallerRuntime for SimulatedInstaller {
    fn cached_workflow_path(&self, _: RepositoryHandle) -> Option<PathBuf> {
        None
    }

    fn register_workflow(&self, _: RepositoryHandle, _: &Path) -> bool {
        false
    }

    fn workflow_requires_registration(&self, _: RepositoryHandle) -> bool {
        false
    }

    fn register_addon(&self, _: RepositoryHandle) -> RegistrationOutcome {
        RegistrationOutcome::ClientUnavailable
    }

    fn reread_agents(&self, _: &Path) -> bool {
        true
    }
}

/// Serves files of `dir://` and `file://` repositories from the local disk.
pub struct LocalFiles {
    package_manager: std::sync::Arc<SimulatedPackageManager>,
}

impl LocalFiles {
    pub fn new(package_manager: std::sync::Arc<SimulatedPackageManager>) -> Self {
        Self {
            package_manager,
        }
    }
}

impl MediaFiles for LocalFiles {
    fn provide_file(&self, handle: RepositoryHandle, path: &str) -> Option<PathBuf> {
        let repo = self
            .package_manager
            .repositories()
            .into_iter()
            .find(|repo| repo.handle == handle)?;
        let root = local_root(&repo.url)?;
        let file = root
            .join(repo.product_dir.trim_start_matches('/'))
            .join(path.trim_start_matches('/'));
        file.is_file().then_some(file)
    }
}

fn url_alias(url: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    query
        .split(['&', '#'])
        .find_map(|param| param.strip_prefix("alias="))
        .filter(|alias| !alias.is_empty())
        .map(str::to_string)
}

fn local_root(url: &str) -> Option<PathBuf> {
    let path = url
        .strip_prefix("dir://")
        .or_else(|| url.strip_prefix("file://"))?;
    let path = path.split(['?', '#']).next().unwrap_or(path);
    Some(PathBuf::from(path))
}
