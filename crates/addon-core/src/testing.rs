//! Scripted collaborators for exercising the workflow without a real installer.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use crate::{
    capability::{
        Capabilities, InstallerRuntime, MediaFiles, OperatorPrompt, PackageManager,
        RegistrationOutcome,
    },
    types::{
        RepositoryHandle, RepositoryInfo, RepositoryRequest, Resolvable, ResolvableFilter,
        ResolvableKind,
    },
};

/// Call made against [`MockPackageManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageManagerCall {
    Add(RepositoryRequest),
    Delete(RepositoryHandle),
    SaveAll,
    Refresh(RepositoryHandle),
    Label(RepositoryHandle),
    Find(ResolvableKind, ResolvableFilter),
    MarkInstall(String, ResolvableKind),
    Reload,
}

#[derive(Default)]
struct PackageManagerState {
    repositories: Vec<RepositoryInfo>,
    next_id: u64,
    add_results: HashMap<String, Option<u64>>,
    labels: HashMap<RepositoryHandle, String>,
    resolvables: Vec<Resolvable>,
    installable: HashSet<String>,
    calls: Vec<PackageManagerCall>,
}

/// In-memory package manager.
///
/// Unscripted URLs are accepted with increasing ids starting at 101.
#[derive(Default)]
pub struct MockPackageManager {
    state: Mutex<PackageManagerState>,
}

impl MockPackageManager {
    pub fn new() -> Self {
        let pm = Self::default();
        pm.state.lock().unwrap().next_id = 100;
        pm
    }

    /// Scripts the result of adding `url`: `Some(id)` accepts, `None` rejects.
    pub fn on_add(&self, url: &str, result: Option<u64>) -> &Self {
        self.state
            .lock()
            .unwrap()
            .add_results
            .insert(url.to_string(), result);
        self
    }

    pub fn set_label(&self, id: u64, label: &str) -> &Self {
        self.state
            .lock()
            .unwrap()
            .labels
            .insert(RepositoryHandle::new(id), label.to_string());
        self
    }

    pub fn add_resolvable(&self, resolvable: Resolvable) -> &Self {
        self.state.lock().unwrap().resolvables.push(resolvable);
        self
    }

    /// Products that [`PackageManager::resolvable_mark_install`] accepts.
    pub fn set_installable(&self, names: &[&str]) -> &Self {
        self.state.lock().unwrap().installable = names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn set_repositories(&self, repositories: Vec<RepositoryInfo>) -> &Self {
        self.state.lock().unwrap().repositories = repositories;
        self
    }

    pub fn calls(&self) -> Vec<PackageManagerCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// URLs passed to `repository_add`, in call order.
    pub fn added_urls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| {
                match call {
                    PackageManagerCall::Add(request) => request.base_urls.first().cloned(),
                    _ => None,
                }
            })
            .collect()
    }

    pub fn add_requests(&self) -> Vec<RepositoryRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| {
                match call {
                    PackageManagerCall::Add(request) => Some(request),
                    _ => None,
                }
            })
            .collect()
    }

    pub fn deleted(&self) -> Vec<u64> {
        self.calls()
            .into_iter()
            .filter_map(|call| {
                match call {
                    PackageManagerCall::Delete(handle) => Some(handle.id()),
                    _ => None,
                }
            })
            .collect()
    }

    pub fn find_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, PackageManagerCall::Find(..)))
            .count()
    }

    pub fn count(&self, expected: &PackageManagerCall) -> usize {
        self.calls().iter().filter(|call| *call == expected).count()
    }
}

impl PackageManager for MockPackageManager {
    fn repository_add(&self, request: &RepositoryRequest) -> Option<RepositoryHandle> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(PackageManagerCall::Add(request.clone()));

        let url = request.base_urls.first().cloned().unwrap_or_default();
        let id = match state.add_results.get(&url) {
            Some(result) => (*result)?,
            None => {
                state.next_id += 1;
                state.next_id
            }
        };

        let handle = RepositoryHandle::new(id);
        state.repositories.retain(|repo| repo.handle != handle);
        state.repositories.push(RepositoryInfo {
            handle,
            url,
            product_dir: request.prod_dir.clone(),
            enabled: request.enabled,
        });
        Some(handle)
    }

    fn repository_delete(&self, handle: RepositoryHandle) -> bool {
        let mut state = self.state.lock().unwrap();
        state.calls.push(PackageManagerCall::Delete(handle));
        let before = state.repositories.len();
        state.repositories.retain(|repo| repo.handle != handle);
        before != state.repositories.len()
    }

    fn repositories(&self) -> Vec<RepositoryInfo> {
        self.state.lock().unwrap().repositories.clone()
    }

    fn save_all(&self) -> bool {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(PackageManagerCall::SaveAll);
        true
    }

    fn refresh_now(&self, handle: RepositoryHandle) -> bool {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(PackageManagerCall::Refresh(handle));
        true
    }

    fn product_label(&self, handle: RepositoryHandle) -> Option<String> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(PackageManagerCall::Label(handle));
        state.labels.get(&handle).cloned()
    }

    fn resolvable_find(&self, kind: ResolvableKind, filter: &ResolvableFilter) -> Vec<Resolvable> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(PackageManagerCall::Find(kind, filter.clone()));
        state
            .resolvables
            .iter()
            .filter(|resolvable| resolvable.kind == kind && filter.matches(resolvable))
            .cloned()
            .collect()
    }

    fn resolvable_mark_install(&self, name: &str, kind: ResolvableKind) -> bool {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(PackageManagerCall::MarkInstall(name.to_string(), kind));
        state.installable.contains(name)
    }

    fn reload_resolvables(&self) -> bool {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(PackageManagerCall::Reload);
        true
    }
}

#[derive(Default)]
struct PromptState {
    media_answers: VecDeque<Option<String>>,
    media_requests: Vec<(String, Option<String>)>,
    license_requests: Vec<RepositoryHandle>,
    network_checks: usize,
}

/// Operator that answers from a script.
pub struct MockPrompt {
    state: Mutex<PromptState>,
    accept_license: bool,
    network_ok: bool,
}

impl Default for MockPrompt {
    fn default() -> Self {
        Self {
            state: Mutex::new(PromptState::default()),
            accept_license: true,
            network_ok: true,
        }
    }
}

impl MockPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting_license() -> Self {
        Self {
            accept_license: false,
            ..Self::default()
        }
    }

    pub fn without_network() -> Self {
        Self {
            network_ok: false,
            ..Self::default()
        }
    }

    /// Queues answers to media prompts; an exhausted queue cancels.
    pub fn answer_media(&self, answers: &[Option<&str>]) -> &Self {
        self.state
            .lock()
            .unwrap()
            .media_answers
            .extend(answers.iter().map(|answer| answer.map(str::to_string)));
        self
    }

    pub fn media_requests(&self) -> Vec<(String, Option<String>)> {
        self.state.lock().unwrap().media_requests.clone()
    }

    pub fn license_requests(&self) -> Vec<RepositoryHandle> {
        self.state.lock().unwrap().license_requests.clone()
    }

    pub fn network_checks(&self) -> usize {
        self.state.lock().unwrap().network_checks
    }
}

impl OperatorPrompt for MockPrompt {
    fn ask_for_alternate_media(&self, original_url: &str, name: Option<&str>) -> Option<String> {
        let mut state = self.state.lock().unwrap();
        state
            .media_requests
            .push((original_url.to_string(), name.map(str::to_string)));
        state.media_answers.pop_front().flatten()
    }

    fn confirm_license(&self, handle: RepositoryHandle) -> bool {
        self.state.lock().unwrap().license_requests.push(handle);
        self.accept_license
    }

    fn check_network(&self) -> bool {
        self.state.lock().unwrap().network_checks += 1;
        self.network_ok
    }
}

/// Call made against [`MockInstaller`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallerCall {
    RegisterWorkflow(RepositoryHandle, PathBuf),
    RegisterAddOn(RepositoryHandle),
    RereadAgents(PathBuf),
}

/// Installer runtime with scripted workflow metadata.
pub struct MockInstaller {
    workflows: Mutex<HashMap<RepositoryHandle, PathBuf>>,
    requires_registration: Mutex<HashSet<RepositoryHandle>>,
    registration: RegistrationOutcome,
    reread_ok: bool,
    calls: Mutex<Vec<InstallerCall>>,
}

impl Default for MockInstaller {
    fn default() -> Self {
        Self::with_registration(RegistrationOutcome::Registered)
    }
}

impl MockInstaller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registration(registration: RegistrationOutcome) -> Self {
        Self {
            workflows: Mutex::new(HashMap::new()),
            requires_registration: Mutex::new(HashSet::new()),
            registration,
            reread_ok: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Installer whose configuration agents cannot be reread.
    pub fn failing_agent_reread() -> Self {
        Self {
            reread_ok: false,
            ..Self::default()
        }
    }

    pub fn set_workflow(&self, id: u64, path: &Path) -> &Self {
        self.workflows
            .lock()
            .unwrap()
            .insert(RepositoryHandle::new(id), path.to_path_buf());
        self
    }

    pub fn require_registration(&self, id: u64) -> &Self {
        self.requires_registration
            .lock()
            .unwrap()
            .insert(RepositoryHandle::new(id));
        self
    }

    pub fn calls(&self) -> Vec<InstallerCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl InstallerRuntime for MockInstaller {
    fn cached_workflow_path(&self, handle: RepositoryHandle) -> Option<PathBuf> {
        self.workflows.lock().unwrap().get(&handle).cloned()
    }

    fn register_workflow(&self, handle: RepositoryHandle, path: &Path) -> bool {
        self.calls
            .lock()
            .unwrap()
            .push(InstallerCall::RegisterWorkflow(handle, path.to_path_buf()));
        true
    }

    fn workflow_requires_registration(&self, handle: RepositoryHandle) -> bool {
        self.requires_registration.lock().unwrap().contains(&handle)
    }

    fn register_addon(&self, handle: RepositoryHandle) -> RegistrationOutcome {
        if self.registration == RegistrationOutcome::Registered {
            self.calls
                .lock()
                .unwrap()
                .push(InstallerCall::RegisterAddOn(handle));
        }
        self.registration
    }

    fn reread_agents(&self, root: &Path) -> bool {
        self.calls
            .lock()
            .unwrap()
            .push(InstallerCall::RereadAgents(root.to_path_buf()));
        self.reread_ok
    }
}

/// Repository file access backed by local paths.
#[derive(Default)]
pub struct MockFiles {
    files: Mutex<HashMap<(RepositoryHandle, String), PathBuf>>,
    requests: Mutex<Vec<(RepositoryHandle, String)>>,
}

impl MockFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, id: u64, path: &str, local: &Path) -> &Self {
        self.files.lock().unwrap().insert(
            (RepositoryHandle::new(id), path.to_string()),
            local.to_path_buf(),
        );
        self
    }

    pub fn requests(&self) -> Vec<(RepositoryHandle, String)> {
        self.requests.lock().unwrap().clone()
    }
}

impl MediaFiles for MockFiles {
    fn provide_file(&self, handle: RepositoryHandle, path: &str) -> Option<PathBuf> {
        self.requests
            .lock()
            .unwrap()
            .push((handle, path.to_string()));
        self.files
            .lock()
            .unwrap()
            .get(&(handle, path.to_string()))
            .cloned()
    }
}

/// Shared mock handles plus the [`Capabilities`] bundle built from them.
#[derive(Clone)]
pub struct Mocks {
    pub package_manager: Arc<MockPackageManager>,
    pub prompt: Arc<MockPrompt>,
    pub installer: Arc<MockInstaller>,
    pub files: Arc<MockFiles>,
}

impl Default for Mocks {
    fn default() -> Self {
        Self::with_prompt(MockPrompt::new())
    }
}

impl Mocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prompt(prompt: MockPrompt) -> Self {
        Self {
            package_manager: Arc::new(MockPackageManager::new()),
            prompt: Arc::new(prompt),
            installer: Arc::new(MockInstaller::new()),
            files: Arc::new(MockFiles::new()),
        }
    }

    pub fn with_installer(mut self, installer: MockInstaller) -> Self {
        self.installer = Arc::new(installer);
        self
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::new(
            self.package_manager.clone(),
            self.prompt.clone(),
            self.installer.clone(),
            self.files.clone(),
        )
    }
}

/// Product with a release package, as the rename lookup expects.
pub fn product(name: &str, release_package: &str) -> Resolvable {
    let mut resolvable = Resolvable::new(name, ResolvableKind::Product);
    resolvable.product_package = Some(release_package.to_string());
    resolvable
}

/// Package carrying the given dependencies.
pub fn package(name: &str, deps: Vec<crate::types::Dependency>) -> Resolvable {
    let mut resolvable = Resolvable::new(name, ResolvableKind::Package);
    resolvable.deps = deps;
    resolvable
}
