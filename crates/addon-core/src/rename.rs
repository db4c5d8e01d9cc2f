//! Product rename lookup.
//!
//! Renames come from two places: facts seeded up front and `obsoletes`/`provides`
//! dependencies of release packages in the package manager's pool. The derived part is
//! only valid for the repository set it was computed from, so it is keyed by a
//! fingerprint of the enabled repositories and rebuilt wholesale when that changes.

use std::{
    collections::{HashMap, HashSet},
    sync::LazyLock,
};

use addon_utils::hash::Fingerprinter;
use regex::Regex;
use tracing::{debug, trace};

use crate::{
    capability::PackageManager,
    constants::DEFAULT_RENAMES,
    types::{DependencyKind, RepositoryInfo, ResolvableFilter, ResolvableKind},
};

static PRODUCT_DEP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^product(?::([^\s()]+)|\(([^\s()]+)\))(?:\s.*)?$")
        .expect("unable to compile product dependency regex")
});

type RenameMap = HashMap<String, HashSet<String>>;

#[derive(Debug, Default)]
pub struct RenameCache {
    seeded: RenameMap,
    fingerprint: Option<String>,
    derived: Option<RenameMap>,
}

impl RenameCache {
    /// Empty cache without the built-in renames.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache seeded with [`DEFAULT_RENAMES`].
    pub fn with_defaults() -> Self {
        let mut cache = Self::new();
        for (old, new) in DEFAULT_RENAMES {
            cache.add_rename(old, new);
        }
        cache
    }

    /// Records a rename without consulting the package manager.
    pub fn add_rename(&mut self, old_name: &str, new_name: &str) {
        debug!(old = old_name, new = new_name, "adding product rename");
        self.seeded
            .entry(old_name.to_string())
            .or_default()
            .insert(new_name.to_string());
    }

    /// Whether `old_name` was renamed to `new_name`.
    pub fn renamed(
        &mut self,
        package_manager: &dyn PackageManager,
        old_name: &str,
        new_name: &str,
    ) -> bool {
        if is_listed(&self.seeded, old_name, new_name) {
            return true;
        }

        let derived = self.derived_renames(package_manager);
        let renamed = is_listed(derived, old_name, new_name);
        trace!(
            old = old_name,
            new = new_name,
            renamed = renamed,
            "rename lookup"
        );
        renamed
    }

    /// All names `old_name` is known to have been renamed to, sorted.
    pub fn renamed_to(&mut self, package_manager: &dyn PackageManager, old_name: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .seeded
            .get(old_name)
            .into_iter()
            .flatten()
            .cloned()
            .collect();
        if let Some(derived) = self.derived_renames(package_manager).get(old_name) {
            names.extend(derived.iter().cloned());
        }
        names.sort();
        names.dedup();
        names
    }

    /// Drops everything derived from the package manager. Seeded renames stay.
    pub fn invalidate(&mut self) {
        self.fingerprint = None;
        self.derived = None;
    }

    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    fn derived_renames(&mut self, package_manager: &dyn PackageManager) -> &RenameMap {
        let current = repositories_fingerprint(&package_manager.repositories());
        if self.fingerprint.as_deref() != Some(current.as_str()) {
            if self.fingerprint.is_some() {
                debug!("repository set changed, dropping derived renames");
            }
            self.fingerprint = Some(current);
            self.derived = None;
        }

        self.derived
            .get_or_insert_with(|| load_renames(package_manager))
    }
}

/// Fingerprint of the enabled repositories: (id, url, product_dir) in manager order.
pub fn repositories_fingerprint(repositories: &[RepositoryInfo]) -> String {
    let mut fp = Fingerprinter::new();
    for repo in repositories.iter().filter(|repo| repo.enabled) {
        fp.field(&repo.handle.id().to_string())
            .field(&repo.url)
            .field(&repo.product_dir);
    }
    fp.finish()
}

/// Old product name referenced by a `product:<name>` or `product(<name>)` dependency.
pub fn product_dependency_name(dependency: &str) -> Option<&str> {
    let captures = PRODUCT_DEP_RE.captures(dependency.trim())?;
    captures
        .get(1)
        .or_else(|| captures.get(2))
        .map(|m| m.as_str())
}

fn load_renames(package_manager: &dyn PackageManager) -> RenameMap {
    let mut renames = RenameMap::new();

    let products = package_manager.resolvable_find(ResolvableKind::Product, &ResolvableFilter::any());
    for product in &products {
        let Some(release_package) = product.product_package.as_deref() else {
            continue;
        };

        let packages = package_manager.resolvable_find(
            ResolvableKind::Package,
            &ResolvableFilter::named(release_package),
        );
        for dependency in packages.iter().flat_map(|package| &package.deps) {
            if !matches!(
                dependency.kind,
                DependencyKind::Obsoletes | DependencyKind::Provides
            ) {
                continue;
            }
            let Some(old_name) = product_dependency_name(&dependency.value) else {
                continue;
            };
            if old_name == product.name {
                continue;
            }
            renames
                .entry(old_name.to_string())
                .or_default()
                .insert(product.name.clone());
        }
    }

    debug!(
        products = products.len(),
        renames = renames.values().map(HashSet::len).sum::<usize>(),
        "loaded product renames from package metadata"
    );
    renames
}

fn is_listed(map: &RenameMap, old_name: &str, new_name: &str) -> bool {
    map.get(old_name)
        .is_some_and(|targets| targets.contains(new_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        testing::{package, product, MockPackageManager},
        types::{Dependency, RepositoryHandle},
    };

    fn repo(id: u64, url: &str, product_dir: &str) -> RepositoryInfo {
        RepositoryInfo {
            handle: RepositoryHandle::new(id),
            url: url.to_string(),
            product_dir: product_dir.to_string(),
            enabled: true,
        }
    }

    fn libzypp_renames() -> MockPackageManager {
        let pm = MockPackageManager::new();
        pm.set_repositories(vec![repo(0, "dvd:///?devices=/dev/sr0", "/p0")]);
        pm.add_resolvable(product("new_product", "new_product-release"));
        pm.add_resolvable(package("installed_product-release", vec![]));
        pm.add_resolvable(package(
            "new_product-release",
            vec![
                Dependency::obsoletes("product:old_product1"),
                Dependency::obsoletes("product(old_product2)"),
                Dependency::provides("product:new_product"),
                Dependency::provides("product(old_name) = 1.0"),
            ],
        ));
        pm
    }

    #[test]
    fn test_product_dependency_name() {
        assert_eq!(product_dependency_name("product:SLES"), Some("SLES"));
        assert_eq!(product_dependency_name("product(SLES)"), Some("SLES"));
        assert_eq!(product_dependency_name("product(SLES) >= 15"), Some("SLES"));
        assert_eq!(product_dependency_name("product:sle-ha = 12"), Some("sle-ha"));
        assert_eq!(product_dependency_name("product()"), None);
        assert_eq!(product_dependency_name("productivity"), None);
        assert_eq!(product_dependency_name("sles-release"), None);
    }

    #[test]
    fn test_fallback_renames() {
        let pm = MockPackageManager::new();
        let mut cache = RenameCache::with_defaults();
        assert!(cache.renamed(&pm, "SUSE_SLES", "SLES"));
        assert!(cache.renamed(&pm, "sle-module-toolchain", "sle-module-development-tools"));
        assert_eq!(pm.find_count(), 0);
    }

    #[test]
    fn test_unknown_rename() {
        let pm = MockPackageManager::new();
        let mut cache = RenameCache::with_defaults();
        assert!(!cache.renamed(&pm, "foo", "bar"));
    }

    #[test]
    fn test_libzypp_renames() {
        let pm = libzypp_renames();
        let mut cache = RenameCache::new();
        assert!(cache.renamed(&pm, "old_product1", "new_product"));
        assert!(cache.renamed(&pm, "old_product2", "new_product"));
        assert!(cache.renamed(&pm, "old_name", "new_product"));
        assert!(!cache.renamed(&pm, "new_product", "new_product"));
        assert!(!cache.renamed(&pm, "installed_product", "new_product"));
    }

    #[test]
    fn test_loaded_renames_are_not_queried_again() {
        let pm = libzypp_renames();
        let mut cache = RenameCache::new();
        cache.renamed(&pm, "old_name", "new_product");
        let queries = pm.find_count();
        assert_eq!(queries, 2);

        assert!(cache.renamed(&pm, "old_name", "new_product"));
        assert!(!cache.renamed(&pm, "unknown", "new_product"));
        assert_eq!(pm.find_count(), queries);
    }

    #[test]
    fn test_new_repository_triggers_reload() {
        let pm = libzypp_renames();
        let mut cache = RenameCache::new();
        cache.renamed(&pm, "old_name", "new_product");
        pm.clear_calls();

        pm.set_repositories(vec![
            repo(0, "dvd:///?devices=/dev/sr0", "/p0"),
            repo(1, "dvd:///?devices=/dev/sr0", "/p1"),
        ]);
        assert!(cache.renamed(&pm, "old_name", "new_product"));
        assert_eq!(
            pm.count(&crate::testing::PackageManagerCall::Find(
                ResolvableKind::Product,
                ResolvableFilter::any()
            )),
            1
        );
    }

    #[test]
    fn test_changed_repository_triggers_reload() {
        let changes = [
            repo(1, "dvd:///?devices=/dev/sr0", "/p0"),
            repo(0, "dvd:///?devices=/dev/sr2", "/p0"),
            repo(0, "dvd:///?devices=/dev/sr0", "/another"),
        ];

        for changed in changes {
            let pm = libzypp_renames();
            let mut cache = RenameCache::new();
            cache.renamed(&pm, "old_name", "new_product");
            pm.clear_calls();

            pm.set_repositories(vec![changed]);
            assert!(cache.renamed(&pm, "old_name", "new_product"));
            assert_eq!(
                pm.count(&crate::testing::PackageManagerCall::Find(
                    ResolvableKind::Product,
                    ResolvableFilter::any()
                )),
                1
            );

            pm.clear_calls();
            cache.renamed(&pm, "old_name", "new_product");
            assert_eq!(pm.find_count(), 0);
        }
    }

    #[test]
    fn test_stale_answer_does_not_survive_change() {
        let pm = libzypp_renames();
        let mut cache = RenameCache::new();
        assert!(cache.renamed(&pm, "old_product1", "new_product"));

        let empty = MockPackageManager::new();
        empty.set_repositories(vec![repo(7, "http://example.net/repo", "/")]);
        assert!(!cache.renamed(&empty, "old_product1", "new_product"));
    }

    #[test]
    fn test_disabled_repositories_are_ignored() {
        let mut disabled = repo(5, "http://example.net/off", "/");
        disabled.enabled = false;
        let enabled = repo(0, "dvd:///?devices=/dev/sr0", "/p0");

        assert_eq!(
            repositories_fingerprint(&[enabled.clone()]),
            repositories_fingerprint(&[enabled, disabled])
        );
    }

    #[test]
    fn test_add_rename() {
        let pm = MockPackageManager::new();
        let mut cache = RenameCache::new();
        assert!(!cache.renamed(&pm, "FOO", "BAR"));
        cache.add_rename("FOO", "BAR");
        assert!(cache.renamed(&pm, "FOO", "BAR"));
    }

    #[test]
    fn test_add_rename_keeps_existing() {
        let pm = MockPackageManager::new();
        let mut cache = RenameCache::with_defaults();
        cache.add_rename("SUSE_SLES", "SLES_NEW");
        assert!(cache.renamed(&pm, "SUSE_SLES", "SLES_NEW"));
        assert!(cache.renamed(&pm, "SUSE_SLES", "SLES"));
    }

    #[test]
    fn test_single_double_and_multiple_renames() {
        let pm = MockPackageManager::new();
        let mut cache = RenameCache::new();

        cache.add_rename("SUSE_SLE", "SLES");
        assert!(cache.renamed(&pm, "SUSE_SLE", "SLES"));
        assert!(!cache.renamed(&pm, "SUSE_SLE", "SLES_SAP"));

        cache.add_rename("SUSE_SLE", "SLES_SAP");
        assert!(cache.renamed(&pm, "SUSE_SLE", "SLES"));
        assert!(cache.renamed(&pm, "SUSE_SLE", "SLES_SAP"));
        assert!(!cache.renamed(&pm, "SUSE_SLE", "SLES_NEW"));

        cache.add_rename("SUSE_SLE", "SLES_NEW");
        assert!(cache.renamed(&pm, "SUSE_SLE", "SLES_NEW"));
        assert_eq!(
            cache.renamed_to(&pm, "SUSE_SLE"),
            vec!["SLES", "SLES_NEW", "SLES_SAP"]
        );
    }

    #[test]
    fn test_many_sources_one_target() {
        let pm = MockPackageManager::new();
        let mut cache = RenameCache::new();
        cache.add_rename("sle-hpc", "SLE_HPC");
        cache.add_rename("SLE-HPC-old", "SLE_HPC");
        assert!(cache.renamed(&pm, "sle-hpc", "SLE_HPC"));
        assert!(cache.renamed(&pm, "SLE-HPC-old", "SLE_HPC"));
    }

    #[test]
    fn test_seeded_renames_survive_invalidation() {
        let pm = libzypp_renames();
        let mut cache = RenameCache::with_defaults();
        cache.renamed(&pm, "old_name", "new_product");
        assert!(cache.fingerprint().is_some());

        cache.invalidate();
        assert!(cache.fingerprint().is_none());
        assert!(cache.renamed(&pm, "SUSE_SLES", "SLES"));
    }
}
