//! Integration of an accepted add-on into the running installation.
//!
//! Everything here is best effort: failures are logged and reported but never undo the
//! product selection or stop the record from being written.

use std::path::{Path, PathBuf};

use addon_events::{AddOnEvent, ExtensionStage, LogLevel};
use addon_utils::fs::{ensure_dir_exists, overlay_dir, safe_remove};
use tracing::{debug, info, warn};

use crate::{
    capability::RegistrationOutcome,
    constants::EXTENSION_STAGING_DIR,
    error::AddOnError,
    session::{AddOnSession, WorkflowEnv},
    types::{AddOnDescriptor, AddOnRecord, RepositoryHandle, ResolvableKind},
    AddOnResult,
};

/// Products requested by a descriptor, split by availability.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProductSelection {
    pub selected: Vec<String>,
    pub missing: Vec<String>,
}

/// Marks each requested product for installation.
///
/// Found products are added to the session; each missing one is reported on its own.
pub fn install_products(
    env: &WorkflowEnv,
    session: &mut AddOnSession,
    handle: RepositoryHandle,
    products: &[String],
) -> ProductSelection {
    let mut selection = ProductSelection::default();

    for product in products {
        if env
            .caps
            .package_manager
            .resolvable_mark_install(product, ResolvableKind::Product)
        {
            debug!(product = product.as_str(), "product selected for installation");
            session.select_product(product);
            emit(env, handle, ExtensionStage::ProductSelected(product.clone()));
            selection.selected.push(product.clone());
        } else {
            emit(env, handle, ExtensionStage::ProductMissing(product.clone()));
            env.report(
                LogLevel::Error,
                AddOnError::ProductNotFound(product.clone()).to_string(),
            );
            selection.missing.push(product.clone());
        }
    }

    selection
}

/// Fetches the extension archive from the repository and merges it into the installer.
///
/// Returns `Ok(false)` when the repository carries no archive.
pub fn integrate_extension_archive(
    env: &WorkflowEnv,
    handle: RepositoryHandle,
) -> AddOnResult<bool> {
    let archive_name = env.config.get_extension_archive();
    let Some(archive) = env
        .caps
        .files
        .provide_file(handle, &format!("/{archive_name}"))
    else {
        debug!(repo = %handle, archive = archive_name, "no installer extension archive");
        return Ok(false);
    };
    if !archive.is_file() {
        debug!(repo = %handle, path = %archive.display(), "extension archive missing on disk");
        return Ok(false);
    }

    let staging = env
        .config
        .get_work_dir()?
        .join(EXTENSION_STAGING_DIR)
        .join(handle.id().to_string());
    safe_remove(&staging)?;
    ensure_dir_exists(&staging)?;

    emit(env, handle, ExtensionStage::UpdatingInstSys);
    let result = unpack_archive(&archive, &staging)
        .and_then(|_| apply_extension_tree(env, handle, &staging));

    if let Err(err) = safe_remove(&staging) {
        warn!(path = %staging.display(), "failed to clean up staging directory: {}", err);
    }

    result.map(|_| true)
}

fn unpack_archive(archive: &Path, staging: &Path) -> AddOnResult<()> {
    let archive = archive.to_path_buf();
    let staging = staging.to_path_buf();
    compak::extract_archive(&archive, &staging)?;
    Ok(())
}

/// Merges an unpacked extension tree over the installer root.
///
/// When the tree contains update metadata the installer rereads its agents.
pub fn apply_extension_tree(
    env: &WorkflowEnv,
    handle: RepositoryHandle,
    tree: &Path,
) -> AddOnResult<Vec<PathBuf>> {
    let root = env.config.get_inst_sys_root()?;
    let written = overlay_dir(tree, &root)?;
    info!(
        repo = %handle,
        files = written.len(),
        root = %root.display(),
        "installer extension merged"
    );

    if tree.join(env.config.get_update_metadata_dir()).is_dir() {
        emit(env, handle, ExtensionStage::RereadingAgents);
        if !env.caps.installer.reread_agents(&root) {
            return Err(AddOnError::Extension(format!(
                "configuration agents below {} could not be reread",
                root.display()
            )));
        }
    }

    Ok(written)
}

/// Registers the workflow definition shipped by the repository, if any.
pub fn register_workflow(env: &WorkflowEnv, handle: RepositoryHandle) -> bool {
    let installer = &env.caps.installer;
    let Some(path) = installer.cached_workflow_path(handle) else {
        debug!(repo = %handle, "repository has no workflow definition");
        return false;
    };

    emit(env, handle, ExtensionStage::RegisteringWorkflow);
    let registered = installer.register_workflow(handle, &path);
    if !registered {
        warn!(repo = %handle, path = %path.display(), "failed to register workflow");
    }
    registered
}

/// Runs add-on registration when the add-on's workflow asks for it.
pub fn register_addon_product(env: &WorkflowEnv, handle: RepositoryHandle) {
    let installer = &env.caps.installer;
    if !installer.workflow_requires_registration(handle) {
        debug!(repo = %handle, "add-on does not require registration");
        return;
    }

    emit(env, handle, ExtensionStage::RegisteringAddOn);
    match installer.register_addon(handle) {
        RegistrationOutcome::Registered => info!(repo = %handle, "add-on registered"),
        RegistrationOutcome::ClientUnavailable => {
            env.report(
                LogLevel::Error,
                "The add-on requires registration but the registration client is not \
                 available. Register the add-on manually after the installation.",
            );
        }
    }
}

/// Integrates an accepted add-on and appends its record to the session.
pub fn integrate(
    env: &WorkflowEnv,
    session: &mut AddOnSession,
    descriptor: &AddOnDescriptor,
    handle: RepositoryHandle,
    media_url: &str,
) -> AddOnRecord {
    if let Some(products) = &descriptor.install_products {
        install_products(env, session, handle, products);
    }

    if let Err(err) = integrate_extension_archive(env, handle) {
        env.report(
            LogLevel::Error,
            format!("Failed to update the installation system: {err}"),
        );
    }

    register_workflow(env, handle);
    register_addon_product(env, handle);

    let product = descriptor
        .name
        .clone()
        .filter(|name| !name.is_empty())
        .or_else(|| env.caps.package_manager.product_label(handle))
        .unwrap_or_default();

    let record = AddOnRecord {
        media: handle,
        product_dir: descriptor.product_dir.clone(),
        product,
        autoyast_product: descriptor.autoyast_product.clone(),
        media_url: media_url.to_string(),
    };
    session.push_record(record.clone());
    emit(env, handle, ExtensionStage::Complete);
    record
}

fn emit(env: &WorkflowEnv, handle: RepositoryHandle, stage: ExtensionStage) {
    env.emit(AddOnEvent::Extension {
        op_id: env.op_id,
        repo_id: handle.id(),
        stage,
    });
}
