//! Reverting integrated add-ons.

use addon_core::{registrar::remove_repo, types::RepositoryHandle, AddOnResult};
use tracing::debug;

use crate::{progress::next_op_id, AddOnContext, RevertReport};

/// Forgets the record of an integrated add-on and deletes its repository.
///
/// A handle without a record still gets its repository deleted.
pub fn revert_addon(ctx: &AddOnContext, handle: RepositoryHandle) -> AddOnResult<RevertReport> {
    let record = ctx.with_session(|session| session.remove_record(handle))?;
    debug!(repo = %handle, known = record.is_some(), "reverting add-on");

    let existed = ctx
        .capabilities()
        .package_manager
        .repositories()
        .iter()
        .any(|repo| repo.handle == handle);
    remove_repo(&ctx.env(next_op_id()), handle, "add-on reverted");

    Ok(RevertReport {
        repo_id: handle.id(),
        product: record.map(|record| record.product),
        repository_deleted: existed,
    })
}

/// Reverts every integrated add-on, newest first.
pub fn revert_all(ctx: &AddOnContext) -> AddOnResult<Vec<RevertReport>> {
    let handles: Vec<RepositoryHandle> = ctx
        .records()?
        .iter()
        .rev()
        .map(|record| record.media)
        .collect();
    handles
        .into_iter()
        .map(|handle| revert_addon(ctx, handle))
        .collect()
}
