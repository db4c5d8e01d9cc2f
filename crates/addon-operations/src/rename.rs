use addon_core::AddOnResult;

use crate::AddOnContext;

/// Whether `old_name` was renamed to `new_name` in the current repository set.
pub fn is_renamed(ctx: &AddOnContext, old_name: &str, new_name: &str) -> AddOnResult<bool> {
    let package_manager = ctx.capabilities().package_manager.clone();
    ctx.with_session(|session| {
        session
            .renames()
            .renamed(package_manager.as_ref(), old_name, new_name)
    })
}

/// Every product name `old_name` was renamed to.
pub fn renamed_to(ctx: &AddOnContext, old_name: &str) -> AddOnResult<Vec<String>> {
    let package_manager = ctx.capabilities().package_manager.clone();
    ctx.with_session(|session| {
        session
            .renames()
            .renamed_to(package_manager.as_ref(), old_name)
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use addon_config::config::{Config, RenameRule};
    use addon_core::testing::Mocks;
    use addon_events::NullSink;

    use super::*;

    #[test]
    fn test_is_renamed_uses_config_renames() {
        let mocks = Mocks::new();
        let mut config = Config::default_config();
        config.renames.push(RenameRule {
            from: "sle-sdk".to_string(),
            to: "sle-module-development-tools".to_string(),
        });
        let ctx = AddOnContext::new(config, mocks.capabilities(), Arc::new(NullSink));

        assert!(is_renamed(&ctx, "sle-sdk", "sle-module-development-tools").unwrap());
        assert!(is_renamed(&ctx, "SUSE_SLES", "SLES").unwrap());
        assert!(!is_renamed(&ctx, "SLES", "SLED").unwrap());
    }
}
