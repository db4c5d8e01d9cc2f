//! Unattended-install profile export and import.

use addon_core::{profile, AddOnResult};
use serde_json::Value;
use tracing::debug;

use crate::{add::add_descriptors, AddOnContext, AddOnReport};

/// Serializes the integrated add-ons as an `add_on_products` profile section.
pub fn export_profile(ctx: &AddOnContext) -> AddOnResult<Value> {
    let records = ctx.records()?;
    debug!(count = records.len(), "exporting add-on profile");
    profile::export_json(&records)
}

/// Integrates the add-ons listed in a profile section.
pub fn import_profile(ctx: &AddOnContext, value: Value) -> AddOnResult<AddOnReport> {
    let descriptors = profile::import_json(value)?;
    debug!(count = descriptors.len(), "importing add-on profile");
    add_descriptors(ctx, descriptors)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use addon_config::config::Config;
    use addon_core::testing::Mocks;
    use addon_events::NullSink;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_import_then_export() {
        let mocks = Mocks::new();
        mocks.package_manager.on_add("cd:/?devices=/dev/sr1", Some(4));
        let ctx = AddOnContext::new(
            Config::default_config(),
            mocks.capabilities(),
            Arc::new(NullSink),
        );

        let report = import_profile(
            &ctx,
            json!({
                "add_on_products": [{
                    "media_url": "cd:/?devices=/dev/sr1",
                    "product": "sle-module-basesystem",
                    "product_dir": "/Module-Basesystem",
                    "confirm_license": false
                }]
            }),
        )
        .unwrap();
        assert_eq!(report.integrated.len(), 1);
        assert!(mocks.prompt.license_requests().is_empty());

        assert_eq!(
            export_profile(&ctx).unwrap(),
            json!({
                "add_on_products": [{
                    "product_dir": "/Module-Basesystem",
                    "product": "sle-module-basesystem",
                    "media_url": "cd:/?devices=/dev/sr1"
                }]
            })
        );
    }
}
