//! Unattended-install profile section for add-ons.

use serde::{Deserialize, Serialize};

use crate::{
    constants::DEFAULT_PRODUCT_DIR,
    types::{AddOnDescriptor, AddOnRecord},
    AddOnResult,
};

/// The `add_on_products` section of an unattended-install profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOnProfile {
    #[serde(default)]
    pub add_on_products: Vec<ProfileEntry>,
}

/// One add-on in the profile.
///
/// Export writes only `product_dir`, `product` and `media_url`; the other keys are
/// accepted on import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEntry {
    #[serde(default = "default_product_dir")]
    pub product_dir: String,
    #[serde(default)]
    pub product: String,
    pub media_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_license: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_name: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_products: Option<Vec<String>>,
}

fn default_product_dir() -> String {
    DEFAULT_PRODUCT_DIR.to_string()
}

impl From<&AddOnRecord> for ProfileEntry {
    fn from(record: &AddOnRecord) -> Self {
        Self {
            product_dir: record.product_dir.clone(),
            product: record
                .autoyast_product
                .clone()
                .unwrap_or_else(|| record.product.clone()),
            media_url: record.media_url.clone(),
            ..Self::default()
        }
    }
}

impl From<&ProfileEntry> for AddOnDescriptor {
    fn from(entry: &ProfileEntry) -> Self {
        let mut descriptor = AddOnDescriptor::new(entry.media_url.clone());
        descriptor.product_dir = entry.product_dir.clone();
        if let Some(priority) = entry.priority {
            descriptor.priority = priority;
        }
        descriptor.name = entry.name.clone();
        descriptor.alias = entry.alias.clone();
        descriptor.install_products = entry.install_products.clone();
        descriptor.confirm_license = entry.confirm_license;
        if let Some(check_name) = entry.check_name {
            descriptor.check_name = check_name;
        }
        descriptor.autoyast_product = Some(entry.product.clone()).filter(|p| !p.is_empty());
        descriptor
    }
}

/// Builds the profile section for the integrated add-ons.
///
/// The profile identifier replaces the product name when set; the repository handle is
/// never written.
pub fn export(records: &[AddOnRecord]) -> AddOnProfile {
    AddOnProfile {
        add_on_products: records.iter().map(ProfileEntry::from).collect(),
    }
}

pub fn export_json(records: &[AddOnRecord]) -> AddOnResult<serde_json::Value> {
    Ok(serde_json::to_value(export(records))?)
}

/// Turns a profile section back into descriptors.
pub fn import(profile: &AddOnProfile) -> Vec<AddOnDescriptor> {
    profile
        .add_on_products
        .iter()
        .map(AddOnDescriptor::from)
        .collect()
}

pub fn import_json(value: serde_json::Value) -> AddOnResult<Vec<AddOnDescriptor>> {
    let profile: AddOnProfile = serde_json::from_value(value)?;
    Ok(import(&profile))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::RepositoryHandle;

    fn record(autoyast_product: Option<&str>) -> AddOnRecord {
        AddOnRecord {
            media: RepositoryHandle::new(0),
            product_dir: "/Module-Basesystem".to_string(),
            product: "sle-module-basesystem".to_string(),
            autoyast_product: autoyast_product.map(str::to_string),
            media_url: "cd:/?devices=/dev/cdrom/".to_string(),
        }
    }

    #[test]
    fn test_export_uses_autoyast_product() {
        assert_eq!(
            export_json(&[record(Some("base"))]).unwrap(),
            json!({
                "add_on_products": [{
                    "product_dir": "/Module-Basesystem",
                    "product": "base",
                    "media_url": "cd:/?devices=/dev/cdrom/"
                }]
            })
        );
    }

    #[test]
    fn test_export_without_autoyast_product() {
        assert_eq!(
            export_json(&[record(None)]).unwrap(),
            json!({
                "add_on_products": [{
                    "product_dir": "/Module-Basesystem",
                    "product": "sle-module-basesystem",
                    "media_url": "cd:/?devices=/dev/cdrom/"
                }]
            })
        );
    }

    #[test]
    fn test_export_never_contains_media() {
        let value = export_json(&[record(Some("base")), record(None)]).unwrap();
        for entry in value["add_on_products"].as_array().unwrap() {
            assert!(entry.get("media").is_none());
            assert!(entry.get("autoyast_product").is_none());
        }
    }

    #[test]
    fn test_import() {
        let descriptors = import_json(json!({
            "add_on_products": [
                {
                    "media_url": "http://example.net/sdk",
                    "product": "sle-sdk",
                    "product_dir": "/sdk",
                    "priority": 20,
                    "confirm_license": true,
                    "check_name": false,
                    "install_products": ["sle-sdk"]
                },
                { "media_url": "cd:/" }
            ]
        }))
        .unwrap();

        assert_eq!(descriptors.len(), 2);
        let sdk = &descriptors[0];
        assert_eq!(sdk.url, "http://example.net/sdk");
        assert_eq!(sdk.product_dir, "/sdk");
        assert_eq!(sdk.priority, 20);
        assert_eq!(sdk.confirm_license, Some(true));
        assert!(!sdk.check_name);
        assert_eq!(sdk.autoyast_product.as_deref(), Some("sle-sdk"));

        let cd = &descriptors[1];
        assert_eq!(cd.product_dir, "/");
        assert_eq!(cd.autoyast_product, None);
        assert!(cd.check_name);
    }

    #[test]
    fn test_import_missing_url() {
        assert!(import_json(json!({ "add_on_products": [{ "product": "x" }] })).is_err());
    }

    #[test]
    fn test_import_empty_profile() {
        assert!(import_json(json!({})).unwrap().is_empty());
    }
}
