use addon_core::{
    types::AddOnRecord,
    workflow::{AddOnState, DescriptorOutcome},
};
use addon_utils::url::redact_credentials;
use serde::Serialize;

/// Report returned after a list of add-ons was processed.
#[derive(Debug, Default, Serialize)]
pub struct AddOnReport {
    pub integrated: Vec<IntegratedInfo>,
    pub failed: Vec<FailedInfo>,
    /// Products selected for installation over the whole session.
    pub selected_products: Vec<String>,
}

impl AddOnReport {
    pub fn total(&self) -> usize {
        self.integrated.len() + self.failed.len()
    }

    pub(crate) fn push(&mut self, outcome: &DescriptorOutcome) {
        match &outcome.state {
            AddOnState::Integrated(record) => self.integrated.push(IntegratedInfo::from(record)),
            state => {
                self.failed.push(FailedInfo {
                    url: redact_credentials(&outcome.descriptor.url),
                    name: outcome.descriptor.display_name().map(str::to_string),
                    error: state
                        .error()
                        .map(ToString::to_string)
                        .unwrap_or_else(|| state.to_string()),
                    rolled_back: matches!(state, AddOnState::RolledBack { .. }),
                })
            }
        }
    }
}

/// Info about an integrated add-on.
#[derive(Debug, Clone, Serialize)]
pub struct IntegratedInfo {
    pub repo_id: u64,
    pub product: String,
    pub product_dir: String,
    pub media_url: String,
}

impl From<&AddOnRecord> for IntegratedInfo {
    fn from(record: &AddOnRecord) -> Self {
        Self {
            repo_id: record.media.id(),
            product: record.product.clone(),
            product_dir: record.product_dir.clone(),
            media_url: redact_credentials(&record.media_url),
        }
    }
}

/// Info about an add-on that was not integrated.
#[derive(Debug, Clone, Serialize)]
pub struct FailedInfo {
    pub url: String,
    pub name: Option<String>,
    pub error: String,
    /// A repository was added and deleted again.
    pub rolled_back: bool,
}

/// Result of reverting an integrated add-on.
#[derive(Debug, Clone, Serialize)]
pub struct RevertReport {
    pub repo_id: u64,
    pub product: Option<String>,
    pub repository_deleted: bool,
}
