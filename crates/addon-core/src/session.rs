use addon_config::config::Config;
use addon_events::{AddOnEvent, EventSink, LogLevel, OperationId};
use tracing::{error, info, warn};

use crate::{
    capability::Capabilities,
    rename::RenameCache,
    types::{AddOnRecord, RepositoryHandle},
};

/// State accumulated over all processed add-ons.
#[derive(Debug)]
pub struct AddOnSession {
    records: Vec<AddOnRecord>,
    selected_products: Vec<String>,
    base_product_url: Option<String>,
    renames: RenameCache,
}

impl Default for AddOnSession {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            selected_products: Vec::new(),
            base_product_url: None,
            renames: RenameCache::with_defaults(),
        }
    }
}

impl AddOnSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session seeded from configuration: base product URL and extra renames.
    pub fn from_config(config: &Config) -> Self {
        let mut session = Self::new();
        session.base_product_url = config.base_product_url.clone();
        for rule in &config.renames {
            session.renames.add_rename(&rule.from, &rule.to);
        }
        session
    }

    pub fn records(&self) -> &[AddOnRecord] {
        &self.records
    }

    pub fn selected_products(&self) -> &[String] {
        &self.selected_products
    }

    pub fn base_product_url(&self) -> Option<&str> {
        self.base_product_url.as_deref()
    }

    pub fn set_base_product_url(&mut self, url: Option<String>) {
        self.base_product_url = url;
    }

    pub fn renames(&mut self) -> &mut RenameCache {
        &mut self.renames
    }

    pub fn push_record(&mut self, record: AddOnRecord) {
        self.records.push(record);
    }

    pub fn select_product(&mut self, product: &str) {
        if !self.selected_products.iter().any(|p| p == product) {
            self.selected_products.push(product.to_string());
        }
    }

    /// Removes the record of a reverted add-on.
    pub fn remove_record(&mut self, media: RepositoryHandle) -> Option<AddOnRecord> {
        let index = self.records.iter().position(|r| r.media == media)?;
        Some(self.records.remove(index))
    }

    /// Forgets all records and selected products.
    pub fn clear(&mut self) {
        self.records.clear();
        self.selected_products.clear();
    }
}

/// Everything a workflow step needs besides the session.
pub struct WorkflowEnv<'a> {
    pub caps: &'a Capabilities,
    pub config: &'a Config,
    pub events: &'a dyn EventSink,
    pub op_id: OperationId,
}

impl<'a> WorkflowEnv<'a> {
    pub fn new(
        caps: &'a Capabilities,
        config: &'a Config,
        events: &'a dyn EventSink,
        op_id: OperationId,
    ) -> Self {
        Self {
            caps,
            config,
            events,
            op_id,
        }
    }

    pub fn emit(&self, event: AddOnEvent) {
        self.events.emit(event);
    }

    /// Shows `message` to the operator and logs it at the same level.
    pub fn report(&self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            LogLevel::Error => error!("{}", message),
            LogLevel::Warning => warn!("{}", message),
            _ => info!("{}", message),
        }
        self.events.emit(AddOnEvent::Report {
            level,
            message,
        });
    }
}
