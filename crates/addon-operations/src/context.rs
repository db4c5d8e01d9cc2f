//! Shared state for add-on operations.

use std::sync::{Arc, Mutex};

use addon_config::config::Config;
use addon_core::{
    capability::Capabilities,
    session::{AddOnSession, WorkflowEnv},
    types::AddOnRecord,
    AddOnResult,
};
use addon_events::{EventSinkHandle, OperationId};

struct Inner {
    config: Config,
    capabilities: Capabilities,
    events: EventSinkHandle,
    session: Mutex<AddOnSession>,
}

/// Configuration, collaborators and the session, cheap to clone.
#[derive(Clone)]
pub struct AddOnContext {
    inner: Arc<Inner>,
}

impl AddOnContext {
    pub fn new(config: Config, capabilities: Capabilities, events: EventSinkHandle) -> Self {
        let session = AddOnSession::from_config(&config);
        Self {
            inner: Arc::new(Inner {
                config,
                capabilities,
                events,
                session: Mutex::new(session),
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.inner.capabilities
    }

    pub fn events(&self) -> &EventSinkHandle {
        &self.inner.events
    }

    /// Workflow environment for one operation.
    pub fn env(&self, op_id: OperationId) -> WorkflowEnv<'_> {
        WorkflowEnv::new(
            &self.inner.capabilities,
            &self.inner.config,
            self.inner.events.as_ref(),
            op_id,
        )
    }

    /// Runs `f` with exclusive access to the session.
    pub fn with_session<R>(&self, f: impl FnOnce(&mut AddOnSession) -> R) -> AddOnResult<R> {
        let mut session = self.inner.session.lock()?;
        Ok(f(&mut session))
    }

    pub fn records(&self) -> AddOnResult<Vec<AddOnRecord>> {
        self.with_session(|session| session.records().to_vec())
    }

    pub fn selected_products(&self) -> AddOnResult<Vec<String>> {
        self.with_session(|session| session.selected_products().to_vec())
    }
}
