//! Per-descriptor state machine.
//!
//! Each descriptor starts in [`AddOnState::Pending`] and is advanced by [`step`] until it
//! reaches `Integrated`, `Failed` or `RolledBack`. Media prompts are a state of their own,
//! so a scripted prompt drives retries and cancellation deterministically.

use std::fmt;

use addon_events::{AddOnEvent, LogLevel, VerifyStage};
use addon_utils::url::{expand_relative_url, redact_credentials, set_url_alias};
use tracing::{debug, error, info};

use crate::{
    descriptor::{read_source, DescriptorSource},
    error::AddOnError,
    integrator::integrate,
    license::check_license,
    media::{resolve_media, MediaOutcome},
    registrar::{add_repo, remove_repo},
    session::{AddOnSession, WorkflowEnv},
    types::{AddOnDescriptor, AddOnRecord, RepositoryHandle},
    AddOnResult,
};

#[derive(Debug)]
pub enum AddOnState {
    /// Waiting to register `url`. `attempt` counts the media prompts shown so far and
    /// `rolled_back` is the last repository this descriptor already added and deleted.
    Pending {
        url: String,
        attempt: u32,
        rolled_back: Option<RepositoryHandle>,
    },
    /// `failed_url` could not be used; the media resolver decides what happens next.
    AwaitingMedia {
        failed_url: String,
        attempt: u32,
        cause: AddOnError,
        rolled_back: Option<RepositoryHandle>,
    },
    Registered {
        handle: RepositoryHandle,
        url: String,
        attempt: u32,
    },
    NameVerified {
        handle: RepositoryHandle,
        url: String,
    },
    Licensed {
        handle: RepositoryHandle,
        url: String,
    },
    Integrated(AddOnRecord),
    /// Nothing was left behind in the package manager.
    Failed(AddOnError),
    /// A repository was added and deleted again.
    RolledBack {
        handle: RepositoryHandle,
        cause: AddOnError,
    },
}

impl AddOnState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Integrated(_) | Self::Failed(_) | Self::RolledBack { .. }
        )
    }

    pub fn record(&self) -> Option<&AddOnRecord> {
        match self {
            Self::Integrated(record) => Some(record),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AddOnError> {
        match self {
            Self::Failed(err) => Some(err),
            Self::RolledBack {
                cause, ..
            } => Some(cause),
            _ => None,
        }
    }
}

impl fmt::Display for AddOnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending {
                ..
            } => write!(f, "pending"),
            Self::AwaitingMedia {
                ..
            } => write!(f, "awaiting media"),
            Self::Registered {
                ..
            } => write!(f, "registered"),
            Self::NameVerified {
                ..
            } => write!(f, "name verified"),
            Self::Licensed {
                ..
            } => write!(f, "licensed"),
            Self::Integrated(_) => write!(f, "integrated"),
            Self::Failed(_) => write!(f, "failed"),
            Self::RolledBack {
                ..
            } => write!(f, "rolled back"),
        }
    }
}

/// A processed descriptor and the terminal state it reached.
#[derive(Debug)]
pub struct DescriptorOutcome {
    pub descriptor: AddOnDescriptor,
    pub state: AddOnState,
}

/// Expands `relurl://` against the base product URL and writes the alias into the URL.
pub fn prepare_url(session: &AddOnSession, descriptor: &AddOnDescriptor) -> AddOnResult<String> {
    let url = expand_relative_url(&descriptor.url, session.base_product_url())?;
    Ok(set_url_alias(
        Some(&url),
        descriptor.alias.as_deref(),
        descriptor.name.as_deref(),
    )
    .unwrap_or(url))
}

/// Advances `state` by one transition.
pub fn step(
    env: &WorkflowEnv,
    session: &mut AddOnSession,
    descriptor: &AddOnDescriptor,
    state: AddOnState,
) -> AddOnState {
    match state {
        AddOnState::Pending {
            url,
            attempt,
            rolled_back,
        } => {
            match add_repo(env, &url, &descriptor.product_dir, descriptor.priority) {
                Ok(handle) => {
                    AddOnState::Registered {
                        handle,
                        url,
                        attempt,
                    }
                }
                Err(cause) => {
                    AddOnState::AwaitingMedia {
                        failed_url: url,
                        attempt,
                        cause,
                        rolled_back,
                    }
                }
            }
        }
        AddOnState::AwaitingMedia {
            failed_url,
            attempt,
            cause,
            rolled_back,
        } => {
            let failed = |cause: AddOnError| {
                match rolled_back {
                    Some(handle) => {
                        AddOnState::RolledBack {
                            handle,
                            cause,
                        }
                    }
                    None => AddOnState::Failed(cause),
                }
            };
            match resolve_media(env, descriptor, &failed_url, attempt) {
                MediaOutcome::Retry(url) => {
                    AddOnState::Pending {
                        url,
                        attempt: attempt + 1,
                        rolled_back,
                    }
                }
                MediaOutcome::Cancelled => {
                    match cause {
                        AddOnError::NameMismatch {
                            ..
                        } => failed(cause),
                        _ => {
                            failed(AddOnError::MediaCancelled {
                                url: redact_credentials(&descriptor.url),
                            })
                        }
                    }
                }
                MediaOutcome::NetworkChecked {
                    reachable: false,
                } => {
                    failed(AddOnError::NetworkUnavailable {
                        url: redact_credentials(&failed_url),
                    })
                }
                MediaOutcome::NetworkChecked {
                    reachable: true,
                } => failed(cause),
            }
        }
        AddOnState::Registered {
            handle,
            url,
            attempt,
        } => verify_name(env, descriptor, handle, url, attempt),
        AddOnState::NameVerified {
            handle,
            url,
        } => {
            if check_license(env, handle, descriptor.confirm_license).allows_integration() {
                AddOnState::Licensed {
                    handle,
                    url,
                }
            } else {
                remove_repo(env, handle, "license rejected");
                AddOnState::RolledBack {
                    handle,
                    cause: AddOnError::LicenseRejected {
                        repo: handle,
                    },
                }
            }
        }
        AddOnState::Licensed {
            handle,
            url,
        } => AddOnState::Integrated(integrate(env, session, descriptor, handle, &url)),
        terminal => terminal,
    }
}

fn verify_name(
    env: &WorkflowEnv,
    descriptor: &AddOnDescriptor,
    handle: RepositoryHandle,
    url: String,
    attempt: u32,
) -> AddOnState {
    let emit = |stage: VerifyStage| {
        env.emit(AddOnEvent::Verification {
            op_id: env.op_id,
            repo_id: handle.id(),
            stage,
        })
    };

    let Some(expected) = descriptor.expected_name() else {
        emit(VerifyStage::Skipped);
        return AddOnState::NameVerified {
            handle,
            url,
        };
    };

    let found = env.caps.package_manager.product_label(handle);
    if found.as_deref() == Some(expected) {
        emit(VerifyStage::Matched {
            label: expected.to_string(),
        });
        return AddOnState::NameVerified {
            handle,
            url,
        };
    }

    debug!(
        repo = %handle,
        expected = expected,
        found = ?found,
        "repository does not provide the expected product"
    );
    emit(VerifyStage::Mismatch {
        expected: expected.to_string(),
        found: found.clone(),
    });
    remove_repo(env, handle, "product name mismatch");

    let cause = AddOnError::NameMismatch {
        repo: handle,
        expected: expected.to_string(),
        found: found.unwrap_or_default(),
    };
    if env.config.is_network_url(&url) {
        return AddOnState::RolledBack {
            handle,
            cause,
        };
    }
    AddOnState::AwaitingMedia {
        failed_url: url,
        attempt,
        cause,
        rolled_back: Some(handle),
    }
}

/// Drives `state` until it is terminal.
pub fn drive(
    env: &WorkflowEnv,
    session: &mut AddOnSession,
    descriptor: &AddOnDescriptor,
    mut state: AddOnState,
) -> AddOnState {
    while !state.is_terminal() {
        debug!(url = %redact_credentials(&descriptor.url), state = %state, "add-on step");
        state = step(env, session, descriptor, state);
    }
    state
}

/// Runs one descriptor through the whole workflow.
pub fn process_descriptor(
    env: &WorkflowEnv,
    session: &mut AddOnSession,
    descriptor: &AddOnDescriptor,
) -> AddOnState {
    let redacted = redact_credentials(&descriptor.url);
    env.emit(AddOnEvent::Processing {
        op_id: env.op_id,
        url: redacted.clone(),
        name: descriptor.display_name().map(str::to_string),
    });

    let state = match prepare_url(session, descriptor) {
        Ok(url) => {
            drive(
                env,
                session,
                descriptor,
                AddOnState::Pending {
                    url,
                    attempt: 0,
                    rolled_back: None,
                },
            )
        }
        Err(err) => {
            env.report(LogLevel::Error, err.to_string());
            AddOnState::Failed(err)
        }
    };

    match &state {
        AddOnState::Integrated(record) => {
            info!(repo = %record.media, product = record.product.as_str(), "add-on integrated");
            env.emit(AddOnEvent::AddOnIntegrated {
                op_id: env.op_id,
                repo_id: record.media.id(),
                product: record.product.clone(),
            });
        }
        other => {
            let reason = other
                .error()
                .map(ToString::to_string)
                .unwrap_or_else(|| other.to_string());
            info!(url = %redacted, reason = reason.as_str(), "add-on not integrated");
            env.emit(AddOnEvent::AddOnFailed {
                op_id: env.op_id,
                url: redacted,
                error: reason,
            });
        }
    }
    state
}

/// Reads every descriptor source and processes the descriptors in file order.
///
/// An empty or missing list does nothing. Unsupported source kinds are logged and
/// skipped; unreadable or malformed sources are reported and count as empty.
pub fn process_sources(
    env: &WorkflowEnv,
    session: &mut AddOnSession,
    sources: Option<&[DescriptorSource]>,
) -> Vec<DescriptorOutcome> {
    let Some(sources) = sources.filter(|sources| !sources.is_empty()) else {
        debug!("no add-on lists given");
        return Vec::new();
    };

    load_descriptors(env, sources)
        .into_iter()
        .map(|descriptor| {
            let state = process_descriptor(env, session, &descriptor);
            DescriptorOutcome {
                descriptor,
                state,
            }
        })
        .collect()
}

/// Reads all sources in order, skipping the ones that cannot be used.
pub fn load_descriptors(env: &WorkflowEnv, sources: &[DescriptorSource]) -> Vec<AddOnDescriptor> {
    let mut descriptors = Vec::new();
    for source in sources {
        match read_source(source) {
            Ok(parsed) => descriptors.extend(parsed),
            Err(err @ AddOnError::UnsupportedDescriptorSource { .. }) => error!("{}", err),
            Err(err) => env.report(LogLevel::Error, err.to_string()),
        }
    }
    descriptors
}

#[cfg(test)]
mod tests {
    use std::fs;

    use addon_config::config::Config;
    use addon_events::CollectorSink;
    use tempfile::tempdir;

    use super::*;
    use crate::{
        capability::Capabilities,
        descriptor::SourceKind,
        testing::{MockPrompt, Mocks, PackageManagerCall},
        types::ResolvableKind,
    };

    const BASE_URL: &str = "cd:/?devices=/dev/disk/by-id/ata-QEMU_DVD-ROM_QM00001";
    const ADDON_URL: &str = "cd:/?alias=Foo";
    const CD_URL: &str = "cd:///?device=/dev/sr0";
    const OTHER_CD_URL: &str = "cd:///?device=/dev/sr1";

    fn addon_repo() -> AddOnDescriptor {
        let mut descriptor = AddOnDescriptor::new(ADDON_URL);
        descriptor.product_dir = "/foo".to_string();
        descriptor.priority = 50;
        descriptor
    }

    fn named_repo() -> AddOnDescriptor {
        let mut descriptor = addon_repo();
        descriptor.name = Some("Foo".to_string());
        descriptor
    }

    struct Harness {
        mocks: Mocks,
        caps: Capabilities,
        config: Config,
        events: CollectorSink,
        session: AddOnSession,
    }

    impl Harness {
        fn new(mocks: Mocks) -> Self {
            let caps = mocks.capabilities();
            let mut session = AddOnSession::new();
            session.set_base_product_url(Some(BASE_URL.to_string()));
            Self {
                mocks,
                caps,
                config: Config::default_config(),
                events: CollectorSink::default(),
                session,
            }
        }

        fn auto_mode(mut self, auto: bool) -> Self {
            self.config.auto_mode = Some(auto);
            self
        }

        fn run(&mut self, descriptor: &AddOnDescriptor) -> AddOnState {
            let env = WorkflowEnv::new(&self.caps, &self.config, &self.events, 1);
            process_descriptor(&env, &mut self.session, descriptor)
        }

        fn run_sources(&mut self, sources: Option<&[DescriptorSource]>) -> Vec<DescriptorOutcome> {
            let env = WorkflowEnv::new(&self.caps, &self.config, &self.events, 1);
            process_sources(&env, &mut self.session, sources)
        }
    }

    #[test]
    fn test_adds_repository() {
        let mut h = Harness::new(Mocks::new());
        h.mocks.package_manager.on_add(ADDON_URL, Some(1));

        let state = h.run(&addon_repo());
        assert!(matches!(state, AddOnState::Integrated(_)));
        assert_eq!(h.session.records().len(), 1);
        assert_eq!(
            h.mocks.package_manager.add_requests()[0].prod_dir,
            "/foo".to_string()
        );
        assert_eq!(h.mocks.package_manager.add_requests()[0].priority, Some(50));
    }

    #[test]
    fn test_license_unset_in_auto_mode() {
        let mut h = Harness::new(Mocks::new()).auto_mode(true);
        h.run(&addon_repo());
        assert!(h.mocks.prompt.license_requests().is_empty());
        assert_eq!(h.session.records().len(), 1);
    }

    #[test]
    fn test_license_unset_in_interactive_mode() {
        let mut h = Harness::new(Mocks::new()).auto_mode(false);
        h.run(&addon_repo());
        assert_eq!(h.mocks.prompt.license_requests().len(), 1);
    }

    #[test]
    fn test_license_true_always_asks() {
        let mut descriptor = addon_repo();
        descriptor.confirm_license = Some(true);
        for auto in [true, false] {
            let mut h = Harness::new(Mocks::new()).auto_mode(auto);
            h.run(&descriptor);
            assert_eq!(h.mocks.prompt.license_requests().len(), 1);
        }
    }

    #[test]
    fn test_license_false_never_asks() {
        let mut descriptor = addon_repo();
        descriptor.confirm_license = Some(false);
        for auto in [true, false] {
            let mut h = Harness::new(Mocks::new()).auto_mode(auto);
            h.run(&descriptor);
            assert!(h.mocks.prompt.license_requests().is_empty());
        }
    }

    #[test]
    fn test_license_rejection_deletes_repository() {
        let mut h = Harness::new(Mocks::with_prompt(MockPrompt::rejecting_license()));
        h.mocks.package_manager.on_add(ADDON_URL, Some(1));

        let state = h.run(&addon_repo());
        assert!(matches!(
            state,
            AddOnState::RolledBack {
                cause: AddOnError::LicenseRejected { .. },
                ..
            }
        ));
        assert_eq!(h.mocks.package_manager.deleted(), vec![1]);
        assert!(h.session.records().is_empty());
        assert!(h.mocks.installer.calls().is_empty());
    }

    #[test]
    fn test_install_products_partial() {
        let mut h = Harness::new(Mocks::new());
        h.mocks.package_manager.on_add(ADDON_URL, Some(1));
        h.mocks
            .package_manager
            .set_installable(&["available_product"]);
        let mut descriptor = addon_repo();
        descriptor.install_products = Some(vec![
            "available_product".to_string(),
            "not_available_product".to_string(),
        ]);

        h.run(&descriptor);
        assert_eq!(h.session.records().len(), 1);
        assert_eq!(
            h.session.selected_products(),
            ["available_product".to_string()]
        );
        assert_eq!(
            h.events.reports(LogLevel::Error),
            vec!["Product not_available_product not found on media.".to_string()]
        );
        assert_eq!(
            h.mocks.package_manager.count(&PackageManagerCall::MarkInstall(
                "not_available_product".to_string(),
                ResolvableKind::Product
            )),
            1
        );
    }

    #[test]
    fn test_asks_for_cd_when_add_fails() {
        let mut h = Harness::new(Mocks::new());
        h.mocks.package_manager.on_add(ADDON_URL, None);
        h.mocks.package_manager.on_add(CD_URL, Some(1));
        h.mocks.prompt.answer_media(&[Some(CD_URL)]);

        let state = h.run(&addon_repo());
        assert!(matches!(state, AddOnState::Integrated(_)));
        let requests = h.mocks.package_manager.add_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].base_urls, vec![CD_URL.to_string()]);
        assert_eq!(requests[1].prod_dir, "/foo");
        assert_eq!(requests[1].priority, Some(50));
        assert_eq!(h.session.records()[0].media_url, CD_URL);
    }

    #[test]
    fn test_cancelled_media_request() {
        let mut h = Harness::new(Mocks::new());
        h.mocks.package_manager.on_add(ADDON_URL, None);

        let state = h.run(&addon_repo());
        assert!(matches!(
            state,
            AddOnState::Failed(AddOnError::MediaCancelled { .. })
        ));
        assert!(h.session.records().is_empty());
        assert!(h.mocks.package_manager.deleted().is_empty());
    }

    #[test]
    fn test_network_scheme_checks_network() {
        let mut h = Harness::new(Mocks::with_prompt(MockPrompt::without_network()));
        let url = "http://example.net/repo";
        h.mocks.package_manager.on_add(url, None);
        let mut descriptor = addon_repo();
        descriptor.url = url.to_string();

        let state = h.run(&descriptor);
        assert!(matches!(
            state,
            AddOnState::Failed(AddOnError::NetworkUnavailable { .. })
        ));
        assert_eq!(h.mocks.prompt.network_checks(), 1);
        assert!(h.mocks.prompt.media_requests().is_empty());
        assert_eq!(h.mocks.package_manager.add_requests().len(), 1);
    }

    #[test]
    fn test_network_reachable_keeps_registration_error() {
        let mut h = Harness::new(Mocks::new());
        let url = "https://example.net/repo";
        h.mocks.package_manager.on_add(url, None);
        let mut descriptor = addon_repo();
        descriptor.url = url.to_string();

        let state = h.run(&descriptor);
        assert!(matches!(
            state,
            AddOnState::Failed(AddOnError::RegistrationFailure { .. })
        ));
        assert_eq!(h.mocks.prompt.network_checks(), 1);
    }

    #[test]
    fn test_matching_name_adds_without_asking() {
        let mut h = Harness::new(Mocks::new());
        h.mocks.package_manager.on_add(ADDON_URL, Some(1));
        h.mocks.package_manager.set_label(1, "Foo");

        let state = h.run(&named_repo());
        assert!(matches!(state, AddOnState::Integrated(_)));
        assert!(h.mocks.prompt.media_requests().is_empty());
        assert_eq!(h.session.records()[0].product, "Foo");
    }

    #[test]
    fn test_mismatch_cancelled() {
        let mut h = Harness::new(Mocks::new());
        h.mocks.package_manager.on_add(ADDON_URL, Some(2));
        h.mocks.package_manager.set_label(2, "other");

        let state = h.run(&named_repo());
        assert!(matches!(
            state,
            AddOnState::RolledBack {
                cause: AddOnError::NameMismatch { .. },
                ..
            }
        ));
        assert_eq!(h.mocks.package_manager.deleted(), vec![2]);
        assert!(h.session.records().is_empty());
        assert!(h.mocks.installer.calls().is_empty());
    }

    #[test]
    fn test_mismatch_then_valid_cd() {
        let mut h = Harness::new(Mocks::new());
        h.mocks.package_manager.on_add(ADDON_URL, Some(2));
        h.mocks.package_manager.on_add(CD_URL, Some(1));
        h.mocks.package_manager.set_label(1, "Foo");
        h.mocks.package_manager.set_label(2, "other");
        h.mocks.prompt.answer_media(&[Some(CD_URL)]);

        let state = h.run(&named_repo());
        assert_eq!(state.record().map(|r| r.media), Some(RepositoryHandle::new(1)));
        assert_eq!(h.mocks.package_manager.deleted(), vec![2]);
        assert_eq!(h.session.records().len(), 1);
    }

    #[test]
    fn test_retry_keeps_original_url() {
        let mut h = Harness::new(Mocks::new());
        h.mocks.package_manager.on_add(ADDON_URL, None);
        h.mocks.package_manager.on_add(OTHER_CD_URL, Some(2));
        h.mocks.package_manager.on_add(CD_URL, Some(1));
        h.mocks.package_manager.set_label(1, "Foo");
        h.mocks.package_manager.set_label(2, "other");
        h.mocks.prompt.answer_media(&[Some(OTHER_CD_URL), None]);

        let state = h.run(&named_repo());
        assert!(matches!(state, AddOnState::RolledBack { .. }));
        let expected = (ADDON_URL.to_string(), Some("Foo".to_string()));
        assert_eq!(
            h.mocks.prompt.media_requests(),
            vec![expected.clone(), expected]
        );
        assert_eq!(h.mocks.package_manager.deleted(), vec![2]);
        assert!(h.session.records().is_empty());
    }

    #[test]
    fn test_cancel_after_mismatch_and_failed_retry_is_rolled_back() {
        let mut h = Harness::new(Mocks::new());
        h.mocks.package_manager.on_add(ADDON_URL, Some(2));
        h.mocks.package_manager.on_add(OTHER_CD_URL, None);
        h.mocks.package_manager.set_label(2, "other");
        h.mocks.prompt.answer_media(&[Some(OTHER_CD_URL), None]);

        let state = h.run(&named_repo());
        assert!(matches!(
            state,
            AddOnState::RolledBack {
                handle,
                cause: AddOnError::MediaCancelled { .. },
            } if handle == RepositoryHandle::new(2)
        ));
        assert_eq!(h.mocks.package_manager.deleted(), vec![2]);
        assert_eq!(h.mocks.prompt.media_requests().len(), 2);
        assert!(h.session.records().is_empty());
    }

    #[test]
    fn test_check_name_disabled() {
        let mut h = Harness::new(Mocks::new());
        h.mocks.package_manager.on_add(ADDON_URL, Some(2));
        h.mocks.package_manager.set_label(2, "other");
        let mut descriptor = named_repo();
        descriptor.check_name = false;

        let state = h.run(&descriptor);
        assert!(matches!(state, AddOnState::Integrated(_)));
        assert!(h.mocks.package_manager.deleted().is_empty());
    }

    #[test]
    fn test_network_mismatch_does_not_prompt() {
        let mut h = Harness::new(Mocks::new());
        let url = "http://example.net/repo";
        h.mocks.package_manager.on_add(url, Some(3));
        h.mocks.package_manager.set_label(3, "other");
        let mut descriptor = named_repo();
        descriptor.url = url.to_string();

        let state = h.run(&descriptor);
        assert!(matches!(state, AddOnState::RolledBack { .. }));
        assert_eq!(h.mocks.package_manager.deleted(), vec![3]);
        assert!(h.mocks.prompt.media_requests().is_empty());
        assert_eq!(h.mocks.prompt.network_checks(), 0);
    }

    #[test]
    fn test_prepare_url() {
        let mut session = AddOnSession::new();
        session.set_base_product_url(Some("http://example.net/base?alias=base".to_string()));

        let mut descriptor = AddOnDescriptor::new("relurl://addon");
        descriptor.name = Some("SDK".to_string());
        assert_eq!(
            prepare_url(&session, &descriptor).unwrap(),
            "http://example.net/base/addon?alias=SDK"
        );

        let mut descriptor = AddOnDescriptor::new("http://example.com/repo?alias=yourSLES");
        descriptor.alias = Some("mySLES".to_string());
        descriptor.name = Some("ignored".to_string());
        assert_eq!(
            prepare_url(&session, &descriptor).unwrap(),
            "http://example.com/repo?alias=mySLES"
        );
    }

    #[test]
    fn test_relative_url_without_base_fails() {
        let mut h = Harness::new(Mocks::new());
        h.session.set_base_product_url(None);

        let state = h.run(&AddOnDescriptor::new("relurl://addon"));
        assert!(matches!(state, AddOnState::Failed(AddOnError::Url(_))));
        assert!(h.mocks.package_manager.add_requests().is_empty());
        assert_eq!(h.events.reports(LogLevel::Error).len(), 1);
    }

    #[test]
    fn test_empty_source_list() {
        let mut h = Harness::new(Mocks::new());
        assert!(h.run_sources(None).is_empty());
        assert!(h.run_sources(Some(&[])).is_empty());
        assert!(h.mocks.package_manager.calls().is_empty());
        assert!(h.events.is_empty());
    }

    #[test]
    fn test_xml_and_plain_sources() {
        let dir = tempdir().unwrap();
        let xml = dir.path().join("add_on_products.xml");
        fs::write(
            &xml,
            r#"<?xml version="1.0"?>
<add_on_products xmlns="http://www.suse.com/1.0/yast2ns">
  <product_items config:type="list" xmlns:config="http://www.suse.com/1.0/configns">
    <product_item>
      <url>cd:/?alias=Foo</url>
      <path>/foo</path>
      <priority config:type="integer">50</priority>
    </product_item>
  </product_items>
</add_on_products>
"#,
        )
        .unwrap();
        let plain = dir.path().join("add_on_products");
        fs::write(&plain, "# comment\nhttp://example.net/sdk /sdk\n").unwrap();

        let mut h = Harness::new(Mocks::new());
        let outcomes = h.run_sources(Some(&[
            DescriptorSource::new(&xml, SourceKind::Xml),
            DescriptorSource::new(&plain, SourceKind::Plain),
        ]));

        assert_eq!(outcomes.len(), 2);
        assert_eq!(
            h.mocks.package_manager.added_urls(),
            vec![ADDON_URL.to_string(), "http://example.net/sdk".to_string()]
        );
        assert_eq!(h.session.records().len(), 2);
    }

    #[test]
    fn test_unsupported_source_is_skipped() {
        let mut h = Harness::new(Mocks::new());
        let outcomes = h.run_sources(Some(&[DescriptorSource::new(
            "/add_on_products.xml",
            SourceKind::Other("unsupported".to_string()),
        )]));
        assert!(outcomes.is_empty());
        assert!(h.mocks.package_manager.calls().is_empty());
        assert!(h.events.reports(LogLevel::Error).is_empty());
    }

    #[test]
    fn test_malformed_source_is_reported() {
        let dir = tempdir().unwrap();
        let xml = dir.path().join("broken.xml");
        fs::write(&xml, "<add_on_products><product_items>").unwrap();

        let mut h = Harness::new(Mocks::new());
        let outcomes = h.run_sources(Some(&[DescriptorSource::new(&xml, SourceKind::Xml)]));
        assert!(outcomes.is_empty());
        assert_eq!(h.events.reports(LogLevel::Error).len(), 1);
    }

    #[test]
    fn test_failure_does_not_block_next_descriptor() {
        let dir = tempdir().unwrap();
        let plain = dir.path().join("add_on_products");
        fs::write(&plain, "dvd:/bad\nhttp://example.net/good\n").unwrap();

        let mut h = Harness::new(Mocks::new());
        h.mocks.package_manager.on_add("dvd:/bad", None);
        let outcomes = h.run_sources(Some(&[DescriptorSource::new(&plain, SourceKind::Plain)]));

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].state.error().is_some());
        assert!(outcomes[1].state.record().is_some());
    }
}
