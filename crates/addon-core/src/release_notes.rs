//! Release notes lookup with a package source, a URL source and a local store.

use std::{
    fmt,
    sync::{Arc, Mutex},
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::AddOnResult;

pub const DEFAULT_USER_LANG: &str = "en_US";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseNotesFormat {
    #[default]
    Txt,
    Rtf,
}

impl fmt::Display for ReleaseNotesFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Txt => write!(f, "txt"),
            Self::Rtf => write!(f, "rtf"),
        }
    }
}

/// Version of the release notes, or `Latest` when the source is unversioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseNotesVersion {
    Version(String),
    Latest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseNotes {
    pub product_name: String,
    pub content: String,
    /// Language that was asked for.
    pub user_lang: String,
    /// Language that was found.
    pub lang: String,
    pub format: ReleaseNotesFormat,
    pub version: ReleaseNotesVersion,
}

impl ReleaseNotes {
    fn matches(&self, product_name: &str, user_lang: &str, format: ReleaseNotesFormat) -> bool {
        self.product_name == product_name && self.user_lang == user_lang && self.format == format
    }
}

/// A place release notes can be downloaded from.
pub trait ReleaseNotesFetcher: Send + Sync {
    fn latest_version(&self) -> Option<ReleaseNotesVersion>;

    fn release_notes(&self, user_lang: &str, format: ReleaseNotesFormat) -> Option<ReleaseNotes>;
}

/// Release notes downloaded earlier in this run.
pub trait ReleaseNotesStore: Send + Sync {
    fn retrieve(
        &self,
        product_name: &str,
        user_lang: &str,
        format: ReleaseNotesFormat,
    ) -> Option<ReleaseNotes>;

    fn store(&self, release_notes: ReleaseNotes) -> AddOnResult<()>;

    fn clear(&self) -> AddOnResult<()>;
}

/// Store kept in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<Vec<ReleaseNotes>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReleaseNotesStore for MemoryStore {
    fn retrieve(
        &self,
        product_name: &str,
        user_lang: &str,
        format: ReleaseNotesFormat,
    ) -> Option<ReleaseNotes> {
        let entries = self.entries.lock().ok()?;
        entries
            .iter()
            .find(|notes| notes.matches(product_name, user_lang, format))
            .cloned()
    }

    fn store(&self, release_notes: ReleaseNotes) -> AddOnResult<()> {
        let mut entries = self.entries.lock()?;
        entries.retain(|notes| {
            !notes.matches(
                &release_notes.product_name,
                &release_notes.user_lang,
                release_notes.format,
            )
        });
        entries.push(release_notes);
        Ok(())
    }

    fn clear(&self) -> AddOnResult<()> {
        self.entries.lock()?.clear();
        Ok(())
    }
}

/// Whether the installed system is registered with the update service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStatus {
    Registered,
    Unregistered,
    /// Registration support is not available at all.
    Unsupported,
}

/// Reads the release notes of one product.
///
/// Registered systems prefer the release notes package, other systems the URL named by
/// the product. A copy in the store always wins and is never stored again.
pub struct ReleaseNotesReader {
    product_name: String,
    package: Arc<dyn ReleaseNotesFetcher>,
    url: Arc<dyn ReleaseNotesFetcher>,
    store: Arc<dyn ReleaseNotesStore>,
    registration: RegistrationStatus,
}

impl ReleaseNotesReader {
    pub fn new(
        product_name: impl Into<String>,
        package: Arc<dyn ReleaseNotesFetcher>,
        url: Arc<dyn ReleaseNotesFetcher>,
        store: Arc<dyn ReleaseNotesStore>,
        registration: RegistrationStatus,
    ) -> Self {
        Self {
            product_name: product_name.into(),
            package,
            url,
            store,
            registration,
        }
    }

    pub fn release_notes(
        &self,
        user_lang: &str,
        format: ReleaseNotesFormat,
    ) -> AddOnResult<Option<ReleaseNotes>> {
        if let Some(stored) = self.store.retrieve(&self.product_name, user_lang, format) {
            debug!(
                product = self.product_name.as_str(),
                user_lang = user_lang,
                "using stored release notes"
            );
            return Ok(Some(stored));
        }

        let sources: [(&str, &Arc<dyn ReleaseNotesFetcher>); 2] = match self.registration {
            RegistrationStatus::Registered => [("package", &self.package), ("url", &self.url)],
            _ => [("url", &self.url), ("package", &self.package)],
        };

        for (source, fetcher) in sources {
            debug!(
                product = self.product_name.as_str(),
                source = source,
                latest = ?fetcher.latest_version(),
                "fetching release notes"
            );
            if let Some(notes) = fetcher.release_notes(user_lang, format) {
                self.store.store(notes.clone())?;
                return Ok(Some(notes));
            }
        }

        debug!(product = self.product_name.as_str(), "no release notes found");
        Ok(None)
    }

    /// Release notes in the default language and plain text.
    pub fn default_release_notes(&self) -> AddOnResult<Option<ReleaseNotes>> {
        self.release_notes(DEFAULT_USER_LANG, ReleaseNotesFormat::Txt)
    }
}
