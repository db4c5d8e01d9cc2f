use std::{
    collections::HashSet,
    fs,
    path::PathBuf,
    sync::{LazyLock, PoisonError, RwLock},
};

use addon_utils::{
    path::{resolve_path, xdg_cache_home, xdg_config_home},
    url::scheme,
};
use documented::{Documented, DocumentedFields};
use serde::{Deserialize, Serialize};
use toml_edit::DocumentMut;
use tracing::info;

use crate::{
    annotations::{annotate_toml_array_of_tables, annotate_toml_table},
    error::{ConfigError, Result},
};

/// URL schemes treated as network sources unless overridden.
pub const DEFAULT_NETWORK_SCHEMES: &[&str] = &[
    "http", "https", "ftp", "tftp", "nfs", "nfs4", "cifs", "smb", "slp",
];

pub const DEFAULT_EXTENSION_ARCHIVE: &str = "y2update.tgz";

pub const DEFAULT_UPDATE_METADATA_DIR: &str = "usr/share/YaST2/scrconf";

/// A product rename known ahead of time.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, Documented, DocumentedFields)]
pub struct RenameRule {
    /// Product name used by the older release.
    pub from: String,

    /// Product name it was renamed to.
    pub to: String,
}

/// Add-on integration configuration.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Documented, DocumentedFields)]
pub struct Config {
    /// Unattended installation mode.
    /// Default: false
    pub auto_mode: Option<bool>,

    /// Root of the running installer that extension archives are merged into.
    /// Default: /
    pub inst_sys_root: Option<String>,

    /// Scratch directory for unpacking extension archives.
    /// Default: $XDG_CACHE_HOME/addon
    pub work_dir: Option<String>,

    /// Name of the installer extension archive looked up on each add-on medium.
    /// Default: y2update.tgz
    pub extension_archive: Option<String>,

    /// Directory inside the extension archive whose presence triggers an agent reload.
    /// Default: usr/share/YaST2/scrconf
    pub update_metadata_dir: Option<String>,

    /// URL schemes that run a network check instead of asking for other media.
    /// Default: http, https, ftp, tftp, nfs, nfs4, cifs, smb, slp
    pub network_schemes: Option<Vec<String>>,

    /// URL of the base product medium, used to expand `relurl://` URLs.
    pub base_product_url: Option<String>,

    /// Additional product renames, on top of the built-in list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub renames: Vec<RenameRule>,
}

pub static CONFIG_PATH: LazyLock<RwLock<PathBuf>> = LazyLock::new(|| {
    RwLock::new(match std::env::var("ADDON_CONFIG") {
        Ok(path_str) => PathBuf::from(path_str),
        Err(_) => xdg_config_home().join("addon").join("config.toml"),
    })
});

/// Current location of the configuration file.
pub fn config_path() -> PathBuf {
    CONFIG_PATH
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Points [`CONFIG_PATH`] at a different file.
pub fn set_config_path(path: PathBuf) {
    *CONFIG_PATH.write().unwrap_or_else(PoisonError::into_inner) = path;
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn default_config() -> Self {
        Self {
            auto_mode: Some(false),
            inst_sys_root: Some("/".to_string()),
            work_dir: Some(format!("{}/addon", xdg_cache_home().display())),
            extension_archive: Some(DEFAULT_EXTENSION_ARCHIVE.to_string()),
            update_metadata_dir: Some(DEFAULT_UPDATE_METADATA_DIR.to_string()),
            network_schemes: Some(
                DEFAULT_NETWORK_SCHEMES
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ),
            base_product_url: None,
            renames: Vec::new(),
        }
    }

    /// Creates a new configuration by loading it from the configuration file.
    /// If the configuration file is not found, it uses the default configuration.
    pub fn new() -> Result<Self> {
        let config_path = config_path();

        let mut config = match fs::read_to_string(&config_path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default_config(),
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.resolve()?;

        Ok(config)
    }

    /// Fills unset values with defaults and validates the rest.
    pub fn resolve(&mut self) -> Result<()> {
        let defaults = Self::default_config();

        self.auto_mode.get_or_insert(false);
        if self.inst_sys_root.is_none() {
            self.inst_sys_root = defaults.inst_sys_root;
        }
        if self.work_dir.is_none() {
            self.work_dir = defaults.work_dir;
        }
        if self.extension_archive.is_none() {
            self.extension_archive = defaults.extension_archive;
        }
        if self.update_metadata_dir.is_none() {
            self.update_metadata_dir = defaults.update_metadata_dir;
        }
        if self.network_schemes.is_none() {
            self.network_schemes = defaults.network_schemes;
        }

        if let Some(archive) = &self.extension_archive {
            let archive = archive.trim();
            if archive.is_empty() {
                return Err(ConfigError::EmptyValue("extension_archive"));
            }
            if archive.contains('/') {
                return Err(ConfigError::InvalidExtensionArchive(archive.to_string()));
            }
        }

        if self
            .inst_sys_root
            .as_deref()
            .is_some_and(|root| root.trim().is_empty())
        {
            return Err(ConfigError::EmptyValue("inst_sys_root"));
        }

        if let Some(schemes) = &mut self.network_schemes {
            for entry in schemes.iter_mut() {
                let normalized = scheme(&format!("{entry}:"))
                    .ok_or_else(|| ConfigError::InvalidScheme(entry.clone()))?;
                *entry = normalized;
            }
            let mut seen = HashSet::new();
            schemes.retain(|s| seen.insert(s.clone()));
        }

        for rule in &self.renames {
            let from = rule.from.trim();
            let to = rule.to.trim();
            if from.is_empty() || to.is_empty() || from == to {
                return Err(ConfigError::InvalidRename {
                    from: rule.from.clone(),
                    to: rule.to.clone(),
                });
            }
        }

        if self
            .base_product_url
            .as_deref()
            .is_some_and(|url| url.trim().is_empty())
        {
            self.base_product_url = None;
        }

        Ok(())
    }

    pub fn is_unattended(&self) -> bool {
        if let Ok(value) = std::env::var("ADDON_AUTO_MODE") {
            return matches!(value.as_str(), "1" | "true" | "yes");
        }
        self.auto_mode.unwrap_or(false)
    }

    pub fn get_inst_sys_root(&self) -> Result<PathBuf> {
        if let Ok(env_path) = std::env::var("ADDON_INST_SYS_ROOT") {
            return Ok(resolve_path(&env_path)?);
        }
        Ok(resolve_path(self.inst_sys_root.as_deref().unwrap_or("/"))?)
    }

    pub fn get_work_dir(&self) -> Result<PathBuf> {
        if let Ok(env_path) = std::env::var("ADDON_WORK_DIR") {
            return Ok(resolve_path(&env_path)?);
        }
        match &self.work_dir {
            Some(work_dir) => Ok(resolve_path(work_dir)?),
            None => Ok(xdg_cache_home().join("addon")),
        }
    }

    pub fn get_extension_archive(&self) -> &str {
        self.extension_archive
            .as_deref()
            .unwrap_or(DEFAULT_EXTENSION_ARCHIVE)
    }

    pub fn get_update_metadata_dir(&self) -> &str {
        self.update_metadata_dir
            .as_deref()
            .unwrap_or(DEFAULT_UPDATE_METADATA_DIR)
    }

    /// Whether `url` uses one of the configured network schemes.
    pub fn is_network_url(&self, url: &str) -> bool {
        let Some(url_scheme) = scheme(url) else {
            return false;
        };
        match &self.network_schemes {
            Some(schemes) => schemes.iter().any(|s| s.eq_ignore_ascii_case(&url_scheme)),
            None => DEFAULT_NETWORK_SCHEMES.contains(&url_scheme.as_str()),
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = config_path();
        let serialized = toml::to_string_pretty(self)?;
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&config_path, serialized)?;
        info!("Configuration saved to {}", config_path.display());
        Ok(())
    }

    /// TOML document with every field's documentation written above its key.
    pub fn to_annotated_document(&self) -> Result<DocumentMut> {
        let toml_string = toml::to_string_pretty(self)?;
        let mut doc = toml_string.parse::<DocumentMut>()?;

        annotate_toml_table::<Config>(doc.as_table_mut(), true)?;

        if let Some(renames) = doc
            .get_mut("renames")
            .and_then(|item| item.as_array_of_tables_mut())
        {
            annotate_toml_array_of_tables::<RenameRule>(renames)?;
        }

        Ok(doc)
    }

    pub fn to_annotated_string(&self) -> Result<String> {
        Ok(self.to_annotated_document()?.to_string())
    }
}

pub fn generate_default_config() -> Result<()> {
    let config_path = config_path();

    if config_path.exists() {
        return Err(ConfigError::ConfigAlreadyExists);
    }

    let annotated = Config::default_config().to_annotated_document()?;

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&config_path, annotated.to_string())?;
    info!(
        "Default configuration file generated with documentation at: {}",
        config_path.display()
    );
    Ok(())
}
