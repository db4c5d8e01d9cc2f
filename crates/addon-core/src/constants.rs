//! Constants used throughout addon-core.

/// Priority value meaning "let the package manager decide".
pub const DEFAULT_PRIORITY: i32 = -1;

/// Product directory used when a descriptor does not name one.
pub const DEFAULT_PRODUCT_DIR: &str = "/";

/// Product renames known from past releases, seeded into every rename cache.
pub const DEFAULT_RENAMES: &[(&str, &str)] = &[
    ("SUSE_SLES", "SLES"),
    ("SUSE_SLED", "SLED"),
    ("SUSE_SLES_SAP", "SLES_SAP"),
    ("sle-haegeo", "sle-ha-geo"),
    ("sle-hpc", "SLE_HPC"),
    ("sle-module-toolchain", "sle-module-development-tools"),
];

/// Staging directory (below the work dir) for unpacked extension archives.
pub const EXTENSION_STAGING_DIR: &str = "extension";
