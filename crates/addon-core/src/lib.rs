use error::AddOnError;

pub mod capability;
pub mod constants;
pub mod descriptor;
pub mod error;
pub mod integrator;
pub mod license;
pub mod media;
pub mod profile;
pub mod registrar;
pub mod release_notes;
pub mod rename;
pub mod session;
pub mod types;
pub mod workflow;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub type AddOnResult<T> = std::result::Result<T, AddOnError>;
