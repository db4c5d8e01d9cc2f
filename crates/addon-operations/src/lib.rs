pub mod context;
pub mod progress;
pub mod types;

pub mod add;
pub mod profile;
pub mod remove;
pub mod rename;

pub use context::AddOnContext;
pub use types::*;
