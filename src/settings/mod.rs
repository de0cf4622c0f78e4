//! Settings persistence and editing module
//!
//! Settings are validated here, at the editing boundary. The phase engine
//! trusts whatever it is handed.

pub mod bounds;
pub mod store;

// Re-export main types
pub use bounds::SettingsPatch;
pub use store::{SettingsStore, SETTINGS_KEY};
