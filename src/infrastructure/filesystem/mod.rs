pub mod project_locator;
pub mod settings_store;

pub use project_locator::locate_project_root;
pub use settings_store::{SettingsStore, SettingsStoreError};
