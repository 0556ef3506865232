pub mod state;

pub use state::{ChatSettings, InputSettings, ProviderSettings, SettingsError, SettingsStore};
