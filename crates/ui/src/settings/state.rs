use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use easybot_llm::{DEFAULT_OPENAI_MODEL, ProviderConfig, resolve_model_id};
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use gpui::*;
use gpui_component::{Theme, ThemeMode};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use snafu::{ResultExt, Snafu};

use crate::chat::header::DEFAULT_TITLE;
use crate::chat::message_input::SubmitPolicy;

pub const DEFAULT_PROVIDER_ID: &str = "openai";
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";
pub const SETTINGS_DIRECTORY_NAME: &str = "easybot";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
/// Environment prefix; nested keys use `__`, e.g. `EASYBOT_PROVIDER__API_KEY`.
pub const SETTINGS_ENV_PREFIX: &str = "EASYBOT_";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSettings {
    /// Treat whitespace-only input as empty.
    #[serde(default)]
    pub reject_blank: bool,
}

impl InputSettings {
    pub fn submit_policy(&self) -> SubmitPolicy {
        if self.reject_blank {
            SubmitPolicy::RejectBlank
        } else {
            SubmitPolicy::RejectEmpty
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_provider_id")]
    pub provider_id: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub max_tokens: Option<u64>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            provider_id: default_provider_id(),
            api_key: String::new(),
            endpoint: default_endpoint(),
            model: default_model(),
            max_tokens: None,
        }
    }
}

impl ProviderSettings {
    pub fn to_provider_config(&self) -> Option<ProviderConfig> {
        if !self.is_valid() {
            return None;
        }

        Some(ProviderConfig::new(
            &self.provider_id,
            &self.api_key,
            &self.endpoint,
        ))
    }

    pub fn is_valid(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Fills a blank API key and model from the conventional `OPENAI_*` variables.
    pub fn with_openai_fallback(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup_trimmed = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if self.api_key.trim().is_empty()
            && let Some(api_key) = lookup_trimmed("OPENAI_API_KEY")
        {
            self.api_key = api_key;
            if self.model == DEFAULT_OPENAI_MODEL
                && let Some(model) = lookup_trimmed("OPENAI_MODEL")
            {
                self.model = model;
            }
            if self.endpoint == DEFAULT_ENDPOINT
                && let Some(endpoint) = lookup_trimmed("OPENAI_BASE_URL")
            {
                self.endpoint = endpoint;
            }
        }

        self
    }

    fn normalized(mut self) -> Self {
        self.provider_id = if self.provider_id.trim().is_empty() {
            default_provider_id()
        } else {
            self.provider_id.trim().to_string()
        };
        self.api_key = self.api_key.trim().to_string();
        self.endpoint = if self.endpoint.trim().is_empty() {
            default_endpoint()
        } else {
            self.endpoint.trim().to_string()
        };
        self.model = resolve_model_id(&self.model);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSettings {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(
        default = "default_theme_mode",
        serialize_with = "serialize_theme_mode",
        deserialize_with = "deserialize_theme_mode"
    )]
    pub theme_mode: ThemeMode,
    /// System prompt sent ahead of every conversation.
    #[serde(default)]
    pub preamble: Option<String>,
    #[serde(default)]
    pub input: InputSettings,
    #[serde(default)]
    pub provider: ProviderSettings,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            title: default_title(),
            theme_mode: default_theme_mode(),
            preamble: None,
            input: InputSettings::default(),
            provider: ProviderSettings::default(),
        }
    }
}

impl ChatSettings {
    pub fn normalized(mut self) -> Self {
        self.title = if self.title.trim().is_empty() {
            default_title()
        } else {
            self.title.trim().to_string()
        };
        self.preamble = self
            .preamble
            .map(|preamble| preamble.trim().to_string())
            .filter(|preamble| !preamble.is_empty());
        self.provider = self.provider.normalized();
        self
    }

    pub fn apply_theme(&self, window: Option<&mut Window>, cx: &mut App) {
        Theme::change(self.theme_mode, window, cx);
    }

    fn with_environment_fallback(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        self.provider = self.provider.with_openai_fallback(lookup);
        self
    }
}

/// Shared, lock-free snapshot of the loaded settings.
pub struct SettingsStore {
    settings: ArcSwap<ChatSettings>,
    config_path: PathBuf,
}

impl Global for SettingsStore {}

impl SettingsStore {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".easybot"))
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(SETTINGS_FILE_NAME)
    }

    pub fn new(config_path: PathBuf) -> Self {
        let settings = Self::load_or_default(&config_path);
        Self {
            settings: ArcSwap::from_pointee(settings),
            config_path,
        }
    }

    pub fn load() -> Self {
        Self::new(Self::default_config_path())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> Arc<ChatSettings> {
        self.settings.load_full()
    }

    /// Re-reads the settings file; a malformed file keeps the previous snapshot.
    pub fn reload(&self) -> Result<Arc<ChatSettings>, SettingsError> {
        let settings = Arc::new(
            Self::try_load_from(&self.config_path)?
                .with_environment_fallback(|name| std::env::var(name).ok()),
        );
        self.settings.store(settings.clone());
        tracing::info!(path = ?self.config_path, "reloaded settings");
        Ok(settings)
    }

    /// Layers defaults, the JSON file and `EASYBOT_` variables, in that order.
    pub fn try_load_from(path: &Path) -> Result<ChatSettings, SettingsError> {
        if !path.exists() {
            tracing::info!(path = ?path, "settings file not found, using defaults and environment");
        }

        let figment = Figment::from(Serialized::defaults(ChatSettings::default()))
            .merge(Json::file(path))
            .merge(Env::prefixed(SETTINGS_ENV_PREFIX).split("__"));

        let settings = figment
            .extract::<ChatSettings>()
            .map_err(Box::new)
            .context(ExtractSnafu {
                stage: "extract-settings",
                path: path.to_path_buf(),
            })?;

        Ok(settings.normalized())
    }

    fn load_or_default(path: &Path) -> ChatSettings {
        let settings = match Self::try_load_from(path) {
            Ok(settings) => settings,
            Err(error) => {
                tracing::warn!(error = %error, "failed to load settings, using defaults");
                ChatSettings::default()
            }
        };

        settings.with_environment_fallback(|name| std::env::var(name).ok())
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SettingsError {
    #[snafu(display("failed to read settings from {path:?} on `{stage}`: {source}"))]
    Extract {
        stage: &'static str,
        path: PathBuf,
        source: Box<figment::Error>,
    },
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_provider_id() -> String {
    DEFAULT_PROVIDER_ID.to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_OPENAI_MODEL.to_string()
}

fn default_theme_mode() -> ThemeMode {
    ThemeMode::Light
}

fn serialize_theme_mode<S>(value: &ThemeMode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value.name())
}

fn deserialize_theme_mode<'de, D>(deserializer: D) -> Result<ThemeMode, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(parse_theme_mode(&value))
}

fn parse_theme_mode(value: &str) -> ThemeMode {
    if value.trim().eq_ignore_ascii_case("dark") {
        ThemeMode::Dark
    } else {
        ThemeMode::Light
    }
}
