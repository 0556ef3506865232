//! Provider boundary for EasyBot model replies.
//!
//! The UI crate hands a [`ResponseRequest`] to an [`LlmProvider`] and awaits the
//! concatenated reply through the returned [`ResponseHandle`].
use std::sync::Arc;

mod model;
mod provider;
mod rig_adapter;

pub use model::{DEFAULT_OPENAI_MODEL, resolve_model_id};
pub use provider::{
    LlmProvider, ProviderConfig, ProviderError, ProviderMessage, ProviderResult, ProviderWorker,
    ResponseHandle, ResponseReceiver, ResponseRequest, Role,
};
pub use rig_adapter::{RIG_OPENAI_PROVIDER_ID, RigProviderAdapter};

/// Builds the provider named by `config.provider_id`.
///
/// An empty id selects the rig-backed OpenAI adapter.
pub fn create_provider(mut config: ProviderConfig) -> ProviderResult<Arc<dyn LlmProvider>> {
    if config.provider_id.is_empty() {
        config.provider_id = RIG_OPENAI_PROVIDER_ID.to_string();
    }

    match config.provider_id.as_str() {
        "openai" | "rig-openai" => {
            config.provider_id = RIG_OPENAI_PROVIDER_ID.to_string();
            Ok(Arc::new(RigProviderAdapter::new(config)?))
        }
        _ => Err(ProviderError::UnsupportedProvider {
            stage: "create-provider",
            provider_id: config.provider_id,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_provider_id_is_rejected() {
        let config = ProviderConfig::new("gemini", "key", "");
        let error = create_provider(config).err().expect("gemini is not wired");
        assert!(matches!(
            error,
            ProviderError::UnsupportedProvider { ref provider_id, .. } if provider_id == "gemini"
        ));
    }

    #[test]
    fn empty_provider_id_falls_back_to_openai() {
        let config = ProviderConfig::new("  ", "sk-test", "https://api.openai.com/v1");
        let provider = create_provider(config).expect("openai adapter");
        assert_eq!(provider.id(), RIG_OPENAI_PROVIDER_ID);
    }

    #[test]
    fn rig_alias_normalizes_to_openai_id() {
        let config = ProviderConfig::new("rig-openai", "sk-test", "");
        let provider = create_provider(config).expect("openai adapter");
        assert_eq!(provider.id(), "openai");
    }

    #[test]
    fn missing_api_key_surfaces_from_factory() {
        let config = ProviderConfig::new("openai", "   ", "");
        let error = create_provider(config).err().expect("blank key");
        assert!(matches!(error, ProviderError::MissingApiKey { .. }));
    }
}
