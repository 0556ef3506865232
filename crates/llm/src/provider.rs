use std::future::Future;
use std::pin::Pin;

use snafu::Snafu;
use tokio::sync::oneshot;

/// Speaker role as understood by completion providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub provider_id: String,
    pub api_key: String,
    pub endpoint: String,
}

impl ProviderConfig {
    pub fn new(
        provider_id: impl Into<String>,
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            provider_id: provider_id.into().trim().to_string(),
            api_key: api_key.into().trim().to_string(),
            endpoint: endpoint.into().trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderMessage {
    pub role: Role,
    pub content: String,
}

impl ProviderMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// One reply request: the full transcript so far plus generation knobs.
///
/// The last message is treated as the prompt; earlier messages are history.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseRequest {
    pub model_id: String,
    pub messages: Vec<ProviderMessage>,
    pub preamble: Option<String>,
    pub max_tokens: Option<u64>,
}

impl ResponseRequest {
    pub fn new(model_id: impl Into<String>, messages: Vec<ProviderMessage>) -> Self {
        Self {
            model_id: model_id.into(),
            messages,
            preamble: None,
            max_tokens: None,
        }
    }

    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = Some(preamble.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u64) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

pub type ProviderWorker = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;
pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ProviderError {
    #[snafu(display("missing API key for provider '{provider_id}'"))]
    MissingApiKey {
        stage: &'static str,
        provider_id: String,
    },
    #[snafu(display("provider '{provider_id}' is not supported"))]
    UnsupportedProvider {
        stage: &'static str,
        provider_id: String,
    },
    #[snafu(display("reply request for model '{model_id}' has no messages"))]
    EmptyMessageSet {
        stage: &'static str,
        model_id: String,
    },
    #[snafu(display("http client failed on `{stage}`, {source}"))]
    HttpClient {
        stage: &'static str,
        source: rig::http_client::Error,
    },
    #[snafu(display("completions failed on `{stage}`, {source}"))]
    CompletionsFailed {
        stage: &'static str,
        source: rig::completion::CompletionError,
    },
    #[snafu(display("model '{model_id}' returned an empty reply"))]
    EmptyReply {
        stage: &'static str,
        model_id: String,
    },
    #[snafu(display("provider worker stopped before replying"))]
    WorkerDropped {
        stage: &'static str,
        source: oneshot::error::RecvError,
    },
}

/// Receiving half of a reply; resolves once the worker finishes.
pub struct ResponseReceiver {
    reply: oneshot::Receiver<ProviderResult<String>>,
}

impl ResponseReceiver {
    pub async fn recv(self) -> ProviderResult<String> {
        match self.reply.await {
            Ok(result) => result,
            Err(source) => Err(ProviderError::WorkerDropped {
                stage: "receive-reply",
                source,
            }),
        }
    }
}

/// A started reply: `worker` must be driven on a tokio runtime while `reply`
/// is awaited wherever the caller lives.
pub struct ResponseHandle {
    pub reply: ResponseReceiver,
    pub worker: ProviderWorker,
}

pub trait LlmProvider: Send + Sync {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn respond(&self, request: ResponseRequest) -> ProviderResult<ResponseHandle>;
}

pub(crate) fn make_reply_channel() -> (oneshot::Sender<ProviderResult<String>>, ResponseReceiver) {
    let (reply_tx, reply) = oneshot::channel();
    (reply_tx, ResponseReceiver { reply })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_values_are_trimmed() {
        let config = ProviderConfig::new(" openai ", " sk-abc\n", " https://example.test/v1 ");
        assert_eq!(config.provider_id, "openai");
        assert_eq!(config.api_key, "sk-abc");
        assert_eq!(config.endpoint, "https://example.test/v1");
    }

    #[test]
    fn request_builders_set_optional_knobs() {
        let request = ResponseRequest::new(
            "gpt-4o-mini",
            vec![ProviderMessage::new(Role::User, "Hello")],
        )
        .with_preamble("Be brief.")
        .with_max_tokens(256);

        assert_eq!(request.preamble.as_deref(), Some("Be brief."));
        assert_eq!(request.max_tokens, Some(256));
        assert_eq!(request.messages.len(), 1);
    }

    #[tokio::test]
    async fn receiver_yields_worker_reply() {
        let (reply_tx, reply) = make_reply_channel();
        reply_tx
            .send(Ok("Hi there".to_string()))
            .expect("receiver alive");
        assert_eq!(reply.recv().await.expect("reply"), "Hi there");
    }

    #[tokio::test]
    async fn dropped_worker_is_reported() {
        let (reply_tx, reply) = make_reply_channel();
        drop(reply_tx);
        let error = reply.recv().await.expect_err("worker dropped");
        assert!(matches!(error, ProviderError::WorkerDropped { .. }));
    }
}
