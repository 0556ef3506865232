use futures::StreamExt;
use rig::completion::{CompletionModel, Message as RigMessage};
use rig::prelude::CompletionClient;
use rig::providers::openai;
use rig::streaming::StreamedAssistantContent;
use snafu::{ResultExt, ensure};
use tokio::sync::oneshot;

use super::provider::{
    CompletionsFailedSnafu, EmptyMessageSetSnafu, EmptyReplySnafu, HttpClientSnafu, LlmProvider,
    MissingApiKeySnafu, ProviderConfig, ProviderError, ProviderMessage, ProviderResult,
    ProviderWorker, ResponseHandle, ResponseRequest, Role, make_reply_channel,
};

pub const RIG_OPENAI_PROVIDER_ID: &str = "openai";

type RigStreamingResponse = rig::streaming::StreamingCompletionResponse<
    rig::providers::openai::responses_api::streaming::StreamingCompletionResponse,
>;

/// OpenAI-compatible provider backed by rig's streaming completions.
///
/// Text deltas are concatenated so the caller receives one finished reply.
pub struct RigProviderAdapter {
    config: ProviderConfig,
}

impl RigProviderAdapter {
    pub fn new(config: ProviderConfig) -> ProviderResult<Self> {
        ensure!(
            !config.api_key.is_empty(),
            MissingApiKeySnafu {
                stage: "rig-adapter-new",
                provider_id: config.provider_id.clone(),
            }
        );

        Ok(Self { config })
    }

    fn build_client(config: &ProviderConfig) -> ProviderResult<openai::Client> {
        let mut builder = openai::Client::builder().api_key(config.api_key.as_str());
        if !config.endpoint.is_empty() {
            builder = builder.base_url(config.endpoint.as_str());
        }
        builder.build().context(HttpClientSnafu {
            stage: "build-client",
        })
    }

    fn to_rig_message(message: &ProviderMessage) -> Option<RigMessage> {
        match message.role {
            Role::System => None,
            Role::User => Some(RigMessage::user(message.content.clone())),
            Role::Assistant => Some(RigMessage::assistant(message.content.clone())),
        }
    }

    fn merged_preamble(request: &ResponseRequest) -> Option<String> {
        let mut preamble_parts = Vec::new();

        if let Some(preamble) = &request.preamble
            && !preamble.trim().is_empty()
        {
            preamble_parts.push(preamble.clone());
        }

        // Rig has a single preamble slot; system turns are appended to it.
        for message in &request.messages {
            if matches!(message.role, Role::System) && !message.content.trim().is_empty() {
                preamble_parts.push(message.content.clone());
            }
        }

        if preamble_parts.is_empty() {
            None
        } else {
            Some(preamble_parts.join("\n\n"))
        }
    }

    async fn open_stream(
        config: &ProviderConfig,
        request: &ResponseRequest,
    ) -> ProviderResult<RigStreamingResponse> {
        let client = Self::build_client(config)?;
        let model = client.completion_model(request.model_id.clone());

        let mut messages = request
            .messages
            .iter()
            .filter_map(Self::to_rig_message)
            .collect::<Vec<_>>();

        let Some(prompt) = messages.pop() else {
            tracing::warn!(
                model_id = %request.model_id,
                total_message_count = request.messages.len(),
                "cannot open stream because no user/model messages remain after filtering"
            );
            return EmptyMessageSetSnafu {
                stage: "open-stream-pop-prompt",
                model_id: request.model_id.clone(),
            }
            .fail();
        };
        let mut builder = model.completion_request(prompt).messages(messages);

        if let Some(preamble) = Self::merged_preamble(request) {
            builder = builder.preamble(preamble);
        }

        if let Some(max_tokens) = request.max_tokens {
            builder = builder.max_tokens(max_tokens);
        }

        builder.stream().await.context(CompletionsFailedSnafu {
            stage: "open-stream",
        })
    }

    async fn collect_reply(
        config: &ProviderConfig,
        request: &ResponseRequest,
        reply_tx: &mut oneshot::Sender<ProviderResult<String>>,
    ) -> Option<ProviderResult<String>> {
        let mut stream = match Self::open_stream(config, request).await {
            Ok(stream) => stream,
            Err(error) => return Some(Err(error)),
        };

        let mut reply = String::new();
        loop {
            tokio::select! {
                _ = reply_tx.closed() => {
                    tracing::debug!(model_id = %request.model_id, "reply receiver dropped; cancelling stream");
                    stream.cancel();
                    return None;
                }
                next_item = stream.next() => {
                    match next_item {
                        Some(Ok(StreamedAssistantContent::Text(text))) => reply.push_str(&text.text),
                        Some(Ok(_)) => {}
                        Some(Err(source)) => {
                            return Some(Err(ProviderError::CompletionsFailed {
                                stage: "stream-chunk",
                                source,
                            }));
                        }
                        None => break,
                    }
                }
            }
        }

        if reply.trim().is_empty() {
            return Some(
                EmptyReplySnafu {
                    stage: "collect-reply",
                    model_id: request.model_id.clone(),
                }
                .fail(),
            );
        }

        Some(Ok(reply))
    }

    async fn run_reply_worker(
        config: ProviderConfig,
        request: ResponseRequest,
        mut reply_tx: oneshot::Sender<ProviderResult<String>>,
    ) {
        let Some(result) = Self::collect_reply(&config, &request, &mut reply_tx).await else {
            return;
        };

        match &result {
            Ok(reply) => tracing::debug!(
                provider_id = %config.provider_id,
                model_id = %request.model_id,
                reply_len = reply.len(),
                "provider reply completed"
            ),
            Err(error) => tracing::error!(
                provider_id = %config.provider_id,
                model_id = %request.model_id,
                error = %error,
                "provider reply failed"
            ),
        }

        if reply_tx.send(result).is_err() {
            tracing::debug!(model_id = %request.model_id, "reply receiver dropped before delivery");
        }
    }
}

impl LlmProvider for RigProviderAdapter {
    fn id(&self) -> &str {
        &self.config.provider_id
    }

    fn name(&self) -> &str {
        "Rig OpenAI"
    }

    fn respond(&self, request: ResponseRequest) -> ProviderResult<ResponseHandle> {
        ensure!(
            !request.messages.is_empty(),
            EmptyMessageSetSnafu {
                stage: "respond",
                model_id: request.model_id.clone(),
            }
        );

        let (reply_tx, reply) = make_reply_channel();
        let worker: ProviderWorker = Box::pin(Self::run_reply_worker(
            self.config.clone(),
            request,
            reply_tx,
        ));

        Ok(ResponseHandle { reply, worker })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DEFAULT_OPENAI_MODEL;

    fn adapter() -> RigProviderAdapter {
        RigProviderAdapter::new(ProviderConfig::new("openai", "sk-test", "")).expect("adapter")
    }

    #[test]
    fn system_messages_are_folded_into_preamble() {
        let request = ResponseRequest::new(
            DEFAULT_OPENAI_MODEL,
            vec![
                ProviderMessage::new(Role::System, "You are CapBot."),
                ProviderMessage::new(Role::User, "Hello"),
                ProviderMessage::new(Role::System, "   "),
            ],
        )
        .with_preamble("Answer briefly.");

        assert_eq!(
            RigProviderAdapter::merged_preamble(&request).as_deref(),
            Some("Answer briefly.\n\nYou are CapBot.")
        );
    }

    #[test]
    fn blank_preamble_without_system_messages_is_omitted() {
        let request = ResponseRequest::new(
            DEFAULT_OPENAI_MODEL,
            vec![ProviderMessage::new(Role::User, "Hello")],
        )
        .with_preamble("  ");

        assert_eq!(RigProviderAdapter::merged_preamble(&request), None);
    }

    #[test]
    fn system_role_has_no_rig_message() {
        let system = ProviderMessage::new(Role::System, "rules");
        let user = ProviderMessage::new(Role::User, "hi");
        let assistant = ProviderMessage::new(Role::Assistant, "hello");

        assert!(RigProviderAdapter::to_rig_message(&system).is_none());
        assert!(RigProviderAdapter::to_rig_message(&user).is_some());
        assert!(RigProviderAdapter::to_rig_message(&assistant).is_some());
    }

    #[test]
    fn empty_request_is_rejected_before_spawning() {
        let request = ResponseRequest::new(DEFAULT_OPENAI_MODEL, Vec::new());
        let error = adapter().respond(request).err().expect("no messages");
        assert!(matches!(error, ProviderError::EmptyMessageSet { .. }));
    }

    #[test]
    fn blank_key_is_rejected() {
        let result = RigProviderAdapter::new(ProviderConfig::new("openai", "", ""));
        assert!(matches!(result, Err(ProviderError::MissingApiKey { .. })));
    }
}
