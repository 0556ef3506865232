use std::collections::HashSet;
use std::sync::Arc;

use easybot_llm::{
    LlmProvider, ProviderMessage, ProviderResult, ResponseHandle, ResponseRequest,
    Role as ProviderRole, create_provider,
};
use gpui::*;
use gpui_tokio_bridge::Tokio;

use crate::chat::events::MessagesChanged;
use crate::chat::message::{MessageModel, Role};
use crate::chat::store::MessageStore;
use crate::settings::ChatSettings;

pub const PROVIDER_NOT_CONFIGURED: &str =
    "Provider is not configured. Set provider.api_key in settings.json or OPENAI_API_KEY.";

/// The conversation plus the positions of locally generated notices.
///
/// Notices are model-role messages the app writes itself (missing key,
/// provider failures). They are shown but never sent back upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    store: MessageStore,
    local_notices: HashSet<usize>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[MessageModel] {
        self.store.messages()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn is_notice(&self, ix: usize) -> bool {
        self.local_notices.contains(&ix)
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.store.send_message(text);
    }

    pub fn push_reply(&mut self, text: impl Into<String>) {
        self.store.receive_response(text);
    }

    pub fn push_notice(&mut self, text: impl Into<String>) {
        self.local_notices.insert(self.store.len());
        self.store.receive_response(text);
    }

    /// Appends a finished reply, or an `Error:` notice when the provider failed.
    pub fn apply_reply(&mut self, result: ProviderResult<String>) {
        match result {
            Ok(text) => self.push_reply(text),
            Err(error) => {
                tracing::error!(error = %error, "provider reply failed");
                self.push_notice(format!("Error: {error}"));
            }
        }
    }

    pub fn provider_messages(&self) -> Vec<ProviderMessage> {
        build_provider_messages(self.store.messages(), &self.local_notices)
    }
}

/// Owns the conversation and turns user sends into model replies.
pub struct ChatViewModel {
    transcript: Transcript,
    provider: Option<Arc<dyn LlmProvider>>,
    provider_error: Option<String>,
    model_id: String,
    preamble: Option<String>,
    max_tokens: Option<u64>,
}

impl EventEmitter<MessagesChanged> for ChatViewModel {}

impl ChatViewModel {
    pub fn new(settings: &ChatSettings) -> Self {
        let (provider, provider_error) = Self::initialize_provider(settings);

        Self {
            transcript: Transcript::new(),
            provider,
            provider_error,
            model_id: settings.provider.model.clone(),
            preamble: settings.preamble.clone(),
            max_tokens: settings.provider.max_tokens,
        }
    }

    fn initialize_provider(settings: &ChatSettings) -> (Option<Arc<dyn LlmProvider>>, Option<String>) {
        let Some(config) = settings.provider.to_provider_config() else {
            tracing::warn!("no API key configured; replies are disabled");
            return (None, None);
        };

        match create_provider(config) {
            Ok(provider) => {
                tracing::info!(
                    provider_id = %provider.id(),
                    provider_name = %provider.name(),
                    model_id = %settings.provider.model,
                    "initialized provider"
                );
                (Some(provider), None)
            }
            Err(error) => {
                tracing::error!(error = %error, "failed to initialize provider adapter");
                (None, Some(error.to_string()))
            }
        }
    }

    pub fn messages(&self) -> &[MessageModel] {
        self.transcript.messages()
    }

    /// Appends the user's message and asks the provider for a reply.
    pub fn send_message(&mut self, text: String, cx: &mut Context<Self>) {
        self.transcript.push_user(text);
        tracing::debug!(message_count = self.transcript.len(), "user message appended");

        if let Some(handle) = self.start_reply() {
            self.spawn_reply(handle, cx);
        }
        self.emit_changed(cx);
    }

    /// Starts a reply for the current transcript. When no reply can be
    /// started, a notice explaining why is appended instead.
    fn start_reply(&mut self) -> Option<ResponseHandle> {
        let Some(provider) = self.provider.clone() else {
            let notice = match &self.provider_error {
                Some(error) => format!("Provider configuration error: {error}"),
                None => PROVIDER_NOT_CONFIGURED.to_string(),
            };
            self.transcript.push_notice(notice);
            return None;
        };

        match provider.respond(self.build_request()) {
            Ok(handle) => Some(handle),
            Err(error) => {
                tracing::error!(error = %error, "failed to start provider reply");
                self.transcript.push_notice(format!("Error: {error}"));
                None
            }
        }
    }

    fn spawn_reply(&mut self, handle: ResponseHandle, cx: &mut Context<Self>) {
        let ResponseHandle { reply, worker } = handle;

        Tokio::spawn(cx, worker).detach();
        cx.spawn(async move |this, cx| {
            let result = reply.recv().await;
            let _ = this.update(cx, |this, cx| this.handle_reply(result, cx));
        })
        .detach();
    }

    fn handle_reply(&mut self, result: ProviderResult<String>, cx: &mut Context<Self>) {
        self.transcript.apply_reply(result);
        self.emit_changed(cx);
    }

    fn build_request(&self) -> ResponseRequest {
        let mut request = ResponseRequest::new(self.model_id.clone(), self.transcript.provider_messages());

        if let Some(preamble) = &self.preamble {
            request = request.with_preamble(preamble.clone());
        }
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        request
    }

    fn emit_changed(&mut self, cx: &mut Context<Self>) {
        cx.emit(MessagesChanged {
            len: self.transcript.len(),
        });
        cx.notify();
    }
}

/// Maps the transcript onto provider turns, leaving out local notices.
///
/// User text goes out verbatim, whitespace-only turns included, so the turn
/// just sent is always the last one.
pub fn build_provider_messages(
    messages: &[MessageModel],
    local_notices: &HashSet<usize>,
) -> Vec<ProviderMessage> {
    messages
        .iter()
        .enumerate()
        .filter(|(ix, _)| !local_notices.contains(ix))
        .map(|(_, message)| ProviderMessage::new(provider_role(message.role()), message.message()))
        .collect()
}

fn provider_role(role: Role) -> ProviderRole {
    match role {
        Role::User => ProviderRole::User,
        Role::Model => ProviderRole::Assistant,
    }
}

#[cfg(test)]
mod tests {
    use easybot_llm::ProviderError;

    use super::*;

    fn configured_settings() -> ChatSettings {
        let mut settings = ChatSettings::default();
        settings.provider.api_key = "sk-test".to_string();
        settings
    }

    #[::core::prelude::v1::test]
    fn transcript_maps_roles_in_order() {
        let messages = vec![
            MessageModel::user("Hello"),
            MessageModel::model("Hi! How can I help?"),
            MessageModel::user("Tell me a joke"),
        ];

        let turns = build_provider_messages(&messages, &HashSet::new());

        assert_eq!(
            turns,
            vec![
                ProviderMessage::new(ProviderRole::User, "Hello"),
                ProviderMessage::new(ProviderRole::Assistant, "Hi! How can I help?"),
                ProviderMessage::new(ProviderRole::User, "Tell me a joke"),
            ]
        );
    }

    #[::core::prelude::v1::test]
    fn notices_stay_local() {
        let messages = vec![
            MessageModel::user("Hello"),
            MessageModel::model(PROVIDER_NOT_CONFIGURED),
            MessageModel::user("Still there?"),
        ];
        let notices = HashSet::from([1]);

        let turns = build_provider_messages(&messages, &notices);

        let texts = turns.iter().map(|turn| turn.content.as_str()).collect::<Vec<_>>();
        assert_eq!(texts, ["Hello", "Still there?"]);
    }

    #[::core::prelude::v1::test]
    fn whitespace_turn_is_the_prompt() {
        let mut view_model = ChatViewModel::new(&configured_settings());
        view_model.transcript.push_user("Hello");
        view_model.transcript.push_reply("Hi!");
        view_model.transcript.push_user(" ");

        let request = view_model.build_request();

        assert_eq!(
            request.messages.last(),
            Some(&ProviderMessage::new(ProviderRole::User, " "))
        );
        assert_eq!(request.messages.len(), 3);
    }

    #[::core::prelude::v1::test]
    fn lone_whitespace_message_still_starts_a_reply() {
        let mut view_model = ChatViewModel::new(&configured_settings());
        view_model.transcript.push_user(" ");

        assert!(view_model.start_reply().is_some());
        assert_eq!(view_model.messages(), [MessageModel::user(" ")]);
    }

    #[::core::prelude::v1::test]
    fn missing_key_appends_notice_after_user_turn() {
        let mut view_model = ChatViewModel::new(&ChatSettings::default());
        assert!(view_model.provider.is_none());
        assert!(view_model.provider_error.is_none());

        view_model.transcript.push_user("Hello");
        assert!(view_model.start_reply().is_none());

        assert_eq!(
            view_model.messages(),
            [
                MessageModel::user("Hello"),
                MessageModel::model(PROVIDER_NOT_CONFIGURED),
            ]
        );
        assert!(view_model.transcript.is_notice(1));
        assert!(!view_model.transcript.is_notice(0));
        assert_eq!(
            view_model.build_request().messages,
            vec![ProviderMessage::new(ProviderRole::User, "Hello")]
        );
    }

    #[::core::prelude::v1::test]
    fn unsupported_provider_notice_names_the_error() {
        let mut settings = configured_settings();
        settings.provider.provider_id = "gemini".to_string();
        let mut view_model = ChatViewModel::new(&settings);

        view_model.transcript.push_user("Hello");
        assert!(view_model.start_reply().is_none());

        let notice = view_model.messages()[1].message();
        assert!(notice.starts_with("Provider configuration error:"));
        assert!(notice.contains("gemini"));
        assert!(view_model.transcript.is_notice(1));
    }

    #[::core::prelude::v1::test]
    fn successful_reply_is_a_model_turn() {
        let mut transcript = Transcript::new();
        transcript.push_user("Hello");

        transcript.apply_reply(Ok("Hi there".to_string()));

        assert_eq!(
            transcript.messages(),
            [MessageModel::user("Hello"), MessageModel::model("Hi there")]
        );
        assert!(!transcript.is_notice(1));
        assert_eq!(transcript.provider_messages().len(), 2);
    }

    #[::core::prelude::v1::test]
    fn failed_reply_becomes_a_local_notice() {
        let mut transcript = Transcript::new();
        transcript.push_user("Hello");

        transcript.apply_reply(Err(ProviderError::EmptyReply {
            stage: "collect-reply",
            model_id: "gpt-4o-mini".to_string(),
        }));
        transcript.push_user("Again?");
        transcript.apply_reply(Ok("Yes.".to_string()));

        let failure = &transcript.messages()[1];
        assert_eq!(failure.role(), Role::Model);
        assert!(failure.message().starts_with("Error: "));
        assert!(failure.message().contains("gpt-4o-mini"));
        assert!(transcript.is_notice(1));
        assert!(!transcript.is_notice(3));

        let texts = transcript
            .provider_messages()
            .into_iter()
            .map(|turn| turn.content)
            .collect::<Vec<_>>();
        assert_eq!(texts, ["Hello", "Again?", "Yes."]);
    }

    #[::core::prelude::v1::test]
    fn request_carries_model_and_preamble() {
        let mut settings = ChatSettings::default();
        settings.preamble = Some("You are CapBot.".to_string());
        settings.provider.max_tokens = Some(512);
        let mut view_model = ChatViewModel::new(&settings);
        view_model.transcript.push_user("Hello");

        let request = view_model.build_request();

        assert_eq!(request.model_id, settings.provider.model);
        assert_eq!(request.preamble.as_deref(), Some("You are CapBot."));
        assert_eq!(request.max_tokens, Some(512));
        assert_eq!(request.messages.len(), 1);
    }
}
