use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    input::{Input, InputEvent, InputState},
};

use crate::chat::events::MessageSend;

pub const INPUT_PLACEHOLDER: &str = "Type a message...";

/// Which buffer contents count as "nothing to send".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPolicy {
    /// Only the empty string is rejected; whitespace-only text is sent as-is.
    #[default]
    RejectEmpty,
    /// Empty and whitespace-only text are both rejected.
    RejectBlank,
}

impl SubmitPolicy {
    pub fn accepts(self, text: &str) -> bool {
        match self {
            Self::RejectEmpty => !text.is_empty(),
            Self::RejectBlank => !text.trim().is_empty(),
        }
    }
}

/// Single-line text buffer behind the input row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    text: String,
    policy: SubmitPolicy,
}

impl InputBuffer {
    pub fn new(policy: SubmitPolicy) -> Self {
        Self {
            text: String::new(),
            policy,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn policy(&self) -> SubmitPolicy {
        self.policy
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Hands the buffer to `on_message_send` and clears it.
    ///
    /// Returns `false` without calling back when the policy rejects the text.
    pub fn submit(&mut self, on_message_send: impl FnOnce(String)) -> bool {
        if !self.policy.accepts(&self.text) {
            return false;
        }

        on_message_send(std::mem::take(&mut self.text));
        true
    }
}

/// Input row: text field plus send button. Emits [`MessageSend`].
pub struct MessageInput {
    input_state: Entity<InputState>,
    buffer: InputBuffer,
}

impl EventEmitter<MessageSend> for MessageInput {}

impl MessageInput {
    pub fn new(policy: SubmitPolicy, window: &mut Window, cx: &mut Context<Self>) -> Self {
        let input_state = cx.new(|cx| InputState::new(window, cx).placeholder(INPUT_PLACEHOLDER));

        cx.subscribe_in(
            &input_state,
            window,
            |this, _, event: &InputEvent, window, cx| {
                if let InputEvent::PressEnter { .. } = event {
                    this.handle_submit(window, cx);
                }
            },
        )
        .detach();

        Self {
            input_state,
            buffer: InputBuffer::new(policy),
        }
    }

    fn handle_submit(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let value = self.input_state.read(cx).value().to_string();
        self.buffer.set_text(value);

        let submitted = self
            .buffer
            .submit(|content| cx.emit(MessageSend::new(content)));
        if !submitted {
            return;
        }

        self.input_state.update(cx, |state, cx| {
            state.set_value("", window, cx);
        });
    }
}

impl Render for MessageInput {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        h_flex()
            .id("message-input")
            .w_full()
            .gap_2()
            .p_2()
            .items_center()
            .bg(theme.background)
            .child(
                div()
                    .flex_1()
                    .min_w_0()
                    .px_3()
                    .py_1()
                    .rounded_full()
                    .border_1()
                    .border_color(theme.border)
                    .bg(white())
                    .child(Input::new(&self.input_state).w_full()),
            )
            .child(
                Button::new("send")
                    .small()
                    .primary()
                    .icon(IconName::ArrowUp)
                    .on_click(cx.listener(|this, _, window, cx| {
                        this.handle_submit(window, cx);
                    })),
            )
    }
}
