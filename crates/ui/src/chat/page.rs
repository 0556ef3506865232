use gpui::*;
use gpui_component::{ActiveTheme, v_flex};

use crate::chat::events::{MessageSend, MessagesChanged};
use crate::chat::header::AppHeader;
use crate::chat::message_input::MessageInput;
use crate::chat::message_list::MessageList;
use crate::chat::view_model::ChatViewModel;
use crate::settings::ChatSettings;

/// Header, message list and input row wired to one view-model.
pub struct ChatPage {
    title: SharedString,
    view_model: Entity<ChatViewModel>,
    message_list: Entity<MessageList>,
    message_input: Entity<MessageInput>,
}

impl ChatPage {
    pub fn new(settings: &ChatSettings, window: &mut Window, cx: &mut Context<Self>) -> Self {
        let view_model = cx.new(|_| ChatViewModel::new(settings));
        let message_list = cx.new(MessageList::new);
        let submit_policy = settings.input.submit_policy();
        let message_input = cx.new(|cx| MessageInput::new(submit_policy, window, cx));

        cx.subscribe(&message_input, |this, _, event: &MessageSend, cx| {
            let content = event.content.clone();
            this.view_model
                .update(cx, |view_model, cx| view_model.send_message(content, cx));
        })
        .detach();

        cx.subscribe(&view_model, |this, view_model, _: &MessagesChanged, cx| {
            let messages = view_model.read(cx).messages().to_vec();
            this.message_list
                .update(cx, |list, cx| list.set_messages(messages, cx));
        })
        .detach();

        Self {
            title: SharedString::from(settings.title.clone()),
            view_model,
            message_list,
            message_input,
        }
    }
}

impl Render for ChatPage {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        v_flex()
            .id("chat-page")
            .size_full()
            .min_h_0()
            .overflow_hidden()
            .bg(theme.background)
            .child(AppHeader::new(self.title.clone()))
            .child(
                div()
                    .id("chat-page-message-list")
                    .flex_1()
                    .min_h_0()
                    .child(self.message_list.clone()),
            )
            .child(
                div()
                    .id("chat-page-message-input")
                    .flex_shrink_0()
                    .w_full()
                    .border_t_1()
                    .border_color(theme.border)
                    .child(self.message_input.clone()),
            )
    }
}
