use gpui::*;
use gpui_component::{ActiveTheme, Icon, IconName, label::Label, v_flex};

use crate::chat::message::MessageModel;
use crate::chat::message_row::MessageRow;
use crate::chat::scroll_manager::ScrollManager;

pub const EMPTY_STATE_CAPTION: &str = "Ask me anything";
const EMPTY_STATE_ICON_SIZE: Pixels = px(60.);
const EMPTY_STATE_ICON_COLOR: u32 = 0x66BB6A;

/// What the list shows for a given message sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListContent<'a> {
    Placeholder,
    /// Newest message first, paired with its insertion index.
    Rows(Vec<(usize, &'a MessageModel)>),
}

pub fn list_content(messages: &[MessageModel]) -> ListContent<'_> {
    if messages.is_empty() {
        return ListContent::Placeholder;
    }

    ListContent::Rows(messages.iter().enumerate().rev().collect())
}

/// Read-only view over a snapshot of the view-model's messages.
pub struct MessageList {
    messages: Vec<MessageModel>,
    scroll_manager: ScrollManager,
}

impl MessageList {
    pub fn new(_cx: &mut Context<Self>) -> Self {
        Self {
            messages: Vec::new(),
            scroll_manager: ScrollManager::new(),
        }
    }

    pub fn set_messages(&mut self, messages: Vec<MessageModel>, cx: &mut Context<Self>) {
        let grew = messages.len() > self.messages.len();
        self.messages = messages;

        if grew {
            self.scroll_manager.rows_appended();
        }

        cx.notify();
    }

    fn render_placeholder(&self, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();

        v_flex()
            .id("message-list-empty")
            .size_full()
            .items_center()
            .justify_center()
            .gap_2()
            .child(
                Icon::new(IconName::Bot)
                    .size(EMPTY_STATE_ICON_SIZE)
                    .text_color(rgb(EMPTY_STATE_ICON_COLOR)),
            )
            .child(
                Label::new(EMPTY_STATE_CAPTION)
                    .text_xl()
                    .text_color(theme.foreground),
            )
            .into_any_element()
    }

    fn render_rows(&self, rows: Vec<(usize, MessageModel)>) -> AnyElement {
        // Rows arrive newest first; gpui stacks top-down, so walk them back to
        // front. `set_messages` pins the viewport to the tail.
        let children = rows
            .into_iter()
            .rev()
            .map(|(ix, message)| MessageRow::new(ix, message));

        div()
            .id("message-list")
            .size_full()
            .min_h_0()
            .overflow_y_scroll()
            .track_scroll(self.scroll_manager.handle())
            .child(v_flex().w_full().py_2().children(children))
            .into_any_element()
    }
}

impl Render for MessageList {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let rows = match list_content(&self.messages) {
            ListContent::Placeholder => return self.render_placeholder(cx),
            ListContent::Rows(rows) => rows
                .into_iter()
                .map(|(ix, message)| (ix, message.clone()))
                .collect::<Vec<_>>(),
        };

        self.render_rows(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shown(messages: &[MessageModel]) -> Vec<&str> {
        match list_content(messages) {
            ListContent::Placeholder => Vec::new(),
            ListContent::Rows(rows) => rows.into_iter().map(|(_, m)| m.message()).collect(),
        }
    }

    #[::core::prelude::v1::test]
    fn empty_sequence_shows_placeholder() {
        assert_eq!(list_content(&[]), ListContent::Placeholder);
    }

    #[::core::prelude::v1::test]
    fn rows_are_newest_first() {
        let messages = vec![
            MessageModel::user("m1"),
            MessageModel::model("m2"),
            MessageModel::user("m3"),
        ];

        assert_eq!(shown(&messages), ["m3", "m2", "m1"]);
    }

    #[::core::prelude::v1::test]
    fn rows_keep_insertion_indices() {
        let messages = vec![MessageModel::user("a"), MessageModel::user("a")];

        let ListContent::Rows(rows) = list_content(&messages) else {
            panic!("two messages must render rows");
        };
        let indices = rows.iter().map(|(ix, _)| *ix).collect::<Vec<_>>();
        assert_eq!(indices, [1, 0]);
    }

    #[::core::prelude::v1::test]
    fn single_message_is_never_placeholder() {
        let messages = vec![MessageModel::model("")];
        assert!(matches!(list_content(&messages), ListContent::Rows(rows) if rows.len() == 1));
    }
}
