use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::{h_flex, text::TextView};

use crate::chat::message::{MessageModel, Role};

/// Bubble fill for model replies.
pub const MODEL_BUBBLE_COLOR: u32 = 0x2E7D32;
/// Bubble fill for user messages.
pub const USER_BUBBLE_COLOR: u32 = 0x7E57C2;

const NEAR_MARGIN: f32 = 8.0;
const FAR_MARGIN: f32 = 70.0;
const VERTICAL_MARGIN: f32 = 8.0;
const BUBBLE_PADDING: f32 = 16.0;
const BUBBLE_RADIUS: f32 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleAlignment {
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleTone {
    Model,
    User,
}

impl BubbleTone {
    pub fn color(self) -> Hsla {
        match self {
            Self::Model => rgb(MODEL_BUBBLE_COLOR).into(),
            Self::User => rgb(USER_BUBBLE_COLOR).into(),
        }
    }
}

/// Placement of one bubble inside a full-width row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BubbleLayout {
    pub alignment: BubbleAlignment,
    pub tone: BubbleTone,
    pub margin_start: f32,
    pub margin_end: f32,
}

pub fn bubble_layout(role: Role) -> BubbleLayout {
    match role {
        Role::Model => BubbleLayout {
            alignment: BubbleAlignment::Start,
            tone: BubbleTone::Model,
            margin_start: NEAR_MARGIN,
            margin_end: FAR_MARGIN,
        },
        Role::User => BubbleLayout {
            alignment: BubbleAlignment::End,
            tone: BubbleTone::User,
            margin_start: FAR_MARGIN,
            margin_end: NEAR_MARGIN,
        },
    }
}

/// Escapes `text` so the markdown view shows it exactly as typed.
///
/// ASCII punctuation is backslash-escaped, line breaks become hard breaks and
/// whitespace the renderer would collapse (edges, runs, tabs) turns into
/// no-break spaces. A single space between words stays breakable.
pub fn literal_markdown(text: &str) -> String {
    let chars = text.chars().collect::<Vec<_>>();
    let is_gap = |c: char| c == ' ' || c == '\t';
    let mut out = String::with_capacity(text.len() * 2);

    for (ix, &c) in chars.iter().enumerate() {
        match c {
            '\n' => out.push_str("\\\n"),
            '\r' => {}
            ' ' | '\t' => {
                let at_edge = ix == 0 || ix + 1 == chars.len();
                let in_run = (ix > 0 && is_gap(chars[ix - 1]))
                    || chars.get(ix + 1).is_some_and(|&next| is_gap(next));
                let at_line_edge = (ix > 0 && chars[ix - 1] == '\n')
                    || chars.get(ix + 1).is_some_and(|&next| next == '\n');
                if c == ' ' && !(at_edge || in_run || at_line_edge) {
                    out.push(' ');
                } else {
                    out.push('\u{a0}');
                }
            }
            c if c.is_ascii_punctuation() => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }

    out
}

/// One message rendered as a colored bubble. Text is selectable, not editable.
#[derive(IntoElement)]
pub struct MessageRow {
    ix: usize,
    message: MessageModel,
}

impl MessageRow {
    pub fn new(ix: usize, message: MessageModel) -> Self {
        Self { ix, message }
    }
}

impl RenderOnce for MessageRow {
    fn render(self, _window: &mut Window, _cx: &mut App) -> impl IntoElement {
        let layout = bubble_layout(self.message.role());
        let text_id = ElementId::Name(SharedString::from(format!(
            "message-text-{}-{}",
            self.message.role(),
            self.ix
        )));
        // Replies are markdown; user text is shown as typed.
        let source = match self.message.role() {
            Role::Model => self.message.message().to_string(),
            Role::User => literal_markdown(self.message.message()),
        };

        h_flex()
            .w_full()
            .when(layout.alignment == BubbleAlignment::End, |row| {
                row.justify_end()
            })
            .child(
                div()
                    .ml(px(layout.margin_start))
                    .mr(px(layout.margin_end))
                    .my(px(VERTICAL_MARGIN))
                    .p(px(BUBBLE_PADDING))
                    .rounded(px(BUBBLE_RADIUS))
                    .bg(layout.tone.color())
                    .text_color(white())
                    .font_weight(FontWeight::MEDIUM)
                    .child(
                        TextView::markdown(text_id, source)
                            .selectable(true),
                    ),
            )
    }
}
