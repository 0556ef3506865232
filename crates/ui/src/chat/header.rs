use gpui::*;

pub const DEFAULT_TITLE: &str = "CapBot";
/// Header bar fill.
pub const HEADER_COLOR: u32 = 0x4CAF50;

/// Full-width title bar at the top of the chat page.
#[derive(IntoElement)]
pub struct AppHeader {
    title: SharedString,
}

impl AppHeader {
    pub fn new(title: impl Into<SharedString>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

impl RenderOnce for AppHeader {
    fn render(self, _window: &mut Window, _cx: &mut App) -> impl IntoElement {
        div()
            .id("app-header")
            .w_full()
            .flex_shrink_0()
            .flex()
            .items_center()
            .justify_center()
            .bg(rgb(HEADER_COLOR))
            .child(
                div()
                    .p(px(16.))
                    .text_color(white())
                    .text_size(px(22.))
                    .child(self.title),
            )
    }
}
