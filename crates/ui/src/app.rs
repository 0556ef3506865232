use std::path::PathBuf;

use gpui::*;
use gpui_component::Root;

use crate::chat::ChatPage;
use crate::settings::SettingsStore;

pub const WINDOW_WIDTH: f32 = 420.0;
pub const WINDOW_HEIGHT: f32 = 780.0;

gpui::actions!(easybot, [Quit, ReloadSettings]);

/// Returns the default themes directory path.
pub fn default_themes_path() -> PathBuf {
    PathBuf::from("./themes")
}

/// Registers global actions and key bindings.
pub fn register_actions(cx: &mut App) {
    cx.on_action(|_: &Quit, cx| {
        cx.quit();
    });

    cx.on_action(|_: &ReloadSettings, cx| {
        let reloaded = cx.global::<SettingsStore>().reload();
        match reloaded {
            Ok(settings) => settings.apply_theme(None, cx),
            Err(error) => {
                tracing::warn!(error = %error, "settings reload failed; keeping previous settings");
            }
        }
    });

    cx.bind_keys([
        KeyBinding::new("cmd-q", Quit, None),
        KeyBinding::new("cmd-r", ReloadSettings, None),
    ]);
}

fn window_options(cx: &App) -> WindowOptions {
    WindowOptions {
        window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
            None,
            size(px(WINDOW_WIDTH), px(WINDOW_HEIGHT)),
            cx,
        ))),
        titlebar: Some(TitlebarOptions {
            title: Some(SharedString::from("EasyBot")),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Opens the chat window. Root is required by gpui-component for overlays.
pub fn open_main_window(cx: &mut App) {
    let settings = cx.global::<SettingsStore>().settings();
    let options = window_options(cx);

    let opened = cx.open_window(options, |window, cx| {
        let page = cx.new(|cx| ChatPage::new(&settings, window, cx));
        cx.new(|cx| Root::new(page, window, cx))
    });

    match opened {
        Ok(_) => cx.activate(true),
        Err(error) => {
            tracing::error!(error = %error, "failed to open main window");
            cx.quit();
        }
    }
}
