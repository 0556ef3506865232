use gpui::*;
use gpui_component::ThemeRegistry;

use easybot::app::{default_themes_path, open_main_window, register_actions};
use easybot::settings::SettingsStore;

fn main() {
    tracing_subscriber::fmt::init();

    let app = Application::new().with_assets(gpui_component_assets::Assets);

    app.run(|cx| {
        gpui_tokio_bridge::init(cx);

        // Must run before any Root is created.
        gpui_component::init(cx);

        let settings_store = SettingsStore::load();
        tracing::info!(path = ?settings_store.config_path(), "loaded settings");
        cx.set_global(settings_store);

        // Missing theme directory is fine; built-in themes are used instead.
        if let Err(err) = ThemeRegistry::watch_dir(default_themes_path(), cx, |cx| {
            let settings = cx.global::<SettingsStore>().settings();
            settings.apply_theme(None, cx);
            tracing::info!("theme directory watch initialized");
        }) {
            tracing::warn!(error = %err, "failed to watch themes directory, using default themes");
            let settings = cx.global::<SettingsStore>().settings();
            settings.apply_theme(None, cx);
        }

        register_actions(cx);

        cx.spawn(async move |cx| {
            let _ = cx.update(open_main_window);
        })
        .detach();
    });
}
