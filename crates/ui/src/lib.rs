//! EasyBot chat client.
//!
//! A single-conversation desktop chat built with GPUI and gpui-component: a
//! header, the message list, and an input row backed by an in-memory store.
#![deny(unsafe_code)]

/// Window bootstrap, actions and key bindings.
pub mod app;
/// Chat model, store and components.
pub mod chat;
/// Settings loading.
pub mod settings;
