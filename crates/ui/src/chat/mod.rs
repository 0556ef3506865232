/// Event contracts between the input, view-model and list.
pub mod events;
pub mod header;
/// Message entity and the closed role set.
pub mod message;
pub mod message_input;
pub mod message_list;
pub mod message_row;
pub mod page;
pub mod scroll_manager;
/// Ordered in-memory conversation.
pub mod store;
pub mod view_model;

pub use events::{MessageSend, MessagesChanged};
pub use header::AppHeader;
pub use message::{MessageModel, Role, UnknownRole};
pub use message_input::{InputBuffer, MessageInput, SubmitPolicy};
pub use message_list::{ListContent, MessageList, list_content};
pub use message_row::{BubbleAlignment, BubbleLayout, BubbleTone, MessageRow, bubble_layout};
pub use page::ChatPage;
pub use scroll_manager::ScrollManager;
pub use store::MessageStore;
pub use view_model::{ChatViewModel, Transcript};
