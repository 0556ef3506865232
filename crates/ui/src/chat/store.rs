use crate::chat::message::MessageModel;

/// Ordered, append-only sequence of chat messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageStore {
    messages: Vec<MessageModel>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[MessageModel] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Appends a user turn. The text is stored as given, empty or not.
    pub fn send_message(&mut self, text: impl Into<String>) -> &MessageModel {
        self.push(MessageModel::user(text))
    }

    /// Appends a model turn once a reply arrives.
    pub fn receive_response(&mut self, text: impl Into<String>) -> &MessageModel {
        self.push(MessageModel::model(text))
    }

    /// Newest message first.
    pub fn display_order(&self) -> impl DoubleEndedIterator<Item = &MessageModel> + '_ {
        self.messages.iter().rev()
    }

    fn push(&mut self, message: MessageModel) -> &MessageModel {
        let index = self.messages.len();
        self.messages.push(message);
        &self.messages[index]
    }
}
