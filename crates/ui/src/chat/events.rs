/// Emitted when the input accepts a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSend {
    pub content: String,
}

impl MessageSend {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Emitted by the view-model after its message sequence grew.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessagesChanged {
    pub len: usize,
}
