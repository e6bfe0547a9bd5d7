use uuid::Uuid;

/// Launcher session state. Owned by the coordinator alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Whether the input window is shown.
    pub visible: bool,
    /// Current input text.
    pub buffer: String,
    /// Whether voice capture was started for this session.
    pub capturing: bool,
    /// Identity of the visible session, `None` while hidden.
    pub session_id: Option<Uuid>,
}

impl SessionState {
    /// Append `text`, separated from existing content by one space.
    pub fn append(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if !self.buffer.is_empty() {
            self.buffer.push(' ');
        }
        self.buffer.push_str(text);
    }
}
