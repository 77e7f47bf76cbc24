use crate::llm::provider::PromptMessage;

/// Every completed exchange of the session, replayed to the model on each call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationMemory {
    messages: Vec<PromptMessage>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[PromptMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn save_turn(&mut self, input: &str, output: &str) {
        self.messages.push(PromptMessage::human(input));
        self.messages.push(PromptMessage::ai(output));
    }
}
