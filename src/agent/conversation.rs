//! Bounded conversation history for the repair loop.
//!
//! The history is seeded with the system directive and the design prompt
//! and is collapsed back to that pair once a full round trip has
//! accumulated, so the context sent to the model stays bounded no matter
//! how many repair iterations run. Reflection prompts are never stored -
//! they only ride along on the reflection request itself.

use crate::llm::{Message, Role};

/// Number of messages in a freshly seeded conversation.
pub const SEED_MESSAGES: usize = 2;

/// History length at which the next generate cycle collapses it.
pub const COLLAPSE_THRESHOLD: usize = 4;

/// Index the collapse cuts at: everything from here on is discarded.
pub const COLLAPSE_SLOT: usize = 2;

/// Ordered message history owned by the repair loop controller.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Seed a conversation with the system directive and design prompt.
    pub fn new(system_directive: impl Into<String>, design_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![
                Message::system(system_directive),
                Message::user(design_prompt),
            ],
        }
    }

    /// Live message history.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of live messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when the history is empty (never the case after seeding).
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Whether the next generate cycle must collapse first.
    pub fn needs_collapse(&self) -> bool {
        self.messages.len() >= COLLAPSE_THRESHOLD
    }

    /// Collapse the history back to the seed pair, refreshing the user
    /// slot with the live design prompt. Invoked at most once per
    /// generate cycle.
    pub fn collapse(&mut self, design_prompt: &str) {
        self.messages.truncate(COLLAPSE_SLOT);
        self.messages[SEED_MESSAGES - 1] = Message::user(design_prompt);
        debug_assert_eq!(self.messages.len(), SEED_MESSAGES);
    }

    /// Append the model's raw generation response.
    pub fn record_response(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    /// Append the revision prompt that arms the next retry.
    pub fn push_retry_prompt(&mut self, prompt: impl Into<String>) {
        self.messages.push(Message::user(prompt));
    }

    /// Build the message list for a reflection call: the live history
    /// plus the reflection prompt. The history itself is unchanged.
    pub fn reflection_request(&self, reflection_prompt: &str) -> Vec<Message> {
        let mut request = self.messages.clone();
        request.push(Message::user(reflection_prompt));
        request
    }

    /// Render the history for the transcript: role tag, then content.
    pub fn render(&self) -> String {
        self.messages
            .iter()
            .map(|m| {
                let tag = match m.role {
                    Role::System => "System",
                    Role::User => "User",
                    Role::Assistant => "Assistant",
                };
                format!("{}:\n{}", tag, m.content)
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_with_two_messages() {
        let conversation = Conversation::new("directive", "build a mux");

        assert_eq!(conversation.len(), SEED_MESSAGES);
        assert_eq!(conversation.messages()[0].role, Role::System);
        assert_eq!(conversation.messages()[1].role, Role::User);
        assert_eq!(conversation.messages()[1].content, "build a mux");
    }

    #[test]
    fn test_record_response_appends() {
        let mut conversation = Conversation::new("sys", "prompt");
        conversation.record_response("module m; endmodule");

        assert_eq!(conversation.len(), 3);
        assert_eq!(conversation.messages()[2].role, Role::Assistant);
        assert!(!conversation.needs_collapse());
    }

    #[test]
    fn test_needs_collapse_at_threshold() {
        let mut conversation = Conversation::new("sys", "prompt");
        conversation.record_response("attempt 1");
        assert!(!conversation.needs_collapse());

        conversation.push_retry_prompt("revise it");
        assert_eq!(conversation.len(), COLLAPSE_THRESHOLD);
        assert!(conversation.needs_collapse());
    }

    #[test]
    fn test_collapse_restores_seed_pair_with_live_prompt() {
        let mut conversation = Conversation::new("sys", "original prompt");
        conversation.record_response("attempt 1");
        conversation.push_retry_prompt("revise it");

        conversation.collapse("revise it");

        assert_eq!(conversation.len(), SEED_MESSAGES);
        assert_eq!(conversation.messages()[0].content, "sys");
        assert_eq!(conversation.messages()[1].content, "revise it");
    }

    #[test]
    fn test_repeated_cycles_stay_bounded() {
        // Simulate the controller's generate/reflect cadence for many
        // rounds; the history at generate time must always be the seed
        // pair after the first round trip.
        let mut conversation = Conversation::new("sys", "prompt");
        let mut prompt = "prompt".to_string();

        for round in 0..10 {
            if conversation.needs_collapse() {
                conversation.collapse(&prompt);
            }
            if round > 0 {
                assert_eq!(conversation.len(), SEED_MESSAGES, "round {}", round);
            }
            conversation.record_response(format!("attempt {}", round));
            prompt = format!("revision {}", round);
            conversation.push_retry_prompt(&prompt);
        }

        assert!(conversation.len() <= COLLAPSE_THRESHOLD);
    }

    #[test]
    fn test_reflection_request_does_not_persist() {
        let mut conversation = Conversation::new("sys", "prompt");
        conversation.record_response("attempt");

        let request = conversation.reflection_request("why did it fail?");

        assert_eq!(request.len(), 4);
        assert_eq!(request[3].content, "why did it fail?");
        assert_eq!(conversation.len(), 3);
    }

    #[test]
    fn test_render_tags_roles() {
        let mut conversation = Conversation::new("be terse", "build it");
        conversation.record_response("module m; endmodule");

        let rendered = conversation.render();

        assert!(rendered.starts_with("System:\nbe terse"));
        assert!(rendered.contains("User:\nbuild it"));
        assert!(rendered.contains("Assistant:\nmodule m; endmodule"));
    }
}
