//! Builds the message list submitted to the chat-completion API.

use crate::model::{Message, MessageRole};

/// Combine the instruction template with the capped website context into
/// the session's single system message body.
pub fn system_text(instructions: &str, context: &str) -> String {
    format!("{instructions}\n\nWebsite content:\n{context}")
}

/// Assemble `[system, prior exchange…, user(question)]`.
///
/// Exactly one system message sits at index 0 regardless of history length;
/// any stray system entries in the history are dropped rather than repeated.
pub fn assemble(system_text: &str, history: &[Message], question: &str) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(system_text));
    messages.extend(
        history
            .iter()
            .filter(|msg| msg.role != MessageRole::System)
            .cloned(),
    );
    messages.push(Message::user(question));
    messages
}

#[cfg(test)]
mod tests {
    use super::{assemble, system_text};
    use crate::model::{Message, MessageRole};

    fn system_count(messages: &[Message]) -> usize {
        messages
            .iter()
            .filter(|msg| msg.role == MessageRole::System)
            .count()
    }

    #[test]
    fn system_text_includes_context_verbatim() {
        let context = "Datacrumbs is an educational platform offering bootcamps.";
        let text = system_text("You are the Datacrumbs assistant.", context);
        assert!(text.contains(context));
        assert!(text.starts_with("You are the Datacrumbs assistant."));
    }

    #[test]
    fn assembled_list_starts_with_single_system_message() {
        let history = vec![
            Message::user("first question"),
            Message::assistant("first answer"),
        ];
        let messages = assemble("instructions", &history, "second question");

        assert_eq!(messages[0].role, MessageRole::System);
        assert_eq!(system_count(&messages), 1);
        assert_eq!(messages.len(), 4);
        assert_eq!(messages.last().unwrap().content, "second question");
        assert_eq!(messages.last().unwrap().role, MessageRole::User);
    }

    #[test]
    fn assemble_with_empty_history_has_system_then_question() {
        let messages = assemble("instructions", &[], "q");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::System);
        assert_eq!(messages[1].role, MessageRole::User);
    }

    #[test]
    fn stray_system_entries_in_history_are_dropped() {
        let history = vec![
            Message::system("stale system entry"),
            Message::user("q1"),
            Message::assistant("a1"),
        ];
        let messages = assemble("fresh instructions", &history, "q2");

        assert_eq!(system_count(&messages), 1);
        assert_eq!(messages[0].content, "fresh instructions");
    }

    #[test]
    fn long_history_still_keeps_system_at_index_zero() {
        let mut history = Vec::new();
        for i in 0..50 {
            history.push(Message::user(format!("q{i}")));
            history.push(Message::assistant(format!("a{i}")));
        }
        let messages = assemble("instructions", &history, "final");
        assert_eq!(messages[0].role, MessageRole::System);
        assert_eq!(system_count(&messages), 1);
        assert_eq!(messages.len(), 102);
    }
}
