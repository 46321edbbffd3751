//! Prompt Building
//!
//! Turns a persona, its transcript and a new user turn into the message list
//! sent to the inference endpoint.

use crate::domain::{Message, Persona};
use crate::ports::ChatMessage;

/// Number of trailing transcript messages included in each request
pub const CONTEXT_WINDOW: usize = 10;

/// System message that puts the model in character
pub fn persona_system_prompt(persona: &Persona) -> String {
    format!(
        "You are {}. {}\n\nPlease respond as this character would, staying in character \
         throughout the conversation. Be engaging, empathetic, and maintain the personality \
         traits described above.",
        persona.name, persona.personality
    )
}

/// Build the outbound message list using the default [`CONTEXT_WINDOW`].
pub fn build_prompt(persona: &Persona, history: &[Message], new_message: &str) -> Vec<ChatMessage> {
    build_prompt_with_window(persona, history, new_message, CONTEXT_WINDOW)
}

/// Build the outbound message list: one system message, the last `window`
/// transcript messages (timestamps dropped), then the new user message.
pub fn build_prompt_with_window(
    persona: &Persona,
    history: &[Message],
    new_message: &str,
    window: usize,
) -> Vec<ChatMessage> {
    let start = history.len().saturating_sub(window);
    let recent = &history[start..];

    let mut messages = Vec::with_capacity(recent.len() + 2);
    messages.push(ChatMessage::system(persona_system_prompt(persona)));
    messages.extend(recent.iter().map(ChatMessage::from));
    messages.push(ChatMessage::user(new_message));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageRole, NewPersona};

    fn ava() -> Persona {
        Persona::new(NewPersona::new("Ava", "llama3.2").with_personality("Cheerful and curious."))
            .unwrap()
    }

    fn history(n: usize) -> Vec<Message> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    Message::user(format!("u{i}"))
                } else {
                    Message::assistant(format!("a{i}"))
                }
            })
            .collect()
    }

    #[test]
    fn test_system_prompt_text() {
        let prompt = persona_system_prompt(&ava());
        assert_eq!(
            prompt,
            "You are Ava. Cheerful and curious.\n\nPlease respond as this character would, \
             staying in character throughout the conversation. Be engaging, empathetic, and \
             maintain the personality traits described above."
        );
    }

    #[test]
    fn test_empty_history() {
        let messages = build_prompt(&ava(), &[], "hi");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::System);
        assert_eq!(messages[1], ChatMessage::user("hi"));
    }

    #[test]
    fn test_window_keeps_last_ten_in_order() {
        let history = history(15);
        let messages = build_prompt(&ava(), &history, "next");

        assert_eq!(messages.len(), 12);
        assert_eq!(messages[0].role, MessageRole::System);
        let middle: Vec<&str> = messages[1..11].iter().map(|m| m.content.as_str()).collect();
        assert_eq!(
            middle,
            vec!["a5", "u6", "a7", "u8", "a9", "u10", "a11", "u12", "a13", "u14"]
        );
        assert_eq!(messages[11], ChatMessage::user("next"));
    }

    #[test]
    fn test_short_history_is_included_whole() {
        let history = history(3);
        let messages = build_prompt(&ava(), &history, "next");
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[1].content, "u0");
        assert_eq!(messages[3].role, MessageRole::User);
    }

    #[test]
    fn test_custom_window() {
        let history = history(6);
        let messages = build_prompt_with_window(&ava(), &history, "x", 2);
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[1].content, "u4");
        assert_eq!(messages[2].content, "a5");

        let messages = build_prompt_with_window(&ava(), &history, "x", 0);
        assert_eq!(messages.len(), 2);
    }
}
