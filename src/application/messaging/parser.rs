//! Message parser - Parses raw text into structured messages

use crate::domain::entities::{Message, Content, User};

/// Parses incoming messages into structured Message objects
pub struct MessageParser {
    command_prefix: String,
}

impl MessageParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.command_prefix
    }

    /// Parse a text message
    pub fn parse(&self, chat_id: impl Into<String>, text: impl Into<String>, sender: Option<User>) -> Message {
        let text = text.into();
        let chat_id = chat_id.into();

        let content = self.parse_content(&text);
        let message = Message::new(chat_id, content);
        match sender {
            Some(user) => message.with_sender(user),
            None => message,
        }
    }

    /// Split `!name arg arg` into a command; anything else stays text
    pub fn parse_content(&self, text: &str) -> Content {
        let text = text.trim();
        if text.is_empty() {
            return Content::Empty;
        }

        let Some(cmd_text) = text.strip_prefix(self.command_prefix.as_str()) else {
            return Content::Text(text.to_string());
        };

        // A prefix followed by a space is not a command.
        if cmd_text.is_empty() || cmd_text.starts_with(char::is_whitespace) {
            return Content::Text(text.to_string());
        }

        let (name, rest) = cmd_text.split_once(char::is_whitespace).unwrap_or((cmd_text, ""));
        Content::Command {
            name: name.to_string(),
            args: split_args(rest),
        }
    }
}

/// Split command arguments on whitespace. An argument opening with `"` runs
/// to the closing quote and may hold spaces; `\"` inside it is a literal
/// quote. An unclosed quote takes the rest of the line.
fn split_args(text: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut chars = text.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let Some(first) = chars.next() else {
            break;
        };

        let mut arg = String::new();
        if first == '"' {
            while let Some(c) = chars.next() {
                match c {
                    '\\' if chars.peek() == Some(&'"') => {
                        chars.next();
                        arg.push('"');
                    }
                    '"' => break,
                    c => arg.push(c),
                }
            }
        } else {
            arg.push(first);
            while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                arg.push(c);
            }
        }
        args.push(arg);
    }

    args
}
