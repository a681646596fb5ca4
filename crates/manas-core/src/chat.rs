//! Chat history handling

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One content part of a chat turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatPart {
    #[serde(default)]
    pub text: Option<String>,
}

/// A role-tagged conversation turn (`user` or `model`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub parts: Vec<ChatPart>,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self::with_role("user", text)
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::with_role("model", text)
    }

    fn with_role(role: &str, text: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![ChatPart {
                text: Some(text.into()),
            }],
        }
    }

    /// Text of the first part that carries any
    pub fn text(&self) -> Option<&str> {
        self.parts.iter().find_map(|p| p.text.as_deref())
    }

    fn is_well_formed(&self) -> bool {
        self.text().is_some_and(|t| !t.trim().is_empty())
    }
}

/// Drop turns that carry no text
pub fn well_formed_turns(history: Vec<ChatTurn>) -> Vec<ChatTurn> {
    history.into_iter().filter(ChatTurn::is_well_formed).collect()
}

/// Split a history into prior context and the new message.
///
/// Malformed turns are removed first; the last remaining turn is the new
/// message and everything before it, in order, is context.
pub fn split_history(history: Vec<ChatTurn>) -> Result<(Vec<ChatTurn>, String)> {
    let mut turns = well_formed_turns(history);
    let last = turns
        .pop()
        .ok_or_else(|| Error::InvalidInput("Chat history has no messages".to_string()))?;

    let message = last.text().unwrap_or_default().to_string();
    Ok((turns, message))
}

/// Render a conversation as `Speaker: text` lines, the model speaking as Manas
pub fn transcript(turns: &[ChatTurn]) -> String {
    turns
        .iter()
        .filter_map(|turn| {
            let text = turn.text()?;
            let speaker = match turn.role.as_str() {
                "model" => "Manas",
                "" => "user",
                other => other,
            };
            Some(format!("{}: {}", speaker, text))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
