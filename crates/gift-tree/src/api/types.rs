use serde::{Deserialize, Serialize};

/// Store-assigned identifier of a gift.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GiftId(pub String);

/// Store-assigned identifier of a memory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryId(pub String);

/// Correlates a backend request with the reply the host sends back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u32);

/// What a gift contains. Only letters can be created from the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GiftKind {
    #[default]
    Letter,
    Audio,
    Video,
}

/// A gift left under the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gift {
    pub id: GiftId,
    pub sender_name: String,
    pub recipient_name: String,
    /// URL of the sender's photo, if one was given.
    pub sender_photo: Option<String>,
    pub message: String,
    pub kind: GiftKind,
    /// Box colour as `#rrggbb`.
    pub color: String,
    /// Creation time, milliseconds since the Unix epoch.
    pub created_at: i64,
    pub ai_blessing: Option<String>,
    pub is_opened: bool,
}

impl Gift {
    /// Name the blessing is addressed to: recipient, then sender, then a generic friend.
    pub fn blessing_name(&self) -> &str {
        [self.recipient_name.as_str(), self.sender_name.as_str()]
            .into_iter()
            .find(|name| !name.is_empty())
            .unwrap_or("Amigo")
    }

    /// Whether opening this gift still needs a generated blessing.
    pub fn needs_blessing(&self) -> bool {
        self.ai_blessing.as_deref().map_or(true, str::is_empty)
    }
}

/// A photo memory hung on the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub id: MemoryId,
    /// Public URL of the uploaded photo.
    pub photo_url: String,
    pub message: Option<String>,
    pub sender_name: String,
    /// Creation time, milliseconds since the Unix epoch.
    pub created_at: i64,
}

/// A memory about to be persisted; the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryDraft {
    pub photo_url: String,
    pub message: Option<String>,
    pub sender_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gift(sender: &str, recipient: &str) -> Gift {
        Gift {
            id: GiftId("g1".into()),
            sender_name: sender.into(),
            recipient_name: recipient.into(),
            sender_photo: None,
            message: "hola".into(),
            kind: GiftKind::Letter,
            color: "#d32f2f".into(),
            created_at: 0,
            ai_blessing: None,
            is_opened: false,
        }
    }

    #[test]
    fn blessing_name_prefers_recipient() {
        assert_eq!(gift("Ana", "Luis").blessing_name(), "Luis");
        assert_eq!(gift("Ana", "").blessing_name(), "Ana");
        assert_eq!(gift("", "").blessing_name(), "Amigo");
    }

    #[test]
    fn empty_blessing_still_needs_one() {
        let mut g = gift("Ana", "Luis");
        assert!(g.needs_blessing());
        g.ai_blessing = Some(String::new());
        assert!(g.needs_blessing());
        g.ai_blessing = Some("Paz".into());
        assert!(!g.needs_blessing());
    }

    #[test]
    fn gift_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&GiftKind::Letter).unwrap(), "\"letter\"");
        let kind: GiftKind = serde_json::from_str("\"video\"").unwrap();
        assert_eq!(kind, GiftKind::Video);
    }
}
