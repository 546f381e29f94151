//! Read model handed to the host UI.
//!
//! A [`ViewSnapshot`] is rebuilt whenever session state changes and carries a
//! revision number, so the host only re-renders its DOM when the revision
//! moves. Display defaults are applied here, never in the stored data.

use serde::Serialize;

use crate::api::types::{Gift, GiftId, GiftKind, MemoryId};
use crate::core::placement::MemoryOrnament;

pub const DEFAULT_SENDER_LABEL: &str = "Alguien especial";
pub const DEFAULT_RECIPIENT_LABEL: &str = "Un ser querido";
pub const LOCKED_TITLE: &str = "¡Aún no es Navidad!";
pub const UPLOAD_FAILED_ALERT: &str = "Error al subir la imagen";

/// The dialog currently on screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Modal {
    CreateGift,
    AddMemory { uploading: bool },
    Locked { title: String, countdown: String },
    GiftDetail { gift_id: GiftId, generating: bool },
    Photo { photo_url: String, message: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GiftView {
    pub id: GiftId,
    pub sender: String,
    pub recipient: String,
    /// Sender photo when it is a usable URL, a generated avatar otherwise.
    pub avatar_url: String,
    /// Text on the tag hanging from the box.
    pub tag_label: String,
    pub message: String,
    pub kind: GiftKind,
    pub color: String,
    pub is_opened: bool,
    pub blessing: Option<String>,
}

impl GiftView {
    pub fn from_gift(gift: &Gift) -> Self {
        let sender = non_empty_or(&gift.sender_name, DEFAULT_SENDER_LABEL);
        let recipient = non_empty_or(&gift.recipient_name, DEFAULT_RECIPIENT_LABEL);
        let avatar_url = match gift.sender_photo.as_deref() {
            Some(url) if url.starts_with("http") => url.to_string(),
            _ => avatar_url(&sender),
        };
        Self {
            id: gift.id.clone(),
            tag_label: format!("Para: {}", non_empty_or(&gift.recipient_name, "Amigo")),
            sender,
            recipient,
            avatar_url,
            message: gift.message.clone(),
            kind: gift.kind,
            color: gift.color.clone(),
            is_opened: gift.is_opened,
            blessing: gift.ai_blessing.clone().filter(|b| !b.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryView {
    pub id: MemoryId,
    pub photo_url: String,
    pub message: Option<String>,
    /// Tree-local position, for hit testing and labels.
    pub position: [f64; 3],
}

impl From<&MemoryOrnament> for MemoryView {
    fn from(ornament: &MemoryOrnament) -> Self {
        Self {
            id: ornament.source_id.clone(),
            photo_url: ornament.image_url.clone(),
            message: ornament.caption.clone(),
            position: ornament.position.to_array(),
        }
    }
}

/// Immutable snapshot of everything the UI shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSnapshot {
    pub revision: u64,
    pub unlocked: bool,
    pub countdown: String,
    pub gifts: Vec<GiftView>,
    pub memories: Vec<MemoryView>,
    pub modal: Option<Modal>,
    /// Blocking message the user must dismiss.
    pub alert: Option<String>,
}

impl ViewSnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Generated avatar for someone without a photo.
pub fn avatar_url(name: &str) -> String {
    let name = if name.is_empty() { "Amigo" } else { name };
    format!(
        "https://ui-avatars.com/api/?name={}&size=200&background=random",
        encode_uri_component(name)
    )
}

/// Percent-encode everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`, as
/// browsers do for a URI component.
pub fn encode_uri_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
