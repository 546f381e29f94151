//! Requests the core asks the host to perform, and the replies it expects.
//!
//! The host owns every network call (hosted table store, photo bucket,
//! blessing generator). Rust only describes the call and later consumes the
//! outcome, matched up by [`RequestId`]. Both directions travel as JSON.

use chrono::{DateTime, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::api::types::{Gift, GiftId, GiftKind, Memory, MemoryDraft, MemoryId, RequestId};
use crate::error::{Failure, FailureKind, StoreError};

/// Names of the remote resources the host talks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub gifts_table: String,
    pub memories_table: String,
    pub photo_bucket: String,
    pub blessing_model: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            gifts_table: "gifts".into(),
            memories_table: "memories".into(),
            photo_bucket: "tree-photos".into(),
            blessing_model: "gemini-3-flash-preview".into(),
        }
    }
}

/// A call for the host to make. List reads are ordered by `created_at`
/// ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BackendRequest {
    ListGifts {
        request_id: RequestId,
        table: String,
    },
    CreateGift {
        request_id: RequestId,
        table: String,
        row: GiftRow,
    },
    /// Set `is_opened`, and `ai_blessing` when one is given.
    MarkOpened {
        request_id: RequestId,
        table: String,
        gift_id: GiftId,
        ai_blessing: Option<String>,
    },
    ClearGifts {
        request_id: RequestId,
        table: String,
    },
    ListMemories {
        request_id: RequestId,
        table: String,
    },
    /// Upload the file the user picked (held by the host) under `path`.
    UploadPhoto {
        request_id: RequestId,
        bucket: String,
        path: String,
    },
    InsertMemory {
        request_id: RequestId,
        table: String,
        row: MemoryDraft,
    },
    RemovePhoto {
        request_id: RequestId,
        bucket: String,
        path: String,
    },
    GenerateBlessing {
        request_id: RequestId,
        model: String,
        prompt: String,
    },
}

impl BackendRequest {
    pub fn request_id(&self) -> RequestId {
        match self {
            BackendRequest::ListGifts { request_id, .. }
            | BackendRequest::CreateGift { request_id, .. }
            | BackendRequest::MarkOpened { request_id, .. }
            | BackendRequest::ClearGifts { request_id, .. }
            | BackendRequest::ListMemories { request_id, .. }
            | BackendRequest::UploadPhoto { request_id, .. }
            | BackendRequest::InsertMemory { request_id, .. }
            | BackendRequest::RemovePhoto { request_id, .. }
            | BackendRequest::GenerateBlessing { request_id, .. } => *request_id,
        }
    }
}

/// The host's answer to one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendReply {
    pub request_id: RequestId,
    #[serde(flatten)]
    pub outcome: ReplyOutcome,
}

impl BackendReply {
    pub fn new(request_id: RequestId, outcome: ReplyOutcome) -> Self {
        Self { request_id, outcome }
    }

    /// Parse a reply from the host.
    ///
    /// A reply whose outcome cannot be read but whose `request_id` can is
    /// turned into a `Malformed` failure, so the request it answers still
    /// resolves. Only a reply without a readable id is an error.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        match serde_json::from_str(json) {
            Ok(reply) => Ok(reply),
            Err(e) => {
                let ReplyId { request_id } = serde_json::from_str(json)?;
                log::warn!("unreadable reply to request {}: {e}", request_id.0);
                Ok(Self::new(
                    request_id,
                    ReplyOutcome::Failed {
                        error: Failure::new(FailureKind::Malformed, e.to_string()),
                    },
                ))
            }
        }
    }
}

#[derive(Deserialize)]
struct ReplyId {
    request_id: RequestId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplyOutcome {
    Gifts {
        #[serde(default, deserialize_with = "lenient_rows")]
        rows: Vec<GiftRow>,
    },
    Memories {
        #[serde(default, deserialize_with = "lenient_rows")]
        rows: Vec<MemoryRow>,
    },
    GiftCreated,
    GiftMarked,
    GiftsCleared,
    PhotoUploaded { public_url: String },
    MemoryInserted,
    PhotoRemoved,
    Blessing { text: String },
    Failed { error: Failure },
}

/// A row of the gifts table. Nullable columns are tolerated on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GiftRow {
    pub id: String,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub recipient_name: Option<String>,
    #[serde(default)]
    pub sender_photo: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Unknown kinds read as absent.
    #[serde(rename = "type", default, deserialize_with = "lenient_kind")]
    pub kind: Option<GiftKind>,
    #[serde(default)]
    pub color: Option<String>,
    /// Epoch milliseconds.
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub ai_blessing: Option<String>,
    #[serde(default)]
    pub is_opened: Option<bool>,
}

impl From<&Gift> for GiftRow {
    fn from(gift: &Gift) -> Self {
        Self {
            id: gift.id.0.clone(),
            sender_name: Some(gift.sender_name.clone()),
            recipient_name: Some(gift.recipient_name.clone()),
            sender_photo: gift.sender_photo.clone(),
            message: Some(gift.message.clone()),
            kind: Some(gift.kind),
            color: Some(gift.color.clone()),
            created_at: Some(gift.created_at),
            ai_blessing: gift.ai_blessing.clone(),
            is_opened: Some(gift.is_opened),
        }
    }
}

impl From<GiftRow> for Gift {
    fn from(row: GiftRow) -> Self {
        Self {
            id: GiftId(row.id),
            sender_name: row.sender_name.unwrap_or_default(),
            recipient_name: row.recipient_name.unwrap_or_default(),
            sender_photo: row.sender_photo,
            message: row.message.unwrap_or_default(),
            kind: row.kind.unwrap_or_default(),
            color: row.color.unwrap_or_default(),
            created_at: row.created_at.unwrap_or_default(),
            ai_blessing: row.ai_blessing,
            is_opened: row.is_opened.unwrap_or(false),
        }
    }
}

/// Read a row list one row at a time, skipping rows that do not fit `T`.
/// A `null` list reads as empty.
fn lenient_rows<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let rows = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value(row) {
            Ok(row) => Some(row),
            Err(e) => {
                log::warn!("skipping unreadable row: {e}");
                None
            }
        })
        .collect())
}

fn lenient_kind<'de, D>(deserializer: D) -> Result<Option<GiftKind>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match serde_json::from_value(v.clone()) {
        Ok(kind) => Some(kind),
        Err(_) => {
            log::warn!("unknown gift type {v}, using the default");
            None
        }
    }))
}

/// Primary key as the store returns it: text or an integer sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowKey {
    Text(String),
    Number(i64),
}

impl RowKey {
    fn into_string(self) -> String {
        match self {
            RowKey::Text(s) => s,
            RowKey::Number(n) => n.to_string(),
        }
    }
}

/// A row of the memories table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRow {
    pub id: RowKey,
    pub photo_url: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub sender_name: Option<String>,
    /// RFC 3339 timestamp, or an ISO timestamp without offset (read as UTC).
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Milliseconds since the epoch for a store timestamp.
pub fn parse_timestamp(ts: &str) -> Result<i64, StoreError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Ok(dt.timestamp_millis());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(ts, fmt).ok())
        .map(|naive| naive.and_utc().timestamp_millis())
        .ok_or_else(|| StoreError::Malformed(format!("created_at {ts:?}")))
}

/// An unreadable `created_at` becomes 0; it never hides the memory.
impl From<MemoryRow> for Memory {
    fn from(row: MemoryRow) -> Self {
        let created_at = match row.created_at.as_deref().map(parse_timestamp) {
            Some(Ok(ms)) => ms,
            Some(Err(e)) => {
                log::warn!("memory {:?}: {e}", row.id);
                0
            }
            None => 0,
        };
        Self {
            id: MemoryId(row.id.into_string()),
            photo_url: row.photo_url,
            message: row.message.filter(|m| !m.is_empty()),
            sender_name: row.sender_name.unwrap_or_default(),
            created_at,
        }
    }
}

/// Storage path for an uploaded photo: a random stem plus the picked file's
/// extension (everything after the last dot, or the whole name).
pub fn photo_path(stem: &str, file_name: &str) -> String {
    let ext = file_name.rsplit('.').next().unwrap_or(file_name);
    format!("{stem}.{ext}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gift_row_reads_store_columns() {
        let json = r##"{
            "id": "abc123xyz",
            "sender_name": "Ana",
            "recipient_name": "Luis",
            "sender_photo": null,
            "message": "Te quiero",
            "type": "letter",
            "color": "#1976d2",
            "created_at": 1734000000000,
            "ai_blessing": null,
            "is_opened": false
        }"##;
        let gift: Gift = serde_json::from_str::<GiftRow>(json).unwrap().into();
        assert_eq!(gift.id, GiftId("abc123xyz".into()));
        assert_eq!(gift.kind, GiftKind::Letter);
        assert_eq!(gift.created_at, 1_734_000_000_000);
        assert!(!gift.is_opened);
        assert!(gift.needs_blessing());
    }

    #[test]
    fn gift_row_tolerates_missing_columns() {
        let gift: Gift = serde_json::from_str::<GiftRow>(r#"{"id":"x"}"#).unwrap().into();
        assert_eq!(gift.sender_name, "");
        assert_eq!(gift.color, "");
        assert!(!gift.is_opened);
    }

    #[test]
    fn gift_row_writes_type_column() {
        let gift: Gift = serde_json::from_str::<GiftRow>(r#"{"id":"x","type":"video"}"#)
            .unwrap()
            .into();
        let value = serde_json::to_value(GiftRow::from(&gift)).unwrap();
        assert_eq!(value["type"], "video");
        assert_eq!(value["is_opened"], false);
    }

    #[test]
    fn memory_row_parses_timestamps() {
        let row: MemoryRow = serde_json::from_str(
            r#"{"id": 12, "photo_url": "https://x/a.jpg", "message": "", "sender_name": "User",
                "created_at": "2024-12-20T10:00:00.5+00:00"}"#,
        )
        .unwrap();
        let memory = Memory::from(row);
        assert_eq!(memory.id, MemoryId("12".into()));
        assert_eq!(memory.message, None);
        assert_eq!(memory.created_at, 1_734_688_800_500);
    }

    #[test]
    fn timestamps_without_offset_read_as_utc() {
        assert_eq!(parse_timestamp("2024-12-20T10:00:00.5").unwrap(), 1_734_688_800_500);
        assert_eq!(parse_timestamp("2024-12-20 10:00:00").unwrap(), 1_734_688_800_000);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn odd_timestamps_keep_the_memory() {
        let reply = BackendReply::from_json(
            r#"{"request_id": 1, "kind": "memories", "rows": [
                {"id": "a", "photo_url": "u", "created_at": "2024-12-20T10:00:00.123456"},
                {"id": "b", "photo_url": "v", "created_at": "yesterday"}]}"#,
        )
        .unwrap();
        let rows = match reply.outcome {
            ReplyOutcome::Memories { rows } => rows,
            other => panic!("expected memories, got {other:?}"),
        };
        let memories: Vec<Memory> = rows.into_iter().map(Memory::from).collect();
        assert_eq!(memories.len(), 2);
        assert_eq!(memories[0].created_at, 1_734_688_800_123);
        assert_eq!(memories[1].created_at, 0);
    }

    #[test]
    fn unreadable_rows_are_skipped_one_by_one() {
        let reply = BackendReply::from_json(
            r#"{"request_id": 1, "kind": "gifts", "rows": [
                {"id": "ok"},
                {"id": "postcard", "type": "postcard"},
                {"sender_name": "no id"}]}"#,
        )
        .unwrap();
        let rows = match reply.outcome {
            ReplyOutcome::Gifts { rows } => rows,
            other => panic!("expected gifts, got {other:?}"),
        };
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["ok", "postcard"]);
        assert_eq!(rows[1].kind, None);

        let null_rows = BackendReply::from_json(r#"{"request_id": 2, "kind": "gifts", "rows": null}"#).unwrap();
        assert_eq!(null_rows.outcome, ReplyOutcome::Gifts { rows: Vec::new() });
    }

    #[test]
    fn unreadable_outcome_becomes_a_failure() {
        let reply =
            BackendReply::from_json(r#"{"request_id": 5, "kind": "photo_uploaded"}"#).unwrap();
        assert_eq!(reply.request_id, RequestId(5));
        assert!(matches!(
            reply.outcome,
            ReplyOutcome::Failed {
                error: Failure {
                    kind: FailureKind::Malformed,
                    ..
                }
            }
        ));

        assert!(BackendReply::from_json(r#"{"kind": "gifts"}"#).is_err());
        assert!(BackendReply::from_json("not json").is_err());
    }

    #[test]
    fn requests_are_tagged() {
        let req = BackendRequest::MarkOpened {
            request_id: RequestId(4),
            table: "gifts".into(),
            gift_id: GiftId("g".into()),
            ai_blessing: Some("Paz".into()),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["op"], "mark_opened");
        assert_eq!(value["request_id"], 4);
        assert_eq!(value["gift_id"], "g");
        assert_eq!(req.request_id(), RequestId(4));
    }

    #[test]
    fn replies_parse_from_host_json() {
        let reply = BackendReply::from_json(
            r#"{"request_id": 9, "kind": "photo_uploaded", "public_url": "https://x/p.png"}"#,
        )
        .unwrap();
        assert_eq!(reply.request_id, RequestId(9));
        assert_eq!(
            reply.outcome,
            ReplyOutcome::PhotoUploaded {
                public_url: "https://x/p.png".into()
            }
        );

        let failed = BackendReply::from_json(
            r#"{"request_id": 2, "kind": "failed", "error": {"kind": "quota", "message": "429"}}"#,
        )
        .unwrap();
        assert_eq!(
            failed.outcome,
            ReplyOutcome::Failed {
                error: Failure::new(FailureKind::Quota, "429")
            }
        );

        let bare = BackendReply::from_json(r#"{"request_id": 3, "kind": "gift_created"}"#).unwrap();
        assert_eq!(bare.outcome, ReplyOutcome::GiftCreated);
    }

    #[test]
    fn photo_path_keeps_extension() {
        assert_eq!(photo_path("k3j2", "me.and.you.PNG"), "k3j2.PNG");
        assert_eq!(photo_path("k3j2", "noext"), "k3j2.noext");
    }

    #[test]
    fn default_backend_names() {
        let config = BackendConfig::default();
        assert_eq!(config.gifts_table, "gifts");
        assert_eq!(config.memories_table, "memories");
        assert_eq!(config.photo_bucket, "tree-photos");
    }
}
