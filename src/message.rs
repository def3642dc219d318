use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{AppError, Result};

/// Subtype Slack puts on replies that were also sent to the channel.
pub const THREAD_BROADCAST: &str = "thread_broadcast";

/// One message as returned by `conversations.history` / `conversations.replies`.
///
/// Only the fields the export pipeline inspects are typed; everything else
/// Slack sends (text, attachments, reactions, ...) is kept verbatim in
/// `extra` so the day files preserve the full message objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Fixed-point `seconds.microseconds` string, unique within a conversation.
    pub ts: String,

    /// Author id. Missing for some bot messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,

    /// Present and > 0 only on thread roots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_count: Option<u32>,

    /// Attached by the history assembler on thread roots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replies: Option<Vec<ReplySummary>>,

    /// New conversation name, set on rename events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Previous conversation name, set on rename events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_name: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Message {
    pub fn is_thread_root(&self) -> bool {
        self.reply_count.unwrap_or(0) > 0
    }

    pub fn is_thread_broadcast(&self) -> bool {
        self.subtype.as_deref() == Some(THREAD_BROADCAST)
    }
}

/// Minimal record of one thread reply, attached to the root's `replies` list
/// so consumers know who participated without duplicating full reply bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplySummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub ts: String,
}

/// The kind of conversation being exported, as Slack classifies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationKind {
    Channel,
    Group,
    Im,
}

impl ConversationKind {
    /// Subtype marking a rename event for this kind. DMs cannot be renamed.
    pub fn rename_subtype(&self) -> Option<&'static str> {
        match self {
            ConversationKind::Channel => Some("channel_name"),
            ConversationKind::Group => Some("group_name"),
            ConversationKind::Im => None,
        }
    }
}

/// Parse a Slack `ts` string into a UTC datetime.
///
/// The fractional part is validated but dropped; day partitioning only needs
/// second resolution. Anything that is not `seconds.fraction` with numeric
/// parts breaks the date-partitioning invariant and is rejected.
pub fn parse_timestamp(ts: &str) -> Result<DateTime<Utc>> {
    let invalid = || AppError::InvalidTimestamp(ts.to_string());

    let (seconds, fraction) = ts.split_once('.').ok_or_else(invalid)?;
    if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let seconds: i64 = seconds.parse().map_err(|_| invalid())?;

    DateTime::from_timestamp(seconds, 0).ok_or_else(invalid)
}

/// UTC calendar date a message belongs to, used as the day file name.
pub fn file_date(ts: &str) -> Result<NaiveDate> {
    Ok(parse_timestamp(ts)?.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_valid() {
        let dt = parse_timestamp("1577836800.000100").unwrap();
        assert_eq!(dt.to_rfc3339(), "2020-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_file_date() {
        let date = file_date("1577923199.999999").unwrap();
        assert_eq!(date.to_string(), "2020-01-01");
    }

    #[test]
    fn test_parse_timestamp_missing_fraction() {
        let err = parse_timestamp("1577836800").unwrap_err();
        assert!(matches!(err, AppError::InvalidTimestamp(_)));
    }

    #[test]
    fn test_parse_timestamp_non_numeric() {
        assert!(parse_timestamp("yesterday.morning").is_err());
        assert!(parse_timestamp("1577836800.12ab").is_err());
        assert!(parse_timestamp("1577836800.").is_err());
        assert!(parse_timestamp("").is_err());
    }

    #[test]
    fn test_message_deserialize_keeps_unknown_fields() {
        let raw = r#"{
            "ts": "1577836800.000100",
            "user": "U123",
            "text": "hello world",
            "type": "message",
            "reply_count": 2
        }"#;

        let message: Message = serde_json::from_str(raw).unwrap();

        assert_eq!(message.ts, "1577836800.000100");
        assert_eq!(message.user.as_deref(), Some("U123"));
        assert_eq!(message.reply_count, Some(2));
        assert!(message.is_thread_root());
        assert_eq!(
            message.extra.get("text").and_then(|v| v.as_str()),
            Some("hello world")
        );
    }

    #[test]
    fn test_message_deserialize_requires_ts() {
        let raw = r#"{"user": "U123", "text": "no timestamp"}"#;
        assert!(serde_json::from_str::<Message>(raw).is_err());
    }

    #[test]
    fn test_message_serialize_skips_absent_fields() {
        let raw = r#"{"ts": "1577836800.000100", "text": "hi"}"#;
        let message: Message = serde_json::from_str(raw).unwrap();

        let out = serde_json::to_string(&message).unwrap();

        assert!(out.contains("\"text\""));
        assert!(!out.contains("reply_count"));
        assert!(!out.contains("replies"));
        assert!(!out.contains("subtype"));
    }

    #[test]
    fn test_message_roundtrip_with_replies() {
        let raw = r#"{"ts": "300.000000", "user": "U1", "reply_count": 1}"#;
        let mut message: Message = serde_json::from_str(raw).unwrap();
        message.replies = Some(vec![ReplySummary {
            user: Some("U2".to_string()),
            ts: "350.000000".to_string(),
        }]);

        let out = serde_json::to_string(&message).unwrap();
        let back: Message = serde_json::from_str(&out).unwrap();

        assert_eq!(back.replies, message.replies);
    }

    #[test]
    fn test_thread_broadcast_detection() {
        let raw = r#"{"ts": "1.000000", "subtype": "thread_broadcast"}"#;
        let message: Message = serde_json::from_str(raw).unwrap();
        assert!(message.is_thread_broadcast());

        let raw = r#"{"ts": "1.000000", "subtype": "channel_join"}"#;
        let message: Message = serde_json::from_str(raw).unwrap();
        assert!(!message.is_thread_broadcast());
    }

    #[test]
    fn test_rename_subtype_per_kind() {
        assert_eq!(
            ConversationKind::Channel.rename_subtype(),
            Some("channel_name")
        );
        assert_eq!(ConversationKind::Group.rename_subtype(), Some("group_name"));
        assert_eq!(ConversationKind::Im.rename_subtype(), None);
    }
}
