//! The paste record, its persisted (JSON slot) layout, and access evaluation.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder used when a paste is created with a blank title.
pub const UNTITLED: &str = "Untitled";

/// Listing previews are capped at this many characters.
pub const PREVIEW_MAX_CHARS: usize = 100;

/// A stored paste. Serializes to the camelCase layout of the persisted
/// `pastes` slot, with ISO-8601 timestamps and optional fields omitted when
/// absent.
///
/// Deserialization is deliberately lenient: a record written by an older or
/// buggy writer should degrade, not poison the whole slot. An unparseable
/// `createdAt` is coerced to "now" and an unparseable `expiresAt` to "never";
/// missing counters start at zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paste {
    pub id: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default = "Utc::now", deserialize_with = "lenient_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_optional_datetime"
    )]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_views: Option<u32>,
    #[serde(default)]
    pub current_views: u32,
    #[serde(default)]
    pub is_private: bool,
}

/// Whether a paste may still be read. `Expired` is terminal: no operation
/// transitions a paste back to `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessState {
    Active,
    Expired,
}

impl Paste {
    /// Pure expiration policy: the time bound is evaluated before the view
    /// bound, and neither check mutates the record. Callers increment the
    /// view count separately, and only after observing `Active`.
    #[must_use]
    pub fn evaluate_access(&self, now: DateTime<Utc>) -> AccessState {
        if let Some(expires_at) = self.expires_at {
            if expires_at < now {
                return AccessState::Expired;
            }
        }

        if let Some(max_views) = self.max_views {
            if self.current_views >= max_views {
                return AccessState::Expired;
            }
        }

        AccessState::Active
    }

    /// Records one successful read. Must only be called on a paste that
    /// evaluated `Active`, which keeps `current_views` from ever passing
    /// `max_views`.
    pub fn increment_view(&mut self) {
        self.current_views += 1;
    }

    /// Normalizes a user-supplied title: trimmed, blank replaced with
    /// [`UNTITLED`].
    #[must_use]
    pub fn normalize_title(title: &str) -> String {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            UNTITLED.to_string()
        } else {
            trimmed.to_string()
        }
    }
}

/// Listing entry: paste metadata plus a truncated content preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasteSummary {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub current_views: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_views: Option<u32>,
    pub content_preview: String,
}

impl From<&Paste> for PasteSummary {
    fn from(paste: &Paste) -> Self {
        Self {
            id: paste.id.clone(),
            title: paste.title.clone(),
            created_at: paste.created_at,
            expires_at: paste.expires_at,
            current_views: paste.current_views,
            max_views: paste.max_views,
            content_preview: preview(&paste.content),
        }
    }
}

/// The first [`PREVIEW_MAX_CHARS`] characters of `content`, with a `...`
/// marker when anything was cut. Short content passes through unmodified.
#[must_use]
pub fn preview(content: &str) -> String {
    if content.chars().count() <= PREVIEW_MAX_CHARS {
        return content.to_string();
    }

    let mut truncated: String = content.chars().take(PREVIEW_MAX_CHARS).collect();
    truncated.push_str("...");
    truncated
}

/// Request payload for creating a paste. Selectors stay textual so that a
/// malformed value is a domain validation failure rather than a decode error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePasteRequest {
    #[serde(default)]
    pub title: String,
    pub content: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: String,
    #[serde(default = "default_max_views")]
    pub max_views: String,
    #[serde(default)]
    pub is_private: bool,
}

/// Response payload for a created paste. Callers compose the shareable URL
/// from the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePasteResponse {
    pub id: String,
}

fn default_title() -> String {
    UNTITLED.to_string()
}

fn default_expires_in() -> String {
    "never".to_string()
}

fn default_max_views() -> String {
    "unlimited".to_string()
}

/// Timestamps as older writers stored them: ISO-8601 text or epoch
/// milliseconds.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredDateTime {
    Text(String),
    EpochMillis(i64),
}

impl StoredDateTime {
    fn parse(self) -> Option<DateTime<Utc>> {
        match self {
            Self::Text(raw) => raw.parse().ok(),
            Self::EpochMillis(millis) => Utc.timestamp_millis_opt(millis).single(),
        }
    }
}

fn lenient_datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = StoredDateTime::deserialize(deserializer)?;
    Ok(raw.parse().unwrap_or_else(Utc::now))
}

fn lenient_optional_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<StoredDateTime>::deserialize(deserializer)?;
    Ok(raw.and_then(StoredDateTime::parse))
}
