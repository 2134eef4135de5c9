#![warn(clippy::nursery, clippy::pedantic)]

//! Contains common types and structures shared by the server and CLI.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
pub use url::Url;

pub mod paste;

pub use paste::{AccessState, CreatePasteRequest, CreatePasteResponse, Paste, PasteSummary};

pub const API_ENDPOINT: &str = "/api";

/// Errors surfaced by the paste lifecycle.
///
/// Storage failures on *reads* are not surfaced through this type; the store
/// fails open to an empty collection instead. Only write failures and internal
/// faults become [`Error::Storage`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("paste not found")]
    NotFound,

    #[error("storage error: {0}")]
    Storage(String),
}

/// How long a paste stays readable, as selected at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpiresIn {
    #[default]
    Never,
    TenMinutes,
    OneHour,
    OneDay,
    SevenDays,
    ThirtyDays,
}

impl ExpiresIn {
    /// Resolves the selector against `now` into an absolute deadline.
    /// `Never` has no deadline.
    #[must_use]
    pub fn expires_at(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Never => None,
            Self::TenMinutes => Some(now + Duration::minutes(10)),
            Self::OneHour => Some(now + Duration::hours(1)),
            Self::OneDay => Some(now + Duration::days(1)),
            Self::SevenDays => Some(now + Duration::days(7)),
            Self::ThirtyDays => Some(now + Duration::days(30)),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Never => "never",
            Self::TenMinutes => "10m",
            Self::OneHour => "1h",
            Self::OneDay => "1d",
            Self::SevenDays => "7d",
            Self::ThirtyDays => "30d",
        }
    }
}

impl FromStr for ExpiresIn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "never" => Ok(Self::Never),
            "10m" => Ok(Self::TenMinutes),
            "1h" => Ok(Self::OneHour),
            "1d" => Ok(Self::OneDay),
            "7d" => Ok(Self::SevenDays),
            "30d" => Ok(Self::ThirtyDays),
            other => Err(Error::Validation(format!(
                "unknown expiration selector `{other}`"
            ))),
        }
    }
}

impl Display for ExpiresIn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// View-count cap selected at creation time. `Capped(1)` is burn-after-reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewLimit {
    #[default]
    Unlimited,
    Capped(u32),
}

impl ViewLimit {
    #[must_use]
    pub const fn max_views(self) -> Option<u32> {
        match self {
            Self::Unlimited => None,
            Self::Capped(n) => Some(n),
        }
    }
}

impl FromStr for ViewLimit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "unlimited" {
            return Ok(Self::Unlimited);
        }

        match s.parse::<u32>() {
            Ok(n) if n > 0 => Ok(Self::Capped(n)),
            _ => Err(Error::Validation(format!(
                "max views must be `unlimited` or a positive integer, got `{s}`"
            ))),
        }
    }
}

impl Display for ViewLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unlimited => f.write_str("unlimited"),
            Self::Capped(n) => write!(f, "{n}"),
        }
    }
}
