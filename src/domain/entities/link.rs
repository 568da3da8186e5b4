//! Link entity representing a short-code to destination-URL mapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a short code resolves: immediately, or via an interstitial page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RedirectMode {
    /// Immediate redirect; the click event is recorded as SUCCESS right away.
    #[default]
    Direct,
    /// Interstitial page; the visitor must click through to confirm.
    Click,
    /// Interstitial page with a countdown that auto-continues.
    Timer,
}

impl RedirectMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Click => "click",
            Self::Timer => "timer",
        }
    }

    /// True for modes that go through the token-confirmed interstitial flow.
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Click | Self::Timer)
    }
}

impl fmt::Display for RedirectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RedirectMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "direct" => Ok(Self::Direct),
            "click" => Ok(Self::Click),
            "timer" => Ok(Self::Timer),
            other => Err(format!("unknown redirect mode '{other}'")),
        }
    }
}

/// A short link with its destination and resolution policy.
///
/// Owned by the durable store; the cache holds serialized snapshots of this
/// struct with a bounded lifetime, so cached copies may lag the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub code: String,
    pub url: String,
    pub mode: RedirectMode,
    pub timer_seconds: i32,
    pub disabled: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Returns true if the link has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|e| Utc::now() >= e)
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub code: String,
    pub url: String,
    pub mode: RedirectMode,
    pub timer_seconds: i32,
    pub disabled: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Partial update for an existing link.
///
/// `None` fields are left unchanged.
/// `expires_at: Some(None)` clears the expiry; `Some(Some(t))` sets it.
#[derive(Debug, Clone, Default)]
pub struct LinkPatch {
    pub url: Option<String>,
    pub mode: Option<RedirectMode>,
    pub timer_seconds: Option<i32>,
    pub disabled: Option<bool>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

impl LinkPatch {
    /// True when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.url.is_none()
            && self.mode.is_none()
            && self.timer_seconds.is_none()
            && self.disabled.is_none()
            && self.expires_at.is_none()
    }
}
