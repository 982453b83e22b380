//! Goal tracking types for Creo.
//!
//! A `Goal` is a durable progress record toward a numeric target on one
//! social platform. `GoalDraft` is the validated input to goal creation and
//! `GoalProposal` is a transient suggestion parsed from coach output,
//! pending explicit user acceptance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Social platform a goal is scoped to.
///
/// Unknown platform names deserialize to `Other`, so a proposal naming a
/// platform this build does not know about still parses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    Instagram,
    TikTok,
    YouTube,
    LinkedIn,
    X,
    #[serde(other)]
    Other,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Instagram => write!(f, "Instagram"),
            Platform::TikTok => write!(f, "TikTok"),
            Platform::YouTube => write!(f, "YouTube"),
            Platform::LinkedIn => write!(f, "LinkedIn"),
            Platform::X => write!(f, "X"),
            Platform::Other => write!(f, "Other"),
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "instagram" => Ok(Platform::Instagram),
            "tiktok" => Ok(Platform::TikTok),
            "youtube" => Ok(Platform::YouTube),
            "linkedin" => Ok(Platform::LinkedIn),
            "x" | "twitter" => Ok(Platform::X),
            "other" => Ok(Platform::Other),
            other => Err(format!("invalid platform: '{other}'")),
        }
    }
}

/// A tracked creator goal.
///
/// Invariant: `0 <= current_value <= target_value`, enforced by clamping on
/// every mutation. Once `archived_at` is set the goal is terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: Uuid,
    pub title: String,
    pub platform: Platform,
    pub target_value: f64,
    pub current_value: f64,
    pub unit: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
}

impl Goal {
    /// Percentage of the target reached, rounded, saturating at 100.
    ///
    /// Saturation is deliberate: external platform counts can drift past the
    /// target, but the displayed progress stops at 100.
    pub fn progress_percent(&self) -> u32 {
        if self.target_value <= 0.0 {
            return 0;
        }
        let raw = (self.current_value / self.target_value * 100.0).round() as u32;
        raw.min(100)
    }

    /// Whether the target has been reached.
    pub fn target_reached(&self) -> bool {
        self.progress_percent() >= 100
    }

    /// Whether this goal has been archived.
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}

/// Input for creating a goal, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalDraft {
    pub title: String,
    pub platform: Platform,
    pub target_value: f64,
    pub current_value: f64,
    pub unit: String,
}

impl Default for GoalDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            platform: Platform::Instagram,
            target_value: 1000.0,
            current_value: 0.0,
            unit: "Followers".to_string(),
        }
    }
}

/// A transient goal suggestion parsed from coach output.
///
/// Never persisted; discarded on session reset, goal creation, or when the
/// next proposal replaces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProposal {
    pub title: String,
    pub platform: Platform,
    pub target_value: f64,
    pub unit: String,
}

impl GoalProposal {
    /// Turn the proposal into a creation draft (progress starts at zero).
    pub fn into_draft(self) -> GoalDraft {
        GoalDraft {
            title: self.title,
            platform: self.platform,
            target_value: self.target_value,
            current_value: 0.0,
            unit: self.unit,
        }
    }
}
