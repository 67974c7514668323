//! Life event types, urgency, and the detection artifacts.
//!
//! A detector produces a [`LifeEventCandidate`]; the coordinator turns the
//! candidates that clear the threshold into [`NewLifeEvent`]s; a store
//! assigns an id and status and hands back a [`LifeEvent`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::status::LifeEventStatus;
use crate::types::{DbId, Timestamp, UserId};

// ---------------------------------------------------------------------------
// Event type
// ---------------------------------------------------------------------------

/// Kind of real-world life event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifeEventType {
    Marriage,
    Birth,
    Death,
    Divorce,
    JobChange,
    Move,
    Retirement,
    Illness,
    MajorPurchase,
}

impl LifeEventType {
    pub const ALL: [LifeEventType; 9] = [
        LifeEventType::Marriage,
        LifeEventType::Birth,
        LifeEventType::Death,
        LifeEventType::Divorce,
        LifeEventType::JobChange,
        LifeEventType::Move,
        LifeEventType::Retirement,
        LifeEventType::Illness,
        LifeEventType::MajorPurchase,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LifeEventType::Marriage => "marriage",
            LifeEventType::Birth => "birth",
            LifeEventType::Death => "death",
            LifeEventType::Divorce => "divorce",
            LifeEventType::JobChange => "job_change",
            LifeEventType::Move => "move",
            LifeEventType::Retirement => "retirement",
            LifeEventType::Illness => "illness",
            LifeEventType::MajorPurchase => "major_purchase",
        }
    }

    /// How quickly the follow-up actions should be surfaced.
    pub fn urgency(self) -> Urgency {
        match self {
            LifeEventType::Marriage
            | LifeEventType::Divorce
            | LifeEventType::Birth
            | LifeEventType::Death => Urgency::Immediate,
            LifeEventType::JobChange
            | LifeEventType::Move
            | LifeEventType::Retirement
            | LifeEventType::Illness => Urgency::Soon,
            LifeEventType::MajorPurchase => Urgency::WhenConvenient,
        }
    }

    /// Fixed follow-up checklist shown with a detected event.
    pub fn suggested_updates(self) -> &'static [&'static str] {
        match self {
            LifeEventType::Marriage => &[
                "Update beneficiaries across all assets",
                "Review and update your will",
                "Add spouse to trusted circle",
                "Update emergency contacts",
                "Consider joint asset ownership",
            ],
            LifeEventType::Divorce => &[
                "Remove ex-spouse as beneficiary",
                "Update your will",
                "Remove from trusted circle",
                "Update asset ownership",
                "Review guardianship plans",
            ],
            LifeEventType::Birth => &[
                "Add child as beneficiary",
                "Set up or update guardianship plans",
                "Review life insurance coverage",
                "Update your will with provisions for new child",
                "Consider education savings planning",
            ],
            LifeEventType::Death => &[
                "Update beneficiaries to remove deceased",
                "Review executor and guardian choices",
                "Update trusted circle",
                "Review asset distribution plans",
                "Consider grief counseling resources",
            ],
            LifeEventType::JobChange => &[
                "Update employment information",
                "Review retirement account beneficiaries",
                "Update income information for planning",
                "Review insurance needs with new employer",
                "Consider impact on estate planning",
            ],
            LifeEventType::Move => &[
                "Update all addresses in documents",
                "Review local emergency contacts",
                "Update property records",
                "Consider state-specific legal requirements",
                "Update trusted professionals (lawyers, doctors)",
            ],
            LifeEventType::Retirement => &[
                "Review retirement income strategy",
                "Update estate plan for retirement",
                "Review healthcare coverage",
                "Consider tax implications",
                "Update beneficiary designations",
            ],
            LifeEventType::MajorPurchase => &[
                "Add new asset to inventory",
                "Update insurance coverage",
                "Review estate plan for new asset",
                "Update net worth calculations",
                "Consider asset protection strategies",
            ],
            // No detector emits illness.
            LifeEventType::Illness => &[],
        }
    }
}

impl fmt::Display for LifeEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifeEventType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Invalid life event type '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Urgency
// ---------------------------------------------------------------------------

/// Ordered from most to least urgent, so sorting ascending puts
/// `Immediate` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Immediate,
    Soon,
    WhenConvenient,
}

impl Urgency {
    pub const ALL: [Urgency; 3] = [Urgency::Immediate, Urgency::Soon, Urgency::WhenConvenient];

    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::Immediate => "immediate",
            Urgency::Soon => "soon",
            Urgency::WhenConvenient => "when_convenient",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|u| u.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Invalid urgency '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Detection artifacts
// ---------------------------------------------------------------------------

/// A detector's proposal, before threshold filtering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifeEventCandidate {
    pub event_type: LifeEventType,
    pub detected_date: Timestamp,
    /// Always in `(0.0, 1.0]`.
    pub confidence: f64,
    /// One explanation per check that fired, in evaluation order.
    pub indicators: Vec<String>,
    pub suggested_updates: Vec<String>,
    pub urgency: Urgency,
}

impl LifeEventCandidate {
    /// Attach the owning user, producing an event ready for persistence.
    pub fn for_user(self, user_id: impl Into<UserId>) -> NewLifeEvent {
        NewLifeEvent {
            user_id: user_id.into(),
            event_type: self.event_type,
            detected_date: self.detected_date,
            confidence: self.confidence,
            indicators: self.indicators,
            suggested_updates: self.suggested_updates,
            urgency: self.urgency,
        }
    }
}

/// A detected event that cleared the threshold. Persisted as `detected`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLifeEvent {
    pub user_id: UserId,
    pub event_type: LifeEventType,
    pub detected_date: Timestamp,
    pub confidence: f64,
    pub indicators: Vec<String>,
    pub suggested_updates: Vec<String>,
    pub urgency: Urgency,
}

/// A persisted life event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeEvent {
    pub id: DbId,
    pub user_id: UserId,
    pub event_type: LifeEventType,
    pub detected_date: Timestamp,
    pub confidence: f64,
    pub indicators: Vec<String>,
    pub suggested_updates: Vec<String>,
    pub urgency: Urgency,
    pub status: LifeEventStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl LifeEvent {
    /// Build the stored form of `event` with the initial `detected` status.
    pub fn from_new(id: DbId, event: NewLifeEvent, now: Timestamp) -> Self {
        Self {
            id,
            user_id: event.user_id,
            event_type: event.event_type,
            detected_date: event.detected_date,
            confidence: event.confidence,
            indicators: event.indicators,
            suggested_updates: event.suggested_updates,
            urgency: event.urgency,
            status: LifeEventStatus::Detected,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
