use crate::error::ValidationError;
use crate::reference::blank_to_none;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenovationStatus {
    #[default]
    Planning,
    InProgress,
    Completed,
    Paused,
    Cancelled,
}

impl RenovationStatus {
    pub const ALL: [RenovationStatus; 5] = [
        RenovationStatus::Planning,
        RenovationStatus::InProgress,
        RenovationStatus::Completed,
        RenovationStatus::Paused,
        RenovationStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RenovationStatus::Planning => "planning",
            RenovationStatus::InProgress => "in_progress",
            RenovationStatus::Completed => "completed",
            RenovationStatus::Paused => "paused",
            RenovationStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RenovationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenovationStatus {
    type Err = ValidationError;

    // Also accepts the Portuguese labels older exports were written with.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "planning" | "planejamento" => Ok(RenovationStatus::Planning),
            "in_progress" | "em_andamento" => Ok(RenovationStatus::InProgress),
            "completed" | "concluído" | "concluido" => Ok(RenovationStatus::Completed),
            "paused" | "pausado" => Ok(RenovationStatus::Paused),
            "cancelled" | "canceled" | "cancelado" => Ok(RenovationStatus::Cancelled),
            _ => Err(ValidationError::new(format!(
                "unknown renovation status '{}'",
                s.trim()
            ))),
        }
    }
}

/// A renovation project; items hang off it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Renovation {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_completion_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: RenovationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenovationDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub target_completion_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: RenovationStatus,
}

impl RenovationDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub(crate) fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.description = blank_to_none(self.description);
        self
    }
}

impl Renovation {
    pub(crate) fn from_draft(id: i64, draft: RenovationDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            start_date: draft.start_date,
            target_completion_date: draft.target_completion_date,
            status: draft.status,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn apply(&mut self, draft: RenovationDraft, now: DateTime<Utc>) {
        self.name = draft.name;
        self.description = draft.description;
        self.start_date = draft.start_date;
        self.target_completion_date = draft.target_completion_date;
        self.status = draft.status;
        self.updated_at = now;
    }

    pub fn to_draft(&self) -> RenovationDraft {
        RenovationDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            start_date: self.start_date,
            target_completion_date: self.target_completion_date,
            status: self.status,
        }
    }
}
