use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::store::{Record, Table};

/// The closed set of states a status row may name.
///
/// Names are matched case-insensitively and ignore spaces, hyphens and
/// underscores, so "In Progress", "in_progress" and "IN-PROGRESS" are the
/// same state. `Completed` is the only state that releases dependents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LifecycleState {
    NotStarted,
    InProgress,
    OnHold,
    Completed,
    Cancelled,
}

impl LifecycleState {
    pub const ALL: [LifecycleState; 5] = [
        Self::NotStarted,
        Self::InProgress,
        Self::OnHold,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Canonical display name, also the form stored in the status table.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::OnHold => "On Hold",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "notstarted" => Some(Self::NotStarted),
            "inprogress" => Some(Self::InProgress),
            "onhold" => Some(Self::OnHold),
            "completed" => Some(Self::Completed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub const fn is_done(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleState {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            let known: Vec<&str> = Self::ALL.iter().map(|s| s.as_str()).collect();
            ApiError::validation(format!(
                "Unknown status name {:?}; expected one of: {}",
                s,
                known.join(", ")
            ))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub status_id: i64,
    pub name: String,
    pub description: Option<String>,
}

impl Record for Status {
    const TABLE: Table = Table::Statuses;

    fn id(&self) -> i64 {
        self.status_id
    }
}

impl Status {
    pub fn state(&self) -> Option<LifecycleState> {
        LifecycleState::parse(&self.name)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDto {
    pub status_id: i64,
    pub name: String,
    pub description: Option<String>,
}

impl From<Status> for StatusDto {
    fn from(status: Status) -> Self {
        Self {
            status_id: status.status_id,
            name: status.name,
            description: status.description,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusPayload {
    #[serde(default)]
    pub status_id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl StatusPayload {
    /// Validates the name against [`LifecycleState`] and stores its canonical form.
    pub fn into_status(self) -> Result<Status, ApiError> {
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| ApiError::validation("Status name is required"))?;
        let state: LifecycleState = name.parse()?;
        Ok(Status {
            status_id: self.status_id,
            name: state.as_str().to_string(),
            description: self.description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_loosely() {
        assert_eq!(LifecycleState::parse("completed"), Some(LifecycleState::Completed));
        assert_eq!(LifecycleState::parse("COMPLETED"), Some(LifecycleState::Completed));
        assert_eq!(LifecycleState::parse("In Progress"), Some(LifecycleState::InProgress));
        assert_eq!(LifecycleState::parse("in_progress"), Some(LifecycleState::InProgress));
        assert_eq!(LifecycleState::parse("on-hold"), Some(LifecycleState::OnHold));
        assert_eq!(LifecycleState::parse("Canceled"), Some(LifecycleState::Cancelled));
        assert_eq!(LifecycleState::parse("Done-ish"), None);
        assert_eq!(LifecycleState::parse(""), None);
    }

    #[test]
    fn only_completed_is_done() {
        let done: Vec<_> = LifecycleState::ALL.into_iter().filter(|s| s.is_done()).collect();
        assert_eq!(done, vec![LifecycleState::Completed]);
    }

    #[test]
    fn every_canonical_name_round_trips() {
        for state in LifecycleState::ALL {
            assert_eq!(LifecycleState::parse(state.as_str()), Some(state));
        }
    }

    #[test]
    fn payload_is_normalised_to_the_canonical_name() {
        let status = StatusPayload {
            status_id: 0,
            name: Some("in progress".into()),
            description: None,
        }
        .into_status()
        .unwrap();
        assert_eq!(status.name, "In Progress");
        assert_eq!(status.state(), Some(LifecycleState::InProgress));
    }

    #[test]
    fn payload_rejects_free_text_names() {
        let err = StatusPayload {
            status_id: 0,
            name: Some("Waiting on Bob".into()),
            description: None,
        }
        .into_status()
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = StatusPayload {
            status_id: 0,
            name: None,
            description: None,
        }
        .into_status()
        .unwrap_err();
        assert_eq!(err.to_string(), "Status name is required");
    }
}
