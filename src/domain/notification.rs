//! In-app notifications and gamification achievements.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::common::{new_id, Displayable, Identifiable, NamedEntity};

pub const EXPENSE_ALERT: &str = "expense_alert";
pub const BUDGET_ALERT: &str = "budget_alert";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(default)]
    pub message: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
    /// Free-form tag such as `expense_alert` or `budget_alert`.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_id: Option<String>,
}

impl Notification {
    pub fn new(
        message: impl Into<String>,
        kind: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id("notif"),
            message: message.into(),
            timestamp,
            read: false,
            kind: kind.into(),
            related_id: None,
        }
    }

    pub fn related_to(mut self, id: impl Into<String>) -> Self {
        self.related_id = Some(id.into());
        self
    }
}

impl Identifiable for Notification {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Displayable for Notification {
    fn display_label(&self) -> String {
        let marker = if self.read { " " } else { "*" };
        format!(
            "{} [{}] {}",
            marker,
            self.timestamp.format("%Y-%m-%d %H:%M"),
            self.message
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub achieved: bool,
    /// Completion in `0.0..=1.0`.
    #[serde(default)]
    pub progress: f64,
}

impl Achievement {
    pub fn new(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            achieved: false,
            progress: 0.0,
        }
    }

    /// Stores `progress` clamped to `0.0..=1.0`; reaching 1 marks the achievement.
    pub fn set_progress(&mut self, progress: f64) {
        let clamped = if progress.is_finite() {
            progress.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.progress = clamped;
        if clamped >= 1.0 {
            self.achieved = true;
        }
    }

    pub fn mark_achieved(&mut self) {
        self.achieved = true;
        self.progress = 1.0;
    }
}

impl Identifiable for Achievement {
    fn id(&self) -> &str {
        &self.id
    }
}

impl NamedEntity for Achievement {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_clamps_and_completes() {
        let mut achievement = Achievement::new("first_budget", "First budget", "");
        achievement.set_progress(-0.5);
        assert_eq!(achievement.progress, 0.0);
        achievement.set_progress(0.4);
        assert!(!achievement.achieved);
        achievement.set_progress(3.0);
        assert_eq!(achievement.progress, 1.0);
        assert!(achievement.achieved);
    }
}
