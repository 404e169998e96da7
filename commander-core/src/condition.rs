//! Condition vectors (spec §3 "Condition", §9 "Condition vectors"): an
//! ordered list of `{type, status, lastTransitionTime, reason, message}`
//! entries, upserted by `type`, replacing the object-oriented status
//! singletons a less declarative design would use.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConditionType {
    Connected,
    Healthy,
    Configured,
    Registered,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub r#type: ConditionType,
    pub status: ConditionStatus,
    pub last_transition_time: DateTime<Utc>,
    pub reason: String,
    pub message: String,
}

/// At most one entry per [`ConditionType`]. Kept as a `Vec` rather than a map
/// because the wire and storage representations are both an ordered list
/// (spec §9), and the set is always small (five variants).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conditions(Vec<Condition>);

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, r#type: ConditionType) -> Option<&Condition> {
        self.0.iter().find(|c| c.r#type == r#type)
    }

    pub fn is_true(&self, r#type: ConditionType) -> bool {
        matches!(
            self.get(r#type).map(|c| c.status),
            Some(ConditionStatus::True)
        )
    }

    /// Overwrite in place; `lastTransitionTime` advances only when `status`
    /// actually changes, so repeated `set` calls with the same status are
    /// silent no-ops on the timestamp (spec §3 "Condition").
    pub fn set(
        &mut self,
        r#type: ConditionType,
        status: ConditionStatus,
        reason: impl Into<String>,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        let reason = reason.into();
        let message = message.into();
        match self.0.iter_mut().find(|c| c.r#type == r#type) {
            Some(existing) => {
                if existing.status != status {
                    existing.status = status;
                    existing.last_transition_time = now;
                }
                existing.reason = reason;
                existing.message = message;
            }
            None => self.0.push(Condition {
                r#type,
                status,
                last_transition_time: now,
                reason,
                message,
            }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(seconds: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(seconds, 0).unwrap()
    }

    #[test]
    fn unchanged_status_does_not_advance_transition_time() {
        let mut conds = Conditions::new();
        conds.set(ConditionType::Healthy, ConditionStatus::True, "ok", "", t(1));
        conds.set(
            ConditionType::Healthy,
            ConditionStatus::True,
            "still ok",
            "",
            t(2),
        );
        let c = conds.get(ConditionType::Healthy).unwrap();
        assert_eq!(c.last_transition_time, t(1));
        assert_eq!(c.reason, "still ok");
    }

    #[test]
    fn changed_status_advances_transition_time() {
        let mut conds = Conditions::new();
        conds.set(ConditionType::Healthy, ConditionStatus::True, "ok", "", t(1));
        conds.set(
            ConditionType::Healthy,
            ConditionStatus::False,
            "down",
            "",
            t(2),
        );
        assert_eq!(
            conds.get(ConditionType::Healthy).unwrap().last_transition_time,
            t(2)
        );
    }

    #[test]
    fn at_most_one_entry_per_type() {
        let mut conds = Conditions::new();
        conds.set(ConditionType::Healthy, ConditionStatus::True, "a", "", t(1));
        conds.set(ConditionType::Healthy, ConditionStatus::False, "b", "", t(2));
        assert_eq!(conds.iter().count(), 1);
    }
}
