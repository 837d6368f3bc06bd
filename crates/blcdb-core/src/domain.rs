//! Entity types and the moderation transition tables.
//!
//! Both record kinds carry a closed status enum; every legal status change
//! goes through [`SubmissionStatus::apply`] / [`ReportStatus::apply`] so the
//! workflow lives in one place instead of being scattered across handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::category::Category;

/// A directory entry moving through the moderation workflow.
///
/// The `*_km` fields are the Khmer halves of the bilingual locale pairs.
/// Intake guarantees they are populated for new records; rows imported from
/// an older store may carry empty strings, which display projection treats
/// as "fall back to the base language".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandSubmission {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub purpose: String,
    #[serde(default)]
    pub purpose_km: String,
    pub location: String,
    #[serde(default)]
    pub location_km: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub description_km: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub evidence_url: Option<String>,
    pub status: SubmissionStatus,
    #[serde(default)]
    pub submitted_by: String,
    #[serde(rename = "submissionDate")]
    pub submitted_at: DateTime<Utc>,
}

/// A user-filed correction/complaint against one brand entry.
///
/// `brand_name` and `brand_image` are denormalized snapshots copied at
/// creation time and never synced afterwards — the report stays readable
/// after the referenced brand is edited or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueReport {
    pub id: String,
    pub brand_id: String,
    pub brand_name: String,
    #[serde(default)]
    pub brand_image: Option<String>,
    pub reason: ReportReason,
    pub details: String,
    #[serde(default)]
    pub email: Option<String>,
    pub status: ReportStatus,
    pub submitted_at: DateTime<Utc>,
}

/// A validated brand record ready for insertion; the store assigns the id
/// and creation timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmission {
    pub name: String,
    pub category: Category,
    pub purpose: String,
    pub purpose_km: String,
    pub location: String,
    pub location_km: String,
    pub website: String,
    pub description: String,
    pub description_km: String,
    pub image_url: Option<String>,
    pub evidence_url: Option<String>,
    pub status: SubmissionStatus,
    pub submitted_by: String,
}

/// A validated report ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReport {
    pub brand_id: String,
    pub brand_name: String,
    pub brand_image: Option<String>,
    pub reason: ReportReason,
    pub details: String,
    pub email: Option<String>,
    pub status: ReportStatus,
}

/// Full-record replacement used by the admin edit action. Every content
/// field is written; this mirrors how the dashboard submits its edit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionEdit {
    pub name: String,
    pub category: Category,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub purpose_km: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub location_km: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub description_km: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub evidence_url: Option<String>,
    #[serde(default)]
    pub status: Option<SubmissionStatus>,
    #[serde(default)]
    pub submitted_by: Option<String>,
}

// ---------------------------------------------------------------------------
// Statuses and transitions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(SubmissionStatus::Pending),
            "approved" => Some(SubmissionStatus::Approved),
            "rejected" => Some(SubmissionStatus::Rejected),
            _ => None,
        }
    }

    /// Apply a moderation action to this status.
    ///
    /// Re-applying an action whose target equals the current status is an
    /// idempotent no-op. Any other edge outside the transition table is
    /// [`IllegalTransition`].
    ///
    /// # Errors
    ///
    /// Returns [`IllegalTransition`] if the workflow does not define the
    /// requested edge.
    pub fn apply(self, action: SubmissionAction) -> Result<Self, IllegalTransition> {
        let target = action.target();
        if self == target {
            return Ok(self);
        }
        let legal = matches!(
            (self, target),
            (SubmissionStatus::Pending, SubmissionStatus::Approved)
                | (SubmissionStatus::Pending, SubmissionStatus::Rejected)
                | (SubmissionStatus::Rejected, SubmissionStatus::Pending)
                | (SubmissionStatus::Approved, SubmissionStatus::Pending)
        );
        if legal {
            Ok(target)
        } else {
            Err(IllegalTransition {
                from: self.as_str(),
                action: action.as_str(),
            })
        }
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionAction {
    /// pending → approved
    Approve,
    /// pending → rejected
    Reject,
    /// rejected → pending
    Restore,
    /// approved → pending
    Reevaluate,
}

impl SubmissionAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionAction::Approve => "approve",
            SubmissionAction::Reject => "reject",
            SubmissionAction::Restore => "restore",
            SubmissionAction::Reevaluate => "reevaluate",
        }
    }

    #[must_use]
    pub fn target(self) -> SubmissionStatus {
        match self {
            SubmissionAction::Approve => SubmissionStatus::Approved,
            SubmissionAction::Reject => SubmissionStatus::Rejected,
            SubmissionAction::Restore | SubmissionAction::Reevaluate => SubmissionStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Resolved,
    Dismissed,
}

impl ReportStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Resolved => "resolved",
            ReportStatus::Dismissed => "dismissed",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ReportStatus::Pending),
            "resolved" => Some(ReportStatus::Resolved),
            "dismissed" => Some(ReportStatus::Dismissed),
            _ => None,
        }
    }

    /// Apply a moderation action to this status. Reopen is legal from both
    /// settled states; resolving or dismissing requires a pending report.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalTransition`] if the workflow does not define the
    /// requested edge.
    pub fn apply(self, action: ReportAction) -> Result<Self, IllegalTransition> {
        let target = action.target();
        if self == target {
            return Ok(self);
        }
        let legal = matches!(
            (self, target),
            (ReportStatus::Pending, ReportStatus::Resolved)
                | (ReportStatus::Pending, ReportStatus::Dismissed)
                | (ReportStatus::Resolved, ReportStatus::Pending)
                | (ReportStatus::Dismissed, ReportStatus::Pending)
        );
        if legal {
            Ok(target)
        } else {
            Err(IllegalTransition {
                from: self.as_str(),
                action: action.as_str(),
            })
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportAction {
    /// pending → resolved
    Resolve,
    /// pending → dismissed
    Dismiss,
    /// resolved/dismissed → pending
    Reopen,
}

impl ReportAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ReportAction::Resolve => "resolve",
            ReportAction::Dismiss => "dismiss",
            ReportAction::Reopen => "reopen",
        }
    }

    #[must_use]
    pub fn target(self) -> ReportStatus {
        match self {
            ReportAction::Resolve => ReportStatus::Resolved,
            ReportAction::Dismiss => ReportStatus::Dismissed,
            ReportAction::Reopen => ReportStatus::Pending,
        }
    }
}

/// Why a user filed a report against a brand entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportReason {
    IncorrectInfo,
    NotThai,
    Closed,
    Duplicate,
    Other,
}

impl ReportReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ReportReason::IncorrectInfo => "incorrect_info",
            ReportReason::NotThai => "not_thai",
            ReportReason::Closed => "closed",
            ReportReason::Duplicate => "duplicate",
            ReportReason::Other => "other",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "incorrect_info" => Some(ReportReason::IncorrectInfo),
            "not_thai" => Some(ReportReason::NotThai),
            "closed" => Some(ReportReason::Closed),
            "duplicate" => Some(ReportReason::Duplicate),
            "other" => Some(ReportReason::Other),
            _ => None,
        }
    }

    #[must_use]
    pub fn label_en(self) -> &'static str {
        match self {
            ReportReason::IncorrectInfo => "Incorrect information",
            ReportReason::NotThai => "Not actually Thai-owned",
            ReportReason::Closed => "Business has closed",
            ReportReason::Duplicate => "Duplicate listing",
            ReportReason::Other => "Other",
        }
    }

    #[must_use]
    pub fn label_km(self) -> &'static str {
        match self {
            ReportReason::IncorrectInfo => "ព័ត៌មានមិនត្រឹមត្រូវ",
            ReportReason::NotThai => "មិនមែនជាកម្មសិទ្ធិថៃ",
            ReportReason::Closed => "អាជីវកម្មបានបិទ",
            ReportReason::Duplicate => "ការចុះបញ្ជីស្ទួន",
            ReportReason::Other => "ផ្សេងៗ",
        }
    }
}

impl std::fmt::Display for ReportReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The requested workflow edge does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {action} a {from} record")]
pub struct IllegalTransition {
    pub from: &'static str,
    pub action: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_reaches_only_approved_and_rejected() {
        let pending = SubmissionStatus::Pending;
        assert_eq!(
            pending.apply(SubmissionAction::Approve),
            Ok(SubmissionStatus::Approved)
        );
        assert_eq!(
            pending.apply(SubmissionAction::Reject),
            Ok(SubmissionStatus::Rejected)
        );
        // restore/reevaluate target pending itself: idempotent no-ops
        assert_eq!(
            pending.apply(SubmissionAction::Restore),
            Ok(SubmissionStatus::Pending)
        );
        assert_eq!(
            pending.apply(SubmissionAction::Reevaluate),
            Ok(SubmissionStatus::Pending)
        );
    }

    #[test]
    fn approved_and_rejected_only_return_to_pending() {
        assert_eq!(
            SubmissionStatus::Approved.apply(SubmissionAction::Reevaluate),
            Ok(SubmissionStatus::Pending)
        );
        assert_eq!(
            SubmissionStatus::Rejected.apply(SubmissionAction::Restore),
            Ok(SubmissionStatus::Pending)
        );
        assert!(SubmissionStatus::Approved
            .apply(SubmissionAction::Reject)
            .is_err());
        assert!(SubmissionStatus::Rejected
            .apply(SubmissionAction::Approve)
            .is_err());
    }

    #[test]
    fn repeated_action_is_idempotent_not_an_error() {
        let approved = SubmissionStatus::Pending
            .apply(SubmissionAction::Approve)
            .expect("first approve");
        assert_eq!(approved.apply(SubmissionAction::Approve), Ok(approved));
    }

    #[test]
    fn report_transitions_follow_the_table() {
        assert_eq!(
            ReportStatus::Pending.apply(ReportAction::Resolve),
            Ok(ReportStatus::Resolved)
        );
        assert_eq!(
            ReportStatus::Pending.apply(ReportAction::Dismiss),
            Ok(ReportStatus::Dismissed)
        );
        assert_eq!(
            ReportStatus::Resolved.apply(ReportAction::Reopen),
            Ok(ReportStatus::Pending)
        );
        assert_eq!(
            ReportStatus::Dismissed.apply(ReportAction::Reopen),
            Ok(ReportStatus::Pending)
        );
        assert!(ReportStatus::Resolved.apply(ReportAction::Dismiss).is_err());
        assert!(ReportStatus::Dismissed.apply(ReportAction::Resolve).is_err());
    }

    #[test]
    fn statuses_serialize_to_wire_strings() {
        assert_eq!(
            serde_json::to_string(&SubmissionStatus::Pending).expect("serialize"),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&ReportStatus::Dismissed).expect("serialize"),
            "\"dismissed\""
        );
        assert_eq!(
            serde_json::to_string(&ReportReason::IncorrectInfo).expect("serialize"),
            "\"incorrect_info\""
        );
    }

    #[test]
    fn status_parse_rejects_unknown_values() {
        assert_eq!(SubmissionStatus::parse("approved"), Some(SubmissionStatus::Approved));
        assert_eq!(SubmissionStatus::parse("archived"), None);
        assert_eq!(ReportStatus::parse("resolved"), Some(ReportStatus::Resolved));
        assert_eq!(ReportStatus::parse(""), None);
    }

    #[test]
    fn brand_submission_uses_legacy_field_names_on_the_wire() {
        let brand = BrandSubmission {
            id: "b1".to_owned(),
            name: "Thai Tea Express".to_owned(),
            category: Category::CafesRestaurants,
            purpose: "Bubble Tea Franchise".to_owned(),
            purpose_km: String::new(),
            location: "Phnom Penh".to_owned(),
            location_km: String::new(),
            website: "https://example.com".to_owned(),
            description: String::new(),
            description_km: String::new(),
            image_url: None,
            evidence_url: None,
            status: SubmissionStatus::Pending,
            submitted_by: "user@example.com".to_owned(),
            submitted_at: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&brand).expect("serialize");
        assert!(json.get("submissionDate").is_some());
        assert!(json.get("purposeKm").is_some());
        assert!(json.get("submittedBy").is_some());
    }
}
