//! Intake validation and normalization for user-entered records.
//!
//! Validation happens entirely before anything touches a store: missing
//! required fields are reported together, blank Khmer halves of the
//! bilingual pairs are filled from the base language, and user-typed URLs
//! are never passed through without a scheme.

use serde::Deserialize;
use thiserror::Error;

use crate::category::Category;
use crate::domain::{
    BrandSubmission, NewReport, NewSubmission, ReportReason, ReportStatus, SubmissionEdit,
    SubmissionStatus,
};

/// Raw brand-submission form data, prior to validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: Option<Category>,
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
    pub image_url: String,
    #[serde(default)]
    pub evidence_url: String,
}

/// Raw report form data, prior to validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDraft {
    #[serde(default)]
    pub reason: Option<ReportReason>,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub email: String,
}

/// One or more required fields were missing or blank. Never sent to a
/// store; surfaced inline to the submitting user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required field(s): {}", missing.join(", "))]
pub struct ValidationError {
    pub missing: Vec<&'static str>,
}

/// Prefix scheme-less URLs with `https://` so user-typed values are safe to
/// use as link targets. Blank input stays blank.
#[must_use]
pub fn ensure_https_scheme(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.contains("://") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    }
}

/// Validate an end-user brand submission and normalize it into a record
/// ready for insertion. New public submissions always start pending.
///
/// # Errors
///
/// Returns [`ValidationError`] naming every blank required field.
pub fn validate_brand_draft(
    draft: &BrandDraft,
    submitted_by: &str,
) -> Result<NewSubmission, ValidationError> {
    let mut missing = Vec::new();
    if draft.name.trim().is_empty() {
        missing.push("name");
    }
    if draft.category.is_none() {
        missing.push("category");
    }
    if draft.purpose.trim().is_empty() {
        missing.push("purpose");
    }
    if draft.location.trim().is_empty() {
        missing.push("location");
    }
    if !missing.is_empty() {
        return Err(ValidationError { missing });
    }

    let purpose = draft.purpose.trim().to_owned();
    let location = draft.location.trim().to_owned();
    let description = draft.description.trim().to_owned();

    Ok(NewSubmission {
        name: draft.name.trim().to_owned(),
        category: draft.category.unwrap_or_default(),
        purpose_km: default_locale_pair(&draft.purpose_km, &purpose),
        purpose,
        location_km: default_locale_pair(&draft.location_km, &location),
        location,
        website: ensure_https_scheme(&draft.website),
        description_km: default_locale_pair(&draft.description_km, &description),
        description,
        image_url: blank_to_none(&draft.image_url),
        evidence_url: blank_to_none(&ensure_https_scheme(&draft.evidence_url)),
        status: SubmissionStatus::Pending,
        submitted_by: if submitted_by.trim().is_empty() {
            "Anonymous".to_owned()
        } else {
            submitted_by.trim().to_owned()
        },
    })
}

/// Validate a report draft against the brand it targets. The brand's name
/// and image are copied into the report as a snapshot so it stays readable
/// if the brand is later edited or deleted.
///
/// # Errors
///
/// Returns [`ValidationError`] naming every blank required field.
pub fn validate_report_draft(
    draft: &ReportDraft,
    brand: &BrandSubmission,
) -> Result<NewReport, ValidationError> {
    let mut missing = Vec::new();
    if draft.reason.is_none() {
        missing.push("reason");
    }
    if draft.details.trim().is_empty() {
        missing.push("details");
    }
    if !missing.is_empty() {
        return Err(ValidationError { missing });
    }

    Ok(NewReport {
        brand_id: brand.id.clone(),
        brand_name: brand.name.clone(),
        brand_image: brand.image_url.clone(),
        reason: draft.reason.unwrap_or(ReportReason::Other),
        details: draft.details.trim().to_owned(),
        email: blank_to_none(&draft.email),
        status: ReportStatus::Pending,
    })
}

/// Validate an admin create/edit form. The dashboard only requires name and
/// category; everything else may stay blank. URLs are normalized the same
/// way as public intake.
///
/// # Errors
///
/// Returns [`ValidationError`] naming every blank required field.
pub fn validate_submission_edit(edit: &SubmissionEdit) -> Result<SubmissionEdit, ValidationError> {
    if edit.name.trim().is_empty() {
        return Err(ValidationError {
            missing: vec!["name"],
        });
    }
    let mut normalized = edit.clone();
    normalized.name = edit.name.trim().to_owned();
    normalized.website = ensure_https_scheme(&edit.website);
    normalized.evidence_url = edit
        .evidence_url
        .as_deref()
        .map(ensure_https_scheme)
        .filter(|url| !url.is_empty());
    Ok(normalized)
}

fn default_locale_pair(localized: &str, base: &str) -> String {
    let trimmed = localized.trim();
    if trimmed.is_empty() {
        base.to_owned()
    } else {
        trimmed.to_owned()
    }
}

fn blank_to_none(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}
