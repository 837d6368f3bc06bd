//! Pure listing projection: search, category/status filters, and ordering.
//!
//! Both the public listing and the admin dashboard run their views through
//! these functions, so the matching rules stay identical across surfaces.

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::domain::{BrandSubmission, IssueReport, ReportStatus, SubmissionStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

/// Listing parameters for brand submissions. `None` filters act as the
/// "all" sentinel.
#[derive(Debug, Clone, Default)]
pub struct SubmissionQuery {
    pub search: String,
    pub category: Option<Category>,
    pub status: Option<SubmissionStatus>,
    pub sort: SortOrder,
}

/// Listing parameters for issue reports.
#[derive(Debug, Clone, Default)]
pub struct ReportQuery {
    pub search: String,
    pub status: Option<ReportStatus>,
    pub sort: SortOrder,
}

/// Filter and order brand submissions. Pure: the input slice is never
/// mutated, and identical inputs produce identical output. Sorting is
/// stable, so records with equal timestamps keep their original relative
/// order.
#[must_use]
pub fn filter_submissions(
    records: &[BrandSubmission],
    query: &SubmissionQuery,
) -> Vec<BrandSubmission> {
    let needle = query.search.trim().to_lowercase();
    let mut matched: Vec<BrandSubmission> = records
        .iter()
        .filter(|record| {
            let matches_search = needle.is_empty()
                || contains_ci(&record.name, &needle)
                || contains_ci(&record.purpose, &needle)
                || contains_ci(&record.description, &needle);
            let matches_category = query.category.is_none_or(|c| record.category == c);
            let matches_status = query.status.is_none_or(|s| record.status == s);
            matches_search && matches_category && matches_status
        })
        .cloned()
        .collect();
    sort_by_timestamp(&mut matched, query.sort, |record| record.submitted_at);
    matched
}

/// Filter and order issue reports; same purity and stability guarantees as
/// [`filter_submissions`].
#[must_use]
pub fn filter_reports(records: &[IssueReport], query: &ReportQuery) -> Vec<IssueReport> {
    let needle = query.search.trim().to_lowercase();
    let mut matched: Vec<IssueReport> = records
        .iter()
        .filter(|record| {
            let matches_search = needle.is_empty()
                || contains_ci(&record.brand_name, &needle)
                || contains_ci(record.reason.as_str(), &needle)
                || contains_ci(&record.details, &needle);
            let matches_status = query.status.is_none_or(|s| record.status == s);
            matches_search && matches_status
        })
        .cloned()
        .collect();
    sort_by_timestamp(&mut matched, query.sort, |record| record.submitted_at);
    matched
}

fn contains_ci(haystack: &str, lowercase_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowercase_needle)
}

fn sort_by_timestamp<T, F>(records: &mut [T], order: SortOrder, timestamp: F)
where
    F: Fn(&T) -> chrono::DateTime<chrono::Utc>,
{
    match order {
        SortOrder::Newest => records.sort_by(|a, b| timestamp(b).cmp(&timestamp(a))),
        SortOrder::Oldest => records.sort_by(|a, b| timestamp(a).cmp(&timestamp(b))),
    }
}
