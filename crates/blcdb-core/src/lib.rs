//! Domain core for the boycott-list directory: entity types, moderation
//! transition tables, the listing filter/sort engine, intake validation, and
//! locale-aware display projection. Everything in this crate is pure — no
//! I/O, no clocks, no globals.

pub mod app_config;
pub mod auth;
pub mod category;
pub mod config;
pub mod domain;
pub mod filter;
pub mod intake;
pub mod projection;

pub use app_config::{AppConfig, Environment, StoreBackend};
pub use auth::{can_access_admin, AuthSession, Role};
pub use category::Category;
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use domain::{
    BrandSubmission, IllegalTransition, IssueReport, NewReport, NewSubmission, ReportAction,
    ReportReason, ReportStatus, SubmissionAction, SubmissionEdit, SubmissionStatus,
};
pub use filter::{filter_reports, filter_submissions, ReportQuery, SortOrder, SubmissionQuery};
pub use intake::{
    ensure_https_scheme, validate_brand_draft, validate_report_draft, validate_submission_edit,
    BrandDraft, ReportDraft, ValidationError,
};
pub use projection::{DisplayBrand, Locale};
