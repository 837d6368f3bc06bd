//! Bundled seed catalog for fallback/offline mode.
//!
//! A YAML file of approved listings, validated at load time so a bad edit
//! fails startup rather than rendering a broken public page.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use blcdb_core::{BrandSubmission, Category, SubmissionStatus};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed catalog at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse seed catalog: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid seed catalog: {0}")]
    Validation(String),
}

#[derive(Debug, Deserialize)]
struct SeedFile {
    brands: Vec<SeedBrand>,
}

#[derive(Debug, Deserialize)]
struct SeedBrand {
    id: String,
    name: String,
    category: Category,
    purpose: String,
    #[serde(default)]
    purpose_km: String,
    location: String,
    #[serde(default)]
    location_km: String,
    #[serde(default)]
    website: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    description_km: String,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    evidence_url: Option<String>,
    submitted_at: DateTime<Utc>,
}

/// Load and validate the seed catalog. Every entry becomes an approved
/// listing attributed to the seed import.
///
/// # Errors
///
/// Returns `SeedError` if the file cannot be read, parsed, or fails
/// validation.
pub fn load_seed_catalog(path: &Path) -> Result<Vec<BrandSubmission>, SeedError> {
    let content = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let file: SeedFile = serde_yaml::from_str(&content)?;
    validate(&file)?;

    Ok(file
        .brands
        .into_iter()
        .map(|brand| BrandSubmission {
            id: brand.id,
            name: brand.name,
            category: brand.category,
            purpose: brand.purpose,
            purpose_km: brand.purpose_km,
            location: brand.location,
            location_km: brand.location_km,
            website: brand.website,
            description: brand.description,
            description_km: brand.description_km,
            image_url: brand.image_url,
            evidence_url: brand.evidence_url,
            status: SubmissionStatus::Approved,
            submitted_by: "seed".to_owned(),
            submitted_at: brand.submitted_at,
        })
        .collect())
}

fn validate(file: &SeedFile) -> Result<(), SeedError> {
    let mut seen_ids = HashSet::new();
    let mut seen_names = HashSet::new();
    for brand in &file.brands {
        if brand.id.trim().is_empty() {
            return Err(SeedError::Validation("seed id must be non-empty".to_owned()));
        }
        if brand.name.trim().is_empty() {
            return Err(SeedError::Validation(
                "seed brand name must be non-empty".to_owned(),
            ));
        }
        if !seen_ids.insert(brand.id.clone()) {
            return Err(SeedError::Validation(format!(
                "duplicate seed id: '{}'",
                brand.id
            )));
        }
        if !seen_names.insert(brand.name.to_lowercase()) {
            return Err(SeedError::Validation(format!(
                "duplicate seed brand name: '{}'",
                brand.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_catalog_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("config")
            .join("seed_brands.yaml");
        assert!(
            path.exists(),
            "seed_brands.yaml missing at {path:?} — required for fallback mode"
        );
        let brands = load_seed_catalog(&path).expect("seed catalog loads");
        assert!(!brands.is_empty());
        assert!(brands
            .iter()
            .all(|b| b.status == SubmissionStatus::Approved));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let yaml = r#"
brands:
  - id: seed-1
    name: Thai Tea Express
    category: "Cafés & Restaurants"
    purpose: Tea
    location: Phnom Penh
    submitted_at: 2025-06-01T00:00:00Z
  - id: seed-2
    name: thai tea express
    category: "Cafés & Restaurants"
    purpose: Tea
    location: Siem Reap
    submitted_at: 2025-06-01T00:00:00Z
"#;
        let file: SeedFile = serde_yaml::from_str(yaml).expect("parse");
        let err = validate(&file).expect_err("duplicates must fail");
        assert!(err.to_string().contains("duplicate seed brand name"));
    }

    #[test]
    fn unknown_category_fails_parse() {
        let yaml = r#"
brands:
  - id: seed-1
    name: Mystery Shop
    category: "Space Tourism"
    purpose: Unknown
    location: Phnom Penh
    submitted_at: 2025-06-01T00:00:00Z
"#;
        serde_yaml::from_str::<SeedFile>(yaml).expect_err("unknown categories must not parse");
    }
}
