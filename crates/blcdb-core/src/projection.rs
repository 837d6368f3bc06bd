//! Locale-aware display projection.
//!
//! Maps a stored record into the shape the listing and detail surfaces
//! render: bilingual fields resolved for the active locale (with fallback
//! to the base language), the category label localized, and an explicit
//! `has_image` flag so renderers never have to infer it from an empty
//! string.

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::domain::{BrandSubmission, SubmissionStatus};
use crate::intake::ensure_https_scheme;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Km,
}

impl Locale {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "en" => Some(Locale::En),
            "km" => Some(Locale::Km),
            _ => None,
        }
    }
}

/// Display-ready view of one brand for a given locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayBrand {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub category_label: String,
    pub purpose: String,
    pub location: String,
    pub description: String,
    pub website: Option<String>,
    pub has_image: bool,
    pub image_url: Option<String>,
    pub evidence_url: Option<String>,
    pub status: SubmissionStatus,
}

impl DisplayBrand {
    #[must_use]
    pub fn project(record: &BrandSubmission, locale: Locale) -> Self {
        let category_label = match locale {
            Locale::En => record.category.label_en().to_owned(),
            Locale::Km => record.category.label_km().to_owned(),
        };
        let image_url = record
            .image_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(ToOwned::to_owned);
        DisplayBrand {
            id: record.id.clone(),
            name: record.name.clone(),
            category: record.category,
            category_label,
            purpose: pick_localized(&record.purpose, &record.purpose_km, locale).to_owned(),
            location: pick_localized(&record.location, &record.location_km, locale).to_owned(),
            description: pick_localized(&record.description, &record.description_km, locale)
                .to_owned(),
            website: linkable_url(&record.website),
            has_image: image_url.is_some(),
            image_url,
            evidence_url: record.evidence_url.as_deref().and_then(|url| {
                let link = ensure_https_scheme(url);
                if link.is_empty() {
                    None
                } else {
                    Some(link)
                }
            }),
            status: record.status,
        }
    }
}

/// Select the localized half of a bilingual pair, falling back to the base
/// language when the localized value is blank.
#[must_use]
pub fn pick_localized<'a>(base: &'a str, localized: &'a str, locale: Locale) -> &'a str {
    match locale {
        Locale::Km if !localized.trim().is_empty() => localized,
        _ => base,
    }
}

fn linkable_url(raw: &str) -> Option<String> {
    let link = ensure_https_scheme(raw);
    if link.is_empty() {
        None
    } else {
        Some(link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brand() -> BrandSubmission {
        BrandSubmission {
            id: "b1".to_owned(),
            name: "Thai Tea Express".to_owned(),
            category: Category::CafesRestaurants,
            purpose: "Bubble Tea Franchise".to_owned(),
            purpose_km: String::new(),
            location: "Phnom Penh".to_owned(),
            location_km: "ភ្នំពេញ".to_owned(),
            website: "thaitea.example.com".to_owned(),
            description: "Franchise of a Bangkok chain".to_owned(),
            description_km: String::new(),
            image_url: None,
            evidence_url: Some("evidence.example.com/article".to_owned()),
            status: SubmissionStatus::Approved,
            submitted_by: "seed".to_owned(),
            submitted_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn khmer_locale_falls_back_when_the_pair_is_blank() {
        let view = DisplayBrand::project(&brand(), Locale::Km);
        // purpose_km is blank: fall back to English
        assert_eq!(view.purpose, "Bubble Tea Franchise");
        // location_km is populated: use it
        assert_eq!(view.location, "ភ្នំពេញ");
    }

    #[test]
    fn khmer_pair_is_used_when_present() {
        let mut record = brand();
        record.purpose_km = "ហាងកាហ្វេ".to_owned();
        let view = DisplayBrand::project(&record, Locale::Km);
        assert_eq!(view.purpose, "ហាងកាហ្វេ");
    }

    #[test]
    fn english_locale_always_uses_the_base_fields() {
        let mut record = brand();
        record.purpose_km = "ហាងកាហ្វេ".to_owned();
        let view = DisplayBrand::project(&record, Locale::En);
        assert_eq!(view.purpose, "Bubble Tea Franchise");
        assert_eq!(view.category_label, "Cafés & Restaurants");
    }

    #[test]
    fn category_label_is_localized() {
        let view = DisplayBrand::project(&brand(), Locale::Km);
        assert_eq!(view.category_label, Category::CafesRestaurants.label_km());
    }

    #[test]
    fn has_image_is_explicit() {
        let without = DisplayBrand::project(&brand(), Locale::En);
        assert!(!without.has_image);
        assert_eq!(without.image_url, None);

        let mut record = brand();
        record.image_url = Some("https://cdn.example.com/tea.jpg".to_owned());
        let with = DisplayBrand::project(&record, Locale::En);
        assert!(with.has_image);

        record.image_url = Some("   ".to_owned());
        let blank = DisplayBrand::project(&record, Locale::En);
        assert!(!blank.has_image, "whitespace-only URL is not an image");
    }

    #[test]
    fn urls_are_never_exposed_without_a_scheme() {
        let view = DisplayBrand::project(&brand(), Locale::En);
        assert_eq!(view.website.as_deref(), Some("https://thaitea.example.com"));
        assert_eq!(
            view.evidence_url.as_deref(),
            Some("https://evidence.example.com/article")
        );

        let mut record = brand();
        record.website = String::new();
        let no_site = DisplayBrand::project(&record, Locale::En);
        assert_eq!(no_site.website, None);
    }
}
