//! The closed set of business categories a listing can belong to.
//!
//! Categories are stored and transmitted as their English label strings
//! (e.g. `"Food & Beverage"`), which is also how the remote store persists
//! them. The Khmer labels live here as a fixed lookup table so display code
//! never has to branch on locale data it does not own.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Agriculture & Farming")]
    Agriculture,
    #[serde(rename = "Manufacturing & Industrial")]
    Manufacturing,
    #[serde(rename = "Real Estate & Property")]
    RealEstate,
    #[serde(rename = "Construction & Materials")]
    Construction,
    #[serde(rename = "Energy & Fuel")]
    Energy,
    #[serde(rename = "Logistics & Transport")]
    Logistics,
    #[serde(rename = "Retail & Markets")]
    Retail,
    #[serde(rename = "Food & Beverage")]
    FoodBeverage,
    #[serde(rename = "Cafés & Restaurants")]
    CafesRestaurants,
    #[serde(rename = "Automotive")]
    Automotive,
    #[serde(rename = "Banking & Finance")]
    Finance,
    #[serde(rename = "Professional Services")]
    ProfessionalServices,
    #[serde(rename = "Electronics & Tech")]
    Electronics,
    #[serde(rename = "Media & Communications")]
    Media,
    #[serde(rename = "Education & Training")]
    Education,
    #[serde(rename = "Healthcare & Pharmacy")]
    Healthcare,
    #[serde(rename = "Cosmetics & Personal Care")]
    Cosmetics,
    #[serde(rename = "Fashion & Apparel")]
    Fashion,
    #[serde(rename = "Hospitality & Tourism")]
    Hospitality,
    #[serde(rename = "Entertainment & Leisure")]
    Entertainment,
    #[serde(rename = "Household & Office Supplies")]
    HouseholdOffice,
}

impl Category {
    pub const ALL: [Category; 21] = [
        Category::Agriculture,
        Category::Manufacturing,
        Category::RealEstate,
        Category::Construction,
        Category::Energy,
        Category::Logistics,
        Category::Retail,
        Category::FoodBeverage,
        Category::CafesRestaurants,
        Category::Automotive,
        Category::Finance,
        Category::ProfessionalServices,
        Category::Electronics,
        Category::Media,
        Category::Education,
        Category::Healthcare,
        Category::Cosmetics,
        Category::Fashion,
        Category::Hospitality,
        Category::Entertainment,
        Category::HouseholdOffice,
    ];

    /// English label, identical to the stored wire value.
    #[must_use]
    pub fn label_en(self) -> &'static str {
        match self {
            Category::Agriculture => "Agriculture & Farming",
            Category::Manufacturing => "Manufacturing & Industrial",
            Category::RealEstate => "Real Estate & Property",
            Category::Construction => "Construction & Materials",
            Category::Energy => "Energy & Fuel",
            Category::Logistics => "Logistics & Transport",
            Category::Retail => "Retail & Markets",
            Category::FoodBeverage => "Food & Beverage",
            Category::CafesRestaurants => "Cafés & Restaurants",
            Category::Automotive => "Automotive",
            Category::Finance => "Banking & Finance",
            Category::ProfessionalServices => "Professional Services",
            Category::Electronics => "Electronics & Tech",
            Category::Media => "Media & Communications",
            Category::Education => "Education & Training",
            Category::Healthcare => "Healthcare & Pharmacy",
            Category::Cosmetics => "Cosmetics & Personal Care",
            Category::Fashion => "Fashion & Apparel",
            Category::Hospitality => "Hospitality & Tourism",
            Category::Entertainment => "Entertainment & Leisure",
            Category::HouseholdOffice => "Household & Office Supplies",
        }
    }

    /// Khmer label for the public listing.
    #[must_use]
    pub fn label_km(self) -> &'static str {
        match self {
            Category::Agriculture => "កសិកម្ម និងការដាំដុះ",
            Category::Manufacturing => "ផលិតកម្ម និងឧស្សាហកម្ម",
            Category::RealEstate => "អចលនទ្រព្យ",
            Category::Construction => "សំណង់ និងសម្ភារៈ",
            Category::Energy => "ថាមពល និងឥន្ធនៈ",
            Category::Logistics => "ដឹកជញ្ជូន និងការដឹកអីវ៉ាន់",
            Category::Retail => "លក់រាយ និងផ្សារ",
            Category::FoodBeverage => "ម្ហូបអាហារ និងភេសជ្ជៈ",
            Category::CafesRestaurants => "ហាងកាហ្វេ និងភោជនីយដ្ឋាន",
            Category::Automotive => "យានយន្ត",
            Category::Finance => "ធនាគារ និងហិរញ្ញវត្ថុ",
            Category::ProfessionalServices => "សេវាកម្មវិជ្ជាជីវៈ",
            Category::Electronics => "អេឡិចត្រូនិក និងបច្ចេកវិទ្យា",
            Category::Media => "ប្រព័ន្ធផ្សព្វផ្សាយ និងទំនាក់ទំនង",
            Category::Education => "ការអប់រំ និងបណ្តុះបណ្តាល",
            Category::Healthcare => "សុខាភិបាល និងឱសថស្ថាន",
            Category::Cosmetics => "គ្រឿងសំអាង និងការថែទាំខ្លួន",
            Category::Fashion => "ម៉ូដ និងសំលៀកបំពាក់",
            Category::Hospitality => "បដិសណ្ឋារកិច្ច និងទេសចរណ៍",
            Category::Entertainment => "កម្សាន្ត និងការលំហែ",
            Category::HouseholdOffice => "គ្រឿងប្រើប្រាស់ផ្ទះ និងការិយាល័យ",
        }
    }

    /// Parse a stored label back into the enum. Returns `None` for labels
    /// outside the closed set.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Category::ALL.into_iter().find(|c| c.label_en() == label)
    }

    /// Lenient parse for data read back from a store: unrecognized labels
    /// resolve to the default category instead of failing the whole row.
    #[must_use]
    pub fn from_label_or_default(label: &str) -> Self {
        Self::from_label(label).unwrap_or_default()
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Retail
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label_en())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_from_label() {
        for category in Category::ALL {
            assert_eq!(Category::from_label(category.label_en()), Some(category));
        }
    }

    #[test]
    fn serde_uses_label_strings() {
        let json = serde_json::to_string(&Category::CafesRestaurants).expect("serialize");
        assert_eq!(json, "\"Cafés & Restaurants\"");
        let parsed: Category = serde_json::from_str("\"Food & Beverage\"").expect("deserialize");
        assert_eq!(parsed, Category::FoodBeverage);
    }

    #[test]
    fn unknown_label_resolves_to_default() {
        assert_eq!(Category::from_label("Space Tourism"), None);
        assert_eq!(
            Category::from_label_or_default("Space Tourism"),
            Category::Retail
        );
    }

    #[test]
    fn every_category_has_a_khmer_label() {
        for category in Category::ALL {
            assert!(!category.label_km().is_empty());
        }
    }
}
