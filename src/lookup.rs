//! Display-value to model-code translation tables.
//!
//! The classifier was trained on raw dataset codes (`grocery_pos`, `CA`, `M`),
//! while the form offers human-readable choices. Tables keep the form's
//! display order so the same constants drive both rendering and translation.

use crate::error::{FormError, Result};
use std::collections::HashMap;

/// Category choices as (display value, model code), in form order.
pub const CATEGORY_CHOICES: [(&str, &str); 13] = [
    ("Food & Dining", "food_dining"),
    ("Grocery (POS)", "grocery_pos"),
    ("Grocery (Net)", "grocery_net"),
    ("Miscellaneous (POS)", "misc_pos"),
    ("Miscellaneous (Net)", "misc_net"),
    ("Shopping (POS)", "shopping_pos"),
    ("Shopping (Net)", "shopping_net"),
    ("Gas & Transport", "gas_transport"),
    ("Travel", "travel"),
    ("Personal Care", "personal_care"),
    ("Health & Fitness", "health_fitness"),
    ("Home", "home"),
    ("Kids & Pets", "kids_pets"),
];

/// State choices as (display value, postal code), in form order.
pub const STATE_CHOICES: [(&str, &str); 48] = [
    ("Alabama", "AL"),
    ("Alaska", "AK"),
    ("Arizona", "AZ"),
    ("Arkansas", "AR"),
    ("California", "CA"),
    ("Colorado", "CO"),
    ("Connecticut", "CT"),
    ("District of Columbia", "DC"),
    ("Florida", "FL"),
    ("Georgia", "GA"),
    ("Hawaii", "HI"),
    ("Iowa", "IA"),
    ("Idaho", "ID"),
    ("Illinois", "IL"),
    ("Indiana", "IN"),
    ("Kansas", "KS"),
    ("Kentucky", "KY"),
    ("Louisiana", "LA"),
    ("Massachusetts", "MA"),
    ("Maryland", "MD"),
    ("Michigan", "MI"),
    ("Minnesota", "MN"),
    ("Missouri", "MO"),
    ("Mississippi", "MS"),
    ("Montana", "MT"),
    ("North Carolina", "NC"),
    ("North Dakota", "ND"),
    ("Nebraska", "NE"),
    ("New Jersey", "NJ"),
    ("New Mexico", "NM"),
    ("Nevada", "NV"),
    ("New York", "NY"),
    ("Ohio", "OH"),
    ("Oklahoma", "OK"),
    ("Oregon", "OR"),
    ("Pennsylvania", "PA"),
    ("Rhode Island", "RI"),
    ("South Carolina", "SC"),
    ("South Dakota", "SD"),
    ("Tennessee", "TN"),
    ("Texas", "TX"),
    ("Utah", "UT"),
    ("Virginia", "VA"),
    ("Vermont", "VT"),
    ("Washington", "WA"),
    ("Wisconsin", "WI"),
    ("West Virginia", "WV"),
    ("Wyoming", "WY"),
];

/// Gender choices in form order.
pub const GENDER_CHOICES: [&str; 2] = ["Male", "Female"];

/// Read-only translation tables, built once at startup and shared.
#[derive(Debug, Clone)]
pub struct LookupTables {
    categories: HashMap<&'static str, &'static str>,
    states: HashMap<&'static str, &'static str>,
}

impl LookupTables {
    pub fn new() -> Self {
        Self {
            categories: CATEGORY_CHOICES.iter().copied().collect(),
            states: STATE_CHOICES.iter().copied().collect(),
        }
    }

    /// Translate a category display value into its model code.
    pub fn category_code(&self, display: &str) -> Result<&'static str> {
        self.categories
            .get(display)
            .copied()
            .ok_or_else(|| FormError::UnknownCategory(display.to_string()))
    }

    /// Translate a state display value into its two-letter code.
    pub fn state_code(&self, display: &str) -> Result<&'static str> {
        self.states
            .get(display)
            .copied()
            .ok_or_else(|| FormError::UnknownState(display.to_string()))
    }

    /// Translate a gender display value.
    ///
    /// Only "Male" is matched explicitly; every other value maps to "F".
    /// A display value outside [`GENDER_CHOICES`] is therefore not rejected.
    pub fn gender_code(&self, display: &str) -> &'static str {
        if display == "Male" {
            "M"
        } else {
            "F"
        }
    }

    pub fn category_choices(&self) -> impl Iterator<Item = &'static str> {
        CATEGORY_CHOICES.iter().map(|(display, _)| *display)
    }

    pub fn state_choices(&self) -> impl Iterator<Item = &'static str> {
        STATE_CHOICES.iter().map(|(display, _)| *display)
    }

    pub fn gender_choices(&self) -> impl Iterator<Item = &'static str> {
        GENDER_CHOICES.iter().copied()
    }
}

impl Default for LookupTables {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_category_translates() {
        let tables = LookupTables::new();
        let codes: HashSet<&str> = tables
            .category_choices()
            .map(|display| tables.category_code(display).unwrap())
            .collect();
        assert_eq!(codes.len(), CATEGORY_CHOICES.len());
        assert_eq!(tables.category_code("Food & Dining").unwrap(), "food_dining");
        assert_eq!(tables.category_code("Grocery (POS)").unwrap(), "grocery_pos");
    }

    #[test]
    fn test_every_state_translates() {
        let tables = LookupTables::new();
        let codes: HashSet<&str> = tables
            .state_choices()
            .map(|display| tables.state_code(display).unwrap())
            .collect();
        assert_eq!(codes.len(), STATE_CHOICES.len());
        assert!(codes.iter().all(|code| code.len() == 2));
        assert_eq!(tables.state_code("California").unwrap(), "CA");
        assert_eq!(tables.state_code("District of Columbia").unwrap(), "DC");
    }

    #[test]
    fn test_unknown_values_fail() {
        let tables = LookupTables::new();
        assert!(matches!(
            tables.category_code("food_dining"),
            Err(FormError::UnknownCategory(v)) if v == "food_dining"
        ));
        assert!(matches!(
            tables.state_code("Delaware"),
            Err(FormError::UnknownState(v)) if v == "Delaware"
        ));
    }

    #[test]
    fn test_gender_mapping_is_permissive() {
        let tables = LookupTables::new();
        assert_eq!(tables.gender_code("Male"), "M");
        assert_eq!(tables.gender_code("Female"), "F");
        // Anything that is not exactly "Male" falls through to "F".
        assert_eq!(tables.gender_code("male"), "F");
        assert_eq!(tables.gender_code("Other"), "F");
        assert_eq!(tables.gender_code(""), "F");
    }

    #[test]
    fn test_choices_keep_form_order() {
        let tables = LookupTables::new();
        assert_eq!(tables.category_choices().next(), Some("Food & Dining"));
        assert_eq!(tables.state_choices().last(), Some("Wyoming"));
        assert_eq!(tables.gender_choices().collect::<Vec<_>>(), ["Male", "Female"]);
    }
}
