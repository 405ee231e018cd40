//! Product categories an order can contain.

use serde::{Deserialize, Serialize};

/// The category of product a fulfillment item requests.
///
/// Orderable so category sets iterate deterministically.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Flight,
    Taxi,
    Accommodation,
}

impl ProductCategory {
    /// All known categories.
    pub const ALL: [ProductCategory; 3] = [
        ProductCategory::Flight,
        ProductCategory::Taxi,
        ProductCategory::Accommodation,
    ];

    /// Returns the category name as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Flight => "flight",
            ProductCategory::Taxi => "taxi",
            ProductCategory::Accommodation => "accommodation",
        }
    }
}

impl std::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_wire_name() {
        assert_eq!(ProductCategory::Flight.to_string(), "flight");
        assert_eq!(ProductCategory::Taxi.to_string(), "taxi");
        assert_eq!(ProductCategory::Accommodation.to_string(), "accommodation");
    }

    #[test]
    fn serialization_uses_snake_case() {
        let json = serde_json::to_string(&ProductCategory::Accommodation).unwrap();
        assert_eq!(json, "\"accommodation\"");
        let back: ProductCategory = serde_json::from_str("\"taxi\"").unwrap();
        assert_eq!(back, ProductCategory::Taxi);
    }

    #[test]
    fn categories_are_ordered() {
        let mut cats = vec![ProductCategory::Accommodation, ProductCategory::Flight];
        cats.sort();
        assert_eq!(cats, vec![ProductCategory::Flight, ProductCategory::Accommodation]);
    }
}
