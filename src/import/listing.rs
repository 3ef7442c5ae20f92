//! MLS listing model.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// A property listing as delivered by an MLS feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Listing {
    pub mls_number: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub price: Option<f64>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<f32>,
    pub square_feet: Option<u32>,
    pub property_type: Option<String>,
    pub status: Option<String>,
    pub photos: Vec<String>,
    pub description: Option<String>,
    pub features: Vec<String>,
}

impl Listing {
    pub fn new(mls_number: impl Into<String>) -> Self {
        Self {
            mls_number: mls_number.into(),
            ..Default::default()
        }
    }

    /// Reject listings that can never be imported, however often retried.
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.mls_number.trim().is_empty() {
            return Err(ServiceError::Validation("MLS number is required".to_string()));
        }
        if let Some(price) = self.price {
            if !price.is_finite() || price < 0.0 {
                return Err(ServiceError::Validation(format!("invalid price {}", price)));
            }
        }
        Ok(())
    }
}

/// Parse a JSON array of listings.
pub fn parse_listings(json: &str) -> Result<Vec<Listing>, ServiceError> {
    Ok(serde_json::from_str(json)?)
}

/// Read a JSON array of listings from disk.
pub async fn load_listings(path: &Path) -> Result<Vec<Listing>, ServiceError> {
    let content = tokio::fs::read_to_string(path).await?;
    parse_listings(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_camel_case_feed() {
        let listings = parse_listings(
            r#"[
                {"mlsNumber": "A100", "address": "1 Main St", "price": 450000, "bedrooms": 3},
                {"mlsNumber": "A101", "zipCode": "98101", "photos": ["a.jpg"]}
            ]"#,
        )
        .unwrap();

        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].price, Some(450000.0));
        assert_eq!(listings[1].zip_code, "98101");
        assert_eq!(listings[1].photos, vec!["a.jpg".to_string()]);
    }

    #[test]
    fn test_validate() {
        assert!(Listing::new("A1").validate().is_ok());
        assert!(matches!(Listing::new("  ").validate(), Err(ServiceError::Validation(_))));

        let mut listing = Listing::new("A2");
        listing.price = Some(-1.0);
        assert!(listing.validate().is_err());
    }

    #[test]
    fn test_parse_rejects_non_array() {
        assert!(matches!(parse_listings("{}"), Err(ServiceError::Serialization(_))));
    }
}
