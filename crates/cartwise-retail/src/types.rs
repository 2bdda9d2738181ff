//! Wire types for the retail partner catalog, loyalty, and cart APIs.
//!
//! The partner wraps every list response in a `{ "data": [...] }` envelope;
//! product price data lives on `items[n].price.{regular, promo}`. Fields the
//! aggregation pipeline does not read are left out rather than mirrored.

use serde::{Deserialize, Serialize};

/// The partner's standard list envelope.
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Single-object envelope, used by the identity endpoint.
#[derive(Debug, Deserialize)]
pub struct ObjectEnvelope<T> {
    pub data: T,
}

/// A store location returned by the locations-by-zip search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    pub location_id: String,
    pub name: String,
    pub chain: Option<String>,
    pub address: Option<LocationAddress>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationAddress {
    pub address_line1: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

/// A raw product record from the catalog search endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub product_id: String,
    pub description: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub items: Vec<ProductItem>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductItem {
    #[serde(default)]
    pub price: Option<ProductPrice>,
    #[serde(default)]
    pub size: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductPrice {
    #[serde(default)]
    pub regular: f64,
    #[serde(default)]
    pub promo: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    #[serde(default)]
    pub perspective: Option<String>,
    #[serde(default)]
    pub sizes: Vec<ImageSize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageSize {
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl ProductRecord {
    /// URL of the front-perspective medium image, falling back to the first
    /// image URL present.
    #[must_use]
    pub fn thumbnail_url(&self) -> Option<String> {
        let front = self
            .images
            .iter()
            .find(|img| img.perspective.as_deref() == Some("front"));
        let image = front.or_else(|| self.images.first())?;
        let medium = image
            .sizes
            .iter()
            .find(|s| s.size.as_deref() == Some("medium"));
        let size = medium.or_else(|| image.sizes.first())?;
        size.url.clone()
    }
}

/// A digital coupon from the loyalty endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponRecord {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub expiration_date: Option<String>,
}

/// One line in a cart-add request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub upc: String,
    pub quantity: u32,
}

/// The partner user identity, used as the session key.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityProfile {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_record_parses_nested_price_shape() {
        let json = serde_json::json!({
            "productId": "0001111041700",
            "description": "Whole Milk Gallon",
            "brand": "Simple Truth",
            "categories": ["Dairy"],
            "items": [
                { "price": { "regular": 4.00, "promo": 3.00 }, "size": "1 gal" }
            ],
            "images": [
                {
                    "perspective": "front",
                    "sizes": [
                        { "size": "medium", "url": "https://img.example.com/milk-m.jpg" },
                        { "size": "large", "url": "https://img.example.com/milk-l.jpg" }
                    ]
                }
            ]
        });
        let record: ProductRecord = serde_json::from_value(json).expect("parse product");
        let price = record.items[0].price.as_ref().expect("price present");
        assert!((price.regular - 4.00).abs() < f64::EPSILON);
        assert!((price.promo - 3.00).abs() < f64::EPSILON);
        assert_eq!(
            record.thumbnail_url().as_deref(),
            Some("https://img.example.com/milk-m.jpg")
        );
    }

    #[test]
    fn product_record_tolerates_missing_optional_fields() {
        let json = serde_json::json!({
            "productId": "0001111041701",
            "description": "Store Brand Eggs"
        });
        let record: ProductRecord = serde_json::from_value(json).expect("parse product");
        assert!(record.items.is_empty());
        assert!(record.brand.is_none());
        assert!(record.thumbnail_url().is_none());
    }

    #[test]
    fn data_envelope_defaults_to_empty_list() {
        let envelope: DataEnvelope<ProductRecord> =
            serde_json::from_value(serde_json::json!({})).expect("parse envelope");
        assert!(envelope.data.is_empty());
    }
}
