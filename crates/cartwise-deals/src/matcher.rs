//! Attribution of sale items and coupons to recipe ingredients.
//!
//! Matching is a deliberate heuristic: the lowercase first token of the
//! ingredient name is looked for as a substring of the lowercase sale-item
//! name (for coupons, of the description and brand concatenated). False
//! positives and negatives are expected; there is no canonical ingredient
//! identity resolution.

use serde::Serialize;

use cartwise_retail::types::CouponRecord;

use crate::aggregate::DealItem;

/// Sale items and coupons attributed to a recipe's ingredient list.
#[derive(Debug, Clone, Serialize)]
pub struct SavingsAttribution {
    pub used_sale_items: Vec<DealItem>,
    /// Sum of `savings_amount` over every distinct matched sale item.
    pub total_savings: f64,
    pub coupons_to_clip: Vec<CouponRecord>,
}

/// Lowercase first whitespace-separated token of an ingredient name.
fn first_token(ingredient: &str) -> Option<String> {
    ingredient
        .split_whitespace()
        .next()
        .map(str::to_lowercase)
        .filter(|t| !t.is_empty())
}

/// Matches `ingredients` against `sale_items` and `coupons`, accumulating
/// the savings of every distinct matched sale item.
#[must_use]
pub fn attribute(
    ingredients: &[String],
    sale_items: &[DealItem],
    coupons: &[CouponRecord],
) -> SavingsAttribution {
    let tokens: Vec<String> = ingredients.iter().filter_map(|i| first_token(i)).collect();

    let mut used_sale_items: Vec<DealItem> = Vec::new();
    for item in sale_items {
        let name = item.name.to_lowercase();
        if tokens.iter().any(|t| name.contains(t.as_str()))
            && !used_sale_items.iter().any(|u| u.product_id == item.product_id)
        {
            used_sale_items.push(item.clone());
        }
    }

    let mut coupons_to_clip: Vec<CouponRecord> = Vec::new();
    for coupon in coupons {
        let haystack = format!(
            "{} {}",
            coupon.description,
            coupon.brand.as_deref().unwrap_or_default()
        )
        .to_lowercase();
        if tokens.iter().any(|t| haystack.contains(t.as_str())) {
            coupons_to_clip.push(coupon.clone());
        }
    }

    let total_savings = used_sale_items.iter().map(|i| i.savings_amount).sum();

    SavingsAttribution {
        used_sale_items,
        total_savings,
        coupons_to_clip,
    }
}
