//! Dedup-and-rank aggregation of raw catalog records into deal items.
//!
//! Pure functions only; the fan-out feeds records in chunk order, and any
//! nondeterminism in within-chunk completion order only affects which
//! duplicate wins (duplicates are content-equal apart from the category
//! they were found under, so ranking is unaffected).

use std::collections::HashSet;

use serde::Serialize;

use cartwise_retail::types::ProductRecord;

/// A promotional product, derived from one upstream catalog record.
/// Immutable once constructed and never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct DealItem {
    pub product_id: String,
    pub name: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub regular_price: f64,
    pub sale_price: f64,
    pub savings_amount: f64,
    /// Integer discount percentage, round-half-up, always in `0..=100`.
    pub percent_off: u8,
    pub package_size: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl DealItem {
    /// Builds a deal from a raw record, or `None` when the record carries no
    /// usable promotion (no price, promo ≤ 0, or promo not below regular).
    fn from_record(record: &ProductRecord) -> Option<Self> {
        let item = record.items.first()?;
        let price = item.price.as_ref()?;
        if price.promo <= 0.0 || price.regular <= 0.0 || price.promo >= price.regular {
            return None;
        }

        Some(Self {
            product_id: record.product_id.clone(),
            name: record.description.clone(),
            brand: record.brand.clone(),
            category: record.categories.first().cloned(),
            regular_price: price.regular,
            sale_price: price.promo,
            savings_amount: price.regular - price.promo,
            percent_off: percent_off(price.regular, price.promo),
            package_size: item.size.clone(),
            thumbnail_url: record.thumbnail_url(),
        })
    }
}

/// `round((regular - promo) / regular * 100)`, half-up.
///
/// Callers guarantee `0 < promo < regular`, so the result is in `1..=99`
/// before rounding and `0..=100` after.
fn percent_off(regular: f64, promo: f64) -> u8 {
    let percent = (regular - promo) / regular * 100.0;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        percent.round().clamp(0.0, 100.0) as u8
    }
}

/// Merges raw records into a deduplicated, ranked, capped deal list.
///
/// - records without a positive promotional price are dropped;
/// - duplicates by `product_id` keep the first occurrence in input order;
/// - the survivors are stably sorted descending by `percent_off`, so ties
///   retain their relative input order;
/// - the result is truncated to `cap` entries.
///
/// Empty input yields empty output; this stage never fails.
#[must_use]
pub fn aggregate(records: &[ProductRecord], cap: usize) -> Vec<DealItem> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut deals: Vec<DealItem> = Vec::new();

    for record in records {
        let Some(deal) = DealItem::from_record(record) else {
            continue;
        };
        if seen.insert(deal.product_id.clone()) {
            deals.push(deal);
        }
    }

    deals.sort_by(|a, b| b.percent_off.cmp(&a.percent_off));
    deals.truncate(cap);
    deals
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartwise_retail::types::ProductRecord;

    fn record(id: &str, name: &str, regular: f64, promo: f64) -> ProductRecord {
        serde_json::from_value(serde_json::json!({
            "productId": id,
            "description": name,
            "categories": ["Dairy"],
            "items": [ { "price": { "regular": regular, "promo": promo }, "size": "each" } ]
        }))
        .expect("test record")
    }

    #[test]
    fn non_promotional_records_are_excluded() {
        let records = vec![
            record("1", "Milk", 4.00, 0.0),
            record("2", "Eggs", 5.00, -1.0),
            record("3", "Butter", 6.00, 6.00),
            record("4", "Yogurt", 3.00, 3.50),
        ];
        assert!(aggregate(&records, 10).is_empty());
    }

    #[test]
    fn record_without_items_is_excluded() {
        let bare: ProductRecord = serde_json::from_value(serde_json::json!({
            "productId": "9",
            "description": "Shelf Tag"
        }))
        .expect("test record");
        assert!(aggregate(&[bare], 10).is_empty());
    }

    #[test]
    fn percent_off_is_rounded_half_up_and_bounded() {
        // 1.00 -> 0.995: 0.5% rounds up to 1
        let deals = aggregate(&[record("1", "Gum", 1.00, 0.995)], 10);
        assert_eq!(deals[0].percent_off, 1);

        // 4.00 -> 3.00: exactly 25
        let deals = aggregate(&[record("2", "Milk", 4.00, 3.00)], 10);
        assert_eq!(deals[0].percent_off, 25);

        // 8.00 -> 6.99: 12.625 rounds to 13
        let deals = aggregate(&[record("3", "Coffee", 8.00, 6.99)], 10);
        assert_eq!(deals[0].percent_off, 13);

        for deal in aggregate(
            &[record("4", "Deep cut", 100.0, 0.01), record("5", "Tiny cut", 100.0, 99.99)],
            10,
        ) {
            assert!(deal.percent_off <= 100);
        }
    }

    #[test]
    fn duplicates_keep_first_occurrence() {
        let records = vec![
            record("1", "Milk (dairy aisle)", 4.00, 3.00),
            record("1", "Milk (breakfast aisle)", 4.00, 3.00),
            record("2", "Eggs", 5.00, 4.50),
        ];
        let deals = aggregate(&records, 10);
        assert_eq!(deals.len(), 2);
        assert_eq!(deals[0].name, "Milk (dairy aisle)");
    }

    #[test]
    fn sorted_descending_with_stable_ties_and_cap() {
        let records = vec![
            record("a", "Ten-1", 10.00, 9.00),
            record("b", "Fifty", 10.00, 5.00),
            record("c", "Ten-2", 20.00, 18.00),
            record("d", "Thirty", 10.00, 7.00),
        ];
        let deals = aggregate(&records, 3);
        assert_eq!(deals.len(), 3, "cap applies after sorting");
        let percents: Vec<u8> = deals.iter().map(|d| d.percent_off).collect();
        assert_eq!(percents, vec![50, 30, 10]);
        // windows check: non-increasing throughout
        assert!(percents.windows(2).all(|w| w[0] >= w[1]));
        // the tie at 10% retains input order: "a" beat "c", and "c" fell past the cap
        assert_eq!(deals[2].product_id, "a");
    }

    #[test]
    fn milk_and_eggs_scenario() {
        let records = vec![
            record("1", "Milk", 4.00, 3.00),
            record("1", "Milk", 4.00, 3.00),
            record("2", "Eggs", 5.00, 4.50),
        ];
        let deals = aggregate(&records, 10);
        assert_eq!(deals.len(), 2);
        assert_eq!(deals[0].product_id, "1");
        assert_eq!(deals[0].percent_off, 25);
        assert!((deals[0].savings_amount - 1.00).abs() < 1e-9);
        assert_eq!(deals[1].product_id, "2");
        assert_eq!(deals[1].percent_off, 10);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(aggregate(&[], 10).is_empty());
    }

    #[test]
    fn sale_price_always_below_regular_in_output() {
        let records = vec![
            record("1", "Milk", 4.00, 3.00),
            record("2", "Flat", 5.00, 5.00),
            record("3", "Eggs", 5.00, 4.50),
        ];
        for deal in aggregate(&records, 10) {
            assert!(deal.sale_price < deal.regular_price);
        }
    }
}
