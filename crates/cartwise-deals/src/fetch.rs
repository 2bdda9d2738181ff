//! Category fan-out against the retail partner catalog.
//!
//! One product-search request per category term, issued in fixed-size
//! concurrent batches. Batches run strictly in sequence so peak concurrent
//! upstream load never exceeds the batch size; within a batch all requests
//! are in flight at once and their completions interleave arbitrarily.

use futures::future::join_all;

use cartwise_retail::types::ProductRecord;
use cartwise_retail::RetailClient;

/// Results requested per category search.
const PER_CATEGORY_LIMIT: u32 = 50;

/// The fixed category list swept on every deals request.
pub const CATEGORY_TERMS: &[&str] = &[
    "milk", "eggs", "cheese", "yogurt", "butter", "bread", "bagels", "tortillas", "cereal",
    "oatmeal", "chicken breast", "ground beef", "pork chops", "bacon", "sausage", "deli meat",
    "salmon", "shrimp", "tuna", "apples", "bananas", "oranges", "grapes", "berries", "lettuce",
    "spinach", "tomatoes", "onions", "potatoes", "carrots", "peppers", "broccoli", "avocado",
    "mushrooms", "rice", "pasta", "pasta sauce", "beans", "soup", "peanut butter", "jelly",
    "olive oil", "flour", "sugar", "coffee", "tea", "juice", "soda", "sparkling water",
    "frozen pizza", "frozen vegetables", "ice cream", "chips", "crackers", "cookies", "granola",
    "salsa", "hummus", "salad dressing", "ketchup",
];

/// Sweeps `categories` against the catalog for one store location, returning
/// every raw product record the successful searches produced.
///
/// Categories are partitioned into consecutive chunks of `batch_size`
/// (minimum 1). Chunk *i+1* does not start until every request in chunk *i*
/// has settled. A failed category search contributes zero records and is
/// logged at `warn`; it never fails the sweep, so one bad category cannot
/// take down the user-facing request.
pub async fn fetch_deals(
    client: &RetailClient,
    token: &str,
    location_id: &str,
    categories: &[&str],
    batch_size: usize,
) -> Vec<ProductRecord> {
    let mut records: Vec<ProductRecord> = Vec::new();

    for chunk in categories.chunks(batch_size.max(1)) {
        let searches = chunk
            .iter()
            .map(|term| client.search_products(token, location_id, term, PER_CATEGORY_LIMIT));
        let settled: Vec<Result<Vec<ProductRecord>, _>> = join_all(searches).await;

        for (term, outcome) in chunk.iter().zip(settled) {
            match outcome {
                Ok(found) => records.extend(found),
                Err(error) => {
                    tracing::warn!(
                        category = %term,
                        location_id = %location_id,
                        error = %error,
                        "category search failed; dropping its results"
                    );
                }
            }
        }
    }

    records
}
