pub mod aggregate;
pub mod fetch;
pub mod matcher;

pub use aggregate::{aggregate, DealItem};
pub use fetch::{fetch_deals, CATEGORY_TERMS};
pub use matcher::{attribute, SavingsAttribution};
