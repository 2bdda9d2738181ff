pub mod client;
pub mod credentials;
pub mod error;
pub mod oauth;
pub mod types;

pub use client::RetailClient;
pub use credentials::{Credential, CredentialStore, MemoryCredentialStore, ScopeKind};
pub use error::RetailError;
pub use oauth::{TokenClient, TokenManager, APP_CREDENTIAL_KEY};
pub use types::{CartItem, CouponRecord, LocationRecord, ProductRecord};
