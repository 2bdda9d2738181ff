pub mod client;
pub mod error;
pub mod generate;

pub use client::{RecipeSearchClient, RecipeSearchParams, RecipeSummary};
pub use error::RecipesError;
pub use generate::LlmClient;
