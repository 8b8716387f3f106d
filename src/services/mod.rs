pub mod auth;
pub mod backfill;
pub mod candidates;
pub mod creators;
pub mod engagement;
pub mod ranker;
pub mod recommendations;

pub use auth::{Authenticator, SupabaseAuthenticator};
pub use recommendations::RecommendationService;
