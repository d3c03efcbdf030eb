pub mod server;
pub mod types;

pub use server::GatewayServer;
pub use types::{ErrorBody, RecommendationQuery, RecommendationsResponse, RecordsResponse};
