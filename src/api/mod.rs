pub mod extract;
pub mod odds_api;

pub use extract::extract_fixture;
pub use odds_api::{ApiUsage, OddsApiClient, OddsBoard, OddsSource};
