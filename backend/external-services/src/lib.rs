pub mod bakong;
pub mod cafe_api;
pub mod service;

pub use bakong::BakongClient;
pub use cafe_api::CafeApiClient;
pub use service::*;
