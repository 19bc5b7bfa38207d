pub mod models;
pub mod services;

pub use models::CardToken;
pub use services::TokenService;
