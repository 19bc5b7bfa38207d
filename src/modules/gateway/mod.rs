pub mod services;

pub use services::{DecodedResponse, GatewayTransport, HttpGatewayTransport, RawResponse};
