pub mod decoder;
pub mod payload;
pub mod transport;

pub use decoder::{decode, DecodedResponse};
pub use transport::{GatewayTransport, HttpGatewayTransport, RawResponse};
