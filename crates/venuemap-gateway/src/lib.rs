pub mod client;
pub mod error;
pub mod gateway;
pub mod normalize;
pub mod types;

pub use client::HttpGateway;
pub use error::RemoteError;
pub use gateway::PlaceGateway;
