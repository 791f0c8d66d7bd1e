/*
[INPUT]:  HTTP client configuration and service endpoints
[OUTPUT]: HTTP transport, network client and the crate error type
[POS]:    HTTP layer - REST communication with link service and network node
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod client;
pub mod error;

pub use error::{Result, SessionError};

pub use client::{ApiClient, ClientConfig, NetworkClient, StreamResponse, StreamState};
