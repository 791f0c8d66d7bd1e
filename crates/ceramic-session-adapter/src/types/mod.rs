/*
[INPUT]:  Network, chain and DID definitions plus serde requirements
[OUTPUT]: Typed Rust structs/enums shared across the adapter
[POS]:    Data layer - type definitions
[UPDATE]: When networks, chains or DID document shapes change
*/

pub mod did;
pub mod enums;
pub mod network;

pub use did::*;
pub use enums::*;
pub use network::*;
