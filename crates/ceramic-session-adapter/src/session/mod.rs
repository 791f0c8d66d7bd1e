/*
[INPUT]:  DID providers, resolver registries, credentials
[OUTPUT]: DID sessions, authentication signal, session service and context
[POS]:    Session layer - the authentication state machine and its observers
[UPDATE]: When session lifecycle or exposure to consumers changes
*/

pub mod context;
pub mod did_session;
pub mod service;
pub mod signal;

pub use context::{SessionContext, current_service};
pub use did_session::{DidSession, VerifiedJws};
pub use service::{HandshakeStage, ServiceConfig, SessionService};
pub use signal::AuthenticationSignal;
