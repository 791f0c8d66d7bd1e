/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public ceramic session adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod auth;
pub mod http;
pub mod resolver;
pub mod session;
pub mod types;

// Re-export commonly used types from auth
pub use auth::{
    AuthProvider,
    CredentialSource,
    DidProvider,
    Ed25519Signer,
    EnvKeyCredentialSource,
    EvmWalletSigner,
    HttpIdentityLink,
    IdentityLink,
    Jws,
    KeyDidProvider,
    MockAuthProvider,
    credential_source_fn,
};

// Re-export commonly used types from http
pub use http::{ClientConfig, NetworkClient, Result, SessionError};

// Re-export commonly used types from resolver
pub use resolver::{DidResolver, ResolverRegistry, compose_resolvers};

// Re-export commonly used types from session
pub use session::{
    AuthenticationSignal,
    DidSession,
    HandshakeStage,
    ServiceConfig,
    SessionContext,
    SessionService,
    current_service,
};

// Re-export all types
pub use types::*;

// Endpoint URL type
pub use reqwest::Url;
