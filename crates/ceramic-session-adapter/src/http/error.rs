/*
[INPUT]:  Error sources (HTTP, node API, serialization, wallet, handshake stages)
[OUTPUT]: Structured error types with wrapped causes and retry hints
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or handshake stages
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the session adapter
#[derive(Error, Debug)]
pub enum SessionError {
    /// Network identifier is not one of the supported networks
    #[error("Network {0} is not supported")]
    UnsupportedNetwork(String),

    /// Credential source failed, declined, or produced an unusable credential
    #[error("Credential acquisition failed: {0}")]
    CredentialAcquisition(#[source] Box<SessionError>),

    /// Identity-link protocol rejected the credential
    #[error("Identity link handshake failed: {0}")]
    LinkHandshake(#[source] Box<SessionError>),

    /// The constructed DID session failed its self-authentication
    #[error("Session verification failed: {0}")]
    SessionVerification(#[source] Box<SessionError>),

    /// Session accessed before any successful authentication
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Session service looked up outside of a provisioning scope
    #[error("No session service is provided in this scope")]
    MissingProvider,

    /// Wallet or signer refused to sign
    #[error("Signing rejected: {0}")]
    SigningRejected(String),

    /// DID could not be parsed or resolved
    #[error("DID resolution failed for {did}: {message}")]
    Resolution { did: String, message: String },

    /// No resolver registered for the DID method
    #[error("Unsupported DID method: {0}")]
    UnsupportedDidMethod(String),

    /// JWS signature does not verify against the resolved key
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote service returned an error response
    #[error("API error (code {code}): {message}")]
    Api { code: i32, message: String },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal failure in a local component
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SessionError {
    /// Check if the error is retryable
    ///
    /// Handshake stage failures are retryable by the caller; the service never retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SessionError::CredentialAcquisition(_)
                | SessionError::LinkHandshake(_)
                | SessionError::SessionVerification(_)
                | SessionError::Http(_)
                | SessionError::InvalidResponse(_)
        )
    }

    /// Check if error indicates an authentication failure
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            SessionError::CredentialAcquisition(_)
                | SessionError::LinkHandshake(_)
                | SessionError::SessionVerification(_)
                | SessionError::NotAuthenticated
                | SessionError::SigningRejected(_)
                | SessionError::InvalidSignature(_)
        )
    }

    /// Wrapped cause of a handshake stage failure
    pub fn cause(&self) -> Option<&SessionError> {
        match self {
            SessionError::CredentialAcquisition(inner)
            | SessionError::LinkHandshake(inner)
            | SessionError::SessionVerification(inner) => Some(inner),
            _ => None,
        }
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        SessionError::Api {
            code: status.as_u16() as i32,
            message: message.into(),
        }
    }

    pub(crate) fn credential(err: SessionError) -> Self {
        SessionError::CredentialAcquisition(Box::new(err))
    }

    pub(crate) fn link(err: SessionError) -> Self {
        SessionError::LinkHandshake(Box::new(err))
    }

    pub(crate) fn verification(err: SessionError) -> Self {
        SessionError::SessionVerification(Box::new(err))
    }

    pub(crate) fn resolution(did: impl Into<String>, message: impl Into<String>) -> Self {
        SessionError::Resolution {
            did: did.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
