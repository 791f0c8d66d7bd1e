/*
[INPUT]:  HTTP configuration (endpoint URL, timeouts) and the bound DID session
[OUTPUT]: Configured reqwest clients, typed JSON responses, network node stream reads
[POS]:    HTTP layer - transport for the link service and the network node
[UPDATE]: When adding connection options or new node API calls
*/

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http::{Result, SessionError};
use crate::session::DidSession;

const STREAMS_PATH: &str = "api/v0/streams/";

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

/// JSON-over-HTTP client rooted at one base URL
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Request paths are joined below `base_url`, including any path prefix it carries
    pub fn new(base_url: Url, config: &ClientConfig) -> Result<Self> {
        let base_url = directory_url(base_url);
        let http_client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build request builder for an endpoint relative to the base URL
    pub(crate) fn request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder> {
        let url = self.base_url.join(endpoint)?;
        Ok(self.http_client.request(method, url))
    }

    /// Send a request and decode a JSON body, mapping non-2xx responses to `Api` errors
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SessionError::api_error(status, error_message(&body)));
        }

        serde_json::from_str(&body).map_err(|e| {
            SessionError::InvalidResponse(format!("unexpected response body ({e}): {body}"))
        })
    }

    /// Load the current state of a stream from a network node
    pub async fn load_stream(&self, stream_id: &str) -> Result<StreamResponse> {
        debug!(stream_id, endpoint = %self.base_url, "loading stream");
        let builder = self.request(Method::GET, &format!("{STREAMS_PATH}{stream_id}"))?;
        self.send_json(builder).await
    }
}

/// Ensure the path ends in `/` so relative joins keep every segment
pub(crate) fn directory_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["error", "message"]
                .iter()
                .find_map(|key| value.get(key).and_then(|v| v.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}

/// Stream as served by `GET /api/v0/streams/{id}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamResponse {
    pub stream_id: String,
    pub state: StreamState,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamState {
    #[serde(default)]
    pub content: serde_json::Value,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Client for a document-graph network node.
///
/// Holds the DID session bound by the session service; the field is only
/// written by the service's commit step.
pub struct NetworkClient {
    api: ApiClient,
    session: RwLock<Option<Arc<DidSession>>>,
}

impl NetworkClient {
    pub fn new(endpoint: Url, config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(endpoint, config)?,
            session: RwLock::new(None),
        })
    }

    pub fn endpoint(&self) -> &Url {
        self.api.base_url()
    }

    /// Transport used by resolvers that read identity documents from the node
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// The currently bound DID session, if any
    pub fn session(&self) -> Option<Arc<DidSession>> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the bound session and run `publish` before readers can observe the new field.
    pub(crate) fn bind_session(&self, session: Arc<DidSession>, publish: impl FnOnce()) {
        let mut slot = self.session_slot();
        *slot = Some(session);
        publish();
    }

    fn session_slot(&self) -> RwLockWriteGuard<'_, Option<Arc<DidSession>>> {
        self.session.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load the current state of a stream from the node
    pub async fn load_stream(&self, stream_id: &str) -> Result<StreamResponse> {
        self.api.load_stream(stream_id).await
    }
}

impl fmt::Debug for NetworkClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkClient")
            .field("endpoint", &self.endpoint().as_str())
            .field("has_session", &self.session().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> NetworkClient {
        let endpoint = Url::parse(&server.uri()).unwrap();
        NetworkClient::new(endpoint, &ClientConfig::default()).unwrap()
    }

    #[test]
    fn test_client_config_defaults() {
        let config: ClientConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_new_client_has_no_session() {
        let endpoint = Url::parse("https://gateway-clay.ceramic.network").unwrap();
        let client = NetworkClient::new(endpoint, &ClientConfig::default()).unwrap();
        assert!(client.session().is_none());
        assert_eq!(client.endpoint().as_str(), "https://gateway-clay.ceramic.network/");
    }

    #[tokio::test]
    async fn test_load_stream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v0/streams/kjzl6cwe1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "streamId": "kjzl6cwe1",
                "state": {
                    "content": {"publicKeys": {"signing": "z6MkTest"}},
                    "metadata": {"controllers": ["did:key:z6MkTest"]}
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let stream = client_for(&server).load_stream("kjzl6cwe1").await.unwrap();
        assert_eq!(stream.stream_id, "kjzl6cwe1");
        assert_eq!(stream.state.content["publicKeys"]["signing"], "z6MkTest");
    }

    #[test]
    fn test_directory_url_keeps_prefix() {
        let url = directory_url(Url::parse("https://proxy.example/ceramic").unwrap());
        assert_eq!(url.as_str(), "https://proxy.example/ceramic/");
        assert_eq!(
            url.join(STREAMS_PATH).unwrap().as_str(),
            "https://proxy.example/ceramic/api/v0/streams/"
        );

        let root = directory_url(Url::parse("http://localhost:7007").unwrap());
        assert_eq!(root.as_str(), "http://localhost:7007/");
    }

    #[tokio::test]
    async fn test_load_stream_under_path_prefix() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ceramic/api/v0/streams/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "streamId": "abc",
                "state": {"content": {}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let endpoint = Url::parse(&format!("{}/ceramic", server.uri())).unwrap();
        let client = NetworkClient::new(endpoint, &ClientConfig::default()).unwrap();
        assert_eq!(client.endpoint().path(), "/ceramic/");

        let stream = client.load_stream("abc").await.unwrap();
        assert_eq!(stream.stream_id, "abc");
    }

    #[tokio::test]
    async fn test_load_stream_maps_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v0/streams/missing"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"error": "stream not found"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).load_stream("missing").await.unwrap_err();
        match err {
            SessionError::Api { code, message } => {
                assert_eq!(code, 404);
                assert_eq!(message, "stream not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
