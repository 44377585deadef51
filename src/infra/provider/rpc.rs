use {
    super::{Provider, RpcError},
    serde::Deserialize,
    std::sync::atomic::{self, AtomicU64},
    tracing::Instrument,
};

/// A provider that forwards every request to a JSON-RPC 2.0 endpoint over
/// HTTP. Useful with nodes that manage unlocked accounts (e.g. a local
/// development node) or with wallet bridges that expose an HTTP endpoint.
pub struct Rpc {
    client: reqwest::Client,
    url: reqwest::Url,
}

impl Rpc {
    pub fn new(url: reqwest::Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    pub fn url(&self) -> &reqwest::Url {
        &self.url
    }

    async fn roundtrip(
        &self,
        id: u64,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, Error> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        tracing::trace!(%body, "sending request");

        let response = self
            .client
            .post(self.url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        tracing::trace!(%status, %text, "received response");

        if !status.is_success() {
            return Err(Error::Status(status, text));
        }
        let response = serde_json::from_str::<Response>(&text)?;
        match (response.result, response.error) {
            (_, Some(err)) => Err(Error::Rpc(err)),
            (Some(result), None) => Ok(result),
            (None, None) => Ok(serde_json::Value::Null),
        }
    }
}

#[async_trait::async_trait]
impl Provider for Rpc {
    async fn request(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, RpcError> {
        // Set up a tracing span to correlate the request and response logs of
        // a single call.
        static ID: AtomicU64 = AtomicU64::new(0);
        let id = ID.fetch_add(1, atomic::Ordering::Relaxed);
        self.roundtrip(id, method, params)
            .instrument(tracing::trace_span!("rpc", id = %id, %method))
            .await
            .map_err(RpcError::from)
    }
}

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("HTTP status {0}: {1}")]
    Status(reqwest::StatusCode, String),
    #[error("invalid JSON-RPC response: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Rpc(RpcError),
}

impl From<Error> for RpcError {
    fn from(err: Error) -> Self {
        match err {
            Error::Rpc(err) => err,
            other => RpcError::internal(other.to_string()),
        }
    }
}
