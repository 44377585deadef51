//! The wallet provider seam.
//!
//! Everything the session controller needs from a wallet goes through a single
//! EIP-1193 style `request(method, params)` call. Browser wallets, wallet
//! bridges and plain JSON-RPC nodes with unlocked accounts all fit behind it.
//!
//! https://eips.ethereum.org/EIPS/eip-1193

use serde::Deserialize;

pub mod rpc;

pub use self::rpc::Rpc;

/// Defines the request surface of an injected wallet provider. This
/// abstraction allows for different implementations (HTTP JSON-RPC, in-memory
/// wallets in tests, mocked responses, etc.).
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    /// Submits a single RPC request and returns its raw JSON result.
    async fn request(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, RpcError>;
}

/// Provider error codes.
///
/// https://eips.ethereum.org/EIPS/eip-1193#provider-errors
pub mod code {
    /// The user rejected the request.
    pub const USER_REJECTED: i64 = 4001;
    /// The requested method and/or account has not been authorized by the
    /// user.
    pub const UNAUTHORIZED: i64 = 4100;
    /// The chain passed to `wallet_switchEthereumChain` has not been added to
    /// the wallet.
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;
    /// Execution reverted (geth style JSON-RPC error).
    pub const EXECUTION_REVERTED: i64 = 3;
}

/// An error returned by the provider, carrying its error code when it has one.
#[derive(Clone, Debug, Deserialize, PartialEq, thiserror::Error)]
#[error("provider error {code}: {message}")]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// An error that did not originate from the provider's error reporting
    /// (transport failures, malformed responses). JSON-RPC reserves `-32603`
    /// for internal errors.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(-32603, message)
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == code::USER_REJECTED
    }

    pub fn is_unauthorized(&self) -> bool {
        self.code == code::UNAUTHORIZED
    }

    pub fn is_unrecognized_chain(&self) -> bool {
        self.code == code::UNRECOGNIZED_CHAIN
    }

    /// Nodes disagree on how to report reverts: geth uses code `3`, others
    /// return a generic server error with "revert" in the message.
    pub fn is_revert(&self) -> bool {
        self.code == code::EXECUTION_REVERTED || self.message.to_lowercase().contains("revert")
    }
}
