use crate::{
    domain::{contract, eth},
    infra::provider::RpcError,
};

/// Everything that can go wrong in the wallet lifecycle, as shown to a user.
#[derive(Clone, Debug, thiserror::Error)]
pub enum Error {
    #[error("no wallet provider found")]
    NoProviderFound,
    #[error("request rejected by user")]
    UserRejected,
    #[error("network switch rejected")]
    SwitchRejected { target: eth::ChainId },
    #[error("network {target} unknown to wallet")]
    UnknownNetwork { target: eth::ChainId },
    #[error("wallet not connected")]
    NotConnected,
    #[error("call reverted")]
    CallReverted,
    #[error("another operation is in flight")]
    Busy,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// The message displayed to the user for this error.
    pub fn message(&self) -> String {
        match self {
            Error::NoProviderFound => "Please install a browser wallet such as MetaMask!".into(),
            Error::UserRejected => "Request rejected by user in wallet.".into(),
            Error::SwitchRejected { target } => {
                format!("Please switch to {} in your wallet.", eth::network_name(*target))
            }
            Error::UnknownNetwork { target } => {
                format!("Please add {} to your wallet.", eth::network_name(*target))
            }
            Error::NotConnected => "Please connect your wallet first.".into(),
            Error::CallReverted => "Transaction failed: the contract call reverted.".into(),
            Error::Busy => "Please wait for the pending transaction to finish.".into(),
            Error::InvalidInput(reason) => format!("Please enter a valid value: {reason}"),
            Error::Other(message) => format!("Transaction failed: {message}"),
        }
    }

    /// for instrumentization purposes
    pub fn format_variant(&self) -> &'static str {
        match self {
            Error::NoProviderFound => "NoProviderFound",
            Error::UserRejected => "UserRejected",
            Error::SwitchRejected { .. } => "SwitchRejected",
            Error::UnknownNetwork { .. } => "UnknownNetwork",
            Error::NotConnected => "NotConnected",
            Error::CallReverted => "CallReverted",
            Error::Busy => "Busy",
            Error::InvalidInput(_) => "InvalidInput",
            Error::Other(_) => "Other",
        }
    }
}

impl From<RpcError> for Error {
    fn from(err: RpcError) -> Self {
        if err.is_user_rejection() {
            Self::UserRejected
        } else if err.is_unauthorized() {
            Self::NotConnected
        } else if err.is_revert() {
            Self::CallReverted
        } else {
            Self::Other(err.message)
        }
    }
}

impl From<contract::Error> for Error {
    fn from(err: contract::Error) -> Self {
        match err {
            contract::Error::Arity { .. } | contract::Error::InvalidArgument { .. } => {
                Self::InvalidInput(err.to_string())
            }
            _ => Self::Other(err.to_string()),
        }
    }
}
