use std::{fmt, str::FromStr};

/// A chain ID as reported by a wallet. Wallets may sit on any chain, so this
/// is not restricted to the [`Network`]s known to this crate.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ChainId(pub u64);

impl ChainId {
    /// Parses the `0x`-prefixed hex quantity returned by `eth_chainId`.
    pub fn from_hex(value: &str) -> Result<Self, InvalidChainId> {
        super::parse_quantity(value)
            .map(Self)
            .ok_or_else(|| InvalidChainId(value.to_owned()))
    }

    /// Formats the chain ID the way `wallet_switchEthereumChain` expects it.
    pub fn to_hex(self) -> String {
        format!("{:#x}", self.0)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ChainId {
    type Err = InvalidChainId;

    /// Accepts both decimal (`137`) and hex (`0x89`) notation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("0x") {
            Self::from_hex(s)
        } else {
            s.parse()
                .map(Self)
                .map_err(|_| InvalidChainId(s.to_owned()))
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid chain id {0:?}")]
pub struct InvalidChainId(pub String);

/// A network one of the bundled apps is deployed on.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Network {
    Mainnet = 1,
    Polygon = 137,
    ArbitrumOne = 42161,
    Sepolia = 11155111,
}

impl Network {
    pub fn new(chain: ChainId) -> Result<Self, UnsupportedChain> {
        match chain.0 {
            1 => Ok(Self::Mainnet),
            137 => Ok(Self::Polygon),
            42161 => Ok(Self::ArbitrumOne),
            11155111 => Ok(Self::Sepolia),
            _ => Err(UnsupportedChain(chain)),
        }
    }

    /// Returns the human readable network name, as shown in wallets.
    pub fn name(self) -> &'static str {
        match self {
            Network::Mainnet => "Ethereum Mainnet",
            Network::Polygon => "Polygon Mainnet",
            Network::ArbitrumOne => "Arbitrum One",
            Network::Sepolia => "Sepolia",
        }
    }

    /// Returns the transaction page prefix of the network's block explorer.
    pub fn explorer(self) -> &'static str {
        match self {
            Network::Mainnet => "https://etherscan.io/tx/",
            Network::Polygon => "https://polygonscan.com/tx/",
            Network::ArbitrumOne => "https://arbiscan.io/tx/",
            Network::Sepolia => "https://sepolia.etherscan.io/tx/",
        }
    }

    pub fn chain_id(self) -> ChainId {
        ChainId(self as u64)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unsupported chain {0}")]
pub struct UnsupportedChain(pub ChainId);
