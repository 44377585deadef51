mod chain;

pub use {
    self::chain::{ChainId, InvalidChainId, Network, UnsupportedChain},
    alloy::primitives::{Address, B256, U256},
};

/// A contract address.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ContractAddress(pub Address);

impl From<Address> for ContractAddress {
    fn from(inner: Address) -> Self {
        Self(inner)
    }
}

/// The hash identifying a broadcast transaction.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TxHash(pub B256);

impl std::fmt::Display for TxHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reads a hex quantity (e.g. `"0x89"`) as returned by JSON-RPC nodes.
pub fn parse_quantity(value: &str) -> Option<u64> {
    let digits = value.strip_prefix("0x")?;
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}

/// The name a wallet shows for a chain, falling back to the bare chain ID for
/// networks unknown to this crate.
pub fn network_name(chain: ChainId) -> String {
    match Network::new(chain) {
        Ok(network) => network.name().to_owned(),
        Err(_) => format!("network {chain}"),
    }
}
