pub mod hello_world;
pub mod multi_storage;
pub mod simple_storage;
mod file;

use {
    crate::domain::{contract, dapp, eth},
    std::time::Duration,
};

/// The configuration of one app screen.
#[derive(Clone, Debug)]
pub struct Config {
    /// The wallet provider endpoint. `None` behaves like a browser without a
    /// wallet extension.
    pub node_url: Option<reqwest::Url>,
    pub poll_interval: Duration,
    /// Restore an already authorized session on start instead of waiting for
    /// an explicit connect.
    pub auto_connect: bool,
    pub contract: contract::ContractTarget,
    /// The network writes are restricted to, if any.
    pub network: Option<eth::ChainId>,
    pub explorer: Option<String>,
    pub fields: Vec<dapp::FieldSpec>,
    /// An account whose values are shown next to the connected account's.
    pub example_owner: Option<eth::Address>,
}
