use {
    crate::{
        domain::{dapp::FieldSpec, eth},
        infra::{
            config::dapp::{self, file},
            contracts::{Contract, MULTI_STORAGE_EXAMPLE_OWNER},
        },
        util::serialize,
    },
    serde::Deserialize,
    serde_with::serde_as,
    std::path::Path,
};

#[serde_as]
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct Config {
    /// Address of the per-account storage contract.
    #[serde(default)]
    contract: Option<eth::Address>,

    /// Chain the wallet must be on before anything is stored. By default
    /// whatever network the wallet is on is used.
    #[serde_as(as = "Option<serialize::ChainId>")]
    chain_id: Option<eth::ChainId>,

    /// Transaction page prefix of a block explorer. No links are shown
    /// without it.
    #[serde(default)]
    explorer: Option<String>,

    /// Account whose stored data is shown as an example.
    #[serde(default = "default_example_owner")]
    example_owner: eth::Address,
}

fn default_example_owner() -> eth::Address {
    MULTI_STORAGE_EXAMPLE_OWNER
}

/// Load the multi-storage app configuration from a TOML file.
pub async fn load(path: &Path) -> anyhow::Result<dapp::Config> {
    let (base, config) = file::load::<Config>(path).await?;

    Ok(dapp::Config {
        node_url: base.node_url,
        poll_interval: base.poll_interval,
        auto_connect: base.auto_connect,
        contract: Contract::MultiStorage.target(config.contract.map(eth::ContractAddress)),
        network: config.chain_id,
        explorer: config.explorer,
        fields: vec![
            FieldSpec::new("value", "getValue", Some("storeValue")),
            FieldSpec::new("string", "getString", Some("storeString")),
        ],
        example_owner: Some(config.example_owner),
    })
}
