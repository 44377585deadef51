use {
    crate::{
        domain::{dapp::FieldSpec, eth},
        infra::{
            config::dapp::{self, file},
            contracts::Contract,
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
    /// Address of the storage contract. Defaults to the public Polygon
    /// deployment.
    #[serde(default)]
    contract: Option<eth::Address>,

    /// Chain the wallet must be on before a value is stored. By default
    /// whatever network the wallet is on is used.
    #[serde_as(as = "Option<serialize::ChainId>")]
    chain_id: Option<eth::ChainId>,

    /// Transaction page prefix of the block explorer linked after a write.
    #[serde(default = "default_explorer")]
    explorer: String,
}

fn default_explorer() -> String {
    eth::Network::Polygon.explorer().to_owned()
}

/// Load the simple-storage app configuration from a TOML file.
pub async fn load(path: &Path) -> anyhow::Result<dapp::Config> {
    let (base, config) = file::load::<Config>(path).await?;

    Ok(dapp::Config {
        node_url: base.node_url,
        poll_interval: base.poll_interval,
        auto_connect: base.auto_connect,
        contract: Contract::SimpleStorage.target(config.contract.map(eth::ContractAddress)),
        network: config.chain_id,
        explorer: Some(config.explorer),
        fields: vec![FieldSpec::new("value", "getValue", Some("setValue"))],
        example_owner: None,
    })
}
