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
    /// Address of the greeting contract. Defaults to the public Polygon
    /// deployment.
    #[serde(default)]
    contract: Option<eth::Address>,

    /// Chain the wallet must be on before a message is sent.
    #[serde_as(as = "serialize::ChainId")]
    #[serde(default = "default_chain_id")]
    chain_id: eth::ChainId,

    /// Transaction page prefix of the block explorer linked after a write.
    #[serde(default = "default_explorer")]
    explorer: String,
}

fn default_chain_id() -> eth::ChainId {
    eth::Network::Polygon.chain_id()
}

fn default_explorer() -> String {
    eth::Network::Polygon.explorer().to_owned()
}

/// Load the hello-world app configuration from a TOML file.
pub async fn load(path: &Path) -> anyhow::Result<dapp::Config> {
    let (base, config) = file::load::<Config>(path).await?;

    Ok(dapp::Config {
        node_url: base.node_url,
        poll_interval: base.poll_interval,
        auto_connect: base.auto_connect,
        contract: Contract::HelloWorld.target(config.contract.map(eth::ContractAddress)),
        network: Some(config.chain_id),
        explorer: Some(config.explorer),
        fields: vec![FieldSpec::new("message", "getMessage", Some("setMessage"))],
        example_owner: None,
    })
}
