use {
    anyhow::Context,
    serde::{Deserialize, de::DeserializeOwned},
    serde_with::serde_as,
    std::{path::Path, time::Duration},
};

#[serde_as]
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct Config {
    /// URL of the JSON-RPC endpoint wallet requests are sent to. Leaving it
    /// out runs the app without a wallet provider.
    #[serde_as(as = "Option<serde_with::DisplayFromStr>")]
    node_url: Option<reqwest::Url>,

    /// How often to ask for the receipt of a pending transaction.
    #[serde(with = "humantime_serde", default = "default_poll_interval")]
    poll_interval: Duration,

    /// Reconnect to an already authorized account on start.
    #[serde(default)]
    auto_connect: bool,

    /// App specific configuration.
    #[serde(default)]
    dapp: toml::Table,
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(1)
}

/// Settings shared by every app.
pub struct Base {
    pub node_url: Option<reqwest::Url>,
    pub poll_interval: Duration,
    pub auto_connect: bool,
}

/// Load an app configuration from a TOML file, returning the shared settings
/// and the app specific `[dapp]` table parsed as `T`.
pub async fn load<T: DeserializeOwned>(path: &Path) -> anyhow::Result<(Base, T)> {
    let data = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("I/O error while reading {path:?}"))?;
    parse(&data).with_context(|| format!("invalid config file {path:?}"))
}

fn parse<T: DeserializeOwned>(data: &str) -> anyhow::Result<(Base, T)> {
    let config = toml::from_str::<Config>(data)?;
    let dapp = toml::Value::Table(config.dapp).try_into::<T>()?;
    Ok((
        Base {
            node_url: config.node_url,
            poll_interval: config.poll_interval,
            auto_connect: config.auto_connect,
        },
        dapp,
    ))
}
