use {
    crate::{
        domain::{dapp::Dapp, eth, wallet},
        infra::{
            cli::{self, Action},
            config,
            metrics,
            provider::{self, Provider},
        },
    },
    clap::Parser,
    std::sync::Arc,
    tracing_subscriber::EnvFilter,
};

pub async fn run(args: impl IntoIterator<Item = String>) -> anyhow::Result<()> {
    let args = cli::Args::parse_from(args);
    initialize_tracing(&args.log);
    tracing::info!("running app with {args:#?}");

    let config = match &args.command {
        cli::Command::HelloWorld { config, .. } => {
            config::dapp::hello_world::file::load(config).await?
        }
        cli::Command::SimpleStorage { config, .. } => {
            config::dapp::simple_storage::file::load(config).await?
        }
        cli::Command::MultiStorage { config, .. } => {
            config::dapp::multi_storage::file::load(config).await?
        }
    };
    let name = match &args.command {
        cli::Command::HelloWorld { .. } => "hello-world",
        cli::Command::SimpleStorage { .. } => "simple-storage",
        cli::Command::MultiStorage { .. } => "multi-storage",
    };

    let dapp = build(name, &config)?;
    let interrupted = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(?err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };
    let result = execute(&dapp, &config, args.command.action(), interrupted).await;
    if args.metrics {
        print!("{}", metrics::encode());
    }
    result
}

fn initialize_tracing(filter: &str) {
    let result = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .try_init();
    if let Err(err) = result {
        eprintln!("tracing already initialized: {err}");
    }
}

/// Wires an app screen from its configuration.
pub fn build(name: &str, config: &config::dapp::Config) -> anyhow::Result<Dapp> {
    let provider = config
        .node_url
        .clone()
        .map(|url| Arc::new(provider::Rpc::new(url)) as Arc<dyn Provider>);
    let controller = wallet::Controller::new(provider, config.network, config.poll_interval);
    Ok(Dapp::new(
        name,
        controller,
        config.contract.clone(),
        config.fields.clone(),
        config.explorer.clone(),
    )?)
}

/// Runs an action until it completes or `stop` resolves, whichever is first.
/// The wallet owns a broadcast transaction, so stopping only stops watching it.
async fn execute(
    dapp: &Dapp,
    config: &config::dapp::Config,
    action: &Action,
    stop: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    tokio::select! {
        biased;
        () = stop => {
            let tx = match action {
                Action::Write { field, .. } => dapp
                    .field(field)
                    .ok()
                    .and_then(|field| field.subscribe_writes().borrow().tx()),
                _ => None,
            };
            tracing::info!(?tx, "interrupted");
            Err(match tx {
                Some(tx) => anyhow::anyhow!(
                    "interrupted, stopped watching transaction {tx} which may still be included"
                ),
                None => anyhow::anyhow!("interrupted"),
            })
        }
        result = perform(dapp, config, action) => {
            result.map_err(|err| anyhow::anyhow!(err.message()))
        }
    }
}

async fn perform(
    dapp: &Dapp,
    config: &config::dapp::Config,
    action: &Action,
) -> Result<(), wallet::Error> {
    let session = match action {
        // Forgetting the session is local.
        Action::Disconnect => None,
        _ if config.auto_connect => match dapp.auto_connect().await? {
            Some(session) => Some(session),
            None if matches!(action, Action::Read { .. } | Action::Status) => None,
            None => Some(dapp.connect().await?),
        },
        _ => Some(dapp.connect().await?),
    };

    match action {
        Action::Status => {
            println!("{}", dapp.name());
            match session {
                Some(session) => {
                    println!("account  {}", session.account);
                    println!("network  {}", eth::network_name(session.chain_id));
                }
                None => println!("not connected"),
            }
            for field in dapp.fields() {
                match field.stored() {
                    Some(value) => println!("{:<8} {value}", field.name()),
                    None => println!("{:<8} -", field.name()),
                }
            }
            if let Some(owner) = config.example_owner {
                for field in dapp.fields().iter().filter(|field| field.is_owned()) {
                    let value = dapp.read_for(field.name(), owner).await?;
                    println!("{:<8} {value} (example account {owner})", field.name());
                }
            }
        }
        Action::Read { field, owner } => {
            let value = match owner {
                Some(owner) => dapp.read_for(field, *owner).await?,
                None => dapp.refresh(field).await?,
            };
            println!("{value}");
        }
        Action::Write { field, value } => {
            dapp.set_input(field, value)?;
            let mut operations = dapp.field(field)?.subscribe_writes();
            let submit = dapp.submit(field);
            tokio::pin!(submit);
            let mut announced = false;
            let receipt = loop {
                tokio::select! {
                    receipt = &mut submit => break receipt?,
                    Ok(()) = operations.changed(), if !announced => {
                        let tx = operations.borrow_and_update().tx();
                        if let Some(tx) = tx {
                            announced = true;
                            match dapp.explorer_link(tx) {
                                Some(link) => println!("sent {tx}: {link}"),
                                None => println!("sent {tx}"),
                            }
                        }
                    }
                }
            };
            match receipt.block {
                Some(block) => println!("confirmed in block {block}"),
                None => println!("confirmed"),
            }
            if let Some(value) = dapp.field(field)?.stored() {
                println!("{field} = {value}");
            }
        }
        Action::Network => {
            let target = config.network.ok_or_else(|| {
                wallet::Error::InvalidInput(format!("{} has no network guard", dapp.name()))
            })?;
            dapp.controller().ensure_network(target).await?;
            println!("on {}", eth::network_name(target));
        }
        Action::Disconnect => {
            dapp.disconnect();
            println!("disconnected");
        }
    }
    Ok(())
}
