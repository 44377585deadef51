//! The wallet session controller: connects to a wallet, guards the network
//! and hands out read and write handles for a contract.

use {
    crate::{
        domain::{contract, eth},
        infra::{metrics, provider::Provider},
    },
    serde::de::DeserializeOwned,
    serde_json::json,
    std::{sync::Arc, time::Duration},
    tokio::sync::watch,
};

mod error;
mod handle;

pub use self::{
    error::Error,
    handle::{PendingWrite, ReadHandle, Receipt, WriteHandle},
};

/// An authorized connection to a wallet account.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Session {
    pub account: eth::Address,
    pub chain_id: eth::ChainId,
}

pub struct Controller {
    /// `None` when no wallet is installed.
    provider: Option<Arc<dyn Provider>>,
    /// The network writes are restricted to, if any.
    network: Option<eth::ChainId>,
    /// How long to wait between receipt queries of a pending transaction.
    poll_interval: Duration,
    session: watch::Sender<Option<Session>>,
}

impl Controller {
    pub fn new(
        provider: Option<Arc<dyn Provider>>,
        network: Option<eth::ChainId>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            provider,
            network,
            poll_interval,
            session: watch::Sender::new(None),
        }
    }

    pub fn network(&self) -> Option<eth::ChainId> {
        self.network
    }

    pub fn session(&self) -> Option<Session> {
        *self.session.borrow()
    }

    /// Subscribes to session changes (connects, disconnects, account and
    /// network switches).
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    fn provider(&self) -> Result<&Arc<dyn Provider>, Error> {
        self.provider.as_ref().ok_or(Error::NoProviderFound)
    }

    /// Asks the wallet for access to its accounts. This prompts the user
    /// unless the page was already authorized.
    pub async fn request_connection(&self) -> Result<Session, Error> {
        let result = self.connect().await;
        metrics::connection(result.as_ref().map(|_| ()));
        match &result {
            Ok(session) => {
                tracing::debug!(account = %session.account, chain = %session.chain_id, "connected");
            }
            Err(err) => tracing::warn!(?err, "failed to connect wallet"),
        }
        result
    }

    async fn connect(&self) -> Result<Session, Error> {
        let provider = self.provider()?;
        let accounts: Vec<eth::Address> =
            request(provider.as_ref(), "eth_requestAccounts", json!([])).await?;
        let account = accounts
            .first()
            .copied()
            .ok_or_else(|| Error::Other("wallet returned no accounts".into()))?;
        let chain_id = chain_id(provider.as_ref()).await?;

        let session = Session { account, chain_id };
        self.session.send_replace(Some(session));
        Ok(session)
    }

    /// Restores a session the wallet already authorized, without prompting
    /// the user. Returns `None` if there is no wallet or no authorized account.
    pub async fn restore_connection(&self) -> Result<Option<Session>, Error> {
        let Some(provider) = self.provider.as_ref() else {
            return Ok(None);
        };
        let accounts: Vec<eth::Address> =
            request(provider.as_ref(), "eth_accounts", json!([])).await?;
        let Some(account) = accounts.first().copied() else {
            tracing::debug!("no previously authorized account");
            return Ok(None);
        };
        let chain_id = chain_id(provider.as_ref()).await?;

        let session = Session { account, chain_id };
        tracing::debug!(%account, chain = %chain_id, "restored session");
        self.session.send_replace(Some(session));
        Ok(Some(session))
    }

    /// Makes sure the wallet is on the `target` chain, asking it to switch if
    /// it is not. Returns `true` when the wallet ends up on the target chain.
    pub async fn ensure_network(&self, target: eth::ChainId) -> Result<bool, Error> {
        let provider = self.provider()?;
        let current = chain_id(provider.as_ref()).await?;
        if current == target {
            self.update_chain(current);
            return Ok(true);
        }

        tracing::debug!(%current, %target, "switching network");
        let result = provider
            .request(
                "wallet_switchEthereumChain",
                json!([{ "chainId": target.to_hex() }]),
            )
            .await;
        metrics::network_switch(result.is_ok());
        match result {
            Ok(_) => {
                self.update_chain(target);
                Ok(true)
            }
            Err(err) if err.is_unrecognized_chain() => {
                tracing::warn!(?err, %target, "network unknown to wallet");
                Err(Error::UnknownNetwork { target })
            }
            Err(err) => {
                tracing::warn!(?err, %target, "network switch failed");
                Err(Error::SwitchRejected { target })
            }
        }
    }

    /// Returns a handle for calling view methods of `target`. Reads do not
    /// need a session.
    pub fn read_handle(&self, target: &contract::ContractTarget) -> Result<ReadHandle, Error> {
        Ok(ReadHandle {
            provider: self.provider()?.clone(),
            target: target.clone(),
        })
    }

    /// Returns a handle for sending transactions to `target` from the
    /// connected account.
    pub fn write_handle(&self, target: &contract::ContractTarget) -> Result<WriteHandle, Error> {
        let session = self.session().ok_or(Error::NotConnected)?;
        Ok(WriteHandle {
            provider: self.provider()?.clone(),
            target: target.clone(),
            from: session.account,
        })
    }

    /// Sends `method(args)` as a transaction. When a network is configured
    /// the wallet is moved onto it first, and nothing is sent if that fails.
    ///
    /// Returns as soon as the transaction is broadcast; use
    /// [`PendingWrite::confirm`] to wait for its inclusion.
    pub async fn submit_write(
        &self,
        handle: &WriteHandle,
        method: &str,
        args: &[&str],
    ) -> Result<PendingWrite, Error> {
        let call = handle.target.encode(method, args)?;
        if let Some(network) = self.network {
            self.ensure_network(network).await?;
        }
        if self.session().map(|session| session.account) != Some(handle.from) {
            return Err(Error::NotConnected);
        }

        let tx = handle.send(&call).await?;
        metrics::write_submitted();
        tracing::debug!(method, %tx, from = %handle.from, "transaction broadcast");

        Ok(PendingWrite {
            provider: handle.provider.clone(),
            tx,
            poll_interval: self.poll_interval,
        })
    }

    /// Forgets the session. The wallet keeps its own permission records;
    /// revoking them is up to the user.
    pub fn disconnect(&self) {
        if self.session.send_replace(None).is_some() {
            tracing::debug!("disconnected");
        }
    }

    /// Handles the wallet's `accountsChanged` event. An empty list means the
    /// user revoked access, which ends the session.
    pub fn accounts_changed(&self, accounts: &[eth::Address]) {
        match accounts.first() {
            None => self.disconnect(),
            Some(&account) => {
                self.session.send_if_modified(|session| match session {
                    Some(session) if session.account != account => {
                        tracing::debug!(%account, "account changed");
                        session.account = account;
                        true
                    }
                    _ => false,
                });
            }
        }
    }

    /// Handles the wallet's `chainChanged` event.
    pub fn chain_changed(&self, chain_id: eth::ChainId) {
        self.update_chain(chain_id);
    }

    fn update_chain(&self, chain_id: eth::ChainId) {
        self.session.send_if_modified(|session| match session {
            Some(session) if session.chain_id != chain_id => {
                tracing::debug!(chain = %chain_id, "chain changed");
                session.chain_id = chain_id;
                true
            }
            _ => false,
        });
    }
}

async fn chain_id(provider: &dyn Provider) -> Result<eth::ChainId, Error> {
    let chain: String = request(provider, "eth_chainId", json!([])).await?;
    eth::ChainId::from_hex(&chain).map_err(|err| Error::Other(err.to_string()))
}

/// Sends a request and deserializes its result.
async fn request<T: DeserializeOwned>(
    provider: &dyn Provider,
    method: &str,
    params: serde_json::Value,
) -> Result<T, Error> {
    let result = provider.request(method, params).await?;
    serde_json::from_value(result)
        .map_err(|err| Error::Other(format!("unexpected {method} response: {err}")))
}
