use {
    super::{Error, request},
    crate::{
        domain::{contract, eth},
        infra::{metrics, provider::Provider},
    },
    alloy::primitives::Bytes,
    serde::Deserialize,
    serde_json::json,
    std::{sync::Arc, time::Duration},
};

/// Calls view methods of a contract through the provider. Carries no signing
/// capability.
#[derive(Clone)]
pub struct ReadHandle {
    pub(super) provider: Arc<dyn Provider>,
    pub(super) target: contract::ContractTarget,
}

impl ReadHandle {
    pub fn target(&self) -> &contract::ContractTarget {
        &self.target
    }

    /// Calls a getter against the latest block and decodes its return value.
    pub async fn call(&self, method: &str, args: &[&str]) -> Result<contract::Value, Error> {
        let call = self.target.encode(method, args)?;
        let output: Bytes = request(
            self.provider.as_ref(),
            "eth_call",
            json!([
                {
                    "to": self.target.address.0,
                    "data": Bytes::copy_from_slice(call.calldata()),
                },
                "latest",
            ]),
        )
        .await?;
        metrics::read();

        let value = call.decode(&output)?;
        tracing::debug!(method, %value, "read contract value");
        Ok(value)
    }
}

/// Sends transactions to a contract on behalf of the connected account.
#[derive(Clone)]
pub struct WriteHandle {
    pub(super) provider: Arc<dyn Provider>,
    pub(super) target: contract::ContractTarget,
    pub(super) from: eth::Address,
}

impl WriteHandle {
    pub fn target(&self) -> &contract::ContractTarget {
        &self.target
    }

    /// The account transactions are sent from.
    pub fn from(&self) -> eth::Address {
        self.from
    }

    pub(super) async fn send(&self, call: &contract::Call) -> Result<eth::TxHash, Error> {
        let hash: eth::B256 = request(
            self.provider.as_ref(),
            "eth_sendTransaction",
            json!([{
                "from": self.from,
                "to": self.target.address.0,
                "data": Bytes::copy_from_slice(call.calldata()),
            }]),
        )
        .await?;
        Ok(eth::TxHash(hash))
    }
}

/// A broadcast transaction that has not been confirmed yet.
pub struct PendingWrite {
    pub(super) provider: Arc<dyn Provider>,
    pub(super) tx: eth::TxHash,
    pub(super) poll_interval: Duration,
}

impl PendingWrite {
    /// The hash of the broadcast transaction, available before confirmation.
    pub fn tx(&self) -> eth::TxHash {
        self.tx
    }

    /// Waits until the network reports the transaction as included.
    ///
    /// There is no timeout: a caller that stops waiting does not cancel the
    /// transaction, it only stops observing it. Reverted, dropped or replaced
    /// transactions are reported as errors and never resubmitted. A hash the
    /// node has never reported is waited on.
    pub async fn confirm(self) -> Result<Receipt, Error> {
        let result = self.poll().await;
        metrics::write_finished(result.as_ref().map(|_| ()));
        result
    }

    async fn poll(&self) -> Result<Receipt, Error> {
        // A hash only counts as dropped once it disappears after having been
        // seen.
        let mut seen = false;
        loop {
            let receipt: Option<dto::Receipt> = request(
                self.provider.as_ref(),
                "eth_getTransactionReceipt",
                json!([self.tx.0]),
            )
            .await?;

            if let Some(receipt) = receipt {
                let block = receipt.block_number.as_deref().and_then(eth::parse_quantity);
                if receipt.status.as_deref() == Some("0x0") {
                    tracing::debug!(tx = %self.tx, ?block, "transaction reverted");
                    return Err(Error::CallReverted);
                }
                tracing::debug!(tx = %self.tx, ?block, "transaction included");
                return Ok(Receipt { tx: self.tx, block });
            }

            let known: Option<serde_json::Value> = request(
                self.provider.as_ref(),
                "eth_getTransactionByHash",
                json!([self.tx.0]),
            )
            .await?;
            match (known.is_some(), seen) {
                (true, _) => seen = true,
                (false, true) => {
                    return Err(Error::Other(format!(
                        "transaction {} was dropped or replaced",
                        self.tx
                    )));
                }
                (false, false) => tracing::trace!(tx = %self.tx, "transaction not yet known"),
            }

            tracing::trace!(tx = %self.tx, "transaction pending");
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// Proof that a transaction was successfully included.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Receipt {
    pub tx: eth::TxHash,
    pub block: Option<u64>,
}

mod dto {
    use super::Deserialize;

    /// The subset of an `eth_getTransactionReceipt` result that is needed.
    /// Pre-Byzantium receipts have no status and count as successful.
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Receipt {
        #[serde(default)]
        pub status: Option<String>,
        #[serde(default)]
        pub block_number: Option<String>,
    }
}
