//! The number app: no network guard, one uint256 field.

use {
    crate::{
        domain::{eth, operation::Operation, wallet},
        infra::provider::RpcError,
        tests,
    },
    alloy::dyn_abi::DynSolValue,
};

const CONFIG: &str = r#"
poll-interval = "5ms"
"#;

fn uint(value: u64) -> DynSolValue {
    DynSolValue::Uint(eth::U256::from(value), 256)
}

#[tokio::test]
async fn stores_value() {
    let config = tests::simple_storage(CONFIG).await;
    let wallet = tests::wallet(&config, eth::Network::Polygon);
    wallet.store("Value", None, uint(7));
    let dapp = tests::dapp("simple-storage", &config, Some(wallet.clone()));
    dapp.connect().await.unwrap();
    assert_eq!(dapp.field("value").unwrap().stored().unwrap().to_string(), "7");

    dapp.set_input("value", " 42 ").unwrap();
    let receipt = dapp.submit("value").await.unwrap();

    let field = dapp.field("value").unwrap();
    assert_eq!(field.stored().unwrap().to_string(), "42");
    assert_eq!(field.input(), "");
    assert_eq!(field.operation().tx(), Some(receipt.tx));
    // Without a network guard the chain is never queried again.
    assert!(!wallet.called("wallet_switchEthereumChain"));
    assert_eq!(
        wallet
            .calls()
            .iter()
            .filter(|call| *call == "eth_chainId")
            .count(),
        1
    );
}

#[tokio::test]
async fn writes_on_any_network() {
    let config = tests::simple_storage(CONFIG).await;
    let wallet = tests::wallet(&config, eth::Network::Mainnet);
    let dapp = tests::dapp("simple-storage", &config, Some(wallet.clone()));
    dapp.connect().await.unwrap();

    dapp.set_input("value", "1").unwrap();
    dapp.submit("value").await.unwrap();

    assert_eq!(wallet.state().chain, eth::Network::Mainnet.chain_id());
}

#[tokio::test]
async fn reads_without_connection_but_refuses_writes() {
    let config = tests::simple_storage(CONFIG).await;
    let wallet = tests::wallet(&config, eth::Network::Polygon);
    wallet.store("Value", None, uint(7));
    let dapp = tests::dapp("simple-storage", &config, Some(wallet.clone()));

    assert_eq!(dapp.refresh("value").await.unwrap().to_string(), "7");

    dapp.set_input("value", "42").unwrap();
    let err = dapp.submit("value").await.unwrap_err();

    assert!(matches!(err, wallet::Error::NotConnected));
    assert_eq!(err.message(), "Please connect your wallet first.");
    assert!(!wallet.called("eth_sendTransaction"));
    assert_eq!(dapp.field("value").unwrap().stored().unwrap().to_string(), "7");
}

#[tokio::test]
async fn no_wallet() {
    let config = tests::simple_storage(CONFIG).await;
    let dapp = tests::dapp("simple-storage", &config, None);

    let err = dapp.connect().await.unwrap_err();
    assert!(matches!(err, wallet::Error::NoProviderFound));
    assert_eq!(
        err.message(),
        "Please install a browser wallet such as MetaMask!"
    );
    assert!(matches!(
        dapp.refresh("value").await,
        Err(wallet::Error::NoProviderFound)
    ));
    assert!(dapp.auto_connect().await.unwrap().is_none());
    assert!(dapp.controller().session().is_none());
}

#[tokio::test]
async fn rejects_invalid_input_before_sending() {
    let config = tests::simple_storage(CONFIG).await;
    let wallet = tests::wallet(&config, eth::Network::Polygon);
    let dapp = tests::dapp("simple-storage", &config, Some(wallet.clone()));
    dapp.connect().await.unwrap();

    dapp.set_input("value", "   ").unwrap();
    assert!(matches!(
        dapp.submit("value").await,
        Err(wallet::Error::InvalidInput(_))
    ));
    // Empty input never starts an operation.
    assert!(matches!(
        dapp.field("value").unwrap().operation(),
        Operation::Idle
    ));

    dapp.set_input("value", "forty-two").unwrap();
    assert!(matches!(
        dapp.submit("value").await,
        Err(wallet::Error::InvalidInput(_))
    ));
    assert!(!wallet.called("eth_sendTransaction"));
}

#[tokio::test]
async fn reverted_transaction_keeps_value() {
    let config = tests::simple_storage(CONFIG).await;
    let wallet = tests::wallet(&config, eth::Network::Polygon);
    wallet.store("Value", None, uint(7));
    let dapp = tests::dapp("simple-storage", &config, Some(wallet.clone()));
    dapp.connect().await.unwrap();
    wallet.state().revert_writes = true;

    dapp.set_input("value", "42").unwrap();
    let err = dapp.submit("value").await.unwrap_err();

    assert!(matches!(err, wallet::Error::CallReverted));
    let field = dapp.field("value").unwrap();
    let operation = field.operation();
    assert!(matches!(
        operation,
        Operation::Failed {
            error: wallet::Error::CallReverted,
            ..
        }
    ));
    // The hash of the failed transaction stays available for the explorer.
    assert!(operation.tx().is_some());
    assert_eq!(field.stored().unwrap().to_string(), "7");
    assert_eq!(field.input(), "42");
}

#[tokio::test]
async fn reverted_estimate_is_reported_without_hash() {
    let config = tests::simple_storage(CONFIG).await;
    let wallet = tests::wallet(&config, eth::Network::Polygon);
    let dapp = tests::dapp("simple-storage", &config, Some(wallet.clone()));
    dapp.connect().await.unwrap();
    wallet.state().send_error = Some(RpcError::new(3, "execution reverted"));

    dapp.set_input("value", "42").unwrap();
    let err = dapp.submit("value").await.unwrap_err();

    assert!(matches!(err, wallet::Error::CallReverted));
    assert_eq!(dapp.field("value").unwrap().operation().tx(), None);
}

#[tokio::test]
async fn dropped_transaction() {
    let config = tests::simple_storage(CONFIG).await;
    let wallet = tests::wallet(&config, eth::Network::Polygon);
    let dapp = tests::dapp("simple-storage", &config, Some(wallet.clone()));
    dapp.connect().await.unwrap();
    wallet.state().drop_transactions = true;

    dapp.set_input("value", "42").unwrap();
    let err = dapp.submit("value").await.unwrap_err();

    assert!(matches!(err, wallet::Error::Other(message) if message.contains("dropped or replaced")));
}

#[tokio::test]
async fn waits_for_transaction_the_node_does_not_know_yet() {
    let config = tests::simple_storage(CONFIG).await;
    let wallet = tests::wallet(&config, eth::Network::Polygon);
    let dapp = tests::dapp("simple-storage", &config, Some(wallet.clone()));
    dapp.connect().await.unwrap();
    wallet.state().hidden_polls = 2;

    dapp.set_input("value", "42").unwrap();
    let receipt = dapp.submit("value").await.unwrap();

    assert_eq!(receipt.block, Some(101));
    assert_eq!(dapp.field("value").unwrap().stored().unwrap().to_string(), "42");
    assert_eq!(
        wallet
            .calls()
            .iter()
            .filter(|call| *call == "eth_getTransactionByHash")
            .count(),
        2
    );
}

#[tokio::test]
async fn stale_read_does_not_overwrite_written_value() {
    let config = tests::simple_storage(CONFIG).await;
    let wallet = tests::wallet(&config, eth::Network::Polygon);
    wallet.store("Value", None, uint(7));
    let dapp = tests::dapp("simple-storage", &config, Some(wallet.clone()));
    dapp.connect().await.unwrap();
    wallet.state().read_delay = Some(std::time::Duration::from_millis(200));

    dapp.set_input("value", "42").unwrap();
    let (stale, receipt) = tokio::join!(dapp.refresh("value"), async {
        let receipt = dapp.submit("value").await;
        assert_eq!(dapp.field("value").unwrap().stored().unwrap().to_string(), "42");
        receipt
    });

    // The read was answered before the write landed and finished after it.
    assert_eq!(stale.unwrap().to_string(), "7");
    receipt.unwrap();
    let field = dapp.field("value").unwrap();
    assert_eq!(field.stored().unwrap().to_string(), "42");
    assert!(matches!(field.operation(), Operation::Confirmed { .. }));
}

#[tokio::test]
async fn refuses_second_write_while_in_flight() {
    let config = tests::simple_storage(CONFIG).await;
    let wallet = tests::wallet(&config, eth::Network::Polygon);
    let dapp = tests::dapp("simple-storage", &config, Some(wallet.clone()));
    dapp.connect().await.unwrap();
    wallet.state().hold_receipts = true;

    dapp.set_input("value", "42").unwrap();
    let mut operations = dapp.field("value").unwrap().subscribe_writes();
    let (first, second) = tokio::join!(dapp.submit("value"), async {
        operations
            .wait_for(|operation| operation.tx().is_some())
            .await
            .unwrap();
        let second = dapp.submit("value").await;
        wallet.state().hold_receipts = false;
        second
    });

    assert!(first.is_ok());
    assert!(matches!(second, Err(wallet::Error::Busy)));
    assert_eq!(
        wallet
            .calls()
            .iter()
            .filter(|call| *call == "eth_sendTransaction")
            .count(),
        1
    );
}

#[tokio::test]
async fn explorer_links() {
    let config = tests::simple_storage(
        r#"
        [dapp]
        explorer = "https://amoy.polygonscan.com/tx/"
        "#,
    )
    .await;
    let dapp = tests::dapp("simple-storage", &config, None);
    let tx = eth::TxHash(eth::B256::repeat_byte(0xab));

    assert_eq!(
        dapp.explorer_link(tx).unwrap(),
        format!("https://amoy.polygonscan.com/tx/0x{}", "ab".repeat(32))
    );
}
