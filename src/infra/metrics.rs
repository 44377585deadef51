use {crate::domain::wallet, prometheus_metric_storage::StorageRegistry, std::sync::OnceLock};

/// Metrics for the wallet session lifecycle.
#[derive(Debug, Clone, prometheus_metric_storage::MetricStorage)]
#[metric(subsystem = "wallet_session")]
struct Metrics {
    /// Wallet connection requests by outcome.
    #[metric(labels("outcome"))]
    connections: prometheus::IntCounterVec,

    /// Network switch requests by outcome.
    #[metric(labels("outcome"))]
    network_switches: prometheus::IntCounterVec,

    /// Total number of contract reads.
    reads: prometheus::IntCounter,

    /// Total number of broadcast transactions.
    writes_submitted: prometheus::IntCounter,

    /// Broadcast transactions by final outcome.
    #[metric(labels("outcome"))]
    write_outcomes: prometheus::IntCounterVec,
}

pub fn connection(result: Result<(), &wallet::Error>) {
    get()
        .connections
        .with_label_values(&[outcome(result)])
        .inc();
}

pub fn network_switch(switched: bool) {
    get()
        .network_switches
        .with_label_values(&[if switched { "switched" } else { "failed" }])
        .inc();
}

pub fn read() {
    get().reads.inc();
}

pub fn write_submitted() {
    get().writes_submitted.inc();
}

pub fn write_finished(result: Result<(), &wallet::Error>) {
    get()
        .write_outcomes
        .with_label_values(&[outcome(result)])
        .inc();
}

/// Renders all metrics in the Prometheus text exposition format.
pub fn encode() -> String {
    use prometheus::Encoder;

    let families = registry().registry().gather();
    let mut buffer = Vec::new();
    if let Err(err) = prometheus::TextEncoder::new().encode(&families, &mut buffer) {
        tracing::warn!(?err, "failed to encode metrics");
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

fn outcome(result: Result<(), &wallet::Error>) -> &'static str {
    match result {
        Ok(()) => "success",
        Err(err) => err.format_variant(),
    }
}

fn registry() -> &'static StorageRegistry {
    static REGISTRY: OnceLock<StorageRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| StorageRegistry::new(prometheus::Registry::new()))
}

/// Get the metrics instance.
fn get() -> &'static Metrics {
    Metrics::instance(registry()).expect("unexpected error getting metrics instance")
}
