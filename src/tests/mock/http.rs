//! A mock JSON-RPC node. Every request is checked against the next queued
//! expectation and answered with its canned response.

use {
    anyhow::anyhow,
    std::{
        collections::HashSet,
        net::SocketAddr,
        sync::{
            Arc,
            Mutex,
            atomic::{AtomicBool, Ordering},
        },
    },
    tokio::task::JoinHandle,
};

#[derive(Clone, Debug)]
pub struct Expectation {
    pub method: &'static str,
    pub params: Params,
    pub response: Response,
}

impl Expectation {
    /// Expects `method` with any parameters and answers with `result`.
    pub fn any(method: &'static str, result: serde_json::Value) -> Self {
        Self {
            method,
            params: Params::Any,
            response: Response::Result(result),
        }
    }
}

#[derive(Clone, Debug)]
pub enum Params {
    /// The received params have to match the provided value exactly.
    Exact(serde_json::Value),
    /// The received params have to match the provided value, excluding the
    /// specified paths which are represented as dot-separated strings.
    Partial(serde_json::Value, Vec<&'static str>),
    Any,
}

#[derive(Clone, Debug)]
pub enum Response {
    Result(serde_json::Value),
    Error { code: i64, message: &'static str },
    /// Answers with a non-200 status instead of a JSON-RPC body.
    Status(u16),
}

/// Drop handle that will verify that the server task didn't panic throughout
/// the test and that all the expectations have been met.
pub struct ServerHandle {
    pub address: SocketAddr,
    handle: JoinHandle<()>,
    expectations: Arc<Mutex<Vec<Expectation>>>,
    assert_failed: Arc<AtomicBool>,
}

impl ServerHandle {
    pub fn url(&self) -> reqwest::Url {
        format!("http://{}/", self.address).parse().unwrap()
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        // Don't cause mass hysteria!
        if std::thread::panicking() {
            return;
        }

        // Panics in the server task don't fail the test on their own.
        assert!(!self.assert_failed.load(Ordering::SeqCst));
        assert!(
            !self.handle.is_finished(),
            "mock node terminated before test ended"
        );
        assert_eq!(
            self.expectations.lock().unwrap().len(),
            0,
            "mock node did not receive enough requests"
        );
        self.handle.abort();
    }
}

/// Set up a mock JSON-RPC node expecting the given requests in order.
pub async fn setup(mut expectations: Vec<Expectation>) -> ServerHandle {
    // Reversed so the next expectation can simply be popped.
    expectations.reverse();

    let state = State {
        expectations: Arc::new(Mutex::new(expectations)),
        failed_assert: Arc::new(AtomicBool::new(false)),
    };
    let app = axum::Router::new()
        .route(
            "/",
            axum::routing::post(
                |axum::extract::State(state), axum::extract::Json(req)| async move {
                    post(state, req)
                },
            ),
        )
        .with_state(state.clone());

    let server = axum::Server::bind(&"127.0.0.1:0".parse().unwrap()).serve(app.into_make_service());
    let address = server.local_addr();
    let handle = tokio::spawn(async move { server.await.unwrap() });

    ServerHandle {
        address,
        handle,
        expectations: state.expectations,
        assert_failed: state.failed_assert,
    }
}

#[derive(Clone)]
struct State {
    expectations: Arc<Mutex<Vec<Expectation>>>,
    failed_assert: Arc<AtomicBool>,
}

/// Runs the given closure and updates a flag if it panics.
fn assert_and_propagate_panics<F, R>(assertions: F, flag: &AtomicBool) -> R
where
    F: FnOnce() -> R + std::panic::UnwindSafe + 'static,
{
    std::panic::catch_unwind(assertions)
        .map_err(|_| {
            flag.store(true, Ordering::SeqCst);
        })
        .expect("ignore this panic; it was caused by the previous panic")
}

fn post(state: State, req: serde_json::Value) -> axum::response::Response {
    use axum::response::IntoResponse;

    let expectation = state.expectations.lock().unwrap().pop();
    let assertions = move || {
        let Some(expectation) = expectation else {
            panic!("got another request, but didn't expect any more: {req}");
        };

        assert_eq!(req["jsonrpc"], "2.0", "request is not JSON-RPC 2.0");
        assert_eq!(
            req["method"], expectation.method,
            "request has unexpected method"
        );
        let params = &req["params"];
        match expectation.params {
            Params::Exact(value) => assert_eq!(*params, value, "request has unexpected params"),
            Params::Partial(value, exclude_paths) => {
                let exclude_paths = parse_field_paths(&exclude_paths);
                json_matches_excluding(params, &value, &exclude_paths)
                    .expect("params did not match with the exclusion of specified paths");
            }
            Params::Any => (),
        }

        let id = req["id"].clone();
        match expectation.response {
            Response::Result(result) => axum::Json(serde_json::json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": result,
            }))
            .into_response(),
            Response::Error { code, message } => axum::Json(serde_json::json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": code, "message": message },
            }))
            .into_response(),
            Response::Status(status) => (
                axum::http::StatusCode::from_u16(status).unwrap(),
                "unavailable",
            )
                .into_response(),
        }
    };

    assert_and_propagate_panics(assertions, &state.failed_assert)
}

/// Parses dot-separated field paths into a set of paths.
fn parse_field_paths(paths: &[&str]) -> HashSet<Vec<String>> {
    paths
        .iter()
        .map(|path| path.split('.').map(String::from).collect())
        .collect()
}

/// Recursively compares two JSON values, excluding specified paths. Array
/// elements are addressed by their index.
fn json_matches_excluding(
    actual: &serde_json::Value,
    expected: &serde_json::Value,
    exclude_paths: &HashSet<Vec<String>>,
) -> anyhow::Result<()> {
    fn compare(
        actual: &serde_json::Value,
        expected: &serde_json::Value,
        exclude_paths: &HashSet<Vec<String>>,
        current_path: &mut Vec<String>,
    ) -> anyhow::Result<()> {
        let children: Vec<(String, Option<&serde_json::Value>, Option<&serde_json::Value>)> =
            match (actual, expected) {
                (serde_json::Value::Object(a), serde_json::Value::Object(b)) => a
                    .keys()
                    .chain(b.keys())
                    .cloned()
                    .collect::<HashSet<_>>()
                    .into_iter()
                    .map(|key| {
                        let (a, b) = (a.get(&key), b.get(&key));
                        (key, a, b)
                    })
                    .collect(),
                (serde_json::Value::Array(a), serde_json::Value::Array(b)) => (0..a.len()
                    .max(b.len()))
                    .map(|i| (i.to_string(), a.get(i), b.get(i)))
                    .collect(),
                _ if actual == expected => return Ok(()),
                _ => {
                    return Err(anyhow!(
                        "Mismatch at {}: {:?} != {:?}",
                        current_path.join("."),
                        actual,
                        expected
                    ));
                }
            };

        for (key, a, b) in children {
            current_path.push(key);
            let result = if exclude_paths.contains(current_path) {
                Ok(())
            } else {
                match (a, b) {
                    (Some(a), Some(b)) => compare(a, b, exclude_paths, current_path),
                    (None, _) => Err(anyhow!(
                        "Key missing in actual JSON at {}",
                        current_path.join(".")
                    )),
                    (_, None) => Err(anyhow!(
                        "Key missing in expected JSON at {}",
                        current_path.join(".")
                    )),
                }
            };
            current_path.pop();
            result?;
        }
        Ok(())
    }

    compare(actual, expected, exclude_paths, &mut vec![])
}

#[cfg(test)]
mod tests {
    use {super::*, maplit::hashset, serde_json::json};

    #[test]
    fn test_parse_field_paths() {
        let parsed = parse_field_paths(&["0.data", "0.from"]);
        let expected: HashSet<Vec<String>> = hashset! {
            vec!["0".to_string(), "data".to_string()],
            vec!["0".to_string(), "from".to_string()],
        };
        assert_eq!(parsed, expected)
    }

    #[test]
    fn test_json_matches_excluding_array_elements() {
        let actual = json!([{ "to": "0x01", "data": "0xabcd" }, "latest"]);
        let expected = json!([{ "to": "0x01", "data": "0x" }, "latest"]);

        assert!(json_matches_excluding(&actual, &expected, &hashset! {}).is_err());
        json_matches_excluding(&actual, &expected, &parse_field_paths(&["0.data"])).unwrap();
    }

    #[test]
    fn test_json_matches_excluding_missing_keys() {
        let actual = json!([{ "to": "0x01" }]);
        let expected = json!([{ "to": "0x01", "from": "0x02" }]);

        let err = json_matches_excluding(&actual, &expected, &hashset! {}).unwrap_err();
        assert_eq!(err.to_string(), "Key missing in actual JSON at 0.from");
        let err = json_matches_excluding(&expected, &actual, &hashset! {}).unwrap_err();
        assert_eq!(err.to_string(), "Key missing in expected JSON at 0.from");
    }
}
