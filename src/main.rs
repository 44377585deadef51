#[tokio::main]
async fn main() {
    if let Err(err) = wallet_session::run(std::env::args()).await {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}
