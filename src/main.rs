#[tokio::main]
async fn main() {
    if let Err(e) = krc20_inscribe::cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
