#[tokio::main]
async fn main() {
    if let Err(e) = eatery_reviews::start_server().await {
        eprintln!("Failed to start review service: {}", e);
        std::process::exit(1);
    }
}
