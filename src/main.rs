#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    boosters_site::run().await
}
