use pitchside_auth::{logging, App};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let app = App::new().await?;
    app.run().await
}
