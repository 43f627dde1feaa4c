use courier_core::ClientConfig;

// Use mimalloc as the global allocator
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = ClientConfig::from_env()?;

    // Initialize the application (telemetry, identity services, storage, routes)
    let (_state, router) = courier_web::setup::initialize_app(config.clone()).await?;

    // Start the server
    courier_web::setup::server::start_server(&config, router).await?;

    Ok(())
}
