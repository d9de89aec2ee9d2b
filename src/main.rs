use cpf_backend::app::app::App;
use cpf_backend::util::logger::Logger;
use dotenv::dotenv;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Load .env before the subscriber so RUST_LOG and FILE_LOG_LEVEL apply
    let env_file = dotenv();

    let _logger = match Logger::new() {
        Ok(logger) => Some(logger),
        Err(e) => {
            eprintln!("Failed to initialise logging: {}", e);
            None
        }
    };

    info!("🚀 Starting CPF backend");
    match env_file {
        Ok(_) => info!("✅ Successfully loaded .env file"),
        Err(e) => warn!("⚠️ Failed to load .env file: {} (using system env vars)", e),
    }

    let app = match App::new().await {
        Ok(app) => app,
        Err(e) => {
            error!("Startup failed: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = app.start().await {
        error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}
