use std::path::PathBuf;
use bottle_detect::common::DEFAULT_CONFIG_FILE;
use bottle_detect::web::{self, AppState};
use bottle_detect::{init_detector, AppConfig, ObjectDetector};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = AppConfig::load_or_default(&config_path)?;
    log::info!("Model: {}", config.model);

    // the model is loaded once; a failure is shown on the page instead of exiting
    let model = config.model.clone();
    let detector = tokio::task::spawn_blocking(move || init_detector(&model)).await?;
    let detector = match detector {
        Ok(yolo) => Ok(Box::new(yolo) as Box<dyn ObjectDetector>),
        Err(err) => {
            log::error!("{}", err);
            Err(err)
        }
    };

    let addr = config.bind_addr.clone();
    web::serve(AppState::new(config, detector), &addr).await
}
