use grade_predictor::pages::home::ServiceBadge;
use grade_predictor::server::start_api;
use grade_predictor::{ApiClient, AppError, Config};
use tracing::{info, warn};

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    info!(
        api_url = %config.api_url,
        bind = %config.bind,
        redirect_ms = config.redirect_delay.as_millis() as u64,
        "loaded configuration"
    );

    match ServiceBadge::probe(&ApiClient::new(config.api_url.clone())).await {
        ServiceBadge::Healthy { r2_score, mae } => {
            info!(?r2_score, ?mae, "prediction service is healthy")
        }
        ServiceBadge::Degraded(status) => warn!(%status, "prediction service has no model loaded"),
        ServiceBadge::Unreachable(message) => {
            warn!(url = %config.api_url, "prediction service unreachable: {}", message)
        }
    }

    info!("Visit http://{} in your browser", config.bind);
    start_api(config).await?;
    Ok(())
}
