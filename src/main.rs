use hospital_finder::beds::BedService;
use hospital_finder::beds::store::{InMemoryObservationStore, load_snapshot_from_path};
use hospital_finder::hospital::service::HospitalService;
use hospital_finder::hospital::{InMemoryCatalog, load_catalog_from_path};
use hospital_finder::routing::RouteEstimator;
use hospital_finder::routing::remote::RemoteRouteEstimator;
use hospital_finder::routing::straight_line::StraightLineEstimator;
use hospital_finder::{api, config, state};
use std::net::SocketAddr;
use std::sync::Arc;

fn init_tracing(level: tracing::Level) {
    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_default()?;
    init_tracing(config.log_level());
    tracing::info!(
        config_path = config::DEFAULT_CONFIG_PATH,
        app = %config.app.name,
        "hospital-finder starting"
    );

    let catalog = match config.catalog_path() {
        Some(path) => match load_catalog_from_path(path) {
            Ok(catalog) => {
                tracing::info!(path = %path.display(), "Hospital catalog loaded");
                catalog
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load hospital catalog, starting empty");
                InMemoryCatalog::default()
            }
        },
        None => {
            tracing::warn!("No catalog path configured, starting with an empty catalog");
            InMemoryCatalog::default()
        }
    };

    let store = match config.snapshot_path() {
        Some(path) => match load_snapshot_from_path(path) {
            Ok(store) => {
                tracing::info!(
                    path = %path.display(),
                    observations = store.len()?,
                    "Bed observation snapshot loaded"
                );
                store
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load bed snapshot, starting empty");
                InMemoryObservationStore::new()
            }
        },
        None => InMemoryObservationStore::new(),
    };

    let beds = BedService::new(Arc::new(store), config.utc_offset()?);
    let router = build_route_estimator(&config)?;
    let hospitals = HospitalService::new(Arc::new(catalog), beds, router);
    let state = Arc::new(state::AppState::new(hospitals));

    let app = api::router(state);
    let port = config.server_port();
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Directions API when a key is configured, straight-line estimates otherwise
fn build_route_estimator(
    config: &config::Config,
) -> Result<Arc<dyn RouteEstimator>, Box<dyn std::error::Error>> {
    let straight_line = StraightLineEstimator::new(config.fallback_speed_kmh());

    match config.routing_api() {
        Some((endpoint, api_key)) => {
            tracing::info!(endpoint = endpoint, "Using directions API for route estimates");
            let remote = RemoteRouteEstimator::new(
                endpoint.to_string(),
                api_key.to_string(),
                config.routing_timeout(),
                Some(Box::new(straight_line)),
            )?;
            Ok(Arc::new(remote))
        }
        None => {
            tracing::info!("No routing API key configured, using straight-line estimates");
            Ok(Arc::new(straight_line))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid_toml() -> Result<(), Box<dyn std::error::Error>> {
        let _config = config::load_default()?;
        Ok(())
    }

    #[test]
    fn default_config_falls_back_to_straight_line() -> Result<(), Box<dyn std::error::Error>> {
        let config = config::load_default()?;

        let router = build_route_estimator(&config)?;

        assert!(format!("{router:?}").starts_with("StraightLineEstimator"));
        Ok(())
    }
}
