//! Centre point for the OpenSky bounding box.
//!
//! With `auto_locate` on, the point comes from IP geolocation and falls back
//! to the configured coordinates when the lookup fails.

use crate::config::LocationConfig;
use ipgeolocate::{Locator, Service};
use tracing::{error, info};

/// Resolves the `(latitude, longitude)` to watch.
pub async fn resolve_center(config: &LocationConfig) -> (f64, f64) {
    let fallback = (config.manual_lat, config.manual_lon);
    if !config.auto_locate {
        return fallback;
    }

    match Locator::get("1.1.1.1", Service::IpApi).await {
        Ok(loc) => {
            let lat = loc.latitude.parse::<f64>().unwrap_or(fallback.0);
            let lon = loc.longitude.parse::<f64>().unwrap_or(fallback.1);
            info!("Geolocation successful - ({}, {})", lat, lon);
            (lat, lon)
        }
        Err(e) => {
            error!(
                "Error using geolocation service: {}. Using configured location ({}, {}).",
                e, fallback.0, fallback.1
            );
            fallback
        }
    }
}
