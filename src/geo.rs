//! IP geolocation lookup for the "Your Location" label
//!
//! One request at startup. Any failure degrades to the "Unavailable"
//! placeholder; the result never affects the simulated measurements.

use crate::logging::GeoLogger;
use crate::models::{Config, UserInfo};
use crate::{AppError, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Subset of the geolocation response we display
#[derive(Debug, Default, Deserialize)]
struct GeoIpResponse {
    #[serde(default)]
    organization: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

impl GeoIpResponse {
    fn into_user_info(self) -> UserInfo {
        fn or_default(value: Option<String>, fallback: &str) -> String {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| fallback.to_string())
        }

        UserInfo {
            isp: or_default(self.organization, "N/A"),
            city: or_default(self.city, "Unknown City"),
            country: or_default(self.country, "Unknown Country"),
        }
    }
}

/// Geolocation client
pub struct GeoLocator {
    client: Client,
    url: String,
}

impl GeoLocator {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| AppError::geolocation(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, url: url.into() })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.geo_lookup_url.clone(), config.geo_timeout())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Look up the caller's ISP and location, falling back to the
    /// "Unavailable" placeholder on any error.
    pub async fn lookup(&self, logger: &GeoLogger) -> UserInfo {
        let result = self.try_lookup().await;
        logger.log_lookup(&self.url, &result).await;
        result.unwrap_or_else(|_| UserInfo::unavailable())
    }

    /// Perform the request and surface errors
    pub async fn try_lookup(&self) -> Result<UserInfo> {
        let response = self.client
            .get(&self.url)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::geolocation(format!(
                "Geolocation service returned error: {}",
                response.status()
            )));
        }

        let body: GeoIpResponse = response
            .json()
            .await
            .map_err(|e| AppError::geolocation(format!("Failed to decode geolocation response: {}", e)))?;

        Ok(body.into_user_info())
    }
}
