//! Upstream HTTP clients: OpenSky state vectors and SerpAPI search.

use crate::models::{Flight, FlightSearchResponse, HotelSearchResponse, OpenSkyResponse};
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub const OPENSKY_API_ROOT: &str = "https://opensky-network.org/api";
pub const SERPAPI_URL: &str = "https://serpapi.com/search.json";

/// Latitude/longitude box for an OpenSky query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lamin: f64,
    pub lomin: f64,
    pub lamax: f64,
    pub lomax: f64,
}

impl BoundingBox {
    /// Square-ish box of `radius_km` around a centre point, clamped to valid
    /// coordinates.
    pub fn around(lat: f64, lon: f64, radius_km: f64) -> Self {
        const KM_PER_DEGREE: f64 = 111.32;
        let dlat = radius_km / KM_PER_DEGREE;
        // Longitude degrees shrink toward the poles.
        let cos_lat = lat.to_radians().cos().abs().max(0.01);
        let dlon = (radius_km / (KM_PER_DEGREE * cos_lat)).min(180.0);

        Self {
            lamin: (lat - dlat).max(-90.0),
            lomin: (lon - dlon).max(-180.0),
            lamax: (lat + dlat).min(90.0),
            lomax: (lon + dlon).min(180.0),
        }
    }

    fn query(&self) -> [(&'static str, f64); 4] {
        [
            ("lamin", self.lamin),
            ("lomin", self.lomin),
            ("lamax", self.lamax),
            ("lomax", self.lomax),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct OpenSkyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

pub struct FlightProvider {
    client: Client,
    api_root: String,
    credentials: Option<OpenSkyCredentials>,
    token: Mutex<Option<CachedToken>>,
}

impl FlightProvider {
    pub fn new(api_root: &str, credentials: Option<OpenSkyCredentials>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .wrap_err("building OpenSky HTTP client")?;

        Ok(Self {
            client,
            api_root: api_root.trim_end_matches('/').to_string(),
            credentials,
            token: Mutex::new(None),
        })
    }

    async fn fetch_token(&self, creds: &OpenSkyCredentials) -> Result<String> {
        let url = format!("{}/v2/authenticate", self.api_root);
        let res = self
            .client
            .post(url)
            .basic_auth(&creds.client_id, Some(&creds.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .wrap_err("requesting OpenSky token")?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(eyre!(
                "token fetch failed {}: {}",
                status,
                body.chars().take(300).collect::<String>()
            ));
        }

        let body: TokenResponse = res.json().await.wrap_err("decoding OpenSky token")?;
        let token = body
            .access_token
            .ok_or_else(|| eyre!("token missing in OpenSky response"))?;
        let ttl = body.expires_in.unwrap_or(3600).saturating_sub(60);

        *self.token.lock().await = Some(CachedToken {
            token: token.clone(),
            expires_at: Instant::now() + Duration::from_secs(ttl),
        });
        info!("Fetched OpenSky token OK");
        Ok(token)
    }

    async fn bearer(&self, creds: &OpenSkyCredentials) -> Result<String> {
        if let Some(cached) = self.token.lock().await.as_ref() {
            if Instant::now() < cached.expires_at {
                return Ok(cached.token.clone());
            }
        }
        self.fetch_token(creds).await
    }

    async fn get_states(&self, bbox: &BoundingBox) -> Result<reqwest::Response> {
        let url = format!("{}/states/all", self.api_root);
        let request = || self.client.get(&url).query(&bbox.query());

        let Some(creds) = &self.credentials else {
            return request().send().await.wrap_err("requesting OpenSky states");
        };

        let token = self.bearer(creds).await?;
        let res = request()
            .bearer_auth(token)
            .send()
            .await
            .wrap_err("requesting OpenSky states")?;
        if res.status() != StatusCode::UNAUTHORIZED {
            return Ok(res);
        }

        warn!("401 from OpenSky, refreshing token");
        let token = self.fetch_token(creds).await?;
        request()
            .bearer_auth(token)
            .send()
            .await
            .wrap_err("retrying OpenSky states")
    }

    /// Fetches every state vector inside `bbox`. Rows without a position are
    /// dropped.
    pub async fn fetch_states(&self, bbox: &BoundingBox) -> Result<(Option<i64>, Vec<Flight>)> {
        let res = self.get_states(bbox).await?.error_for_status()?;
        let body = res
            .json::<OpenSkyResponse>()
            .await
            .wrap_err("decoding OpenSky states")?;

        let flights: Vec<Flight> = body
            .states
            .unwrap_or_default()
            .iter()
            .filter_map(|row| Flight::from_state(row))
            .collect();
        debug!("OpenSky returned {} positioned states", flights.len());

        Ok((body.time, flights))
    }
}

/// Brand ids passed to Google Hotels.
pub const HOTEL_BRANDS: &str = "84,7,41,118,256,26,136,289,2,3";
pub const HOTEL_CLASSES: &str = "4,5";
pub const HOTEL_SORT_BY: &str = "8";

/// Expands airport shortcuts into SerpAPI's comma-separated id list.
pub fn airport_ids(input: &str) -> String {
    let t = input.trim().to_lowercase();
    match t.as_str() {
        "" => String::new(),
        "home" => "GSO,RDU".to_string(),
        "nyc" => "LGA,JFK,EWR".to_string(),
        "mia" => "MIA,FLL".to_string(),
        _ => t.to_uppercase(),
    }
}

/// Maps a cabin name to Google Flights' `travel_class` code.
pub fn travel_class_code(cabin: &str) -> &'static str {
    match cabin.trim().to_lowercase().as_str() {
        "first" | "f" => "4",
        "business" | "j" | "c" => "3",
        "premium" | "prem" | "pe" => "2",
        _ => "1",
    }
}

pub struct SerpApiClient {
    client: Client,
    api_key: String,
}

impl SerpApiClient {
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .wrap_err("building SerpAPI HTTP client")?;
        Ok(Self { client, api_key })
    }

    async fn search<T: serde::de::DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T> {
        let res = self
            .client
            .get(SERPAPI_URL)
            .query(params)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await
            .wrap_err("requesting SerpAPI")?
            .error_for_status()?;
        res.json::<T>().await.wrap_err("decoding SerpAPI response")
    }

    pub async fn hotels(
        &self,
        query: &str,
        check_in: &str,
        check_out: &str,
    ) -> Result<HotelSearchResponse> {
        self.search(&[
            ("engine", "google_hotels"),
            ("q", query),
            ("gl", "us"),
            ("hl", "en"),
            ("currency", "USD"),
            ("check_in_date", check_in),
            ("check_out_date", check_out),
            ("brands", HOTEL_BRANDS),
            ("hotel_class", HOTEL_CLASSES),
            ("sort_by", HOTEL_SORT_BY),
            ("adults", "2"),
        ])
        .await
    }

    pub async fn flights(
        &self,
        from: &str,
        to: &str,
        date: &str,
        cabin: &str,
    ) -> Result<FlightSearchResponse> {
        let departure = airport_ids(from);
        let arrival = airport_ids(to);
        self.search(&[
            ("engine", "google_flights"),
            ("gl", "us"),
            ("hl", "en"),
            ("currency", "USD"),
            ("type", "2"),
            ("departure_id", departure.as_str()),
            ("arrival_id", arrival.as_str()),
            ("outbound_date", date),
            ("travel_class", travel_class_code(cabin)),
        ])
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bbox_is_centered_and_clamped() {
        let b = BoundingBox::around(37.77, -122.41, 111.32);
        assert!((b.lamin - 36.77).abs() < 1e-9);
        assert!((b.lamax - 38.77).abs() < 1e-9);
        assert!(b.lomin < -122.41 - 1.0 && b.lomax > -122.41 + 1.0);

        let polar = BoundingBox::around(89.9, 179.0, 500.0);
        assert_eq!(polar.lamax, 90.0);
        assert_eq!(polar.lomax, 180.0);
    }

    #[test]
    fn airport_shortcuts() {
        assert_eq!(airport_ids("nyc"), "LGA,JFK,EWR");
        assert_eq!(airport_ids(" Home "), "GSO,RDU");
        assert_eq!(airport_ids("sfo,oak"), "SFO,OAK");
        assert_eq!(airport_ids(""), "");
    }

    #[test]
    fn cabin_codes() {
        assert_eq!(travel_class_code("First"), "4");
        assert_eq!(travel_class_code("j"), "3");
        assert_eq!(travel_class_code("premium"), "2");
        assert_eq!(travel_class_code("coach"), "1");
    }
}
