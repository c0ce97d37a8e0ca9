use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One aircraft as reported by the OpenSky state-vector feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub icao24: String,
    pub callsign: String,
    pub origin_country: String,
    pub longitude: f64,
    pub latitude: f64,
    pub baro_altitude: Option<f64>,
    pub on_ground: bool,
    pub velocity: Option<f64>,
    pub true_track: Option<f64>,
    pub vertical_rate: Option<f64>,
    pub geo_altitude: Option<f64>,
    pub squawk: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OpenSkyResponse {
    pub time: Option<i64>,
    pub states: Option<Vec<Vec<Value>>>,
}

impl Flight {
    /// Decodes a positional OpenSky state vector. Rows without a position
    /// are of no use downstream and decode to `None`.
    pub fn from_state(data: &[Value]) -> Option<Self> {
        let text = |i: usize| data.get(i).and_then(Value::as_str).map(|s| s.trim().to_string());
        let num = |i: usize| data.get(i).and_then(Value::as_f64);

        Some(Self {
            longitude: num(5)?,
            latitude: num(6)?,
            icao24: text(0).unwrap_or_default(),
            callsign: text(1).unwrap_or_default(),
            origin_country: text(2).unwrap_or_else(|| "Unknown".to_string()),
            baro_altitude: num(7),
            on_ground: data.get(8).and_then(Value::as_bool).unwrap_or(false),
            velocity: num(9),
            true_track: num(10),
            vertical_rate: num(11),
            geo_altitude: num(13),
            squawk: text(14),
        })
    }
}

/// A property from a SerpAPI Google Hotels search.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HotelProperty {
    pub name: String,
    pub brand: Option<String>,
    pub chain: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub subtype: Option<String>,
    pub amenities: Vec<String>,
    pub overall_rating: Option<f64>,
    pub hotel_class: Option<Value>,
    pub extracted_hotel_class: Option<f64>,
    pub rate_per_night: Option<RatePerNight>,
    pub images: Vec<HotelImage>,
    /// Deal and discount fields vary by result; kept loose.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RatePerNight {
    pub lowest: Option<Value>,
    pub extracted_lowest: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HotelImage {
    pub thumbnail: Option<String>,
    pub original_image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HotelSearchResponse {
    pub properties: Vec<HotelProperty>,
}

/// A SerpAPI Google Flights search result.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FlightSearchResponse {
    pub best_flights: Vec<Itinerary>,
    pub other_flights: Vec<Itinerary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Itinerary {
    pub flights: Vec<Segment>,
    pub layovers: Vec<Layover>,
    pub total_duration: Option<i64>,
    pub price: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Segment {
    pub departure_airport: Option<AirportStop>,
    pub arrival_airport: Option<AirportStop>,
    pub airplane: Option<String>,
    pub airline: Option<String>,
    pub flight_number: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AirportStop {
    pub id: Option<String>,
    pub name: Option<String>,
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Layover {
    pub id: Option<String>,
    pub name: Option<String>,
    pub duration: Option<i64>,
}
