//! Flattens SerpAPI flight results into itinerary summaries.

use crate::aircraft;
use crate::airlines::{carrier_code, AirlineIndex};
use crate::models::{AirportStop, FlightSearchResponse, Itinerary, Segment};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leg {
    pub dep: String,
    pub arr: String,
    pub dep_time: String,
    pub arr_time: String,
    /// Canonical aircraft code.
    pub plane: String,
    pub number: String,
    pub carrier: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoverSummary {
    pub id: String,
    pub duration: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItinerarySummary {
    pub price: Option<Value>,
    pub dep_code: String,
    pub arr_code: String,
    pub dep_time: String,
    pub arr_time: String,
    pub airline: String,
    pub airline_code: String,
    pub layovers: Vec<LayoverSummary>,
    pub legs: Vec<Leg>,
    pub total: Option<String>,
}

/// Minutes as `H:MM`.
pub fn minutes_to_hhmm(minutes: i64) -> String {
    format!("{}:{:02}", minutes / 60, minutes % 60)
}

fn ampm_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{1,2}):(\d{2})\s*([AaPp][Mm])").expect("valid time pattern"))
}

fn hour_ampm_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(\d{1,2})\s*([AaPp][Mm])\b").expect("valid time pattern"))
}

fn clock_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(\d{1,2}):(\d{2})\b").expect("valid time pattern"))
}

fn to_24_hour(hour: u32, meridiem: &str) -> u32 {
    match (meridiem.to_ascii_lowercase().as_str(), hour) {
        ("pm", h) if h != 12 => h + 12,
        ("am", 12) => 0,
        (_, h) => h,
    }
}

/// Strict 24-hour `HH:MM`, or an empty string when no time is found.
///
/// Accepts "2:05 PM", "9 am" and "2025-08-15 14:05".
pub fn to_24h(text: &str) -> String {
    let t = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if t.is_empty() {
        return String::new();
    }

    if let Some(c) = ampm_re().captures(&t) {
        let h: u32 = c[1].parse().unwrap_or(0);
        let m: u32 = c[2].parse().unwrap_or(0);
        return format!("{:02}:{:02}", to_24_hour(h, &c[3]), m);
    }
    if let Some(c) = hour_ampm_re().captures(&t) {
        let h: u32 = c[1].parse().unwrap_or(0);
        return format!("{:02}:00", to_24_hour(h, &c[2]));
    }
    if let Some(c) = clock_re().captures(&t) {
        let h: u32 = c[1].parse().unwrap_or(99);
        let m: u32 = c[2].parse().unwrap_or(0);
        if h < 24 {
            return format!("{:02}:{:02}", h, m);
        }
    }
    String::new()
}

fn stop_id(stop: Option<&AirportStop>) -> String {
    stop.and_then(|s| s.id.clone()).unwrap_or_default()
}

fn stop_time(stop: Option<&AirportStop>) -> String {
    stop.and_then(|s| s.time.as_deref()).map(to_24h).unwrap_or_default()
}

fn leg(segment: &Segment) -> Leg {
    Leg {
        dep: stop_id(segment.departure_airport.as_ref()),
        arr: stop_id(segment.arrival_airport.as_ref()),
        dep_time: stop_time(segment.departure_airport.as_ref()),
        arr_time: stop_time(segment.arrival_airport.as_ref()),
        plane: aircraft::canonicalize(segment.airplane.as_deref().unwrap_or("")),
        number: segment.flight_number.clone().unwrap_or_default(),
        carrier: segment.airline.clone().unwrap_or_default(),
    }
}

/// `None` for itineraries with no segments.
pub fn summarize(itinerary: &Itinerary, index: &AirlineIndex) -> Option<ItinerarySummary> {
    let first = itinerary.flights.first()?;
    let last = itinerary.flights.last()?;
    let airline = first.airline.clone().unwrap_or_default();

    Some(ItinerarySummary {
        price: itinerary.price.clone(),
        dep_code: stop_id(first.departure_airport.as_ref()),
        arr_code: stop_id(last.arrival_airport.as_ref()),
        dep_time: stop_time(first.departure_airport.as_ref()),
        arr_time: stop_time(last.arrival_airport.as_ref()),
        airline_code: carrier_code(index, &airline),
        airline,
        layovers: itinerary
            .layovers
            .iter()
            .map(|l| LayoverSummary {
                id: l.id.clone().or_else(|| l.name.clone()).unwrap_or_default(),
                duration: l.duration.filter(|d| *d > 0).map(minutes_to_hhmm),
            })
            .collect(),
        legs: itinerary.flights.iter().map(leg).collect(),
        total: itinerary.total_duration.map(minutes_to_hhmm),
    })
}

/// Best results first, then the rest.
pub fn summarize_all(response: &FlightSearchResponse, index: &AirlineIndex) -> Vec<ItinerarySummary> {
    response
        .best_flights
        .iter()
        .chain(response.other_flights.iter())
        .filter_map(|it| summarize(it, index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn times_are_normalized_to_24h() {
        assert_eq!(to_24h("2:05 PM"), "14:05");
        assert_eq!(to_24h("12:30 am"), "00:30");
        assert_eq!(to_24h("12:10 PM"), "12:10");
        assert_eq!(to_24h("9 am"), "09:00");
        assert_eq!(to_24h("2025-08-15 7:45"), "07:45");
        assert_eq!(to_24h("2025-08-15  31:45"), "");
        assert_eq!(to_24h(""), "");
    }

    #[test]
    fn durations() {
        assert_eq!(minutes_to_hhmm(0), "0:00");
        assert_eq!(minutes_to_hhmm(135), "2:15");
    }

    #[test]
    fn summarizes_best_then_other() {
        let response: FlightSearchResponse = serde_json::from_value(json!({
            "best_flights": [{
                "flights": [
                    {
                        "departure_airport": {"id": "GSO", "time": "2025-08-15 06:10"},
                        "arrival_airport": {"id": "ATL", "time": "2025-08-15 07:30"},
                        "airplane": "Boeing 737-900",
                        "airline": "Delta",
                        "flight_number": "DL 1234"
                    },
                    {
                        "departure_airport": {"id": "ATL", "time": "2025-08-15 09:00"},
                        "arrival_airport": {"id": "JFK", "time": "2025-08-15 11:15"},
                        "airplane": "Airbus A321neo",
                        "airline": "Delta",
                        "flight_number": "DL 55"
                    }
                ],
                "layovers": [{"id": "ATL", "duration": 90}],
                "total_duration": 305,
                "price": 412
            }],
            "other_flights": [{"flights": []}]
        }))
        .unwrap();

        let out = summarize_all(&response, &AirlineIndex::default());
        assert_eq!(out.len(), 1);
        let s = &out[0];
        assert_eq!((s.dep_code.as_str(), s.arr_code.as_str()), ("GSO", "JFK"));
        assert_eq!((s.dep_time.as_str(), s.arr_time.as_str()), ("06:10", "11:15"));
        assert_eq!(s.airline_code, "DL");
        assert_eq!(s.legs[0].plane, "B737-900");
        assert_eq!(s.legs[1].plane, "A321neo");
        assert_eq!(s.layovers[0].duration.as_deref(), Some("1:30"));
        assert_eq!(s.total.as_deref(), Some("5:05"));
    }
}
