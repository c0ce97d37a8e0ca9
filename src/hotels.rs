//! Shapes SerpAPI hotel properties into display records.

use crate::brands::{BrandFields, LogoTable};
use crate::models::HotelProperty;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::OnceLock;

/// Most amenity badges a card shows.
pub const MAX_AMENITIES: usize = 8;

#[derive(Debug, Clone, Serialize)]
pub struct EnrichedProperty {
    pub name: String,
    pub logo_url: String,
    pub class_rating: u8,
    pub overall_rating: Option<f64>,
    pub price: Option<String>,
    pub discount: Option<String>,
    pub amenities: Vec<&'static str>,
    pub images: Vec<String>,
}

/// Maps free-text amenities onto a fixed label set, first-seen order, no
/// repeats.
pub fn amenity_labels(raw: &[String]) -> Vec<&'static str> {
    let mut labels: Vec<&'static str> = Vec::new();
    let mut add = |label: &'static str| {
        if !labels.contains(&label) {
            labels.push(label);
        }
    };

    for amenity in raw {
        let s = amenity.to_lowercase();
        if s.contains("pet") || s.contains("dog") || s.contains("cat") {
            add("Pet friendly");
        }
        if s.contains("spa") && !s.contains("tub") {
            add("Spa");
        }
        if s.contains("restaurant") || s.contains("dining") {
            add("Restaurant");
        }
        if s.contains("room service") {
            add("In-Room Dining");
        }
        if s.contains("bar") || s.contains("lounge") {
            add("Bar");
        }
        if s.contains("pool") {
            add("Pool");
        }
        if s.contains("hot tub") || s.contains("whirlpool") || s.contains("jacuzzi") {
            add("Hot tub");
        }
        if s.contains("beach") {
            add("Beach");
        }
        if s.contains("casino") {
            add("Casino");
        }
    }

    labels.truncate(MAX_AMENITIES);
    labels
}

fn first_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d(?:\.\d)?)").expect("valid class pattern"))
}

fn percent_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{1,3})").expect("valid percent pattern"))
}

fn percent_lower_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\d{1,3})\s*%.*lower").expect("valid discount pattern"))
}

/// Star class rounded and clamped to 0..=5.
pub fn class_rating(property: &HotelProperty) -> u8 {
    let n = match (&property.extracted_hotel_class, &property.hotel_class) {
        (Some(n), _) => *n,
        (None, Some(Value::Number(n))) => n.as_f64().unwrap_or(0.0),
        (None, Some(Value::String(s))) => first_number_re()
            .captures(s)
            .and_then(|c| c[1].parse::<f64>().ok())
            .unwrap_or(0.0),
        _ => 0.0,
    };
    n.round().clamp(0.0, 5.0) as u8
}

/// Lowest nightly rate as `$N`.
pub fn nightly_price(property: &HotelProperty) -> Option<String> {
    let rate = property.rate_per_night.as_ref()?;
    if let Some(n) = rate.extracted_lowest {
        return Some(format!("${}", n.round() as i64));
    }
    match rate.lowest.as_ref()? {
        Value::Number(n) => n.as_f64().map(|n| format!("${}", n.round() as i64)),
        Value::String(s) if s.trim().is_empty() || s == "None" => None,
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(n) => Some(format!("${}", n.round() as i64)),
            Err(_) if s.trim().starts_with('$') => Some(s.trim().to_string()),
            Err(_) => Some(format!("${}", s.trim())),
        },
        _ => None,
    }
}

const DISCOUNT_PERCENT_KEYS: &[&str] = &[
    "price_x_percent_lower_than_usual",
    "price_drop_percent",
    "percent_lower_than_usual",
    "discount_percent",
];

const DISCOUNT_TEXT_KEYS: &[&str] = &["deal", "deal_description", "price_highlight", "savings_text"];

fn value_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// "N% lower" when the property advertises a discount.
pub fn discount_label(property: &HotelProperty) -> Option<String> {
    let from_percent = DISCOUNT_PERCENT_KEYS
        .iter()
        .filter_map(|k| property.extra.get(*k))
        .filter(|v| !v.is_null())
        .find_map(|v| percent_re().captures(&value_text(v)).map(|c| c[1].to_string()));

    from_percent
        .or_else(|| {
            DISCOUNT_TEXT_KEYS
                .iter()
                .filter_map(|k| property.extra.get(*k))
                .find_map(|v| percent_lower_re().captures(&value_text(v)).map(|c| c[1].to_string()))
        })
        .map(|n| format!("{n}% lower"))
}

pub fn brand_fields(property: &HotelProperty) -> BrandFields<'_> {
    BrandFields {
        brand: property.brand.as_deref(),
        chain: property.chain.as_deref(),
        kind: property.kind.as_deref(),
        subtype: property.subtype.as_deref(),
        name: &property.name,
    }
}

/// Drops properties rated below `min_rating` and resolves the rest.
pub fn enrich_properties(
    properties: &[HotelProperty],
    logos: &LogoTable,
    logo_base_url: &str,
    min_rating: f64,
) -> Vec<EnrichedProperty> {
    properties
        .iter()
        .filter(|p| p.overall_rating.unwrap_or(0.0) >= min_rating)
        .map(|p| EnrichedProperty {
            name: p.name.clone(),
            logo_url: LogoTable::url_for(logo_base_url, logos.resolve(&brand_fields(p))),
            class_rating: class_rating(p),
            overall_rating: p.overall_rating,
            price: nightly_price(p),
            discount: discount_label(p),
            amenities: amenity_labels(&p.amenities),
            images: p
                .images
                .iter()
                .filter_map(|im| im.original_image.clone().or_else(|| im.thumbnail.clone()))
                .collect(),
        })
        .collect()
}
