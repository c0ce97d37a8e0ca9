//! Airline reference records and the callsign resolver.
//!
//! The reference file is produced by hand and by scrapers, so it arrives in
//! one of three shapes. [`AirlinesPayload`] names each of them and
//! [`AirlinesPayload::into_records`] folds them into one list of
//! [`ReferenceRecord`]s, from which [`AirlineIndex`] derives its code maps.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::time::SystemTime;
use tracing::warn;

/// Colour used when a record carries neither `primary_color` nor `color`.
pub const DEFAULT_BRAND_COLOR: &str = "#666666";

/// Strings as-is, numbers as their decimal text, anything else as absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// One airline entry exactly as it appears in the reference file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAirline {
    #[serde(default, deserialize_with = "lenient_text")]
    pub icao: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub iata: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub primary_color: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub logo: Option<String>,
}

impl RawAirline {
    /// Decodes one entry. Non-object entries are skipped with a warning so
    /// the rest of the file still loads.
    fn from_entry(label: &str, entry: Value) -> Option<Self> {
        if !entry.is_object() {
            warn!(
                "Skipping airline entry {}: expected an object, found {}",
                label,
                json_kind(&entry)
            );
            return None;
        }
        serde_json::from_value(entry)
            .map_err(|e| warn!("Skipping airline entry {}: {}", label, e))
            .ok()
    }
}

/// The accepted layouts of `airlines.json`.
///
/// Entries stay as raw JSON until [`AirlinesPayload::into_records`], so a
/// single bad entry never rejects the whole layout.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AirlinesPayload {
    /// `{"airlines": [ {...}, ... ]}`
    Wrapped { airlines: Vec<Value> },
    /// `[ {...}, ... ]`
    List(Vec<Value>),
    /// `{"AAL": {...}, "DL": {...}}`
    Keyed(BTreeMap<String, Value>),
    /// Anything else. Loads as an empty list.
    Unknown(Value),
}

impl AirlinesPayload {
    pub fn into_records(self) -> Vec<ReferenceRecord> {
        match self {
            AirlinesPayload::Wrapped { airlines } | AirlinesPayload::List(airlines) => airlines
                .into_iter()
                .enumerate()
                .filter_map(|(i, entry)| RawAirline::from_entry(&format!("#{i}"), entry))
                .map(ReferenceRecord::from)
                .collect(),
            AirlinesPayload::Keyed(map) => map
                .into_iter()
                .filter_map(|(key, entry)| {
                    RawAirline::from_entry(&key, entry)
                        .map(|raw| ReferenceRecord::from_keyed(&key, raw))
                })
                .collect(),
            AirlinesPayload::Unknown(value) => {
                warn!(
                    "Unrecognized airlines payload (top-level {}), treating as empty",
                    json_kind(&value)
                );
                Vec::new()
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A normalized airline record. Never mutated after load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceRecord {
    pub icao_code: String,
    pub iata_code: String,
    pub display_name: String,
    pub brand_color: String,
    pub icon_asset_key: String,
    pub logo_asset_key: String,
}

fn clean_code(code: Option<String>) -> String {
    code.map(|c| c.trim().to_uppercase()).unwrap_or_default()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl From<RawAirline> for ReferenceRecord {
    fn from(raw: RawAirline) -> Self {
        let mut record = Self {
            icao_code: clean_code(raw.icao),
            iata_code: clean_code(raw.iata),
            display_name: non_empty(raw.name).unwrap_or_default(),
            brand_color: non_empty(raw.primary_color)
                .or_else(|| non_empty(raw.color))
                .unwrap_or_else(|| DEFAULT_BRAND_COLOR.to_string()),
            icon_asset_key: non_empty(raw.icon).unwrap_or_default(),
            logo_asset_key: non_empty(raw.logo).unwrap_or_default(),
        };

        let code = record.asset_code().unwrap_or_default().to_string();
        if record.icon_asset_key.is_empty() {
            record.icon_asset_key = code.clone();
        }
        if record.logo_asset_key.is_empty() {
            record.logo_asset_key = code;
        }
        record
    }
}

impl ReferenceRecord {
    /// Builds a record from the keyed layout, letting the key stand in for a
    /// missing code of matching length.
    fn from_keyed(key: &str, mut raw: RawAirline) -> Self {
        let key = key.trim().to_uppercase();
        match key.chars().count() {
            3 if non_empty(raw.icao.clone()).is_none() => raw.icao = Some(key),
            2 if non_empty(raw.iata.clone()).is_none() => raw.iata = Some(key),
            _ => {}
        }
        Self::from(raw)
    }

    pub fn is_indexable(&self) -> bool {
        !self.icao_code.is_empty() || !self.iata_code.is_empty()
    }

    /// Code used to address this airline's assets: ICAO first, then IATA.
    pub fn asset_code(&self) -> Option<&str> {
        [self.icao_code.as_str(), self.iata_code.as_str()]
            .into_iter()
            .find(|c| !c.is_empty())
    }
}

/// Code lookups over one immutable set of airline records.
#[derive(Debug, Default)]
pub struct AirlineIndex {
    records: Vec<ReferenceRecord>,
    by_icao: HashMap<String, usize>,
    by_iata: HashMap<String, usize>,
    source_mtime: Option<SystemTime>,
}

impl AirlineIndex {
    pub fn new(records: Vec<ReferenceRecord>) -> Self {
        let mut by_icao = HashMap::new();
        let mut by_iata = HashMap::new();

        for (i, record) in records.iter().enumerate() {
            if !record.icao_code.is_empty() {
                by_icao.insert(record.icao_code.clone(), i);
            }
            if !record.iata_code.is_empty() {
                by_iata.insert(record.iata_code.clone(), i);
            }
        }

        Self {
            records,
            by_icao,
            by_iata,
            source_mtime: None,
        }
    }

    pub fn with_mtime(mut self, mtime: Option<SystemTime>) -> Self {
        self.source_mtime = mtime;
        self
    }

    /// Modification time of the file this index was built from.
    pub fn source_mtime(&self) -> Option<SystemTime> {
        self.source_mtime
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ReferenceRecord] {
        &self.records
    }

    pub fn by_icao(&self, code: &str) -> Option<&ReferenceRecord> {
        self.by_icao.get(code).map(|&i| &self.records[i])
    }

    pub fn by_iata(&self, code: &str) -> Option<&ReferenceRecord> {
        self.by_iata.get(code).map(|&i| &self.records[i])
    }

    /// Resolves a flight callsign to its airline.
    ///
    /// The leading three characters are tried as an ICAO designator, then the
    /// leading two as an IATA designator. Anything shorter than two
    /// characters resolves to `None`.
    pub fn resolve_callsign(&self, callsign: &str) -> Option<&ReferenceRecord> {
        let cs = callsign.trim().to_uppercase();

        if let Some(record) = cs.get(..3).and_then(|prefix| self.by_icao(prefix)) {
            return Some(record);
        }
        cs.get(..2).and_then(|prefix| self.by_iata(prefix))
    }

    /// Finds a record by exact ICAO code, exact IATA code, or display name.
    pub fn find(&self, code_or_name: &str) -> Option<&ReferenceRecord> {
        let trimmed = code_or_name.trim();
        if trimmed.is_empty() {
            return None;
        }

        let code = trimmed.to_uppercase();
        self.by_icao(&code)
            .or_else(|| self.by_iata(&code))
            .or_else(|| {
                let name = trimmed.to_lowercase();
                self.records
                    .iter()
                    .find(|r| r.display_name.trim().to_lowercase() == name)
            })
    }
}

/// Airline data attached to an enriched record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AirlineDescriptor {
    pub name: Option<String>,
    pub icao: Option<String>,
    pub iata: Option<String>,
    pub primary_color: String,
    pub icon_url: Option<String>,
    pub logo_url: Option<String>,
}

impl AirlineDescriptor {
    pub fn from_record(record: &ReferenceRecord, asset_base_url: &str) -> Self {
        let base = asset_base_url.trim_end_matches('/');
        let has_code = record.is_indexable();
        let asset_url = |kind: &str, key: &str| {
            (has_code && !key.is_empty()).then(|| format!("{base}/{kind}/{key}"))
        };

        Self {
            name: Some(record.display_name.clone()).filter(|n| !n.is_empty()),
            icao: Some(record.icao_code.clone()).filter(|c| !c.is_empty()),
            iata: Some(record.iata_code.clone()).filter(|c| !c.is_empty()),
            primary_color: record.brand_color.clone(),
            icon_url: asset_url("icons", &record.icon_asset_key),
            logo_url: asset_url("logos", &record.logo_asset_key),
        }
    }
}

/// Outcome of a callsign lookup as handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AirlineMatch {
    Resolved(AirlineDescriptor),
    Unresolved,
}

impl AirlineMatch {
    pub fn is_resolved(&self) -> bool {
        matches!(self, AirlineMatch::Resolved(_))
    }
}

/// Marketing-name fragments of carriers that show up without a code in
/// flight search results.
const CARRIER_NAMES: &[(&str, &str)] = &[
    ("american", "AA"),
    ("delta", "DL"),
    ("united", "UA"),
    ("jetblue", "B6"),
    ("spirit", "NK"),
    ("frontier", "F9"),
    ("alaska", "AS"),
];

/// Best-effort two-letter carrier code for an airline's marketing name.
pub fn carrier_code(index: &AirlineIndex, airline_name: &str) -> String {
    if let Some(iata) = index
        .find(airline_name)
        .map(|r| r.iata_code.as_str())
        .filter(|c| !c.is_empty())
    {
        return iata.to_string();
    }

    let lowered = airline_name.to_lowercase();
    if let Some((_, code)) = CARRIER_NAMES.iter().find(|(name, _)| lowered.contains(name)) {
        return (*code).to_string();
    }

    airline_name.trim().chars().take(2).collect::<String>().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(icao: &str, iata: &str, name: &str) -> ReferenceRecord {
        ReferenceRecord::from(RawAirline {
            icao: Some(icao.to_string()),
            iata: Some(iata.to_string()),
            name: Some(name.to_string()),
            ..Default::default()
        })
    }

    fn fixture() -> AirlineIndex {
        AirlineIndex::new(vec![
            record("AAL", "AA", "American Airlines"),
            record("DAL", "DL", "Delta Air Lines"),
            record("", "B6", "JetBlue"),
            record("", "", "Nameless Charter"),
        ])
    }

    fn records_of(body: &str) -> Vec<ReferenceRecord> {
        serde_json::from_str::<AirlinesPayload>(body)
            .unwrap()
            .into_records()
    }

    #[test]
    fn icao_prefix_wins_regardless_of_suffix() {
        let index = fixture();
        for cs in ["AAL123", "aal9", "  DAL2207 ", "AALXYZ"] {
            assert!(index.resolve_callsign(cs).is_some(), "{cs}");
        }
        assert_eq!(index.resolve_callsign("DAL1").unwrap().display_name, "Delta Air Lines");
    }

    #[test]
    fn icao_match_beats_a_different_airlines_iata() {
        let index = AirlineIndex::new(vec![
            record("DLH", "LH", "Lufthansa"),
            record("DAL", "DL", "Delta Air Lines"),
        ]);
        assert_eq!(index.resolve_callsign("DLH400").unwrap().display_name, "Lufthansa");
        assert_eq!(index.resolve_callsign("DL400").unwrap().display_name, "Delta Air Lines");
    }

    #[test]
    fn two_char_callsign_only_tries_iata() {
        let index = fixture();
        assert_eq!(index.resolve_callsign("B6").unwrap().display_name, "JetBlue");
        assert_eq!(index.resolve_callsign("dl").unwrap().icao_code, "DAL");
    }

    #[test]
    fn iata_fallback_for_longer_callsigns() {
        let index = fixture();
        assert_eq!(index.resolve_callsign("B61234").unwrap().iata_code, "B6");
    }

    #[test]
    fn short_or_unknown_callsigns_are_unresolved() {
        let index = fixture();
        assert!(index.resolve_callsign("").is_none());
        assert!(index.resolve_callsign("A").is_none());
        assert!(index.resolve_callsign("ZZZ999").is_none());
        // Same answer on repeat.
        assert!(index.resolve_callsign("ZZZ999").is_none());
    }

    #[test]
    fn records_without_codes_are_kept_but_not_indexed() {
        let index = fixture();
        assert_eq!(index.len(), 4);
        assert!(!index.records()[3].is_indexable());
        assert_eq!(index.find("nameless charter").unwrap().display_name, "Nameless Charter");
    }

    #[test]
    fn raw_records_are_cleaned() {
        let rec = ReferenceRecord::from(RawAirline {
            icao: Some(" ual ".into()),
            iata: Some("ua".into()),
            name: Some("United".into()),
            color: Some("#005daa".into()),
            ..Default::default()
        });
        assert_eq!(rec.icao_code, "UAL");
        assert_eq!(rec.iata_code, "UA");
        assert_eq!(rec.brand_color, "#005daa");
        assert_eq!(rec.icon_asset_key, "UAL");
        assert_eq!(rec.logo_asset_key, "UAL");

        let bare = ReferenceRecord::from(RawAirline::default());
        assert_eq!(bare.brand_color, DEFAULT_BRAND_COLOR);
        assert_eq!(bare.asset_code(), None);
    }

    #[test]
    fn payload_shapes_normalize_to_the_same_records() {
        let wrapped: AirlinesPayload =
            serde_json::from_str(r#"{"airlines":[{"icao":"AAL","iata":"AA","name":"American"}]}"#)
                .unwrap();
        let list: AirlinesPayload =
            serde_json::from_str(r#"[{"icao":"AAL","iata":"AA","name":"American"}]"#).unwrap();
        let keyed: AirlinesPayload =
            serde_json::from_str(r#"{"AAL":{"iata":"AA","name":"American"}}"#).unwrap();

        let a = wrapped.into_records();
        assert_eq!(a, list.into_records());
        assert_eq!(a, keyed.into_records());
    }

    #[test]
    fn unknown_payload_shapes_are_empty() {
        for body in ["42", "\"airlines\"", "null", r#"{"airlines": 7}"#] {
            assert!(records_of(body).is_empty(), "{body}");
        }
    }

    #[test]
    fn null_entry_does_not_drop_its_neighbours() {
        let records = records_of(r#"{"airlines":[null,{"icao":"AAL","iata":"AA","name":"American"}]}"#);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].icao_code, "AAL");

        let records = records_of(r#"[{"icao":"AAL"}, 5, "junk", [1, 2]]"#);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn numeric_codes_are_read_as_text() {
        let records = records_of(r#"[{"icao":"AAL","iata":"AA"},{"icao":"DAL","iata":12}]"#);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].icao_code, "DAL");
        assert_eq!(records[1].iata_code, "12");

        let index = AirlineIndex::new(records);
        assert_eq!(index.resolve_callsign("AAL1").unwrap().iata_code, "AA");
    }

    #[test]
    fn keyed_layout_skips_non_object_values() {
        let records = records_of(r#"{"AAL":{"iata":"AA","name":"American"},"_meta":"v2"}"#);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].icao_code, "AAL");
        assert_eq!(records[0].iata_code, "AA");
    }

    #[test]
    fn descriptor_builds_asset_urls() {
        let index = fixture();
        let desc = AirlineDescriptor::from_record(index.by_iata("B6").unwrap(), "/api/airline/");
        assert_eq!(desc.icao, None);
        assert_eq!(desc.iata.as_deref(), Some("B6"));
        assert_eq!(desc.icon_url.as_deref(), Some("/api/airline/icons/B6"));
        assert_eq!(desc.logo_url.as_deref(), Some("/api/airline/logos/B6"));
        assert_eq!(desc.primary_color, DEFAULT_BRAND_COLOR);
    }

    #[test]
    fn unresolved_serializes_with_status_tag() {
        let json = serde_json::to_value(AirlineMatch::Unresolved).unwrap();
        assert_eq!(json, serde_json::json!({"status": "unresolved"}));
    }

    #[test]
    fn carrier_code_prefers_index_then_table() {
        let index = fixture();
        assert_eq!(carrier_code(&index, "Delta Air Lines"), "DL");
        assert_eq!(carrier_code(&index, "Spirit Airlines"), "NK");
        assert_eq!(carrier_code(&index, "Breeze Airways"), "BR");
    }
}
