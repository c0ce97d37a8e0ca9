//! Airframe lookups from the OpenSky aircraft-database CSV.

use crate::error::{RefDataError, Result};
use csv::ReaderBuilder;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AircraftInfo {
    pub operator: String,
    /// Manufacturer and model joined, e.g. "Boeing 737-832".
    pub description: String,
    pub typecode: String,
    pub registration: String,
}

/// `icao24` transponder address → airframe details.
#[derive(Debug, Default)]
pub struct AircraftRegistry {
    by_icao24: HashMap<String, AircraftInfo>,
}

impl AircraftRegistry {
    /// Loads the CSV at `path`, logging and returning an empty registry when
    /// it cannot be read.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(registry) => {
                info!("Loaded {} airframes from {}", registry.len(), path.display());
                registry
            }
            Err(e) => {
                error!("Failed to load aircraft database: {}", e);
                Self::default()
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|source| RefDataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, path)
    }

    fn from_reader<R: Read>(reader: R, path: &Path) -> Result<Self> {
        let csv_err = |source| RefDataError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let mut rdr = ReaderBuilder::new()
            .quote(b'\'')
            .flexible(true)
            .from_reader(reader);
        let headers = rdr.headers().map_err(csv_err)?.clone();

        // Header lookup ignores case and a leading byte-order mark.
        let find_col = |name: &str| {
            headers.iter().position(|h| {
                h.trim_start_matches('\u{feff}')
                    .trim_matches('\'')
                    .trim()
                    .eq_ignore_ascii_case(name)
            })
        };

        let icao24_idx = find_col("icao24").ok_or_else(|| RefDataError::MissingColumn {
            path: path.to_path_buf(),
            column: "icao24",
        })?;
        let operator_idx = find_col("operator");
        let owner_idx = find_col("owner");
        let manufacturer_idx = find_col("manufacturername");
        let model_idx = find_col("model");
        let typecode_idx = find_col("typecode");
        let registration_idx = find_col("registration");

        let mut by_icao24 = HashMap::new();
        for record in rdr.records().flatten() {
            let get_val = |idx: Option<usize>| {
                idx.and_then(|i| record.get(i))
                    .map(|s| s.trim_matches(|c| c == '\'' || c == '"').trim())
                    .filter(|s| !s.is_empty())
            };

            let Some(icao24) = get_val(Some(icao24_idx)).map(str::to_lowercase) else {
                continue;
            };

            let manufacturer = get_val(manufacturer_idx).unwrap_or("");
            let model = get_val(model_idx).unwrap_or("");

            by_icao24.insert(
                icao24,
                AircraftInfo {
                    operator: get_val(operator_idx)
                        .or_else(|| get_val(owner_idx))
                        .unwrap_or("")
                        .to_string(),
                    description: format!("{} {}", manufacturer, model).trim().to_string(),
                    typecode: get_val(typecode_idx).unwrap_or("").to_string(),
                    registration: get_val(registration_idx).unwrap_or("").to_string(),
                },
            );
        }

        Ok(Self { by_icao24 })
    }

    pub fn get(&self, icao24: &str) -> Option<&AircraftInfo> {
        self.by_icao24.get(&icao24.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.by_icao24.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_icao24.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\u{feff}'icao24','registration','manufacturername','model','typecode','operator','owner'\n\
'a1b2c3','N123DL','Boeing','737-832','B738','Delta Air Lines',''\n\
'abc123','N9XX','Cessna','172S','C172','','Flight School LLC'\n\
'','N000','Ghost','Plane','','',''\n";

    fn sample() -> AircraftRegistry {
        AircraftRegistry::from_reader(SAMPLE.as_bytes(), Path::new("sample.csv")).unwrap()
    }

    #[test]
    fn loads_quoted_rows() {
        let reg = sample();
        assert_eq!(reg.len(), 2);
        let info = reg.get("A1B2C3").unwrap();
        assert_eq!(info.description, "Boeing 737-832");
        assert_eq!(info.typecode, "B738");
        assert_eq!(info.operator, "Delta Air Lines");
    }

    #[test]
    fn owner_stands_in_for_operator() {
        assert_eq!(sample().get("abc123").unwrap().operator, "Flight School LLC");
    }

    #[test]
    fn missing_icao24_column_is_an_error() {
        let err = AircraftRegistry::from_reader("a,b\n1,2\n".as_bytes(), Path::new("x.csv"));
        assert!(matches!(err, Err(RefDataError::MissingColumn { column: "icao24", .. })));
    }

    #[test]
    fn missing_file_gives_empty_registry() {
        assert!(AircraftRegistry::load_or_empty(Path::new("/no/such/aircraft.csv")).is_empty());
    }
}
