//! Attaches airline and airframe data to OpenSky state vectors.

use crate::aircraft;
use crate::airlines::{AirlineDescriptor, AirlineIndex, AirlineMatch};
use crate::models::Flight;
use crate::registry::AircraftRegistry;
use crate::store::AirlineStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Serialize)]
pub struct AircraftSummary {
    /// Display code, e.g. "B737-800".
    pub code: String,
    pub description: String,
    pub typecode: String,
    pub operator: String,
    pub registration: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrichedState {
    #[serde(flatten)]
    pub flight: Flight,
    pub airline: AirlineMatch,
    pub aircraft: Option<AircraftSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatesSnapshot {
    pub fetched_at: DateTime<Utc>,
    /// Upstream's own timestamp for the state vectors.
    pub time: Option<i64>,
    pub count: usize,
    pub resolved: usize,
    pub states: Vec<EnrichedState>,
}

/// Enriches one batch of flights against a single index version.
pub fn enrich_flights(
    index: &AirlineIndex,
    registry: &AircraftRegistry,
    asset_base_url: &str,
    flights: Vec<Flight>,
) -> Vec<EnrichedState> {
    flights
        .into_iter()
        .map(|flight| {
            let airline = match index.resolve_callsign(&flight.callsign) {
                Some(record) => {
                    AirlineMatch::Resolved(AirlineDescriptor::from_record(record, asset_base_url))
                }
                None => AirlineMatch::Unresolved,
            };

            let aircraft = registry.get(&flight.icao24).map(|info| AircraftSummary {
                code: aircraft::canonicalize(&info.description),
                description: info.description.clone(),
                typecode: info.typecode.clone(),
                operator: info.operator.clone(),
                registration: info.registration.clone(),
            });

            EnrichedState {
                flight,
                airline,
                aircraft,
            }
        })
        .collect()
}

pub struct StateEnricher {
    store: Arc<AirlineStore>,
    registry: Arc<AircraftRegistry>,
    asset_base_url: String,
}

impl StateEnricher {
    pub fn new(store: Arc<AirlineStore>, registry: Arc<AircraftRegistry>, asset_base_url: String) -> Self {
        Self {
            store,
            registry,
            asset_base_url,
        }
    }

    pub fn store(&self) -> &AirlineStore {
        &self.store
    }

    /// Picks up a changed airlines file, then enriches the whole batch
    /// against one snapshot of the index.
    pub fn enrich(&self, time: Option<i64>, flights: Vec<Flight>) -> StatesSnapshot {
        if self.store.reload_if_changed() {
            debug!("Airline index reloaded before enrichment");
        }
        let index = self.store.snapshot();

        let states = enrich_flights(&index, &self.registry, &self.asset_base_url, flights);
        let resolved = states.iter().filter(|s| s.airline.is_resolved()).count();

        StatesSnapshot {
            fetched_at: Utc::now(),
            time,
            count: states.len(),
            resolved,
            states,
        }
    }
}
