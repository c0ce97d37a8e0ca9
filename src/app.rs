use crate::events::Event;
use crate::states::StateEnricher;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// State of the `watch` loop.
pub struct App {
    pub enricher: Arc<StateEnricher>,
    pub tick_count: usize,
    pub should_quit: bool,
    /// Reference-file check cadence, in ticks.
    pub reload_every: usize,

    // Poll telemetry
    pub last_update: Option<Instant>,
    pub last_update_success: bool,
    pub failed_polls: usize,
}

impl App {
    pub fn new(enricher: Arc<StateEnricher>, reload_every: usize) -> Self {
        Self {
            enricher,
            tick_count: 0,
            should_quit: false,
            reload_every: reload_every.max(1),
            last_update: None,
            last_update_success: false,
            failed_polls: 0,
        }
    }

    pub fn on_tick(&mut self) {
        self.tick_count += 1;

        if self.tick_count % self.reload_every == 0 && self.enricher.store().reload_if_changed() {
            info!(
                "Airline index reloaded ({} records)",
                self.enricher.store().snapshot().len()
            );
        }
    }

    /// Applies an event. Returns the JSON line to emit, if any.
    pub fn handle(&mut self, event: Event) -> Option<String> {
        match event {
            Event::Tick => {
                self.on_tick();
                None
            }
            Event::Shutdown => {
                info!("Shutdown requested");
                self.should_quit = true;
                None
            }
            Event::StatesUpdate {
                snapshot,
                timestamp,
            } => {
                self.last_update = Some(timestamp);
                match snapshot {
                    Some(snapshot) => {
                        self.last_update_success = true;
                        info!(
                            "Poll ok: {} states, {} resolved",
                            snapshot.count, snapshot.resolved
                        );
                        serde_json::to_string(&snapshot)
                            .map_err(|e| warn!("Could not serialize snapshot: {}", e))
                            .ok()
                    }
                    None => {
                        self.last_update_success = false;
                        self.failed_polls += 1;
                        None
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airlines::AirlineIndex;
    use crate::registry::AircraftRegistry;
    use crate::store::AirlineStore;

    fn app() -> App {
        let store = Arc::new(AirlineStore::from_index("/no/such/airlines.json", AirlineIndex::default()));
        let enricher = StateEnricher::new(store, Arc::new(AircraftRegistry::default()), String::new());
        App::new(Arc::new(enricher), 2)
    }

    #[test]
    fn successful_update_emits_json() {
        let mut app = app();
        let snapshot = app.enricher.enrich(None, Vec::new());
        let line = app.handle(Event::StatesUpdate {
            snapshot: Some(snapshot),
            timestamp: Instant::now(),
        });

        let json: serde_json::Value = serde_json::from_str(&line.unwrap()).unwrap();
        assert_eq!(json["count"], 0);
        assert!(app.last_update_success);
    }

    #[test]
    fn failed_update_is_counted() {
        let mut app = app();
        let line = app.handle(Event::StatesUpdate {
            snapshot: None,
            timestamp: Instant::now(),
        });
        assert!(line.is_none());
        assert_eq!(app.failed_polls, 1);
        assert!(!app.last_update_success);
    }

    #[test]
    fn shutdown_and_ticks() {
        let mut app = app();
        app.handle(Event::Tick);
        app.handle(Event::Tick);
        assert_eq!(app.tick_count, 2);
        app.handle(Event::Shutdown);
        assert!(app.should_quit);
    }
}
