//! Reference data normalization for flight and hotel feeds.
//!
//! Three lookups map loosely structured upstream records onto canonical
//! display data:
//!
//! - [`airlines`]: flight callsign → airline record, backed by the
//!   hot-reloadable [`store::AirlineStore`]
//! - [`brands`]: hotel brand/chain/name text → logo asset
//! - [`aircraft`]: free-text aircraft description → compact model code
//!
//! [`states`], [`hotels`] and [`itineraries`] run those lookups over whole
//! upstream responses fetched by [`api`].

pub mod aircraft;
pub mod airlines;
pub mod api;
pub mod app;
pub mod brands;
pub mod config;
pub mod error;
pub mod events;
pub mod hotels;
pub mod itineraries;
pub mod location;
pub mod logging;
pub mod models;
pub mod registry;
pub mod states;
pub mod store;
