// Library exports for Folio
// This allows integration tests and external code to use Folio modules

pub mod calculator;
pub mod config;
pub mod domain;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;
pub mod store;
pub mod uploads;
