pub mod configuration;
pub mod domain;
pub mod form;
pub mod routes;
pub mod startup;
pub mod store_client;
pub mod telemetry;
pub mod ui;
pub mod utils;
