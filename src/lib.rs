pub mod config;
pub mod hosting;
pub mod logging;
pub mod provenance;
pub mod report;
