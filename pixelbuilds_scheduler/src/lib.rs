pub mod config;
pub mod parser;
pub mod runner;
pub mod scheduler;

#[cfg(test)]
mod testing;

pub use config::{ExporterConfig, ExporterConfigBuilder};
pub use parser::{load_config_from_file, parse_config_from_str};
pub use runner::{CycleReport, CycleRunner, UnavailableSource};
pub use scheduler::Scheduler;
