//! Core domain logic for Visitrack, a person/location/visit tracker.
//! This crate owns every uniqueness and referential-consistency rule.

pub mod collection;
pub mod command;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod storage;
pub mod store;

pub use collection::{CollectionError, UniqueCollection, UniqueRecord, VisitCollection};
pub use command::{parse_command, Command, EntityTarget, ParseError};
pub use config::{AppConfig, ConfigError, StorageBackend};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::{EntityId, HealthStatus, Location, Person, ValidationError, Visit};
pub use service::{CommandError, CommandOutcome, TrackerService};
pub use storage::{
    bootstrap_store, open_sqlite_or_fallback, DataStorage, JsonStorage, SqliteStorage,
    StorageError,
};
pub use store::{EntityStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
