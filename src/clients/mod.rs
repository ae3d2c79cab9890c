//! Client modules for the SolarWinds Observability API.
//!
//! - [`config`]: environment-sourced, immutable client configuration
//! - [`swo`]: the authenticated REST client and the typed domain records
//! - [`archive`]: bare-client log archive download and NDJSON parsing
//!
//! The REST client carries a bearer header on every request; the archive
//! path uses a separate header-free client because pre-signed URLs reject
//! extra headers.

pub mod archive;
pub mod config;
pub mod swo;

pub use archive::download_and_unzip_archive;
pub use config::{ConfigError, SwoConfig};
pub use swo::{
    AlertDefinition, AlertSeverity, AlertUpdate, Entity, EntityStatus, EntityType, LogArchive,
    LogEntry, LogSearch, MetricSample, NewAlert, SwoClient, SwoError, TimeRange, TraceSpan,
};
