// src/lib.rs
pub mod config;
pub mod error;
pub mod logging;
pub mod output_format;
pub mod region;
pub mod request;
pub mod reshape;
pub mod time_range;

pub use error::*;

pub use config::{QueryConfig, QuerySource, RunMode};
pub use output_format::{write_records, OutputFormat};
pub use region::Region;
pub use request::{QueryClient, QueryMetadata, QueryRequest, QuerySyntax, Tier};
pub use reshape::{reshape, OutputRecord, ProjectionFlags, RawResultEntry};
pub use time_range::TimeRange;
