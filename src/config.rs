use crate::error::QueryError;
use crate::output_format::OutputFormat;
use crate::region::Region;
use crate::request::QueryMetadata;
use crate::reshape::ProjectionFlags;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the query text comes from
#[derive(Debug, Clone, PartialEq)]
pub enum QuerySource {
    Inline(String),
    File(PathBuf),
}

/// What to do with the assembled request
#[derive(Debug, Clone, PartialEq)]
pub enum RunMode {
    /// POST the request and reshape the live response
    Send { api_key: String },
    /// Print the request body and stop
    DryRun,
    /// Reshape a previously saved response body (`-` reads stdin)
    Replay(PathBuf),
}

/// Fully resolved configuration for one invocation
#[derive(Debug, Clone)]
pub struct QueryConfig {
    pub query: String,
    pub endpoint: String,
    pub metadata: QueryMetadata,
    pub flags: ProjectionFlags,
    pub format: OutputFormat,
    pub timeout: Duration,
    pub output: Option<PathBuf>,
    pub mode: RunMode,
}

/// Load and trim the query text; empty queries are rejected
pub fn load_query(source: &QuerySource) -> Result<String, QueryError> {
    let text = match source {
        QuerySource::Inline(text) => text.clone(),
        QuerySource::File(path) => std::fs::read_to_string(path).map_err(|e| {
            QueryError::Config(format!(
                "Failed to read query file '{}': {}",
                path.display(),
                e
            ))
        })?,
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(QueryError::Config("Query is empty".to_string()));
    }
    Ok(text.to_string())
}

/// An explicit endpoint wins over the region table
pub fn resolve_endpoint(endpoint: Option<&str>, region: Region) -> String {
    match endpoint {
        Some(url) if !url.trim().is_empty() => url.trim().to_string(),
        _ => region.query_url(),
    }
}

/// Read a saved raw response body for replay
pub fn read_replay(path: &Path) -> Result<String, QueryError> {
    if path == Path::new("-") {
        let mut body = String::new();
        std::io::stdin().read_to_string(&mut body)?;
        return Ok(body);
    }
    std::fs::read_to_string(path).map_err(|e| {
        QueryError::Config(format!(
            "Failed to read response file '{}': {}",
            path.display(),
            e
        ))
    })
}
