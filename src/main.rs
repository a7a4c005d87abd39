use clap::Parser;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use logq::config::{load_query, read_replay, resolve_endpoint};
use logq::reshape::{query_id, split_frames};
use logq::{
    reshape, write_records, OutputFormat, ProjectionFlags, QueryClient, QueryConfig, QueryError,
    QueryMetadata, QueryRequest, QuerySource, QuerySyntax, Region, RunMode, Tier, TimeRange,
};

#[derive(Parser)]
#[command(name = "logq")]
#[command(about = "Run a log-analytics query and print the matching records as YAML or JSON")]
#[command(version)]
struct Args {
    /// Query text
    #[arg(value_name = "QUERY")]
    query: Option<String>,

    /// Read the query text from a file
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    query_file: Option<PathBuf>,

    /// API key sent as a bearer token
    #[arg(long, env = "LOGQ_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Deployment region, selects the query endpoint
    #[arg(long, env = "LOGQ_REGION", value_enum, default_value = "eu1")]
    region: Region,

    /// Full query URL, overrides --region
    #[arg(long, env = "LOGQ_ENDPOINT", value_name = "URL")]
    endpoint: Option<String>,

    /// Storage tier to search
    #[arg(long, value_enum)]
    tier: Option<Tier>,

    /// Query language
    #[arg(long, value_enum)]
    syntax: Option<QuerySyntax>,

    /// Maximum number of results
    #[arg(long)]
    limit: Option<u32>,

    /// Start of the time range (RFC 3339 or free-form date)
    #[arg(long, value_name = "TIME")]
    start: Option<String>,

    /// End of the time range (RFC 3339 or free-form date)
    #[arg(long, value_name = "TIME")]
    end: Option<String>,

    /// Relative start of the time range, e.g. 15m or "2h 30m"
    #[arg(long, value_name = "DURATION", conflicts_with = "start")]
    since: Option<String>,

    /// Output format
    #[arg(long = "format", env = "LOGQ_FORMAT", value_enum, default_value = "yaml")]
    format: OutputFormat,

    /// Print only the body of each record
    #[arg(long)]
    body_only: bool,

    /// Include record metadata
    #[arg(long)]
    metadata: bool,

    /// Include record labels
    #[arg(long)]
    labels: bool,

    /// HTTP timeout
    #[arg(long, value_name = "DURATION", default_value = "30s", value_parser = humantime::parse_duration)]
    timeout: Duration,

    /// Output file (default: stdout)
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    output_file: Option<PathBuf>,

    /// Print the request body instead of sending it
    #[arg(long, conflicts_with = "replay")]
    dry_run: bool,

    /// Reshape a saved response body instead of sending a request ("-" for stdin)
    #[arg(long, value_name = "PATH")]
    replay: Option<PathBuf>,

    /// Debug mode - log request and response details to stderr
    #[arg(long)]
    debug: bool,
}

impl Args {
    fn validate(&self) -> Result<(), String> {
        let has_file = self.query_file.is_some();
        let has_query = self.query.is_some();

        match (has_file, has_query) {
            (true, true) => Err("Cannot use both --file and a query argument".to_string()),
            (false, false) if self.replay.is_none() => {
                Err("Must provide either --file or a query argument".to_string())
            }
            _ => Ok(()),
        }
    }

    fn query_source(&self) -> Option<QuerySource> {
        match (&self.query, &self.query_file) {
            (Some(text), _) => Some(QuerySource::Inline(text.clone())),
            (None, Some(path)) => Some(QuerySource::File(path.clone())),
            (None, None) => None,
        }
    }

    fn into_config(self) -> Result<QueryConfig, QueryError> {
        let query = match self.query_source() {
            Some(source) => load_query(&source)?,
            None => String::new(),
        };

        let range = TimeRange::resolve(
            self.start.as_deref(),
            self.end.as_deref(),
            self.since.as_deref(),
            chrono::Utc::now(),
        )?;

        let mode = if let Some(path) = self.replay {
            RunMode::Replay(path)
        } else if self.dry_run {
            RunMode::DryRun
        } else {
            match self.api_key {
                Some(key) if !key.trim().is_empty() => RunMode::Send {
                    api_key: key.trim().to_string(),
                },
                _ => {
                    return Err(QueryError::Config(
                        "No API key: pass --api-key or set LOGQ_API_KEY".to_string(),
                    ))
                }
            }
        };

        Ok(QueryConfig {
            query,
            endpoint: resolve_endpoint(self.endpoint.as_deref(), self.region),
            metadata: QueryMetadata::new(self.tier, self.syntax, range, self.limit),
            flags: ProjectionFlags {
                body_only: self.body_only,
                include_metadata: self.metadata,
                include_labels: self.labels,
            },
            format: self.format,
            timeout: self.timeout,
            output: self.output_file,
            mode,
        })
    }
}

fn main() {
    let args = Args::parse();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    logq::logging::init(args.debug);

    let result = args.into_config().and_then(run);
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn open_output(path: Option<&PathBuf>) -> Result<Box<dyn Write>, QueryError> {
    Ok(match path {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                QueryError::Config(format!(
                    "Failed to create output file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            Box::new(io::BufWriter::new(file))
        }
        None => Box::new(io::BufWriter::new(io::stdout())),
    })
}

fn run(config: QueryConfig) -> Result<(), QueryError> {
    let request = QueryRequest::new(config.query.clone(), config.metadata.clone());

    let body = match &config.mode {
        RunMode::DryRun => {
            let mut output = open_output(config.output.as_ref())?;
            serde_json::to_writer_pretty(&mut output, &request)?;
            writeln!(output)?;
            output.flush()?;
            return Ok(());
        }
        RunMode::Replay(path) => {
            tracing::debug!(path = %path.display(), "replaying saved response");
            read_replay(path)?
        }
        RunMode::Send { api_key } => {
            let client = QueryClient::new(&config.endpoint, api_key, config.timeout)?;
            client.execute(&request)?
        }
    };

    if let Some(id) = query_id(&split_frames(&body)) {
        tracing::debug!(query_id = %id, "query accepted");
    }

    // Reshape fully before opening the output so a failure never leaves partial output
    let records = reshape(&body, config.flags)?;
    tracing::debug!(records = records.len(), "reshaped response");

    let mut output = open_output(config.output.as_ref())?;
    write_records(&mut output, config.format, &records)?;
    output.flush()?;

    Ok(())
}
