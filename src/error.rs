#[derive(Debug, thiserror::Error)]
pub enum ReshapeError {
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid JSON in {stage}: {source} (text: {snippet})")]
    InvalidJson {
        stage: JsonStage,
        snippet: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ReshapeError {
    pub fn malformed(message: impl Into<String>) -> Self {
        ReshapeError::MalformedResponse(message.into())
    }

    pub fn invalid_json(stage: JsonStage, text: &str, source: serde_json::Error) -> Self {
        ReshapeError::InvalidJson {
            stage,
            snippet: snippet(text),
            source,
        }
    }
}

const SNIPPET_CHARS: usize = 200;

fn snippet(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(SNIPPET_CHARS).collect();
    if chars.next().is_some() {
        format!("{:?}...", head)
    } else {
        format!("{:?}", head)
    }
}

/// Where in the response a JSON decode failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonStage {
    /// The result frame (frame 1) of the response body
    Envelope,
    /// The `userData` string of the result entry at `index`
    UserData { index: usize },
}

impl std::fmt::Display for JsonStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JsonStage::Envelope => write!(f, "result envelope"),
            JsonStage::UserData { index } => write!(f, "userData of result {}", index),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Query API returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error(transparent)]
    Reshape(#[from] ReshapeError),

    #[error("Output encoding error: {0}")]
    Encode(String),
}

impl From<serde_yaml::Error> for QueryError {
    fn from(err: serde_yaml::Error) -> Self {
        QueryError::Encode(err.to_string())
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        QueryError::Encode(err.to_string())
    }
}
