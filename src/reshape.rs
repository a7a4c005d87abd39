//! Turn a raw query response body into output records.
//!
//! The body is newline-delimited: frame 0 carries query metadata, frame 1 is
//! the envelope `{"result": {"results": [...]}}`. Each result's `userData`
//! is itself a JSON-encoded string and is decoded a second time before
//! projection.

use crate::error::{JsonStage, ReshapeError};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One element of `result.results`, before projection
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawResultEntry {
    /// JSON text, decoded separately
    pub user_data: String,
    #[serde(default)]
    pub metadata: Value,
    #[serde(default)]
    pub labels: Value,
}

/// Which fields of an entry end up in its output record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionFlags {
    pub body_only: bool,
    pub include_metadata: bool,
    pub include_labels: bool,
}

/// A reshaped entry, ready for the output encoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputRecord {
    Body {
        body: Value,
    },
    Full {
        #[serde(rename = "userData")]
        user_data: Value,
        #[serde(
            default,
            skip_serializing_if = "Option::is_none",
            deserialize_with = "present"
        )]
        metadata: Option<Value>,
        #[serde(
            default,
            skip_serializing_if = "Option::is_none",
            deserialize_with = "present"
        )]
        labels: Option<Value>,
    },
}

// A key that is present maps to Some, even when its value is null.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Split a response body into frames, keeping empty ones
pub fn split_frames(raw: &str) -> Vec<&str> {
    raw.split('\n')
        .map(|frame| frame.strip_suffix('\r').unwrap_or(frame))
        .collect()
}

/// Best-effort query id from the metadata frame, for diagnostics only
pub fn query_id(frames: &[&str]) -> Option<String> {
    let meta: Value = serde_json::from_str(frames.first()?).ok()?;
    match meta.get("queryId")? {
        Value::String(id) => Some(id.clone()),
        Value::Object(inner) => inner.get("queryId")?.as_str().map(str::to_string),
        _ => None,
    }
}

/// Parse frame 1 and pull out the `result.results` array
pub fn decode_envelope(frames: &[&str]) -> Result<Vec<RawResultEntry>, ReshapeError> {
    // A trailing newline leaves an empty frame 1; that is still a one-line body
    let text = frames
        .get(1)
        .filter(|frame| !frame.trim().is_empty())
        .ok_or_else(|| ReshapeError::malformed("missing result frame"))?;

    let envelope: Value = serde_json::from_str(text)
        .map_err(|e| ReshapeError::invalid_json(JsonStage::Envelope, text, e))?;

    let results = match envelope.pointer("/result/results") {
        Some(Value::Array(results)) => results,
        _ => return Err(ReshapeError::malformed(shape_error(&envelope))),
    };

    results
        .iter()
        .enumerate()
        .map(|(index, item)| {
            RawResultEntry::deserialize(item).map_err(|e| {
                ReshapeError::malformed(format!("result {} is not a valid entry: {}", index, e))
            })
        })
        .collect()
}

fn shape_error(envelope: &Value) -> String {
    match envelope.get("error") {
        Some(err) => {
            let detail = err
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| err.to_string());
            format!("unexpected envelope shape (error: {})", detail)
        }
        None => "unexpected envelope shape".to_string(),
    }
}

/// Project a single entry. `index` is only used for error reporting.
pub fn project_entry(
    index: usize,
    entry: &RawResultEntry,
    flags: ProjectionFlags,
) -> Result<OutputRecord, ReshapeError> {
    let user_data: Value = serde_json::from_str(&entry.user_data).map_err(|e| {
        ReshapeError::invalid_json(JsonStage::UserData { index }, &entry.user_data, e)
    })?;

    if flags.body_only {
        let body = user_data.get("body").cloned().unwrap_or(Value::Null);
        return Ok(OutputRecord::Body { body });
    }

    Ok(OutputRecord::Full {
        user_data,
        metadata: flags.include_metadata.then(|| entry.metadata.clone()),
        labels: flags.include_labels.then(|| entry.labels.clone()),
    })
}

/// Full pipeline: frames, envelope, projection. Any failing entry fails the batch.
pub fn reshape(raw: &str, flags: ProjectionFlags) -> Result<Vec<OutputRecord>, ReshapeError> {
    let frames = split_frames(raw);
    let entries = decode_envelope(&frames)?;

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| project_entry(index, entry, flags))
        .collect()
}
