//! Adapters: one parser per supported GraalVM profiling tool, selected by
//! the JSON `"tool"` tag, each producing the canonical [`CallTree`].

pub mod cpusampler;
pub mod cputracer;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::CallTree;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("input is not a JSON object")]
    NotAnObject,
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("field {0} has an unexpected type")]
    WrongType(&'static str),
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("timestamp order needs hit times (--cpusampler.GatherHitTimes)")]
    MissingHitTimes,
}

/// Adapter-level options. These shape how the canonical tree is built, not
/// how it is laid out.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Append `source:line` information to frame names.
    pub source_info: bool,
    /// Emit one stack per sample in timestamp order instead of merged-stack
    /// order. Requires the profile to carry hit times.
    pub timestamp_order: bool,
    /// Reverse each stack before building, switching the merge end.
    pub stack_reverse: bool,
    /// Keep identical call paths separate (flame chart) instead of merging.
    pub flame_chart: bool,
}

/// Parse profiler output, dispatching on the `"tool"` identifier.
pub fn parse_tool(data: &[u8], options: ParseOptions) -> Result<CallTree, ParseError> {
    let value: Value = serde_json::from_slice(data)?;
    let obj = value.as_object().ok_or(ParseError::NotAnObject)?;
    match fetch_str(obj, "tool")? {
        "cpusampler" => cpusampler::parse(obj, options),
        "cputracer" => cputracer::parse(obj),
        other => Err(ParseError::UnknownTool(other.to_string())),
    }
}

pub(crate) fn fetch<'a>(
    obj: &'a Map<String, Value>,
    key: &'static str,
) -> Result<&'a Value, ParseError> {
    obj.get(key).ok_or(ParseError::MissingField(key))
}

pub(crate) fn fetch_str<'a>(
    obj: &'a Map<String, Value>,
    key: &'static str,
) -> Result<&'a str, ParseError> {
    fetch(obj, key)?.as_str().ok_or(ParseError::WrongType(key))
}

pub(crate) fn fetch_f64(obj: &Map<String, Value>, key: &'static str) -> Result<f64, ParseError> {
    fetch(obj, key)?.as_f64().ok_or(ParseError::WrongType(key))
}

pub(crate) fn fetch_array<'a>(
    obj: &'a Map<String, Value>,
    key: &'static str,
) -> Result<&'a Vec<Value>, ParseError> {
    fetch(obj, key)?
        .as_array()
        .ok_or(ParseError::WrongType(key))
}

pub(crate) fn as_object<'a>(
    value: &'a Value,
    context: &'static str,
) -> Result<&'a Map<String, Value>, ParseError> {
    value.as_object().ok_or(ParseError::WrongType(context))
}
