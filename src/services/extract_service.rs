use std::ops::Range;

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Deserializer, Value};

use crate::models::{ChartPayload, CHART_PAYLOAD_TYPE};
use crate::utils::errors::PayloadError;

lazy_static! {
    /// ```json ... ``` blocks; group 1 is the body
    static ref FENCED_JSON: Regex = Regex::new(r"(?is)```[ \t]*json\b\s*(.*?)```").unwrap();
    static ref TYPE_KEY: Regex = Regex::new(r#""type"\s*:"#).unwrap();
    static ref DATA_KEY: Regex = Regex::new(r#""data"\s*:"#).unwrap();
    static ref CHART_CLAIM: Regex =
        Regex::new(&format!(r#""type"\s*:\s*"{}""#, CHART_PAYLOAD_TYPE)).unwrap();
}

/// Outcome of looking for a chart payload inside one chat message
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// A payload was accepted; `residual` is the text around it, trimmed
    Found { payload: ChartPayload, residual: String },
    /// Nothing in the text claims to be a chart
    NotFound,
    /// The text claims to carry a chart but no fragment passed validation
    Malformed { reason: PayloadError },
}

impl Extraction {
    /// Collapse into `(payload, text to display)`
    pub fn into_parts(self, original: &str) -> (Option<ChartPayload>, String) {
        match self {
            Extraction::Found { payload, residual } => (Some(payload), residual),
            Extraction::NotFound | Extraction::Malformed { .. } => (None, original.to_string()),
        }
    }
}

/// Find the first chart payload in `text`
///
/// Fenced ```json blocks are tried in order first, then bare JSON objects from
/// left to right. At most one payload is returned.
pub fn extract_chart(text: &str) -> Extraction {
    let mut last_error: Option<PayloadError> = None;

    for caps in FENCED_JSON.captures_iter(text) {
        let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let parsed = serde_json::from_str::<Value>(body.as_str().trim())
            .map_err(|e| PayloadError::Syntax(e.to_string()))
            .and_then(accept);

        match parsed {
            Ok(payload) => return found(text, whole.range(), payload),
            Err(e) => {
                tracing::debug!("Fenced JSON block rejected: {}", e);
                remember(&mut last_error, e);
            }
        }
    }

    if TYPE_KEY.is_match(text) && DATA_KEY.is_match(text) {
        for (range, value) in inline_objects(text) {
            match accept(value) {
                Ok(payload) => return found(text, range, payload),
                Err(e) => remember(&mut last_error, e),
            }
        }
    }

    if CHART_CLAIM.is_match(text) {
        let reason = last_error
            .unwrap_or_else(|| PayloadError::Syntax("no complete chart object found".to_string()));
        tracing::debug!("Chart payload present but unusable: {}", reason);
        return Extraction::Malformed { reason };
    }

    Extraction::NotFound
}

/// `(payload, text to display)`; the text is unchanged unless a payload was found
pub fn extract(text: &str) -> (Option<ChartPayload>, String) {
    extract_chart(text).into_parts(text)
}

fn found(text: &str, range: Range<usize>, payload: ChartPayload) -> Extraction {
    let residual = format!("{}{}", &text[..range.start], &text[range.end..])
        .trim()
        .to_string();
    tracing::debug!(
        "Extracted chart payload for {} ({} points)",
        payload.ticker,
        payload.data.len()
    );
    Extraction::Found { payload, residual }
}

/// Keep the most useful rejection reason: anything beats "wrong type"
fn remember(slot: &mut Option<PayloadError>, error: PayloadError) {
    if slot.is_some() && matches!(error, PayloadError::WrongType(_)) {
        return;
    }
    *slot = Some(error);
}

/// Acceptance test shared by both fragment forms
fn accept(value: Value) -> Result<ChartPayload, PayloadError> {
    let obj = value
        .as_object()
        .ok_or_else(|| PayloadError::Schema("expected a JSON object".to_string()))?;

    match obj.get("type").and_then(Value::as_str) {
        Some(CHART_PAYLOAD_TYPE) => {}
        Some(other) => return Err(PayloadError::WrongType(other.to_string())),
        None => return Err(PayloadError::MissingField("type")),
    }
    if !obj.contains_key("data") {
        return Err(PayloadError::MissingField("data"));
    }
    if !obj.contains_key("ticker") {
        return Err(PayloadError::MissingField("ticker"));
    }

    ChartPayload::from_value(value)
}

/// Complete JSON objects starting at each `{`, left to right, with byte ranges
///
/// Parsed lazily so the caller can stop at the first accepted candidate.
/// Objects without a top-level `type` key are skipped, and the scan ends at
/// the last `"type":` in the text.
fn inline_objects(text: &str) -> impl Iterator<Item = (Range<usize>, Value)> + '_ {
    let last_type_key = TYPE_KEY.find_iter(text).last().map(|m| m.start());
    let mut pos = 0;

    std::iter::from_fn(move || {
        let last_type_key = last_type_key?;
        while let Some(offset) = text[pos..].find('{') {
            let start = pos + offset;
            pos = start + 1;

            if start > last_type_key {
                return None;
            }

            let mut stream = Deserializer::from_str(&text[start..]).into_iter::<Value>();
            if let Some(Ok(value)) = stream.next() {
                if value.get("type").is_some() {
                    return Some((start..start + stream.byte_offset(), value));
                }
            }
        }
        None
    })
}
