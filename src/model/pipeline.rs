use serde_json::Value;

use super::{Stage, StageRow};
use crate::error::{Result, SyncError};

/// The whole pipeline document. Only `pipeline.stages` is interpreted; every
/// other field is carried through untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig(Value);

impl PipelineConfig {
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(SyncError::MalformedContent(
                "top-level JSON value is not an object".to_string(),
            ));
        }
        match value.get("pipeline").and_then(|p| p.get("stages")) {
            Some(Value::Array(_)) => Ok(Self(value)),
            Some(_) => Err(SyncError::MalformedContent(
                "`pipeline.stages` is not an array".to_string(),
            )),
            None => Err(SyncError::MalformedContent(
                "missing `pipeline.stages`".to_string(),
            )),
        }
    }

    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| SyncError::MalformedContent(format!("parse JSON: {}", e)))?;
        Self::from_value(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn stages(&self) -> &[Value] {
        self.0["pipeline"]["stages"]
            .as_array()
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Editor rows for the stages currently in the document.
    pub fn rows(&self) -> Vec<StageRow> {
        self.stages().iter().map(StageRow::from_json).collect()
    }

    /// A copy of this document with `pipeline.stages` replaced.
    pub fn with_stages(&self, stages: &[Stage]) -> Result<Self> {
        let stages = serde_json::to_value(stages)
            .map_err(|e| SyncError::Validation(format!("serialize stages: {}", e)))?;
        let mut next = self.0.clone();
        let pipeline = next
            .get_mut("pipeline")
            .and_then(Value::as_object_mut)
            .ok_or_else(|| SyncError::MalformedContent("missing `pipeline` object".to_string()))?;
        pipeline.insert("stages".to_string(), stages);
        Ok(Self(next))
    }

    /// Two-space indented JSON, keys in document order.
    pub fn to_pretty_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.0)
            .map_err(|e| SyncError::Validation(format!("serialize pipeline config: {}", e)))
    }
}
