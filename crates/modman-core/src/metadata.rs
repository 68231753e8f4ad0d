//! Generation metadata attached to image uploads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One LoRA applied during generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoraUsage {
    /// Remote model identifier of the LoRA.
    pub model_id: u64,
    /// Remote version identifier, when one was selected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<u64>,
    /// Display name of the LoRA.
    pub name: String,
    /// Strength the LoRA was applied with.
    pub strength: f64,
}

/// Generation parameters uploaded alongside an image.
///
/// Every field is optional; absent fields are omitted from the upload
/// entirely rather than sent as nulls.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cfg_scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampler: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduler: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nsfw_level: Option<u32>,
    /// LoRAs applied during generation.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub loras: Vec<LoraUsage>,
    /// Host workflow document, passed through verbatim.
    #[serde(rename = "comfyWorkflow", skip_serializing_if = "Option::is_none")]
    pub workflow: Option<Value>,
}

impl GenerationMetadata {
    /// Flatten into multipart form fields.
    ///
    /// Composite values (lists, mappings) are JSON-encoded, booleans become
    /// lowercase `true`/`false`, other scalars use their natural string form,
    /// and absent values are omitted.
    pub fn to_form_fields(&self) -> Vec<(String, String)> {
        let Ok(Value::Object(map)) = serde_json::to_value(self) else {
            return Vec::new();
        };

        map.into_iter()
            .filter_map(|(key, value)| stringify_field(value).map(|text| (key, text)))
            .collect()
    }
}

/// Stringify one metadata value for the upload form; `None` means omit.
fn stringify_field(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s),
        composite @ (Value::Array(_) | Value::Object(_)) => {
            serde_json::to_string(&composite).ok()
        }
    }
}

/// Concatenate optional LoRA-usage lists in order, skipping absent ones.
///
/// The host collects usage records from a variable number of inputs; the
/// merge is plain ordered concatenation.
pub fn merge_lora_usage<I>(lists: I) -> Vec<LoraUsage>
where
    I: IntoIterator<Item = Option<Vec<LoraUsage>>>,
{
    lists.into_iter().flatten().flatten().collect()
}
