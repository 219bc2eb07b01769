// ── Wire envelopes ──
//
// CLIP v2 wraps every response as `{ "errors": [...], "data": ... }`; the
// event stream delivers a JSON array of batches per SSE frame, each batch
// carrying a list of partial resources.

use serde::{Deserialize, Serialize};

use super::resource::Resource;

pub const BATCH_UPDATE: &str = "update";

/// A single error entry in a CLIP v2 response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDescription {
    pub description: String,
}

/// The `{ errors, data }` envelope around every CLIP v2 response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub errors: Vec<ErrorDescription>,
    #[serde(default)]
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            errors: Vec::new(),
            data,
        }
    }

    /// First error description, if the bridge reported any.
    pub fn first_error(&self) -> Option<&str> {
        self.errors.first().map(|e| e.description.as_str())
    }
}

/// `{ rid, rtype }` pointer returned by update endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub rid: String,
    pub rtype: String,
}

/// One batch of the event stream.
///
/// `data` holds patches: partial resources keyed by `id`, carrying only the
/// attribute groups that changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamBatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creationtime: Option<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// `"update"`, `"add"`, `"delete"` or `"error"`.
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub data: Vec<Resource>,
}

impl StreamBatch {
    /// An `update` batch carrying the given patches.
    pub fn update(data: Vec<Resource>) -> Self {
        Self {
            kind: BATCH_UPDATE.into(),
            data,
            ..Self::default()
        }
    }
}

/// Decode the payload of one event-stream frame.
pub fn decode_frame(data: &str) -> Result<Vec<StreamBatch>, serde_json::Error> {
    serde_json::from_str(data)
}
