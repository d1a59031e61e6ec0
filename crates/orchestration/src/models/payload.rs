use serde::{Deserialize, Serialize};

/// Successful result of a capability.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Payload {
    /// Markdown text (solutions, explanations, formula sheets, tips).
    #[serde(rename_all = "camelCase")]
    Text { content: String },

    /// Generated image as a `data:` URL.
    #[serde(rename_all = "camelCase")]
    Image { data_url: String, mime_type: String },

    /// Finished speech transcription.
    #[serde(rename_all = "camelCase")]
    Transcript {
        text: String,
        raw_text: String,
        confidence: f64,
        word_count: usize,
        job_id: String,
        /// Whether post-processing changed the raw transcript.
        enhancement_applied: bool,
    },
}

impl Payload {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    /// Text content, if this is a text payload.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { content } => Some(content),
            _ => None,
        }
    }
}
