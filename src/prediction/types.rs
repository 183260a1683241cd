use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /predictions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePredictionRequest {
    pub version: String,
    pub input: GenerationInput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationInput {
    pub prompt: String,
    pub num_outputs: u32,
    pub aspect_ratio: String,
    pub output_format: String,
    pub output_quality: u8,
}

impl CreatePredictionRequest {
    /// One square JPEG at quality 90.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            version: model.into(),
            input: GenerationInput {
                prompt: prompt.into(),
                num_outputs: 1,
                aspect_ratio: "1:1".to_string(),
                output_format: "jpg".to_string(),
                output_quality: 90,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    Other(String),
}

impl Default for PredictionStatus {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for PredictionStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "starting" => Self::Starting,
            "processing" => Self::Processing,
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed,
            "canceled" => Self::Canceled,
            _ => Self::Other(status),
        }
    }
}

impl From<PredictionStatus> for String {
    fn from(status: PredictionStatus) -> Self {
        match status {
            PredictionStatus::Starting => "starting".to_string(),
            PredictionStatus::Processing => "processing".to_string(),
            PredictionStatus::Succeeded => "succeeded".to_string(),
            PredictionStatus::Failed => "failed".to_string(),
            PredictionStatus::Canceled => "canceled".to_string(),
            PredictionStatus::Other(s) => s,
        }
    }
}

/// Prediction output. Models return either a bare URL or a list of URLs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictionOutput {
    Single(String),
    Multiple(Vec<Value>),
    Other(Value),
}

impl PredictionOutput {
    pub fn first_url(&self) -> Option<&str> {
        match self {
            Self::Single(url) => Some(url.as_str()).filter(|url| !url.is_empty()),
            Self::Multiple(items) => items.first().and_then(Value::as_str),
            Self::Other(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: PredictionStatus,
    #[serde(default)]
    pub output: Option<PredictionOutput>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl Prediction {
    pub fn image_url(&self) -> Option<&str> {
        self.output.as_ref().and_then(PredictionOutput::first_url)
    }
}

/// Outcome of a call whose success is signalled by one specific status code.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiReply<T> {
    Accepted(T),
    Rejected { status: u16 },
}
