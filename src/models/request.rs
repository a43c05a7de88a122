use serde::{Deserialize, Serialize};

/// Body of the cover letter endpoints. The tone stays a raw string so that an
/// unknown value surfaces as a configuration error rather than a JSON rejection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CoverLetterRequest {
    pub job_summary: String,
    pub resume_summary: String,
    #[serde(default = "default_tone")]
    pub tone: String,
}

fn default_tone() -> String {
    "friendly".to_string()
}
