use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    pub predicted_class: String,
    pub confidence_score: f64,
    pub filename: Option<String>,
    pub all_classes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xai: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
