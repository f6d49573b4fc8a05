use crate::errors::SubmitError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Analysis document pinned to the content-addressed store by the
/// ingestion side. Only the fields checked by [`validate`] are
/// guaranteed present; everything else is optional.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisDocument {
    pub metadata: Metadata,
    pub analysis: Analysis,
    #[serde(default)]
    pub context: AnalysisContext,
    #[serde(rename = "impactAssessment")]
    pub impact_assessment: ImpactAssessment,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Metadata {
    pub timestamp: String,
    pub location: Location,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Location {
    pub coordinates: Coordinates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Analysis {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AnalysisContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<Weather>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub news: Option<News>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Weather {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct News {
    #[serde(default, rename = "relevantArticles")]
    pub relevant_articles: Vec<NewsArticle>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewsArticle {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactAssessment {
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_impact: Option<String>,
    #[serde(default)]
    pub recommended_actions: Vec<String>,
}

/// Narrows a raw gateway document to [`AnalysisDocument`]. Collects
/// every violation before failing so the caller can surface the full
/// list at once.
pub fn validate(raw: &Value) -> Result<AnalysisDocument, SubmitError> {
    if raw.is_null() {
        return Err(SubmitError::Validation(vec![
            "No data received from analysis file".to_string(),
        ]));
    }

    let mut errors = Vec::new();

    match raw.pointer("/metadata/timestamp") {
        Some(Value::String(s)) if !s.is_empty() => {}
        _ => errors.push("Missing required field: metadata.timestamp".to_string()),
    }

    match raw.pointer("/metadata/location/coordinates") {
        None | Some(Value::Null) => {
            errors.push("Missing required field: metadata.location.coordinates".to_string())
        }
        Some(coordinates) => {
            let lat = coordinates.get("lat").and_then(Value::as_f64);
            let lng = coordinates.get("lng").and_then(Value::as_f64);
            if lat.is_none() || lng.is_none() {
                errors.push("Invalid coordinates: lat and lng must be numbers".to_string());
            }
        }
    }

    match raw.pointer("/analysis/description") {
        Some(Value::String(s)) if !s.is_empty() => {}
        _ => errors.push("Missing required field: analysis.description".to_string()),
    }

    // A score of exactly zero is a real score; only absence or a
    // non-numeric value is a violation.
    match raw.pointer("/impactAssessment/score") {
        None | Some(Value::Null) => {
            errors.push("Missing required field: impactAssessment.score".to_string())
        }
        Some(score) if score.as_f64().is_none() => {
            errors.push("Invalid field: impactAssessment.score must be a number".to_string())
        }
        Some(_) => {}
    }

    if !errors.is_empty() {
        return Err(SubmitError::Validation(errors));
    }

    serde_json::from_value(raw.clone())
        .map_err(|e| SubmitError::Validation(vec![format!("Malformed analysis document: {e}")]))
}
