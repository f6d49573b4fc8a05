use crate::analysis::AnalysisDocument;
use chrono::Utc;
use rand::{Rng, distr::Alphanumeric};
use std::fmt;

/// Uniqueness token embedded in every rendered description. The
/// governance contract rejects duplicate proposal text, so two
/// submissions of the same analysis must still differ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionToken(String);

impl SubmissionToken {
    pub fn generate() -> Self {
        let suffix: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(|b| (b as char).to_ascii_lowercase())
            .collect();

        SubmissionToken(format!("SUB-{}-{}", Utc::now().timestamp_millis(), suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubmissionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Renders the on-chain proposal description. Pure except for the
/// submission token; every other line is a function of the inputs.
pub fn format_description(
    doc: &AnalysisDocument,
    image_cid: &str,
    analysis_cid: &str,
    gateway_base: &str,
) -> String {
    let token = SubmissionToken::generate();
    let gateway_base = gateway_base.trim_end_matches('/');

    let location = [
        doc.metadata.location.city.as_deref(),
        doc.metadata.location.state.as_deref(),
        doc.metadata.location.country.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(", ");

    let weather = doc.context.weather.as_ref();
    let conditions = weather
        .and_then(|w| w.conditions.as_deref())
        .unwrap_or("N/A");
    let temperature = weather
        .and_then(|w| w.temperature)
        .map(|t| t.to_string())
        .unwrap_or_else(|| "N/A".to_string());

    let urgency = doc.impact_assessment.urgency.as_deref().unwrap_or("N/A");
    let category = doc.impact_assessment.category.as_deref().unwrap_or("N/A");
    let estimated_impact = doc
        .impact_assessment
        .estimated_impact
        .as_deref()
        .unwrap_or("To be assessed by DAO members");
    let confidence = doc
        .analysis
        .confidence
        .map(|c| c.to_string())
        .unwrap_or_else(|| "N/A".to_string());

    let actions = doc
        .impact_assessment
        .recommended_actions
        .iter()
        .map(|action| format!("- {action}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Impact Initiative Proposal

Submission ID: {token}
Location: {location}
Coordinates: {lat}, {lng}
Impact Score: {score}
Urgency: {urgency}
Category: {category}

Description:
{description}

Current Conditions:
- Weather: {conditions} ({temperature}°C)

Estimated Impact:
{estimated_impact}

Recommended Actions:
{actions}

Evidence & Verification:
- Image IPFS: {gateway_base}/{image_cid}
- Analysis IPFS: {gateway_base}/{analysis_cid}
- Confidence Score: {confidence}%
- Timestamp: {timestamp}

This proposal has been automatically generated from verified analysis data.
All information is stored on IPFS and can be independently verified.",
        lat = doc.metadata.location.coordinates.lat,
        lng = doc.metadata.location.coordinates.lng,
        score = doc.impact_assessment.score,
        description = doc.analysis.description,
        timestamp = doc.metadata.timestamp,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::validate;
    use proptest::prelude::*;
    use serde_json::json;

    fn denver_document() -> AnalysisDocument {
        validate(&json!({
            "metadata": {
                "timestamp": "2024-01-01T00:00:00Z",
                "location": {
                    "coordinates": { "lat": 39.7392, "lng": -104.9903 },
                    "city": "Denver"
                }
            },
            "analysis": { "description": "pothole", "confidence": 90 },
            "impactAssessment": {
                "score": 75,
                "category": "Infrastructure",
                "urgency": "high",
                "estimatedImpact": "affects commuters",
                "recommendedActions": ["repair"]
            }
        }))
        .unwrap()
    }

    #[test]
    fn token_has_expected_shape() {
        let token = SubmissionToken::generate();
        let parts: Vec<&str> = token.as_str().splitn(3, '-').collect();
        assert_eq!(parts[0], "SUB");
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 6);
        assert!(
            parts[2]
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn description_contains_rendered_fields() {
        let description =
            format_description(&denver_document(), "QmImg", "QmAnalysis", "https://gateway.pinata.cloud/ipfs");

        assert!(description.contains("Coordinates: 39.7392, -104.9903"));
        assert!(description.contains("Impact Score: 75"));
        assert!(description.contains("Location: Denver"));
        assert!(description.contains("Urgency: high"));
        assert!(description.contains("Category: Infrastructure"));
        assert!(description.contains("- repair"));
        assert!(description.contains("- Image IPFS: https://gateway.pinata.cloud/ipfs/QmImg"));
        assert!(
            description.contains("- Analysis IPFS: https://gateway.pinata.cloud/ipfs/QmAnalysis")
        );
        assert!(description.contains("Confidence Score: 90%"));
        assert!(description.contains("Timestamp: 2024-01-01T00:00:00Z"));
    }

    #[test]
    fn repeated_calls_differ_only_in_the_token() {
        let doc = denver_document();
        let first = format_description(&doc, "QmImg", "QmAnalysis", "https://gateway.pinata.cloud/ipfs");
        let second = format_description(&doc, "QmImg", "QmAnalysis", "https://gateway.pinata.cloud/ipfs");

        assert_ne!(first, second);

        for (a, b) in first.lines().zip(second.lines()) {
            if a.starts_with("Submission ID: ") {
                assert!(b.starts_with("Submission ID: "));
                continue;
            }
            assert_eq!(a, b);
        }
    }

    #[test]
    fn missing_optionals_render_placeholders() {
        let doc = validate(&json!({
            "metadata": {
                "timestamp": "2024-01-01T00:00:00Z",
                "location": { "coordinates": { "lat": 1.5, "lng": 2.5 } }
            },
            "analysis": { "description": "flooded underpass" },
            "impactAssessment": { "score": 40 }
        }))
        .unwrap();

        let description = format_description(&doc, "QmImg", "QmAnalysis", "https://gateway.pinata.cloud/ipfs");

        assert!(description.contains("Location: \n"));
        assert!(description.contains("Urgency: N/A"));
        assert!(description.contains("Category: N/A"));
        assert!(description.contains("- Weather: N/A (N/A°C)"));
        assert!(description.contains("To be assessed by DAO members"));
        assert!(description.contains("Confidence Score: N/A%"));
    }

    #[test]
    fn location_parts_join_with_commas() {
        let doc = validate(&json!({
            "metadata": {
                "timestamp": "2024-01-01T00:00:00Z",
                "location": {
                    "coordinates": { "lat": 1.0, "lng": 2.0 },
                    "city": "Denver",
                    "country": "USA"
                }
            },
            "analysis": { "description": "pothole" },
            "impactAssessment": { "score": 10 }
        }))
        .unwrap();

        let description = format_description(&doc, "QmImg", "QmAnalysis", "https://gateway.pinata.cloud/ipfs");
        assert!(description.contains("Location: Denver, USA"));
    }

    proptest! {
        // Rendered coordinates must parse back to the exact input floats.
        #[test]
        fn coordinates_round_trip(lat in -90.0f64..90.0, lng in -180.0f64..180.0) {
            let mut doc = denver_document();
            doc.metadata.location.coordinates.lat = lat;
            doc.metadata.location.coordinates.lng = lng;

            let description = format_description(&doc, "QmImg", "QmAnalysis", "https://gateway.pinata.cloud/ipfs");
            let line = description
                .lines()
                .find(|l| l.starts_with("Coordinates: "))
                .unwrap();
            let (rendered_lat, rendered_lng) = line
                .strip_prefix("Coordinates: ")
                .unwrap()
                .split_once(", ")
                .unwrap();

            prop_assert_eq!(rendered_lat.parse::<f64>().unwrap(), lat);
            prop_assert_eq!(rendered_lng.parse::<f64>().unwrap(), lng);
        }
    }
}
