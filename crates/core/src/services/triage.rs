//! Placeholder photo triage.
//!
//! No image is fetched or inspected. The suggestion is drawn at random so the
//! report form can be prefilled while a real classifier does not exist.

use paws_common::{AppError, AppResult};
use paws_db::entities::report::{InjurySeverity, IssueType};
use rand::{Rng, seq::SliceRandom};
use serde::Serialize;

const ISSUE_TYPES: [IssueType; 4] = [
    IssueType::Injured,
    IssueType::Starving,
    IssueType::Lost,
    IssueType::Other,
];

const SEVERITIES: [InjurySeverity; 3] = [
    InjurySeverity::Low,
    InjurySeverity::Medium,
    InjurySeverity::High,
];

/// A suggested classification for a report photo.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageSuggestion {
    pub issue_type: IssueType,
    pub injury_severity: InjurySeverity,
    /// In `[0.6, 0.95]`.
    pub confidence: f64,
    pub first_aid_suggestions: Vec<String>,
}

/// Suggest a classification for the photo at `image_url`.
pub fn analyze(image_url: Option<&str>) -> AppResult<TriageSuggestion> {
    if image_url.map(str::trim).is_none_or(str::is_empty) {
        return Err(AppError::BadRequest("Image URL is required".to_string()));
    }

    let mut rng = rand::thread_rng();
    let issue_type = *ISSUE_TYPES.choose(&mut rng).unwrap_or(&IssueType::Other);
    let injury_severity = *SEVERITIES.choose(&mut rng).unwrap_or(&InjurySeverity::Medium);
    let confidence = (rng.gen_range(0.6..=0.95_f64) * 100.0).round() / 100.0;

    Ok(TriageSuggestion {
        issue_type,
        injury_severity,
        confidence,
        first_aid_suggestions: first_aid_for(issue_type)
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
    })
}

const fn first_aid_for(issue_type: IssueType) -> &'static [&'static str] {
    match issue_type {
        IssueType::Injured => &[
            "Keep the animal calm and still",
            "Apply gentle pressure to any bleeding with a clean cloth",
            "Do not give food or water until a vet has seen it",
        ],
        IssueType::Starving => &[
            "Offer small amounts of water first",
            "Give small portions of plain food",
            "Keep the animal warm",
        ],
        IssueType::Lost => &[
            "Check for a collar or tag",
            "Keep the animal in a safe enclosed space",
            "Have it scanned for a microchip",
        ],
        IssueType::Other => &[
            "Keep a safe distance",
            "Observe the animal's behaviour",
            "Wait for a rescuer to arrive",
        ],
    }
}
