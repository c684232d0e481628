//! Workout catalog domain types.
//!
//! A [`WorkoutDraft`] is what a coach submits. It becomes a [`WorkoutRecord`]
//! once added to the catalog, and similarity queries against the catalog
//! yield [`MatchCandidate`]s which the decision procedure folds into a
//! [`DuplicateVerdict`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Enumerations
// =============================================================================

/// Training intensity of a workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intensity {
    #[serde(rename = "Very Low")]
    VeryLow,
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl Intensity {
    /// Display label, identical to the wire format.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::VeryLow => "Very Low",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intensity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Very Low" => Ok(Self::VeryLow),
            "Low" => Ok(Self::Low),
            "Medium" => Ok(Self::Medium),
            "High" => Ok(Self::High),
            "Very High" => Ok(Self::VeryHigh),
            other => Err(format!("unknown intensity: {other}")),
        }
    }
}

/// Who can see a catalog entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    Everyone,
    Private,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Everyone => "Everyone",
            Self::Private => "Private",
        }
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Everyone" => Ok(Self::Everyone),
            "Private" => Ok(Self::Private),
            other => Err(format!("unknown visibility: {other}")),
        }
    }
}

/// Muscle name to trained/not-trained flag.
///
/// Backed by a `BTreeMap` so iteration and serialization order never depend
/// on insertion order.
pub type MuscleGroupFlags = BTreeMap<String, bool>;

// =============================================================================
// Draft (request-scoped input)
// =============================================================================

/// A candidate workout as submitted by a coach.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutDraft {
    #[serde(default, alias = "workoutName")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub intensity: Option<Intensity>,
    #[serde(default, alias = "primary_muscle_group")]
    pub primary_muscle_group: Option<MuscleGroupFlags>,
    #[serde(default, alias = "secondary_muscle_group")]
    pub secondary_muscle_group: Option<MuscleGroupFlags>,

    // Catalog presentation fields. Stored, never embedded.
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl WorkoutDraft {
    /// Convenience constructor for the text fields that feed the embedding.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        intensity: Option<Intensity>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category: category.into(),
            intensity,
            ..Self::default()
        }
    }

    /// Whether either muscle map was supplied.
    pub fn has_muscle_groups(&self) -> bool {
        self.primary_muscle_group.is_some() || self.secondary_muscle_group.is_some()
    }
}

// =============================================================================
// Persisted record
// =============================================================================

/// A workout stored in the catalog together with its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
    pub id: uuid::Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub intensity: Option<Intensity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_muscle_group: Option<MuscleGroupFlags>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_muscle_group: Option<MuscleGroupFlags>,
    pub visibility: Visibility,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub popularity: i32,
    /// Empty when loaded for listing; vectors are only kept on insert.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkoutRecord {
    /// Build a fresh record from a draft and its embedding.
    pub fn from_draft(draft: WorkoutDraft, embedding: Vec<f32>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4(),
            name: draft.name,
            description: draft.description,
            category: draft.category,
            intensity: draft.intensity,
            primary_muscle_group: draft.primary_muscle_group,
            secondary_muscle_group: draft.secondary_muscle_group,
            visibility: draft.visibility,
            cover_image: draft.cover_image,
            video_url: draft.video_url,
            images: draft.images,
            popularity: 0,
            embedding,
            created_at: now,
            updated_at: now,
        }
    }

    /// Projection used in similarity results.
    pub fn to_candidate(&self, similarity: f32) -> MatchCandidate {
        MatchCandidate {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            intensity: self.intensity,
            primary_muscle_group: self.primary_muscle_group.clone(),
            secondary_muscle_group: self.secondary_muscle_group.clone(),
            similarity,
        }
    }
}

// =============================================================================
// Similarity results
// =============================================================================

/// A stored workout returned by a nearest-neighbour query, without its vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCandidate {
    pub id: uuid::Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub intensity: Option<Intensity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_muscle_group: Option<MuscleGroupFlags>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_muscle_group: Option<MuscleGroupFlags>,
    /// Similarity in [0, 1], higher is closer.
    pub similarity: f32,
}

/// Outcome of a duplicate check.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateVerdict {
    pub is_duplicate: bool,
    pub matches: Vec<MatchCandidate>,
}

impl DuplicateVerdict {
    pub fn unique() -> Self {
        Self {
            is_duplicate: false,
            matches: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intensity_labels_round_trip_through_json() {
        let json = serde_json::to_string(&Intensity::VeryHigh).unwrap();
        assert_eq!(json, r#""Very High""#);
        let parsed: Intensity = serde_json::from_str(r#""Very Low""#).unwrap();
        assert_eq!(parsed, Intensity::VeryLow);
        assert_eq!("Medium".parse::<Intensity>().unwrap(), Intensity::Medium);
        assert!("Extreme".parse::<Intensity>().is_err());
    }

    #[test]
    fn test_draft_accepts_form_field_aliases() {
        let draft: WorkoutDraft = serde_json::from_str(
            r#"{
                "workoutName": "Plank",
                "description": "Hold a straight line",
                "category": "Core",
                "intensity": "Low",
                "primary_muscle_group": { "Abs": true, "Back": false }
            }"#,
        )
        .unwrap();

        assert_eq!(draft.name, "Plank");
        assert_eq!(draft.intensity, Some(Intensity::Low));
        assert_eq!(
            draft.primary_muscle_group.unwrap().get("Abs"),
            Some(&true)
        );
        assert_eq!(draft.visibility, Visibility::Everyone);
    }

    #[test]
    fn test_draft_missing_fields_default_to_empty() {
        let draft: WorkoutDraft = serde_json::from_str(r#"{"name": "Burpees"}"#).unwrap();
        assert_eq!(draft.description, "");
        assert_eq!(draft.category, "");
        assert!(draft.intensity.is_none());
        assert!(!draft.has_muscle_groups());
    }

    #[test]
    fn test_listed_record_omits_embedding() {
        let mut record = WorkoutRecord::from_draft(WorkoutDraft::new("Row", "", "", None), vec![]);
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("embedding").is_none());

        record.embedding = vec![0.1, 0.2];
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["embedding"].as_array().unwrap().len(), 2);
    }
}
