//! Canonical text construction.
//!
//! The same function feeds both the stored and the query embeddings; any
//! divergence between the two paths puts them in different vector spaces.

use crate::dedup::domain::workout::{Intensity, MuscleGroupFlags, WorkoutDraft};
use serde::Serialize;

#[derive(Serialize)]
struct MuscleSegment<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    primary: Option<&'a MuscleGroupFlags>,
    #[serde(skip_serializing_if = "Option::is_none")]
    secondary: Option<&'a MuscleGroupFlags>,
}

/// Build the embedding input for a workout.
///
/// Format: `"{name}. {description}. Category: {category}. Intensity: {intensity}."`
/// followed by `" Muscles: {json}"` when either muscle map is present.
/// Missing fields render as empty strings.
pub fn canonical_text(draft: &WorkoutDraft) -> String {
    let intensity = draft.intensity.map_or("", Intensity::as_str);

    let mut text = format!(
        "{}. {}. Category: {}. Intensity: {}.",
        draft.name.trim(),
        draft.description.trim(),
        draft.category.trim(),
        intensity,
    );

    if draft.has_muscle_groups() {
        let segment = MuscleSegment {
            primary: draft.primary_muscle_group.as_ref(),
            secondary: draft.secondary_muscle_group.as_ref(),
        };
        // BTreeMap keys and fixed struct fields; serialization cannot fail.
        let muscles = serde_json::to_string(&segment).unwrap_or_default();
        text.push_str(" Muscles: ");
        text.push_str(&muscles);
    }

    text
}
