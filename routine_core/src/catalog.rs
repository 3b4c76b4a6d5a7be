//! Default catalog of exercises.
//!
//! The engine only consults the catalog for one thing: whether an exercise
//! is cardio-type, which decides the default metrics seeded onto a freshly
//! inserted entry. The rest of the metadata (names, tags, reference links)
//! is for presentation layers.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One exercise definition in the catalog
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExerciseDefinition {
    pub id: String,
    pub name: String,
    /// Cardio-type exercises get duration defaults instead of reps/weight
    pub cardio: bool,
    pub tags: Vec<String>,
    pub reference_url: Option<String>,
}

/// The complete catalog of known exercises
#[derive(Clone, Debug, Default)]
pub struct ExerciseCatalog {
    pub exercises: HashMap<String, ExerciseDefinition>,
}

impl ExerciseCatalog {
    pub fn get(&self, id: &str) -> Option<&ExerciseDefinition> {
        self.exercises.get(id)
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (id, exercise) in &self.exercises {
            if id.is_empty() || exercise.id.is_empty() {
                errors.push("Exercise has empty ID".to_string());
            }
            if id != &exercise.id {
                errors.push(format!(
                    "Exercise key '{}' doesn't match exercise.id '{}'",
                    id, exercise.id
                ));
            }
            if exercise.name.is_empty() {
                errors.push(format!("Exercise '{}' has empty name", id));
            }
        }

        let has_strength = self.exercises.values().any(|e| !e.cardio);
        let has_cardio = self.exercises.values().any(|e| e.cardio);

        if !has_strength {
            errors.push("Catalog has no strength exercises".to_string());
        }
        if !has_cardio {
            errors.push("Catalog has no cardio exercises".to_string());
        }

        errors
    }
}

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<ExerciseCatalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static ExerciseCatalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog with built-in exercises
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns
/// a cached reference. This function is retained for testing and custom
/// catalog creation.
pub fn build_default_catalog() -> ExerciseCatalog {
    let mut exercises = HashMap::new();

    let mut add = |id: &str, name: &str, cardio: bool, tags: &[&str], url: Option<&str>| {
        exercises.insert(
            id.to_string(),
            ExerciseDefinition {
                id: id.into(),
                name: name.into(),
                cardio,
                tags: tags.iter().map(|t| t.to_string()).collect(),
                reference_url: url.map(String::from),
            },
        );
    };

    // ========================================================================
    // Strength
    // ========================================================================

    add(
        "back_squat",
        "Back Squat",
        false,
        &["legs", "posterior_chain", "barbell"],
        Some("https://www.youtube.com/watch?v=ultWZbUMPL8"),
    );
    add(
        "bench_press",
        "Bench Press",
        false,
        &["chest", "push", "barbell"],
        Some("https://www.youtube.com/watch?v=rT7DgCr-3pg"),
    );
    add(
        "deadlift",
        "Deadlift",
        false,
        &["posterior_chain", "hinge", "barbell"],
        Some("https://www.youtube.com/watch?v=op9kVnSso6Q"),
    );
    add(
        "overhead_press",
        "Overhead Press",
        false,
        &["shoulders", "push", "barbell"],
        None,
    );
    add(
        "barbell_row",
        "Barbell Row",
        false,
        &["back", "pull", "barbell"],
        None,
    );
    add(
        "pullup",
        "Pull-up",
        false,
        &["back", "pull", "bodyweight"],
        Some("https://www.youtube.com/watch?v=eGo4IYlbE5g"),
    );
    add(
        "pushup",
        "Push-up",
        false,
        &["chest", "push", "bodyweight"],
        None,
    );
    add(
        "kettlebell_swing",
        "Kettlebell Swing",
        false,
        &["hinge", "posterior_chain", "kettlebell"],
        Some("https://www.youtube.com/watch?v=YSxHifyI6s8"),
    );

    // ========================================================================
    // Cardio
    // ========================================================================

    add(
        "treadmill_run",
        "Treadmill Run",
        true,
        &["conditioning", "machine"],
        None,
    );
    add(
        "rowing_erg",
        "Rowing Erg",
        true,
        &["conditioning", "machine", "full_body"],
        None,
    );
    add(
        "stationary_bike",
        "Stationary Bike",
        true,
        &["conditioning", "machine", "legs"],
        None,
    );
    add(
        "jump_rope",
        "Jump Rope",
        true,
        &["conditioning", "bodyweight"],
        None,
    );

    ExerciseCatalog { exercises }
}
