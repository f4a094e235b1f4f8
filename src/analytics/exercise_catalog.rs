//! Which exercises belong to which body part. An exercise may be listed
//! under several parts.

use crate::error_handler::ServiceError;
use crate::models::BodyPart;
use serde::Serialize;

const CATALOG: &[(BodyPart, &str)] = &[
    (BodyPart::Chest, "Bench Press"),
    (BodyPart::Chest, "Dumbbell Fly"),
    (BodyPart::Chest, "Dumbbell Squeeze Press"),
    (BodyPart::Chest, "Push-up"),
    (BodyPart::Back, "Pull-up"),
    (BodyPart::Back, "Barbell or Dumbbell Row"),
    (BodyPart::Back, "Seated Row"),
    (BodyPart::Legs, "Squat"),
    (BodyPart::Legs, "Deadlift"),
    (BodyPart::Legs, "Lunge"),
    (BodyPart::Legs, "Leg Press"),
    (BodyPart::Glutes, "Hip Thrust"),
    (BodyPart::Glutes, "Romanian Deadlift"),
    (BodyPart::Glutes, "Glute Bridge"),
    (BodyPart::Arms, "Biceps Curl"),
    (BodyPart::Arms, "Triceps Dip"),
    (BodyPart::Core, "Lying Leg Raise"),
    (BodyPart::Core, "Plank"),
    (BodyPart::Core, "Crunch"),
    (BodyPart::Shoulders, "Shoulder Press"),
    (BodyPart::Shoulders, "Dumbbell Fly"),
];

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CatalogSection {
    pub body_part: BodyPart,
    pub exercises: Vec<&'static str>,
}

pub struct ExerciseCatalog;

impl ExerciseCatalog {
    pub fn exercises_for(part: BodyPart) -> impl Iterator<Item = &'static str> {
        CATALOG
            .iter()
            .filter(move |(p, _)| *p == part)
            .map(|(_, name)| *name)
    }

    pub fn parts_of(exercise: &str) -> Vec<BodyPart> {
        CATALOG
            .iter()
            .filter(|(_, name)| *name == exercise)
            .map(|(part, _)| *part)
            .collect()
    }

    pub fn contains(exercise: &str) -> bool {
        CATALOG.iter().any(|(_, name)| *name == exercise)
    }

    pub fn belongs_to(part: BodyPart, exercise: &str) -> bool {
        CATALOG.iter().any(|(p, name)| *p == part && *name == exercise)
    }

    pub fn sections() -> Vec<CatalogSection> {
        BodyPart::ALL
            .into_iter()
            .map(|body_part| CatalogSection {
                body_part,
                exercises: Self::exercises_for(body_part).collect(),
            })
            .collect()
    }

    /// `Ok(None)` for a canonical pair, `Ok(Some(warning))` for a known
    /// exercise logged under another part. Unknown exercises are rejected.
    pub fn check_membership(part: BodyPart, exercise: &str) -> Result<Option<String>, ServiceError> {
        if !Self::contains(exercise) {
            return Err(ServiceError::BadRequest(format!(
                "Unsupported exercise: {}",
                exercise
            )));
        }
        if Self::belongs_to(part, exercise) {
            return Ok(None);
        }
        let usual: Vec<&str> = Self::parts_of(exercise)
            .iter()
            .map(BodyPart::as_str)
            .collect();
        Ok(Some(format!(
            "{} is usually logged under {}, recorded under {} anyway",
            exercise,
            usual.join(", "),
            part.as_str()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_exercise_lists_every_part() {
        assert_eq!(
            ExerciseCatalog::parts_of("Dumbbell Fly"),
            vec![BodyPart::Chest, BodyPart::Shoulders]
        );
    }

    #[test]
    fn canonical_pair_has_no_warning() {
        assert_eq!(
            ExerciseCatalog::check_membership(BodyPart::Legs, "Squat").unwrap(),
            None
        );
    }

    #[test]
    fn other_part_is_accepted_with_a_warning() {
        let warning = ExerciseCatalog::check_membership(BodyPart::Back, "Squat")
            .unwrap()
            .unwrap();
        assert!(warning.contains("usually logged under legs"));
    }

    #[test]
    fn unknown_exercise_is_rejected() {
        assert!(matches!(
            ExerciseCatalog::check_membership(BodyPart::Arms, "Juggling"),
            Err(ServiceError::BadRequest(_))
        ));
    }

    #[test]
    fn sections_cover_every_part() {
        let sections = ExerciseCatalog::sections();
        assert_eq!(sections.len(), BodyPart::ALL.len());
        assert!(sections.iter().all(|section| !section.exercises.is_empty()));
    }
}
