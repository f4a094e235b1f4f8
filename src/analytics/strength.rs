//! Training-volume aggregation and comparisons with earlier sessions.

use crate::models::StrengthSet;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ExerciseGroup {
    pub exercise_name: String,
    pub sets: Vec<StrengthSet>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BodyPartGroup {
    pub body_part: String,
    pub exercises: Vec<ExerciseGroup>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SessionComparison {
    pub date: NaiveDate,
    pub total_load: f64,
    /// Current day's load minus this session's load.
    pub diff_from_current: f64,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct LastMax {
    pub date: NaiveDate,
    pub max_weight_kg: f64,
}

/// Σ weight × reps.
pub fn day_total_load(sets: &[StrengthSet]) -> f64 {
    sets.iter().map(StrengthSet::load).sum()
}

/// body part → exercise → sets, each level in first-seen order.
pub fn group_by_part_and_exercise(sets: &[StrengthSet]) -> Vec<BodyPartGroup> {
    let mut groups: Vec<BodyPartGroup> = Vec::new();
    for set in sets {
        let part_index = match groups.iter().position(|g| g.body_part == set.body_part) {
            Some(index) => index,
            None => {
                groups.push(BodyPartGroup {
                    body_part: set.body_part.clone(),
                    exercises: Vec::new(),
                });
                groups.len() - 1
            }
        };
        let exercises = &mut groups[part_index].exercises;
        match exercises
            .iter()
            .position(|e| e.exercise_name == set.exercise_name)
        {
            Some(index) => exercises[index].sets.push(set.clone()),
            None => exercises.push(ExerciseGroup {
                exercise_name: set.exercise_name.clone(),
                sets: vec![set.clone()],
            }),
        }
    }
    groups
}

/// Heaviest set (by weight × reps) of each exercise; the earliest set wins ties.
pub fn best_set_per_exercise(sets: &[StrengthSet]) -> BTreeMap<String, StrengthSet> {
    let mut best: BTreeMap<String, StrengthSet> = BTreeMap::new();
    for set in sets {
        let replace = best
            .get(&set.exercise_name)
            .map_or(true, |current| set.load() > current.load());
        if replace {
            best.insert(set.exercise_name.clone(), set.clone());
        }
    }
    best
}

/// Dates that have at least one set.
pub fn strength_dates(sets: &[StrengthSet]) -> BTreeSet<NaiveDate> {
    sets.iter().map(|set| set.date).collect()
}

/// Latest session strictly before `current`, compared with the sets dated `current`.
pub fn previous_session_comparison(
    all_sets: &[StrengthSet],
    current: NaiveDate,
) -> Option<SessionComparison> {
    let previous_date = all_sets
        .iter()
        .map(|set| set.date)
        .filter(|date| *date < current)
        .max()?;

    let load_on = |date: NaiveDate| -> f64 {
        all_sets
            .iter()
            .filter(|set| set.date == date)
            .map(StrengthSet::load)
            .sum()
    };
    let previous_load = load_on(previous_date);
    Some(SessionComparison {
        date: previous_date,
        total_load: previous_load,
        diff_from_current: load_on(current) - previous_load,
    })
}

/// For each exercise: the peak weight on the most recent earlier date it was trained.
pub fn last_known_max(all_sets: &[StrengthSet], before: NaiveDate) -> BTreeMap<String, LastMax> {
    let mut last: BTreeMap<String, LastMax> = BTreeMap::new();
    for set in all_sets.iter().filter(|set| set.date < before) {
        let candidate = LastMax {
            date: set.date,
            max_weight_kg: set.weight_kg,
        };
        match last.entry(set.exercise_name.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(candidate);
            }
            Entry::Occupied(mut slot) => {
                let known = slot.get_mut();
                if set.date > known.date {
                    *known = candidate;
                } else if set.date == known.date {
                    known.max_weight_kg = known.max_weight_kg.max(set.weight_kg);
                }
            }
        }
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn stamp(d: u32, minute: u32) -> NaiveDateTime {
        day(d).and_hms_opt(18, minute, 0).unwrap()
    }

    fn set(d: u32, minute: u32, part: &str, exercise: &str, weight_kg: f64, reps: i32) -> StrengthSet {
        StrengthSet {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            date: day(d),
            body_part: part.to_string(),
            exercise_name: exercise.to_string(),
            weight_kg,
            reps,
            created_at: stamp(d, minute),
        }
    }

    #[test]
    fn total_load_sums_weight_times_reps() {
        let sets = vec![
            set(1, 0, "chest", "Bench Press", 50.0, 10),
            set(1, 5, "chest", "Bench Press", 60.0, 5),
        ];
        assert_eq!(day_total_load(&sets), 800.0);
        assert_eq!(day_total_load(&[]), 0.0);
    }

    #[test]
    fn grouping_preserves_first_seen_order() {
        let sets = vec![
            set(1, 0, "legs", "Squat", 80.0, 5),
            set(1, 1, "chest", "Bench Press", 60.0, 8),
            set(1, 2, "legs", "Lunge", 20.0, 12),
            set(1, 3, "legs", "Squat", 85.0, 5),
        ];
        let groups = group_by_part_and_exercise(&sets);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].body_part, "legs");
        assert_eq!(groups[1].body_part, "chest");
        let squat = &groups[0].exercises[0];
        assert_eq!(squat.exercise_name, "Squat");
        assert_eq!(
            squat.sets.iter().map(|s| s.weight_kg).collect::<Vec<_>>(),
            vec![80.0, 85.0]
        );
        assert_eq!(groups[0].exercises[1].exercise_name, "Lunge");
    }

    #[test]
    fn grouping_nothing_is_empty() {
        assert!(group_by_part_and_exercise(&[]).is_empty());
    }

    #[test]
    fn best_set_keeps_the_earliest_on_ties() {
        let first = set(1, 0, "back", "Seated Row", 40.0, 10);
        let tie = set(1, 5, "back", "Seated Row", 50.0, 8);
        let lighter = set(1, 9, "back", "Seated Row", 30.0, 10);
        let best = best_set_per_exercise(&[first.clone(), tie, lighter]);
        assert_eq!(best["Seated Row"].id, first.id);
    }

    #[test]
    fn best_set_picks_the_largest_load() {
        let light = set(1, 0, "legs", "Squat", 60.0, 10);
        let heavy = set(1, 1, "legs", "Squat", 100.0, 7);
        let best = best_set_per_exercise(&[light, heavy.clone()]);
        assert_eq!(best["Squat"].id, heavy.id);
    }

    #[test]
    fn previous_session_compares_with_latest_earlier_day() {
        let sets = vec![
            set(1, 0, "legs", "Squat", 60.0, 10),
            set(4, 0, "chest", "Bench Press", 50.0, 10),
            set(4, 1, "chest", "Bench Press", 50.0, 10),
            set(9, 0, "chest", "Bench Press", 55.0, 10),
            set(12, 0, "legs", "Squat", 70.0, 10),
        ];
        let comparison = previous_session_comparison(&sets, day(9)).unwrap();
        assert_eq!(
            comparison,
            SessionComparison {
                date: day(4),
                total_load: 1000.0,
                diff_from_current: -450.0,
            }
        );
    }

    #[test]
    fn earliest_session_has_no_comparison() {
        let sets = vec![
            set(3, 0, "core", "Plank", 0.0, 1),
            set(5, 0, "core", "Crunch", 0.0, 20),
        ];
        assert_eq!(previous_session_comparison(&sets, day(3)), None);
        assert_eq!(previous_session_comparison(&[], day(3)), None);
    }

    #[test]
    fn last_known_max_uses_latest_date_not_all_time_peak() {
        let sets = vec![
            set(1, 0, "legs", "Squat", 120.0, 3),
            set(6, 0, "legs", "Squat", 90.0, 5),
            set(6, 1, "legs", "Squat", 95.0, 5),
            set(6, 2, "legs", "Squat", 80.0, 8),
            set(2, 0, "arms", "Biceps Curl", 15.0, 12),
            set(10, 0, "legs", "Squat", 100.0, 5),
        ];
        let last = last_known_max(&sets, day(10));

        assert_eq!(
            last["Squat"],
            LastMax {
                date: day(6),
                max_weight_kg: 95.0,
            }
        );
        assert_eq!(last["Biceps Curl"].date, day(2));
        assert_eq!(last.len(), 2);
    }

    #[test]
    fn last_known_max_ignores_input_order() {
        let sets = vec![
            set(6, 0, "legs", "Squat", 90.0, 5),
            set(1, 0, "legs", "Squat", 120.0, 3),
        ];
        assert_eq!(last_known_max(&sets, day(10))["Squat"].max_weight_kg, 90.0);
        assert!(last_known_max(&sets, day(1)).is_empty());
    }

    #[test]
    fn strength_dates_are_distinct() {
        let sets = vec![
            set(2, 0, "legs", "Squat", 60.0, 5),
            set(2, 1, "legs", "Squat", 60.0, 5),
            set(7, 0, "back", "Pull-up", 0.0, 8),
        ];
        assert_eq!(
            strength_dates(&sets),
            BTreeSet::from([day(2), day(7)])
        );
    }

    #[test]
    fn aggregation_is_repeatable() {
        let sets = vec![
            set(2, 0, "legs", "Squat", 60.0, 5),
            set(3, 0, "legs", "Squat", 65.0, 5),
        ];
        assert_eq!(best_set_per_exercise(&sets), best_set_per_exercise(&sets));
        assert_eq!(
            previous_session_comparison(&sets, day(3)),
            previous_session_comparison(&sets, day(3))
        );
        assert_eq!(last_known_max(&sets, day(3)), last_known_max(&sets, day(3)));
    }
}
