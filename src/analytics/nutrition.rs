//! Daily macro totals and progress against the user's nutrition goal.

use crate::models::{DietEntry, Meal, NutritionGoal};
use serde::Serialize;
use std::collections::HashSet;

#[derive(Serialize, Debug, Default, Clone, Copy, PartialEq)]
pub struct MacroTotals {
    pub kcal: f64,
    pub protein_g: f64,
    pub fat_g: f64,
    pub carb_g: f64,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct MacroComparison {
    pub actual: f64,
    pub target: f64,
    /// Signed, never clamped.
    pub diff: f64,
    /// Capped at 100; absent when the target is zero.
    pub percent_of_goal: Option<f64>,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct GoalComparison {
    pub kcal: MacroComparison,
    pub protein_g: MacroComparison,
    pub fat_g: MacroComparison,
    pub carb_g: MacroComparison,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MealGroup {
    pub meal: Meal,
    pub entries: Vec<DietEntry>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FoodSuggestion {
    pub name: String,
    pub kcal: f64,
    pub protein_g: f64,
    pub fat_g: f64,
    pub carb_g: f64,
}

pub fn daily_totals(entries: &[DietEntry]) -> MacroTotals {
    entries
        .iter()
        .fold(MacroTotals::default(), |totals, entry| MacroTotals {
            kcal: totals.kcal + entry.kcal,
            protein_g: totals.protein_g + entry.protein_g,
            fat_g: totals.fat_g + entry.fat_g,
            carb_g: totals.carb_g + entry.carb_g,
        })
}

pub fn compare_macro(actual: f64, target: f64) -> MacroComparison {
    let percent_of_goal = if target > 0.0 {
        Some((actual / target * 100.0).min(100.0))
    } else {
        None
    };
    MacroComparison {
        actual,
        target,
        diff: actual - target,
        percent_of_goal,
    }
}

pub fn goal_comparison(totals: &MacroTotals, goal: &NutritionGoal) -> GoalComparison {
    GoalComparison {
        kcal: compare_macro(totals.kcal, goal.kcal),
        protein_g: compare_macro(totals.protein_g, goal.protein_g),
        fat_g: compare_macro(totals.fat_g, goal.fat_g),
        carb_g: compare_macro(totals.carb_g, goal.carb_g),
    }
}

/// Entries per meal in breakfast → snack order; empty meals are omitted.
pub fn group_by_meal(entries: &[DietEntry]) -> Vec<MealGroup> {
    Meal::ALL
        .into_iter()
        .filter_map(|meal| {
            let in_meal: Vec<DietEntry> = entries
                .iter()
                .filter(|entry| Meal::from_code(&entry.meal) == Some(meal))
                .cloned()
                .collect();
            (!in_meal.is_empty()).then_some(MealGroup {
                meal,
                entries: in_meal,
            })
        })
        .collect()
}

/// Autocomplete candidates from the user's own history.
///
/// `newest_first` must be ordered by creation time, newest first: the first
/// occurrence of a name (case-insensitive) supplies its macros.
pub fn suggestions_from_history(newest_first: &[DietEntry], limit: usize) -> Vec<FoodSuggestion> {
    let mut seen = HashSet::new();
    newest_first
        .iter()
        .filter(|entry| seen.insert(entry.food_name.to_lowercase()))
        .take(limit)
        .map(|entry| FoodSuggestion {
            name: entry.food_name.clone(),
            kcal: entry.kcal,
            protein_g: entry.protein_g,
            fat_g: entry.fat_g,
            carb_g: entry.carb_g,
        })
        .collect()
}
