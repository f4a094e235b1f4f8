use crate::error_handler::ServiceError;
use crate::schema::{
    diary_entries, diet_entries, important_items, nutrition_goals, schedule_items, strength_sets,
    timetable_entries, weight_entries,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use diesel::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

// --- Helpers for optional/nullable fields in update payloads ---

// For Option<Option<String>>: absent -> None, null -> Some(None)
fn deserialize_opt_opt_string<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer) {
        Ok(Some(s)) => Ok(Some(Some(s))),
        Ok(None) => Ok(Some(None)),
        Err(e) => Err(e),
    }
}

// Trims a required text field and rejects it when nothing is left.
pub(crate) fn required_text(value: &str, field: &str) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::BadRequest(format!("{} cannot be empty", field)));
    }
    Ok(trimmed.to_string())
}

// Optional free text: trimmed, and blank collapses to NULL.
pub(crate) fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// Resolves an optional quantity to its stored value (0 when absent).
fn non_negative(value: Option<f64>, field: &str) -> Result<f64, ServiceError> {
    let resolved = value.unwrap_or(0.0);
    if !resolved.is_finite() || resolved < 0.0 {
        return Err(ServiceError::BadRequest(format!(
            "{} must be a non-negative number",
            field
        )));
    }
    Ok(resolved)
}

// --- Enumerations stored as text ---

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleCategory {
    Work,
    Reminder,
    Event,
    Important,
}

impl ScheduleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleCategory::Work => "work",
            ScheduleCategory::Reminder => "reminder",
            ScheduleCategory::Event => "event",
            ScheduleCategory::Important => "important",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Meal {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl Meal {
    /// Display order of the meals in a day.
    pub const ALL: [Meal; 4] = [Meal::Breakfast, Meal::Lunch, Meal::Dinner, Meal::Snack];

    pub fn as_str(&self) -> &'static str {
        match self {
            Meal::Breakfast => "breakfast",
            Meal::Lunch => "lunch",
            Meal::Dinner => "dinner",
            Meal::Snack => "snack",
        }
    }

    pub fn from_code(code: &str) -> Option<Meal> {
        Meal::ALL.into_iter().find(|meal| meal.as_str() == code)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    Chest,
    Back,
    Legs,
    Glutes,
    Arms,
    Core,
    Shoulders,
}

impl BodyPart {
    pub const ALL: [BodyPart; 7] = [
        BodyPart::Chest,
        BodyPart::Back,
        BodyPart::Legs,
        BodyPart::Glutes,
        BodyPart::Arms,
        BodyPart::Core,
        BodyPart::Shoulders,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BodyPart::Chest => "chest",
            BodyPart::Back => "back",
            BodyPart::Legs => "legs",
            BodyPart::Glutes => "glutes",
            BodyPart::Arms => "arms",
            BodyPart::Core => "core",
            BodyPart::Shoulders => "shoulders",
        }
    }
}

/// Day column of the class timetable.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ClassDay {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl ClassDay {
    pub const ALL: [ClassDay; 7] = [
        ClassDay::Mon,
        ClassDay::Tue,
        ClassDay::Wed,
        ClassDay::Thu,
        ClassDay::Fri,
        ClassDay::Sat,
        ClassDay::Sun,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassDay::Mon => "mon",
            ClassDay::Tue => "tue",
            ClassDay::Wed => "wed",
            ClassDay::Thu => "thu",
            ClassDay::Fri => "fri",
            ClassDay::Sat => "sat",
            ClassDay::Sun => "sun",
        }
    }

    pub fn from_code(code: &str) -> Option<ClassDay> {
        ClassDay::ALL.into_iter().find(|day| day.as_str() == code)
    }
}

// --- ScheduleItem Model ---
#[derive(Queryable, Selectable, Identifiable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = schedule_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ScheduleItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub category: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = schedule_items)]
pub struct NewScheduleItem {
    pub user_id: Uuid,
    pub title: String,
    pub category: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub content: String,
}

impl NewScheduleItem {
    pub fn build(user_id: Uuid, payload: &CreateScheduleItemPayload) -> Result<Self, ServiceError> {
        if payload.end_time <= payload.start_time {
            return Err(ServiceError::BadRequest(
                "end_time must be after start_time".to_string(),
            ));
        }
        Ok(NewScheduleItem {
            user_id,
            title: required_text(&payload.title, "title")?,
            category: payload.category.as_str().to_string(),
            date: payload.date,
            start_time: payload.start_time,
            end_time: payload.end_time,
            content: payload
                .content
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
        })
    }
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = schedule_items)]
pub struct UpdateScheduleItemChangeset {
    pub title: Option<String>,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub content: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

// --- DietEntry Model ---
#[derive(Queryable, Selectable, Identifiable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = diet_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DietEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub meal: String,
    pub food_name: String,
    pub kcal: f64,
    pub protein_g: f64,
    pub fat_g: f64,
    pub carb_g: f64,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable, Debug, PartialEq)]
#[diesel(table_name = diet_entries)]
pub struct NewDietEntry {
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub meal: String,
    pub food_name: String,
    pub kcal: f64,
    pub protein_g: f64,
    pub fat_g: f64,
    pub carb_g: f64,
}

impl NewDietEntry {
    /// Missing macros are stored as 0 so the aggregation never re-defaults them.
    pub fn build(user_id: Uuid, payload: &CreateDietEntryPayload) -> Result<Self, ServiceError> {
        Ok(NewDietEntry {
            user_id,
            date: payload.date,
            meal: payload.meal.as_str().to_string(),
            food_name: required_text(&payload.food_name, "food_name")?,
            kcal: non_negative(payload.kcal, "kcal")?,
            protein_g: non_negative(payload.protein_g, "protein_g")?,
            fat_g: non_negative(payload.fat_g, "fat_g")?,
            carb_g: non_negative(payload.carb_g, "carb_g")?,
        })
    }
}

// --- StrengthSet Model ---
// One row is one performed set.
#[derive(Queryable, Selectable, Identifiable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = strength_sets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StrengthSet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub body_part: String,
    pub exercise_name: String,
    pub weight_kg: f64,
    pub reps: i32,
    pub created_at: NaiveDateTime,
}

impl StrengthSet {
    /// weight × reps of this single set.
    pub fn load(&self) -> f64 {
        self.weight_kg * f64::from(self.reps)
    }
}

#[derive(Insertable, Debug, PartialEq)]
#[diesel(table_name = strength_sets)]
pub struct NewStrengthSet {
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub body_part: String,
    pub exercise_name: String,
    pub weight_kg: f64,
    pub reps: i32,
}

impl NewStrengthSet {
    pub fn build(user_id: Uuid, payload: &CreateStrengthSetPayload) -> Result<Self, ServiceError> {
        let reps = payload.reps.unwrap_or(0);
        if reps < 0 {
            return Err(ServiceError::BadRequest(
                "reps must be a non-negative integer".to_string(),
            ));
        }
        Ok(NewStrengthSet {
            user_id,
            date: payload.date,
            body_part: payload.body_part.as_str().to_string(),
            exercise_name: required_text(&payload.exercise_name, "exercise_name")?,
            weight_kg: non_negative(payload.weight_kg, "weight_kg")?,
            reps,
        })
    }
}

#[derive(Serialize, Debug)]
pub struct StrengthSetCreatedResponse {
    #[serde(flatten)]
    pub set: StrengthSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

// --- TimetableEntry Model ---
#[derive(Queryable, Selectable, Identifiable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = timetable_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TimetableEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub weekday: String,
    pub period: String,
    pub course_name: String,
    pub classroom: Option<String>,
    pub teacher: Option<String>,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = timetable_entries)]
pub struct NewTimetableEntry {
    pub user_id: Uuid,
    pub weekday: String,
    pub period: String,
    pub course_name: String,
    pub classroom: Option<String>,
    pub teacher: Option<String>,
    pub note: Option<String>,
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = timetable_entries)]
pub struct UpdateTimetableEntryChangeset {
    pub weekday: Option<String>,
    pub period: Option<String>,
    pub course_name: Option<String>,
    pub classroom: Option<Option<String>>,
    pub teacher: Option<Option<String>>,
    pub note: Option<Option<String>>,
    pub updated_at: Option<NaiveDateTime>,
}

// --- NutritionGoal Model ---
// Singleton per user, keyed by user_id.
#[derive(Queryable, Selectable, Identifiable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = nutrition_goals)]
#[diesel(primary_key(user_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NutritionGoal {
    pub user_id: Uuid,
    pub kcal: f64,
    pub carb_g: f64,
    pub protein_g: f64,
    pub fat_g: f64,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = nutrition_goals)]
pub struct NewNutritionGoal {
    pub user_id: Uuid,
    pub kcal: f64,
    pub carb_g: f64,
    pub protein_g: f64,
    pub fat_g: f64,
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = nutrition_goals)]
pub struct NutritionGoalChangeset {
    pub kcal: f64,
    pub carb_g: f64,
    pub protein_g: f64,
    pub fat_g: f64,
    pub updated_at: NaiveDateTime,
}

impl NewNutritionGoal {
    pub fn build(user_id: Uuid, payload: &SetNutritionGoalPayload) -> Result<Self, ServiceError> {
        Ok(NewNutritionGoal {
            user_id,
            kcal: non_negative(payload.kcal, "kcal")?,
            carb_g: non_negative(payload.carb_g, "carb_g")?,
            protein_g: non_negative(payload.protein_g, "protein_g")?,
            fat_g: non_negative(payload.fat_g, "fat_g")?,
        })
    }

    pub fn changeset(&self, now: NaiveDateTime) -> NutritionGoalChangeset {
        NutritionGoalChangeset {
            kcal: self.kcal,
            carb_g: self.carb_g,
            protein_g: self.protein_g,
            fat_g: self.fat_g,
            updated_at: now,
        }
    }
}

// --- WeightEntry Model ---
#[derive(Queryable, Selectable, Identifiable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = weight_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WeightEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub weight_kg: f64,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = weight_entries)]
pub struct NewWeightEntry {
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub weight_kg: f64,
}

// --- DiaryEntry Model ---
#[derive(Queryable, Selectable, Identifiable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = diary_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DiaryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = diary_entries)]
pub struct NewDiaryEntry {
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub content: String,
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = diary_entries)]
pub struct UpdateDiaryEntryChangeset {
    pub date: Option<NaiveDate>,
    pub content: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

// --- ImportantItem Model ---
#[derive(Queryable, Selectable, Identifiable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = important_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ImportantItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub title: String,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = important_items)]
pub struct NewImportantItem {
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub title: String,
    pub note: Option<String>,
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = important_items)]
pub struct UpdateImportantItemChangeset {
    pub date: Option<NaiveDate>,
    pub title: Option<String>,
    pub note: Option<Option<String>>,
    pub updated_at: Option<NaiveDateTime>,
}

// --- PAYLOAD DTOs ---

#[derive(Deserialize, Debug)]
pub struct CreateScheduleItemPayload {
    pub title: String,
    pub category: ScheduleCategory,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub content: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateScheduleItemPayload {
    pub title: Option<String>,
    pub category: Option<ScheduleCategory>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub content: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct CreateDietEntryPayload {
    pub date: NaiveDate,
    pub meal: Meal,
    pub food_name: String,
    pub kcal: Option<f64>,
    pub protein_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub carb_g: Option<f64>,
}

#[derive(Deserialize, Debug)]
pub struct CreateStrengthSetPayload {
    pub date: NaiveDate,
    pub body_part: BodyPart,
    pub exercise_name: String,
    pub weight_kg: Option<f64>,
    pub reps: Option<i32>,
}

#[derive(Deserialize, Debug)]
pub struct CreateTimetableEntryPayload {
    pub weekday: ClassDay,
    pub period: String,
    pub course_name: String,
    pub classroom: Option<String>,
    pub teacher: Option<String>,
    pub note: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateTimetableEntryPayload {
    pub weekday: Option<ClassDay>,
    pub period: Option<String>,
    pub course_name: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_opt_string", default)]
    pub classroom: Option<Option<String>>,
    #[serde(deserialize_with = "deserialize_opt_opt_string", default)]
    pub teacher: Option<Option<String>>,
    #[serde(deserialize_with = "deserialize_opt_opt_string", default)]
    pub note: Option<Option<String>>,
}

#[derive(Deserialize, Debug)]
pub struct SetNutritionGoalPayload {
    pub kcal: Option<f64>,
    pub carb_g: Option<f64>,
    pub protein_g: Option<f64>,
    pub fat_g: Option<f64>,
}

#[derive(Deserialize, Debug)]
pub struct CreateWeightEntryPayload {
    pub date: NaiveDate,
    pub weight_kg: f64,
}

#[derive(Deserialize, Debug)]
pub struct CreateDiaryEntryPayload {
    pub date: NaiveDate,
    pub content: String,
}

#[derive(Deserialize, Debug)]
pub struct UpdateDiaryEntryPayload {
    pub date: Option<NaiveDate>,
    pub content: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct CreateImportantItemPayload {
    pub date: NaiveDate,
    pub title: String,
    pub note: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateImportantItemPayload {
    pub date: Option<NaiveDate>,
    pub title: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_opt_string", default)]
    pub note: Option<Option<String>>,
}

// --- Query DTOs ---

// Raw strings so that bad dates surface as our own validation error.
#[derive(Deserialize, Debug)]
pub struct DayQuery {
    pub date: String,
}

#[derive(Deserialize, Debug)]
pub struct DateRangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct MonthQuery {
    pub year: Option<String>,
    pub month: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct WeekQuery {
    pub start: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct SuggestQuery {
    pub q: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diet_payload() -> CreateDietEntryPayload {
        CreateDietEntryPayload {
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            meal: Meal::Lunch,
            food_name: "  Chicken rice ".to_string(),
            kcal: Some(650.0),
            protein_g: None,
            fat_g: None,
            carb_g: Some(80.0),
        }
    }

    #[test]
    fn diet_entry_defaults_missing_macros_to_zero() {
        let entry = NewDietEntry::build(Uuid::nil(), &diet_payload()).unwrap();
        assert_eq!(entry.food_name, "Chicken rice");
        assert_eq!(entry.meal, "lunch");
        assert_eq!(entry.protein_g, 0.0);
        assert_eq!(entry.fat_g, 0.0);
        assert_eq!(entry.carb_g, 80.0);
    }

    #[test]
    fn diet_entry_rejects_negative_macro() {
        let mut payload = diet_payload();
        payload.fat_g = Some(-1.0);
        assert!(matches!(
            NewDietEntry::build(Uuid::nil(), &payload),
            Err(ServiceError::BadRequest(_))
        ));
    }

    #[test]
    fn diet_entry_rejects_blank_food_name() {
        let mut payload = diet_payload();
        payload.food_name = "   ".to_string();
        assert!(NewDietEntry::build(Uuid::nil(), &payload).is_err());
    }

    #[test]
    fn schedule_item_requires_end_after_start() {
        let payload = CreateScheduleItemPayload {
            title: "Dentist".to_string(),
            category: ScheduleCategory::Reminder,
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            content: None,
        };
        assert!(NewScheduleItem::build(Uuid::nil(), &payload).is_err());
    }

    #[test]
    fn strength_set_defaults_weight_and_reps() {
        let payload = CreateStrengthSetPayload {
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            body_part: BodyPart::Chest,
            exercise_name: "Push-up".to_string(),
            weight_kg: None,
            reps: None,
        };
        let set = NewStrengthSet::build(Uuid::nil(), &payload).unwrap();
        assert_eq!(set.weight_kg, 0.0);
        assert_eq!(set.reps, 0);
        assert_eq!(set.body_part, "chest");
    }

    #[test]
    fn update_payload_distinguishes_null_from_absent() {
        let payload: UpdateTimetableEntryPayload =
            serde_json::from_str(r#"{"classroom": null, "teacher": "Lin"}"#).unwrap();
        assert_eq!(payload.classroom, Some(None));
        assert_eq!(payload.teacher, Some(Some("Lin".to_string())));
        assert_eq!(payload.note, None);
    }

    #[test]
    fn class_day_codes_round_trip_through_serde() {
        let day: ClassDay = serde_json::from_str(r#""wed""#).unwrap();
        assert_eq!(day, ClassDay::Wed);
        assert_eq!(ClassDay::from_code(day.as_str()), Some(ClassDay::Wed));
    }

    #[test]
    fn blank_optional_text_becomes_null() {
        assert_eq!(optional_text(Some("  B201 ")), Some("B201".to_string()));
        assert_eq!(optional_text(Some("   ")), None);
        assert_eq!(optional_text(None), None);
    }
}
