use crate::analytics::calendar::{
    day_navigation, grid_bounds, month_grid, month_navigation, parse_day, resolve_month,
    resolve_week_start, week_days, week_navigation, YearMonth,
};
use crate::analytics::countdown::{countdowns, Countdown};
use crate::auth_utils::AuthenticatedUser;
use crate::db::DbPool;
use crate::error_handler::ServiceError;
use crate::handlers::diet_handlers::{build_diet_summary, DietDaySummary};
use crate::handlers::important_handlers::load_upcoming;
use crate::handlers::schedule_handlers::load_items_between;
use crate::handlers::strength_handlers::{
    build_strength_summary, load_strength_dates, StrengthDaySummary,
};
use crate::models::{DiaryEntry, ImportantItem, MonthQuery, ScheduleItem, WeekQuery, WeightEntry};
use crate::schema::{diary_entries, important_items, weight_entries};
use actix_web::{get, web, HttpResponse};
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Serialize, Debug)]
pub struct MonthView {
    pub month: YearMonth,
    pub today: NaiveDate,
    pub prev: YearMonth,
    pub next: YearMonth,
    pub weeks: Vec<[NaiveDate; 7]>,
    pub items_by_date: BTreeMap<NaiveDate, Vec<ScheduleItem>>,
    pub strength_dates: BTreeSet<NaiveDate>,
    pub countdowns: Vec<Countdown>,
}

#[derive(Serialize, Debug)]
pub struct WeekView {
    pub start: NaiveDate,
    pub today: NaiveDate,
    pub days: [NaiveDate; 7],
    pub prev_start: NaiveDate,
    pub next_start: NaiveDate,
    pub items_by_date: BTreeMap<NaiveDate, Vec<ScheduleItem>>,
    pub strength_dates: BTreeSet<NaiveDate>,
}

#[derive(Serialize, Debug)]
pub struct DayView {
    pub date: NaiveDate,
    pub prev: NaiveDate,
    pub next: NaiveDate,
    pub schedule_items: Vec<ScheduleItem>,
    pub important_items: Vec<ImportantItem>,
    pub diary_entries: Vec<DiaryEntry>,
    pub weight_entries: Vec<WeightEntry>,
    pub diet: DietDaySummary,
    pub strength: StrengthDaySummary,
}

// Items arrive ordered by (date, start_time), so each day's list keeps that order.
fn items_by_date(items: Vec<ScheduleItem>) -> BTreeMap<NaiveDate, Vec<ScheduleItem>> {
    let mut by_date: BTreeMap<NaiveDate, Vec<ScheduleItem>> = BTreeMap::new();
    for item in items {
        by_date.entry(item.date).or_default().push(item);
    }
    by_date
}

// === GET /calendar/month?year=&month= ===
#[get("/month")]
pub async fn month_view_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    query: web::Query<MonthQuery>,
) -> Result<HttpResponse, ServiceError> {
    let user_uuid = authenticated_user.id;
    let today = Utc::now().date_naive();
    let month = resolve_month(query.year.as_deref(), query.month.as_deref(), today);
    let (prev, next) = month_navigation(month);
    let weeks = month_grid(month);
    // Padding days from neighbouring months are shown too, so load the whole grid.
    let (grid_start, grid_end) = grid_bounds(month);

    let mut conn = pool.get().await?;
    let items = load_items_between(&mut conn, user_uuid, grid_start, grid_end).await?;
    let strength_dates = load_strength_dates(&mut conn, user_uuid, grid_start, grid_end).await?;
    let upcoming = load_upcoming(&mut conn, user_uuid, today).await?;

    log::debug!(
        "Month view {}-{:02} for user {}: {} items, {} training days",
        month.year,
        month.month,
        user_uuid,
        items.len(),
        strength_dates.len()
    );

    Ok(HttpResponse::Ok().json(MonthView {
        month,
        today,
        prev,
        next,
        weeks,
        items_by_date: items_by_date(items),
        strength_dates,
        countdowns: countdowns(&upcoming, today),
    }))
}

// === GET /calendar/week?start= ===
#[get("/week")]
pub async fn week_view_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    query: web::Query<WeekQuery>,
) -> Result<HttpResponse, ServiceError> {
    let user_uuid = authenticated_user.id;
    let today = Utc::now().date_naive();
    let start = resolve_week_start(query.start.as_deref(), today);
    let days = week_days(start);
    let (prev_start, next_start) = week_navigation(start);

    let mut conn = pool.get().await?;
    let items = load_items_between(&mut conn, user_uuid, days[0], days[6]).await?;
    let strength_dates = load_strength_dates(&mut conn, user_uuid, days[0], days[6]).await?;

    Ok(HttpResponse::Ok().json(WeekView {
        start,
        today,
        days,
        prev_start,
        next_start,
        items_by_date: items_by_date(items),
        strength_dates,
    }))
}

// === GET /calendar/day/{day} ===
#[get("/day/{day}")]
pub async fn day_view_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    day: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_uuid = authenticated_user.id;
    let day = parse_day(&day)?;

    let mut conn = pool.get().await?;

    let schedule_items = load_items_between(&mut conn, user_uuid, day, day).await?;

    let important_items = important_items::table
        .filter(important_items::user_id.eq(user_uuid))
        .filter(important_items::date.eq(day))
        .order(important_items::title.asc())
        .select(ImportantItem::as_select())
        .load::<ImportantItem>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    let diary_entries = diary_entries::table
        .filter(diary_entries::user_id.eq(user_uuid))
        .filter(diary_entries::date.eq(day))
        .order(diary_entries::created_at.asc())
        .select(DiaryEntry::as_select())
        .load::<DiaryEntry>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    let weight_entries = weight_entries::table
        .filter(weight_entries::user_id.eq(user_uuid))
        .filter(weight_entries::date.eq(day))
        .order(weight_entries::created_at.asc())
        .select(WeightEntry::as_select())
        .load::<WeightEntry>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    let diet = build_diet_summary(&mut conn, user_uuid, day).await?;
    let strength = build_strength_summary(&mut conn, user_uuid, day).await?;
    let (prev, next) = day_navigation(day);

    Ok(HttpResponse::Ok().json(DayView {
        date: day,
        prev,
        next,
        schedule_items,
        important_items,
        diary_entries,
        weight_entries,
        diet,
        strength,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use uuid::Uuid;

    fn item(d: u32, hour: u32) -> ScheduleItem {
        let date = NaiveDate::from_ymd_opt(2025, 6, d).unwrap();
        ScheduleItem {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            title: format!("item {}-{}", d, hour),
            category: "work".to_string(),
            date,
            start_time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(hour + 1, 0, 0).unwrap(),
            content: String::new(),
            created_at: date.and_hms_opt(8, 0, 0).unwrap(),
            updated_at: date.and_hms_opt(8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn items_are_bucketed_by_day_in_order() {
        let by_date = items_by_date(vec![item(2, 9), item(2, 14), item(5, 10)]);

        assert_eq!(by_date.len(), 2);
        let second = &by_date[&NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()];
        assert_eq!(
            second.iter().map(|i| i.title.as_str()).collect::<Vec<_>>(),
            vec!["item 2-9", "item 2-14"]
        );
    }
}
