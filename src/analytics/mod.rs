//! Pure computations over records already fetched for one user.

pub mod calendar;
pub mod countdown;
pub mod exercise_catalog;
pub mod nutrition;
pub mod strength;
pub mod timetable;
