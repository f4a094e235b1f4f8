pub mod calendar_handlers;
pub mod diary_handlers;
pub mod diet_handlers;
pub mod important_handlers;
pub mod nutrition_goal_handlers;
pub mod schedule_handlers;
pub mod strength_handlers;
pub mod timetable_handlers;
pub mod weight_handlers;
