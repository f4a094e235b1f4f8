mod analytics;
mod auth_utils;
mod db;
mod error_handler;
mod handlers;
mod models;
pub mod schema;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpResponse, HttpServer};
use db::DbPool;
use handlers::{
    calendar_handlers, diary_handlers, diet_handlers, important_handlers,
    nutrition_goal_handlers, schedule_handlers, strength_handlers, timetable_handlers,
    weight_handlers,
};
use std::env;

async fn health_check_handler(
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, error_handler::ServiceError> {
    match pool.get().await {
        Ok(_conn) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "status": "healthy",
            "message": "Backend is running and DB pool accessible"
        }))),
        Err(e) => {
            log::error!("Failed to get connection from pool: {:?}", e);
            Err(error_handler::ServiceError::InternalServerError(
                "Failed to check DB pool".to_string(),
            ))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    if cfg!(debug_assertions) {
        match dotenvy::dotenv() {
            Ok(path) => log::info!(".env file loaded from path: {}", path.display()),
            Err(e) => log::warn!(
                "Could not load .env file: {}, using environment variables.",
                e
            ),
        }
    }

    let database_url = env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set in environment variables or .env file");

    let pool_max_size = env::var("DB_POOL_MAX_SIZE")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|size| *size > 0)
        .unwrap_or(db::DEFAULT_POOL_MAX_SIZE);

    let pool = db::create_pool(&database_url, pool_max_size)
        .await
        .expect("Failed to create database connection pool.");

    log::info!("🚀 Lifelog Backend Service starting...");

    let frontend_url_prod = env::var("FRONTEND_URL_PROD")
        .unwrap_or_else(|_| "https://lifelog.example.com".to_string());

    let frontend_url_dev =
        env::var("FRONTEND_URL_DEV").unwrap_or_else(|_| "http://localhost:3000".to_string());

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse::<u16>()
        .expect("PORT must be a valid number");

    log::info!("Server will start at http://{}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_url_prod)
            .allowed_origin(&frontend_url_dev)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
                header::HeaderName::from_static("x-user-id"),
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(pool.clone()))
            .service(web::resource("/health").route(web::get().to(health_check_handler)))
            .service(
                web::scope("/calendar")
                    .service(calendar_handlers::month_view_handler)
                    .service(calendar_handlers::week_view_handler)
                    .service(calendar_handlers::day_view_handler),
            )
            .service(
                web::scope("/schedule-items")
                    .service(schedule_handlers::create_schedule_item_handler)
                    .service(schedule_handlers::list_schedule_items_handler)
                    .service(schedule_handlers::get_schedule_item_handler)
                    .service(schedule_handlers::update_schedule_item_handler)
                    .service(schedule_handlers::delete_schedule_item_handler),
            )
            .service(
                web::scope("/diet")
                    .service(diet_handlers::create_diet_entry_handler)
                    .service(diet_handlers::list_diet_entries_handler)
                    .service(diet_handlers::diet_summary_handler)
                    .service(diet_handlers::suggest_food_handler)
                    .service(diet_handlers::delete_diet_entry_handler),
            )
            .service(
                web::scope("/strength")
                    .service(strength_handlers::create_strength_set_handler)
                    .service(strength_handlers::list_strength_sets_handler)
                    .service(strength_handlers::strength_summary_handler)
                    .service(strength_handlers::exercise_catalog_handler)
                    .service(strength_handlers::delete_strength_set_handler),
            )
            .service(
                web::scope("/timetable")
                    .service(timetable_handlers::create_timetable_entry_handler)
                    .service(timetable_handlers::list_timetable_entries_handler)
                    .service(timetable_handlers::timetable_layout_handler)
                    .service(timetable_handlers::update_timetable_entry_handler)
                    .service(timetable_handlers::delete_timetable_entry_handler),
            )
            .service(
                web::scope("/nutrition-goal")
                    .service(nutrition_goal_handlers::get_nutrition_goal_handler)
                    .service(nutrition_goal_handlers::set_nutrition_goal_handler)
                    .service(nutrition_goal_handlers::delete_nutrition_goal_handler),
            )
            .service(
                web::scope("/weights")
                    .service(weight_handlers::create_weight_entry_handler)
                    .service(weight_handlers::list_weight_entries_handler)
                    .service(weight_handlers::delete_weight_entry_handler),
            )
            .service(
                web::scope("/diary")
                    .service(diary_handlers::create_diary_entry_handler)
                    .service(diary_handlers::list_diary_entries_handler)
                    .service(diary_handlers::get_diary_entry_handler)
                    .service(diary_handlers::update_diary_entry_handler)
                    .service(diary_handlers::delete_diary_entry_handler),
            )
            .service(
                web::scope("/important-items")
                    .service(important_handlers::create_important_item_handler)
                    .service(important_handlers::list_important_items_handler)
                    .service(important_handlers::countdown_handler)
                    .service(important_handlers::update_important_item_handler)
                    .service(important_handlers::delete_important_item_handler),
            )
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await
}
