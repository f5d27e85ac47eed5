use actix_cors::Cors;
use actix_web::{get, middleware::Logger, web, App, HttpResponse, HttpServer, Responder};
use anyhow::Result;

use crewcall::database::init_database;
use crewcall::handlers::{company, events, requests, requirements, tracking, workers};
use crewcall::middleware::RequestIdMiddleware;
use crewcall::Config;

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("CrewCall API v1.0")
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    println!("🚀 Starting CrewCall API server...");

    let config = Config::from_env()?;
    println!(
        "📋 Configuration loaded (environment: {})",
        config.environment
    );

    init_database(&config.database_url).await?;
    println!("✅ Database initialized");

    let config_data = web::Data::new(config.clone());
    let server_address = config.server_address();
    println!("🌐 Server starting on http://{}", server_address);

    HttpServer::new(move || {
        App::new()
            .app_data(config_data.clone())
            .wrap(
                Cors::default()
                    .allowed_origin(&config.client_base_url)
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                    .allowed_headers(vec![
                        "Authorization",
                        "Content-Type",
                        "Accept",
                        "X-Requested-With",
                        "X-Correlation-ID",
                    ])
                    .max_age(3600),
            )
            .wrap(RequestIdMiddleware)
            .wrap(Logger::new(
                r#"%a "%r" %s %b "%{Referer}i" "%{User-Agent}i" %T correlation_id=%{x-correlation-id}o"#,
            ))
            .service(hello)
            .service(health)
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/companies")
                            .route("", web::post().to(company::create_company))
                            .route("/{id}", web::get().to(company::get_company))
                            .route("/locations", web::post().to(company::create_location)),
                    )
                    .service(
                        web::scope("/workers")
                            .route("", web::post().to(workers::create_worker))
                            .route("", web::get().to(workers::list_workers))
                            .route("/{id}", web::get().to(workers::get_worker)),
                    )
                    .service(
                        web::scope("/events")
                            .route("", web::post().to(events::create_event))
                            .route("/{id}", web::get().to(events::get_event)),
                    )
                    .service(
                        web::scope("/call-times")
                            .route("", web::post().to(events::create_call_time))
                            .route("/{id}", web::get().to(events::get_call_time)),
                    )
                    .service(
                        web::scope("/requirements")
                            .route("", web::post().to(requirements::create_requirement))
                            .route("/{id}", web::get().to(requirements::get_requirement))
                            .route("/{id}", web::put().to(requirements::update_requirement))
                            .route("/{id}", web::delete().to(requirements::delete_requirement))
                            .route("/{id}/fcfs", web::put().to(requirements::set_fcfs))
                            .route("/{id}/requests", web::get().to(requests::get_roster))
                            .route("/{id}/requests", web::post().to(requests::queue_worker))
                            .route(
                                "/{id}/requests/dispatch",
                                web::post().to(requests::dispatch_notifications),
                            ),
                    )
                    .service(
                        web::scope("/requests")
                            .route("/{id}", web::get().to(requests::get_request))
                            .route("/{id}/actions", web::post().to(requests::request_action)),
                    )
                    .service(
                        web::scope("/respond")
                            .route("/{token}", web::post().to(requests::respond_by_token)),
                    )
                    .service(
                        web::scope("/tracking").service(
                            web::scope("/{request_id}")
                                .route("", web::get().to(tracking::get_time_entry))
                                .route("/clock-in", web::post().to(tracking::clock_in))
                                .route("/clock-out", web::post().to(tracking::clock_out))
                                .route("/start-time", web::put().to(tracking::update_start_time))
                                .route("/end-time", web::put().to(tracking::update_end_time))
                                .route("/hours", web::get().to(tracking::get_hours))
                                .route("/breaks", web::post().to(tracking::add_meal_break))
                                .route(
                                    "/breaks/{break_id}",
                                    web::put().to(tracking::update_meal_break),
                                )
                                .route(
                                    "/breaks/{break_id}",
                                    web::delete().to(tracking::delete_meal_break),
                                ),
                        ),
                    ),
            )
    })
    .bind(server_address)?
    .run()
    .await?;

    Ok(())
}
