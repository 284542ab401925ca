mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod services;
mod utils;

use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use actix_web_httpauth::middleware::HttpAuthentication;
use actix_web_prom::PrometheusMetricsBuilder;
use env_logger::Env;
use log::{error, info};
use sqlx::postgres::PgPoolOptions;
use std::collections::HashMap;
use std::io;

use crate::config::Config;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|err| {
        error!("Invalid configuration: {}", err);
        io::Error::new(io::ErrorKind::InvalidInput, err.to_string())
    })?;

    // Initialize the database pool
    let pool = PgPoolOptions::new()
        .connect(&config.database_url)
        .await
        .map_err(|err| {
            error!("Failed to connect to the database: {}", err);
            io::Error::new(io::ErrorKind::ConnectionRefused, err.to_string())
        })?;

    let bind_address = config.bind_address.clone();
    info!("Starting server at {}", bind_address);

    // Authentication middleware
    let auth = HttpAuthentication::bearer(utils::jwt::validator);

    // Set up Prometheus metrics
    let mut labels = HashMap::new();
    labels.insert("app".to_string(), "fittrack".to_string());
    let prometheus = PrometheusMetricsBuilder::new("api")
        .endpoint("/metrics")
        .const_labels(labels)
        .build()
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err.to_string()))?;

    let config = web::Data::new(config);
    let pool = web::Data::new(pool);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(prometheus.clone())
            .app_data(pool.clone())
            .app_data(config.clone())
            .service(
                web::resource("/v1/register")
                    .route(web::post().to(handlers::auth::register)),
            )
            .service(
                web::resource("/v1/login")
                    .route(web::post().to(handlers::auth::login)),
            )
            .service(
                web::resource("/v1/forgot-password")
                    .route(web::post().to(handlers::auth::forgot_password)),
            )
            .service(
                web::resource("/v1/profile")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::profile::get_profile))
                    .route(web::put().to(handlers::profile::update_profile)),
            )
            .service(
                web::resource("/v1/goal/calculate")
                    .wrap(auth.clone())
                    .route(web::post().to(handlers::profile::calculate_goal)),
            )
            .service(
                web::resource("/v1/exercises")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::exercise::get_exercises))
                    .route(web::post().to(handlers::exercise::create_exercise)),
            )
            .service(
                web::resource("/v1/exercises/{id}")
                    .wrap(auth.clone())
                    .route(web::put().to(handlers::exercise::update_exercise))
                    .route(web::delete().to(handlers::exercise::delete_exercise)),
            )
            .service(
                web::resource("/v1/meals")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::meal::get_meals))
                    .route(web::post().to(handlers::meal::create_meal)),
            )
            .service(
                web::resource("/v1/meals/{id}")
                    .wrap(auth.clone())
                    .route(web::put().to(handlers::meal::update_meal))
                    .route(web::delete().to(handlers::meal::delete_meal)),
            )
            .service(
                web::resource("/v1/summary/daily")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::summary::daily_summary)),
            )
            .service(
                web::resource("/v1/summary/weekly")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::summary::weekly_summary)),
            )
    })
    .bind(&bind_address)?
    .run()
    .await
}
