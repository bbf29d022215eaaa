use actix_web::http::StatusCode;
use actix_web::middleware::{ErrorHandlers, Logger};
use actix_web::{App, HttpResponse, HttpServer, Responder, get, web};
use dotenv::dotenv;
use env_logger::Env;
use log::info;
use serde_json::json;

mod comment;
mod database;
mod middleware;
mod post;
mod router;
mod uploader;
mod user;
mod utils;

use middleware::not_found::not_found;
use post::post_service::PostService;
use router::index::routes;
use uploader::BlobStorage;

#[get("/")]
async fn default() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Welcome to the linkfeed API",
        "httpStatusCode": StatusCode::OK.as_u16(),
        "service": std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string()),
    }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("Starting server on http://localhost:8000");

    // One client for the whole process, built up front and handed to the
    // services explicitly. It is dropped when the server stops.
    let mongo_client = database::connect_to_mongo()
        .await
        .expect("Failed to connect to MongoDB");

    let post_service = web::Data::new(PostService::new(&mongo_client));
    let blob_storage =
        web::Data::new(BlobStorage::from_env().expect("Blob storage credentials are required"));

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(post_service.clone())
            .app_data(blob_storage.clone())
            .configure(routes)
            .wrap(ErrorHandlers::new().handler(StatusCode::NOT_FOUND, not_found))
            .service(default)
    })
    .bind(("localhost", 8000))?
    .run()
    .await?;

    info!("Server has stopped");

    Ok(())
}
