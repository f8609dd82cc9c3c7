use actix_web::http::StatusCode;
use actix_web::middleware::{ErrorHandlers, Logger};
use actix_web::{App, HttpResponse, HttpServer, Responder, get, web};
use dotenvy::dotenv;
use env_logger::Env;
use log::{info, warn};
use serde_json::json;

use recipe_forum::checkout::service::CheckoutService;
use recipe_forum::comment::service::CommentService;
use recipe_forum::database;
use recipe_forum::forum::service::ForumService;
use recipe_forum::middleware::auth::AdminAuth;
use recipe_forum::middleware::error_handler::handle_error;
use recipe_forum::middleware::not_found::not_found;
use recipe_forum::moderation::service::ModerationService;
use recipe_forum::router::index::routes;
use recipe_forum::utils::config::{AppConfig, StripeConfig, service_name};

#[get("/")]
async fn default() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Recipe forum API is running",
        "httpStatusCode": StatusCode::OK.as_u16(),
        "service": service_name(),
    }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;
    let stripe = StripeConfig::from_env();
    if !stripe.is_live() {
        warn!("STRIPE_SECRET_KEY is not set, checkout runs in simulation mode (debug builds only)");
    }

    let mongo_client = database::connect_to_mongo(&config)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let comment_service = web::Data::new(CommentService::new(&mongo_client, &config.database_name));
    let forum_service = web::Data::new(ForumService::new(&mongo_client, &config.database_name));
    let moderation_service =
        web::Data::new(ModerationService::new(&mongo_client, &config.database_name));
    let checkout_service = web::Data::new(CheckoutService::new(
        &mongo_client,
        &config.database_name,
        stripe,
    ));
    let admin_auth = config.admin_jwt_secret.clone().map(|secret| web::Data::new(AdminAuth { secret }));
    if admin_auth.is_none() {
        warn!("ADMIN_JWT_SECRET is not set, moderation routes will reject every request");
    }

    info!("Starting server on http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        let mut app = App::new()
            .wrap(Logger::default())
            .app_data(comment_service.clone())
            .app_data(forum_service.clone())
            .app_data(moderation_service.clone())
            .app_data(checkout_service.clone());
        if let Some(auth) = &admin_auth {
            app = app.app_data(auth.clone());
        }
        app.configure(routes)
            .wrap(
                ErrorHandlers::new()
                    .handler(StatusCode::NOT_FOUND, not_found)
                    .default_handler(handle_error),
            )
            .service(default)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    info!("Server has stopped");

    Ok(())
}
