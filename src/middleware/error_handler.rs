use actix_web::dev::ServiceResponse;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::middleware::ErrorHandlerResponse;
use actix_web::{HttpResponse, Result};
use serde_json::json;

use crate::utils::config::service_name;

fn is_json<B>(res: &ServiceResponse<B>) -> bool {
    res.response()
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"))
}

/// Rewrite a non-JSON error response into the `{ error }` envelope. Bodies
/// already produced by `CustomError` pass through untouched.
pub fn jsonify_error<B>(
    res: ServiceResponse<B>,
    fallback: Option<&str>,
) -> Result<ErrorHandlerResponse<B>> {
    if is_json(&res) {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    }

    let status = res.status();
    let message = match fallback {
        Some(message) => message.to_string(),
        None => res
            .response()
            .error()
            .map(|e| e.to_string())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string()),
    };

    let new_response = HttpResponse::build(status).json(json!({
        "success": false,
        "error": message,
        "errorCode": status
            .canonical_reason()
            .unwrap_or("Unknown")
            .to_uppercase()
            .replace(' ', "_"),
        "httpStatusCode": status.as_u16(),
        "service": service_name(),
    }));

    let (req, _) = res.into_parts();
    let res = ServiceResponse::new(req, new_response.map_into_right_body());
    Ok(ErrorHandlerResponse::Response(res))
}

pub fn handle_error<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    jsonify_error(res, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::not_found::not_found;
    use crate::utils::error::CustomError;
    use actix_web::http::StatusCode;
    use actix_web::middleware::ErrorHandlers;
    use actix_web::{App, test, web};

    async fn fails() -> HttpResponse {
        HttpResponse::BadRequest().body("plain text failure")
    }

    async fn typed() -> std::result::Result<HttpResponse, CustomError> {
        Err(CustomError::NotFoundError("Post not found".to_string()))
    }

    async fn echo(body: web::Json<serde_json::Value>) -> HttpResponse {
        HttpResponse::Ok().json(body.into_inner())
    }

    #[actix_web::test]
    async fn test_error_bodies_become_json() {
        let app = test::init_service(
            App::new()
                .wrap(
                    ErrorHandlers::new()
                        .handler(StatusCode::NOT_FOUND, not_found)
                        .default_handler(handle_error),
                )
                .route("/fails", web::get().to(fails))
                .route("/typed", web::get().to(typed))
                .route("/echo", web::post().to(echo)),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/fails").to_request()).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["errorCode"], "BAD_REQUEST");

        let res = test::call_service(&app, test::TestRequest::get().uri("/typed").to_request()).await;
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["error"], "Post not found");

        let res = test::call_service(&app, test::TestRequest::get().uri("/nowhere").to_request()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["error"], "Route does not exist");

        let req = test::TestRequest::post()
            .uri("/echo")
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{broken")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["success"], false);
    }
}
