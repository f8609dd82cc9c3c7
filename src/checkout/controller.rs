use crate::checkout::model::CreateCheckoutRequest;
use crate::checkout::service::CheckoutService;
use crate::utils::error::CustomError;
use actix_web::{HttpResponse, web};

/// Create a payment intent for a product
/// POST /api/create-checkout
pub async fn create_checkout(
    checkout_service: web::Data<CheckoutService>,
    body: web::Json<CreateCheckoutRequest>,
) -> Result<HttpResponse, CustomError> {
    let product_id = body.product_id.trim();
    if product_id.is_empty() {
        return Err(CustomError::BadRequestError(
            "productId is required".to_string(),
        ));
    }

    let checkout = checkout_service.create_checkout(product_id).await?;
    Ok(HttpResponse::Ok().json(checkout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::index::checkout_routes;
    use crate::utils::config::StripeConfig;
    use actix_web::{App, http::StatusCode, test};
    use serde_json::json;

    #[actix_web::test]
    async fn test_missing_product_id() {
        let client = mongodb::Client::with_uri_str("mongodb://127.0.0.1:1")
            .await
            .unwrap();
        let stripe = StripeConfig {
            secret_key: None,
            api_base: "http://127.0.0.1:1".to_string(),
        };
        let service = web::Data::new(CheckoutService::new(&client, "test", stripe));
        let app = test::init_service(App::new().app_data(service).configure(checkout_routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/create-checkout")
            .set_json(json!({ "productId": "  " }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["error"], "productId is required");
    }
}
