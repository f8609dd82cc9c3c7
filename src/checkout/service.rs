use crate::checkout::model::{
    CheckoutResponse, PaymentIntent, Product, ProcessorErrorResponse,
};
use crate::utils::config::StripeConfig;
use crate::utils::error::CustomError;
use log::{info, warn};
use mongodb::bson::doc;
use mongodb::{Client, Collection};
use uuid::Uuid;

pub const PRODUCTS_COLLECTION: &str = "products";

/// Creates payment intents for catalogue products.
pub struct CheckoutService {
    products: Collection<Product>,
    stripe: StripeConfig,
    client: reqwest::Client,
}

/// Form fields of a payment intent creation request.
pub fn intent_form(product: &Product) -> Vec<(&'static str, String)> {
    vec![
        ("amount", product.price.to_string()),
        ("currency", product.currency.to_lowercase()),
        ("automatic_payment_methods[enabled]", "true".to_string()),
        ("metadata[product_id]", product.id.clone()),
        ("description", product.name.clone()),
    ]
}

/// Turn a processor error body into the message shown to the buyer.
pub fn processor_error_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<ProcessorErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| format!("Payment processor returned {}", status))
}

/// Development stand-in for the processor. Only compiled into debug builds.
#[cfg(debug_assertions)]
pub fn simulated_checkout(product: &Product) -> Result<CheckoutResponse, CustomError> {
    use crate::checkout::model::DEV_CLIENT_SECRET;

    warn!(
        "No payment processor key configured, simulating checkout for {}",
        product.id
    );
    Ok(CheckoutResponse {
        client_secret: DEV_CLIENT_SECRET.to_string(),
        amount: product.price,
    })
}

#[cfg(not(debug_assertions))]
pub fn simulated_checkout(_product: &Product) -> Result<CheckoutResponse, CustomError> {
    Err(CustomError::InternalServerError(
        "Payment processor is not configured".to_string(),
    ))
}

impl CheckoutService {
    pub fn new(client: &Client, database: &str, stripe: StripeConfig) -> Self {
        let products = client
            .database(database)
            .collection::<Product>(PRODUCTS_COLLECTION);
        CheckoutService {
            products,
            stripe,
            client: reqwest::Client::new(),
        }
    }

    pub async fn find_product(&self, product_id: &str) -> Result<Product, CustomError> {
        self.products
            .find_one(doc! { "_id": product_id, "active": true })
            .await
            .map_err(|e| {
                CustomError::InternalServerError(format!("Failed to fetch product: {}", e))
            })?
            .ok_or_else(|| CustomError::NotFoundError("Product not found".to_string()))
    }

    /// Create a payment intent for `product_id`. The simulated path is only
    /// reachable when no processor key is configured.
    pub async fn create_checkout(&self, product_id: &str) -> Result<CheckoutResponse, CustomError> {
        let product = self.find_product(product_id).await?;

        match &self.stripe.secret_key {
            Some(secret_key) => self.create_payment_intent(secret_key, &product).await,
            None => simulated_checkout(&product),
        }
    }

    async fn create_payment_intent(
        &self,
        secret_key: &str,
        product: &Product,
    ) -> Result<CheckoutResponse, CustomError> {
        let response = self
            .client
            .post(self.stripe.payment_intents_url())
            .bearer_auth(secret_key)
            .header("Idempotency-Key", Uuid::new_v4().to_string())
            .form(&intent_form(product))
            .send()
            .await
            .map_err(|e| {
                CustomError::PaymentError(format!("Failed to reach payment processor: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = processor_error_message(status, &body);
            warn!("Payment intent for {} failed: {}", product.id, message);
            return Err(CustomError::PaymentError(message));
        }

        let intent = response.json::<PaymentIntent>().await.map_err(|e| {
            CustomError::PaymentError(format!("Failed to parse payment intent: {}", e))
        })?;

        info!(
            "Payment intent {} created for {} ({} {})",
            intent.id, product.id, intent.amount, product.currency
        );
        Ok(CheckoutResponse {
            client_secret: intent.client_secret,
            amount: intent.amount,
        })
    }
}
