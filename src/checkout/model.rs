use serde::{Deserialize, Serialize};

/// `clientSecret` returned when the processor is bypassed in development
/// builds. Clients treat it as "simulate a successful payment".
pub const DEV_CLIENT_SECRET: &str = "dev_mode_simulation";

/// Product document from the `products` collection. Prices are in minor
/// units (cents).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub price: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub active: bool,
}

fn default_currency() -> String {
    "eur".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRequest {
    #[serde(default)]
    pub product_id: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub client_secret: String,
    pub amount: i64,
}

impl CheckoutResponse {
    pub fn is_simulation(&self) -> bool {
        self.client_secret == DEV_CLIENT_SECRET
    }
}

/// Subset of the processor's payment intent object we read back.
#[derive(Debug, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct ProcessorError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ProcessorErrorResponse {
    pub error: ProcessorError,
}
