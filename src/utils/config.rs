use std::env;

pub const DEFAULT_SERVICE_NAME: &str = "recipe-forum-backend";

/// Name echoed back in every response envelope.
pub fn service_name() -> String {
    env::var("SERVICE_NAME").unwrap_or_else(|_| DEFAULT_SERVICE_NAME.to_string())
}

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub database_name: String,
    /// Moderation routes are only mounted when this is set.
    pub admin_jwt_secret: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| "PORT must be a valid number")?,
            mongodb_uri: env::var("MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            database_name: env::var("MONGODB_DATABASE")
                .unwrap_or_else(|_| "recipe_blogdb".to_string()),
            admin_jwt_secret: env::var("ADMIN_JWT_SECRET")
                .ok()
                .filter(|s| !s.trim().is_empty()),
        })
    }
}

/// Payment processor configuration
#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: Option<String>,
    pub api_base: String,
}

impl StripeConfig {
    pub fn from_env() -> Self {
        Self {
            secret_key: env::var("STRIPE_SECRET_KEY")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            api_base: env::var("STRIPE_API_BASE")
                .unwrap_or_else(|_| "https://api.stripe.com".to_string()),
        }
    }

    pub fn payment_intents_url(&self) -> String {
        format!("{}/v1/payment_intents", self.api_base.trim_end_matches('/'))
    }

    pub fn is_live(&self) -> bool {
        self.secret_key.is_some()
    }
}
