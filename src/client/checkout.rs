use log::info;

use crate::client::ClientError;
use crate::client::api::CheckoutApi;

/// Card confirmation against the payment processor, given a client secret.
#[allow(async_fn_in_trait)]
pub trait PaymentProcessor {
    async fn confirm(&self, client_secret: &str) -> Result<PaymentOutcome, String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Succeeded,
    Processing,
}

/// A created intent awaiting confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSession {
    pub product_id: String,
    pub client_secret: String,
    /// Minor units.
    pub amount: i64,
}

impl CheckoutSession {
    pub fn is_simulation(&self) -> bool {
        self.client_secret == crate::checkout::model::DEV_CLIENT_SECRET
    }
}

/// Buy one product: create an intent on the server, then confirm it with
/// the processor. A failed confirmation keeps the session so the user can
/// try again by hand.
pub struct CheckoutFlow<A> {
    api: A,
    session: Option<CheckoutSession>,
    outcome: Option<PaymentOutcome>,
    error: Option<String>,
}

impl<A: CheckoutApi> CheckoutFlow<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            session: None,
            outcome: None,
            error: None,
        }
    }

    pub fn session(&self) -> Option<&CheckoutSession> {
        self.session.as_ref()
    }

    pub fn outcome(&self) -> Option<PaymentOutcome> {
        self.outcome
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn start(&mut self, product_id: &str) -> Result<&CheckoutSession, ClientError> {
        self.error = None;
        self.outcome = None;

        let product_id = product_id.trim();
        if product_id.is_empty() {
            let e = ClientError::NotAllowed("productId is required".to_string());
            self.error = Some(e.to_string());
            return Err(e);
        }

        match self.api.create_checkout(product_id).await {
            Ok(response) => {
                info!("Checkout created for {} ({} minor units)", product_id, response.amount);
                let session = self.session.insert(CheckoutSession {
                    product_id: product_id.to_string(),
                    client_secret: response.client_secret,
                    amount: response.amount,
                });
                Ok(&*session)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub async fn confirm<P: PaymentProcessor>(
        &mut self,
        processor: &P,
    ) -> Result<PaymentOutcome, ClientError> {
        self.error = None;

        let session = match &self.session {
            Some(session) => session,
            None => {
                let e = ClientError::NotAllowed("No checkout in progress".to_string());
                self.error = Some(e.to_string());
                return Err(e);
            }
        };

        let result = if session.is_simulation() {
            simulated_confirmation()
        } else {
            processor
                .confirm(&session.client_secret)
                .await
                .map_err(ClientError::Payment)
        };

        match result {
            Ok(outcome) => {
                self.outcome = Some(outcome);
                if outcome == PaymentOutcome::Succeeded {
                    self.session = None;
                }
                Ok(outcome)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(debug_assertions)]
fn simulated_confirmation() -> Result<PaymentOutcome, ClientError> {
    log::warn!("Simulating a successful payment for a development checkout");
    Ok(PaymentOutcome::Succeeded)
}

#[cfg(not(debug_assertions))]
fn simulated_confirmation() -> Result<PaymentOutcome, ClientError> {
    Err(ClientError::Payment(
        "Payments are not configured on this server".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::model::{CheckoutResponse, DEV_CLIENT_SECRET};
    use std::cell::RefCell;

    struct FakeCheckout {
        response: Result<CheckoutResponse, String>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeCheckout {
        fn returning(client_secret: &str) -> Self {
            Self {
                response: Ok(CheckoutResponse {
                    client_secret: client_secret.to_string(),
                    amount: 1999,
                }),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl CheckoutApi for FakeCheckout {
        async fn create_checkout(&self, product_id: &str) -> Result<CheckoutResponse, ClientError> {
            self.calls.borrow_mut().push(product_id.to_string());
            self.response.clone().map_err(ClientError::Server)
        }
    }

    struct FakeProcessor {
        result: Result<PaymentOutcome, String>,
        calls: RefCell<usize>,
    }

    impl FakeProcessor {
        fn new(result: Result<PaymentOutcome, String>) -> Self {
            Self {
                result,
                calls: RefCell::new(0),
            }
        }
    }

    impl PaymentProcessor for FakeProcessor {
        async fn confirm(&self, _client_secret: &str) -> Result<PaymentOutcome, String> {
            *self.calls.borrow_mut() += 1;
            self.result.clone()
        }
    }

    #[tokio::test]
    async fn test_start_requires_product() {
        let mut flow = CheckoutFlow::new(FakeCheckout::returning("pi_secret"));
        assert!(flow.start("  ").await.is_err());
        assert!(flow.api.calls.borrow().is_empty());
        assert_eq!(flow.error(), Some("productId is required"));
    }

    #[tokio::test]
    async fn test_successful_payment_clears_session() {
        let mut flow = CheckoutFlow::new(FakeCheckout::returning("pi_123_secret_456"));
        let session = flow.start("ebook-keto").await.unwrap();
        assert_eq!(session.amount, 1999);

        let processor = FakeProcessor::new(Ok(PaymentOutcome::Succeeded));
        assert_eq!(flow.confirm(&processor).await.unwrap(), PaymentOutcome::Succeeded);
        assert_eq!(*processor.calls.borrow(), 1);
        assert!(flow.session().is_none());
    }

    #[tokio::test]
    async fn test_declined_card_keeps_session_and_message() {
        let mut flow = CheckoutFlow::new(FakeCheckout::returning("pi_123_secret_456"));
        flow.start("ebook-keto").await.unwrap();

        let processor = FakeProcessor::new(Err("Your card was declined.".to_string()));
        let err = flow.confirm(&processor).await.unwrap_err();
        assert!(matches!(err, ClientError::Payment(_)));
        assert_eq!(flow.error(), Some("Your card was declined."));
        assert!(flow.session().is_some());
        // no automatic retry
        assert_eq!(*processor.calls.borrow(), 1);
    }

    #[tokio::test]
    async fn test_server_error_surfaces_verbatim() {
        let api = FakeCheckout {
            response: Err("Product not found".to_string()),
            calls: RefCell::new(Vec::new()),
        };
        let mut flow = CheckoutFlow::new(api);
        assert!(flow.start("missing").await.is_err());
        assert_eq!(flow.error(), Some("Product not found"));
        assert!(flow.session().is_none());
    }

    #[tokio::test]
    async fn test_confirm_without_session() {
        let mut flow = CheckoutFlow::new(FakeCheckout::returning("pi_secret"));
        let processor = FakeProcessor::new(Ok(PaymentOutcome::Succeeded));
        assert!(flow.confirm(&processor).await.is_err());
        assert_eq!(*processor.calls.borrow(), 0);
    }

    #[cfg(debug_assertions)]
    #[tokio::test]
    async fn test_dev_sentinel_skips_processor() {
        let mut flow = CheckoutFlow::new(FakeCheckout::returning(DEV_CLIENT_SECRET));
        assert!(flow.start("ebook-keto").await.unwrap().is_simulation());

        let processor = FakeProcessor::new(Err("should not be called".to_string()));
        assert_eq!(flow.confirm(&processor).await.unwrap(), PaymentOutcome::Succeeded);
        assert_eq!(*processor.calls.borrow(), 0);
    }
}
