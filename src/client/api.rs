use reqwest::header::CACHE_CONTROL;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::checkout::model::{CheckoutResponse, CreateCheckoutRequest};
use crate::client::ClientError;
use crate::comment::model::{
    Comment, CommentListResponse, CommentPayload, DeleteCommentRequest, MessageResponse,
};
use crate::forum::model::{ForumListResponse, ForumPost, ForumPostPayload};

/// Transport for the comment endpoints.
#[allow(async_fn_in_trait)]
pub trait CommentApi {
    async fn fetch_comments(&self, post_slug: &str) -> Result<Vec<Comment>, ClientError>;
    async fn create_comment(&self, payload: &CommentPayload) -> Result<String, ClientError>;
    async fn update_comment(&self, payload: &CommentPayload) -> Result<String, ClientError>;
    async fn delete_comment(&self, request: &DeleteCommentRequest) -> Result<String, ClientError>;
}

/// Transport for the forum endpoints.
#[allow(async_fn_in_trait)]
pub trait ForumApi {
    async fn list_posts(&self, category: Option<&str>) -> Result<Vec<ForumPost>, ClientError>;
    async fn search_posts(
        &self,
        query: &str,
        category: Option<&str>,
    ) -> Result<Vec<ForumPost>, ClientError>;
    async fn create_post(&self, payload: &ForumPostPayload) -> Result<ForumPost, ClientError>;
}

/// Transport for the checkout endpoint.
#[allow(async_fn_in_trait)]
pub trait CheckoutApi {
    async fn create_checkout(&self, product_id: &str) -> Result<CheckoutResponse, ClientError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    posts: Vec<ForumPost>,
}

#[derive(Debug, Deserialize)]
struct CreatedPost {
    post: ForumPost,
}

/// reqwest-backed transport against a running server.
#[derive(Debug, Clone)]
pub struct HttpApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ClientError::Transport(format!("Malformed response: {}", e)));
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or_else(|_| format!("Request failed with status {}", status));
        Err(ClientError::Server(message))
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Self::read(response).await
    }
}

impl CommentApi for HttpApi {
    async fn fetch_comments(&self, post_slug: &str) -> Result<Vec<Comment>, ClientError> {
        let request = self
            .client
            .get(self.url("/api/comments"))
            .query(&[("postSlug", post_slug)])
            .header(CACHE_CONTROL, "no-store");
        let body: CommentListResponse = self.send(request).await?;
        Ok(body.comments)
    }

    async fn create_comment(&self, payload: &CommentPayload) -> Result<String, ClientError> {
        let request = self.client.post(self.url("/api/comments")).json(payload);
        let body: MessageResponse = self.send(request).await?;
        Ok(body.message)
    }

    async fn update_comment(&self, payload: &CommentPayload) -> Result<String, ClientError> {
        let request = self.client.put(self.url("/api/comments")).json(payload);
        let body: MessageResponse = self.send(request).await?;
        Ok(body.message)
    }

    async fn delete_comment(&self, request: &DeleteCommentRequest) -> Result<String, ClientError> {
        let request = self.client.delete(self.url("/api/comments")).json(request);
        let body: MessageResponse = self.send(request).await?;
        Ok(body.message)
    }
}

impl ForumApi for HttpApi {
    async fn list_posts(&self, category: Option<&str>) -> Result<Vec<ForumPost>, ClientError> {
        let mut request = self
            .client
            .get(self.url("/api/forum"))
            .header(CACHE_CONTROL, "no-store");
        if let Some(category) = category {
            request = request.query(&[("category", category)]);
        }
        let body: ForumListResponse = self.send(request).await?;
        Ok(body.posts)
    }

    async fn search_posts(
        &self,
        query: &str,
        category: Option<&str>,
    ) -> Result<Vec<ForumPost>, ClientError> {
        let mut request = self
            .client
            .get(self.url("/api/forum/search"))
            .query(&[("q", query)]);
        if let Some(category) = category {
            request = request.query(&[("category", category)]);
        }
        let body: SearchResponse = self.send(request).await?;
        Ok(body.posts)
    }

    async fn create_post(&self, payload: &ForumPostPayload) -> Result<ForumPost, ClientError> {
        let request = self.client.post(self.url("/api/forum")).json(payload);
        let body: CreatedPost = self.send(request).await?;
        Ok(body.post)
    }
}

impl CheckoutApi for HttpApi {
    async fn create_checkout(&self, product_id: &str) -> Result<CheckoutResponse, ClientError> {
        let request = self
            .client
            .post(self.url("/api/create-checkout"))
            .json(&CreateCheckoutRequest {
                product_id: product_id.to_string(),
            });
        self.send(request).await
    }
}
