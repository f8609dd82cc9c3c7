use crate::comment::model::Author;
use crate::forum::model::{ForumCategory, ForumPost, ForumPostDocument, ForumPostPayload};
use crate::utils::error::CustomError;
use crate::utils::helpers::generate_slug;
use chrono::Utc;
use futures_util::TryStreamExt;
use log::{info, warn};
use mongodb::bson::{Document, doc, oid::ObjectId};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection};

pub const FORUM_COLLECTION: &str = "forum_posts";
pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 50;
const SEARCH_RESULT_LIMIT: i64 = 50;

pub struct ForumService {
    collection: Collection<ForumPostDocument>,
}

/// Skip and limit for a 1-based page.
pub fn page_window(page: Option<u64>, limit: Option<i64>) -> (u64, i64) {
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let page = page.unwrap_or(1).max(1);
    // the server reads skip as a signed 64-bit value
    let skip = (page - 1).saturating_mul(limit as u64).min(i64::MAX as u64);
    (skip, limit)
}

/// Case-insensitive substring match on title or content, optionally within a
/// category. The query text is matched literally.
pub fn search_filter(query: Option<&str>, category: Option<ForumCategory>) -> Document {
    let mut filter = doc! { "is_deleted": false };

    if let Some(q) = query.map(str::trim).filter(|q| !q.is_empty()) {
        let pattern = regex::escape(q);
        filter.insert(
            "$or",
            vec![
                doc! { "title": { "$regex": pattern.as_str(), "$options": "i" } },
                doc! { "content": { "$regex": pattern.as_str(), "$options": "i" } },
            ],
        );
    }
    if let Some(category) = category {
        filter.insert("category", category.as_str());
    }
    filter
}

pub fn ensure_post_owner(stored: &ForumPostDocument, claimed: &str) -> Result<(), CustomError> {
    if claimed.is_empty() || stored.author_id != claimed {
        warn!(
            "Rejected modification of forum post {} by non-matching author id",
            stored.slug
        );
        return Err(CustomError::ForbiddenError(
            "You can only modify your own posts".to_string(),
        ));
    }
    if stored.is_deleted {
        return Err(CustomError::NotFoundError("Post not found".to_string()));
    }
    Ok(())
}

impl ForumService {
    pub fn new(client: &Client, database: &str) -> Self {
        let collection = client
            .database(database)
            .collection::<ForumPostDocument>(FORUM_COLLECTION);
        ForumService { collection }
    }

    async fn collect(&self, filter: Document, skip: u64, limit: i64) -> Result<Vec<ForumPost>, CustomError> {
        let cursor = self
            .collection
            .find(filter)
            .sort(doc! { "_id": -1 })
            .skip(skip)
            .limit(limit)
            .await
            .map_err(|e| {
                CustomError::InternalServerError(format!("Failed to fetch forum posts: {}", e))
            })?;

        let documents: Vec<ForumPostDocument> = cursor.try_collect().await.map_err(|e| {
            CustomError::InternalServerError(format!("Failed to collect forum posts: {}", e))
        })?;

        Ok(documents.into_iter().map(ForumPost::from).collect())
    }

    /// Live posts, newest first
    pub async fn list_posts(
        &self,
        category: Option<ForumCategory>,
        page: Option<u64>,
        limit: Option<i64>,
    ) -> Result<Vec<ForumPost>, CustomError> {
        let (skip, limit) = page_window(page, limit);
        self.collect(search_filter(None, category), skip, limit).await
    }

    pub async fn search_posts(
        &self,
        query: Option<&str>,
        category: Option<ForumCategory>,
    ) -> Result<Vec<ForumPost>, CustomError> {
        self.collect(search_filter(query, category), 0, SEARCH_RESULT_LIMIT)
            .await
    }

    /// Fetch a post by slug, counting the view.
    pub async fn view_post(&self, slug: &str) -> Result<Option<ForumPost>, CustomError> {
        let post = self
            .collection
            .find_one_and_update(
                doc! { "slug": slug, "is_deleted": false },
                doc! { "$inc": { "views": 1 } },
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| {
                CustomError::InternalServerError(format!("Failed to fetch forum post: {}", e))
            })?;

        Ok(post.map(ForumPost::from))
    }

    pub async fn create_post(
        &self,
        payload: &ForumPostPayload,
        category: ForumCategory,
        author_id: &str,
    ) -> Result<ForumPost, CustomError> {
        let mut post = ForumPostDocument {
            id: None,
            slug: generate_slug(&payload.title),
            title: payload.title.trim().to_string(),
            content: payload.content.trim().to_string(),
            category,
            author: Author {
                name: payload.author_name.trim().to_string(),
                email: payload.author_email.trim().to_string(),
            },
            author_id: author_id.to_string(),
            views: 0,
            likes: 0,
            replies: 0,
            is_edited: false,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: None,
        };

        let result = self.collection.insert_one(&post).await.map_err(|e| {
            CustomError::InternalServerError(format!("Failed to create forum post: {}", e))
        })?;
        post.id = result.inserted_id.as_object_id();

        info!("Forum post {} created in {}", post.slug, category.as_str());
        Ok(ForumPost::from(post))
    }

    async fn get_by_id(&self, post_id: &ObjectId) -> Result<ForumPostDocument, CustomError> {
        self.collection
            .find_one(doc! { "_id": post_id })
            .await
            .map_err(|e| {
                CustomError::InternalServerError(format!("Failed to fetch forum post: {}", e))
            })?
            .ok_or_else(|| CustomError::NotFoundError("Post not found".to_string()))
    }

    pub async fn update_post(
        &self,
        post_id: &ObjectId,
        author_id: &str,
        payload: &ForumPostPayload,
        category: ForumCategory,
    ) -> Result<(), CustomError> {
        let stored = self.get_by_id(post_id).await?;
        ensure_post_owner(&stored, author_id)?;

        self.collection
            .update_one(
                doc! { "_id": post_id, "author_id": author_id },
                doc! {
                    "$set": {
                        "title": payload.title.trim(),
                        "content": payload.content.trim(),
                        "category": category.as_str(),
                        "is_edited": true,
                        "updated_at": Utc::now().to_rfc3339()
                    }
                },
            )
            .await
            .map_err(|e| {
                CustomError::InternalServerError(format!("Failed to update forum post: {}", e))
            })?;

        info!("Forum post {} edited", stored.slug);
        Ok(())
    }

    pub async fn delete_post(&self, post_id: &ObjectId, author_id: &str) -> Result<(), CustomError> {
        let stored = self.get_by_id(post_id).await?;
        ensure_post_owner(&stored, author_id)?;

        self.collection
            .update_one(
                doc! { "_id": post_id, "author_id": author_id },
                doc! {
                    "$set": {
                        "is_deleted": true,
                        "updated_at": Utc::now().to_rfc3339()
                    }
                },
            )
            .await
            .map_err(|e| {
                CustomError::InternalServerError(format!("Failed to delete forum post: {}", e))
            })?;

        info!("Forum post {} soft-deleted", stored.slug);
        Ok(())
    }

    pub async fn like_post(&self, slug: &str) -> Result<i64, CustomError> {
        let post = self
            .collection
            .find_one_and_update(
                doc! { "slug": slug, "is_deleted": false },
                doc! { "$inc": { "likes": 1 } },
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| {
                CustomError::InternalServerError(format!("Failed to like forum post: {}", e))
            })?
            .ok_or_else(|| CustomError::NotFoundError("Post not found".to_string()))?;

        Ok(post.likes)
    }

    /// Bump the reply counter when a comment lands on a forum thread. Slugs
    /// that belong to recipes match nothing.
    pub async fn record_reply(&self, slug: &str) -> Result<(), CustomError> {
        self.collection
            .update_one(
                doc! { "slug": slug, "is_deleted": false },
                doc! { "$inc": { "replies": 1 } },
            )
            .await
            .map_err(|e| {
                CustomError::InternalServerError(format!("Failed to count forum reply: {}", e))
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_window() {
        assert_eq!(page_window(None, None), (0, DEFAULT_PAGE_SIZE));
        assert_eq!(page_window(Some(3), Some(10)), (20, 10));
        assert_eq!(page_window(Some(0), Some(500)), (0, MAX_PAGE_SIZE));
        assert_eq!(page_window(Some(2), Some(-4)), (1, 1));
        assert_eq!(page_window(Some(u64::MAX), Some(50)), (i64::MAX as u64, 50));
    }

    #[test]
    fn test_search_filter_escapes_query() {
        let filter = search_filter(Some(" keto (2024)? "), Some(ForumCategory::Recipes));
        assert_eq!(filter.get_str("category").unwrap(), "recipes");
        assert!(!filter.get_bool("is_deleted").unwrap());

        let or = filter.get_array("$or").unwrap();
        let title = or[0].as_document().unwrap().get_document("title").unwrap();
        assert_eq!(title.get_str("$regex").unwrap(), r"keto \(2024\)\?");
        assert_eq!(title.get_str("$options").unwrap(), "i");
    }

    #[test]
    fn test_search_filter_without_query() {
        let filter = search_filter(Some("   "), None);
        assert!(filter.get("$or").is_none());
        assert!(filter.get("category").is_none());
    }

    #[test]
    fn test_ensure_post_owner() {
        let post = ForumPostDocument {
            id: Some(ObjectId::new()),
            slug: "hello-abc123".to_string(),
            title: "Hello".to_string(),
            content: "World".to_string(),
            category: ForumCategory::General,
            author: Author::default(),
            author_id: "author_123".to_string(),
            views: 0,
            likes: 0,
            replies: 0,
            is_edited: false,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: None,
        };
        assert!(ensure_post_owner(&post, "author_123").is_ok());
        assert!(ensure_post_owner(&post, "author_456").is_err());
        assert!(ensure_post_owner(&post, "").is_err());
    }
}
