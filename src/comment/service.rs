use crate::comment::model::{Author, Comment, CommentDocument, CommentPayload};
use crate::comment::tree::{build_tree, can_modify, orphans};
use crate::utils::error::CustomError;
use chrono::Utc;
use futures_util::TryStreamExt;
use log::{debug, info, warn};
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Client, Collection};

pub const COMMENTS_COLLECTION: &str = "comments";

pub struct CommentService {
    collection: Collection<CommentDocument>,
}

/// Parse an id coming from a request body or query.
pub fn parse_object_id(raw: &str, what: &str) -> Result<ObjectId, CustomError> {
    ObjectId::parse_str(raw.trim())
        .map_err(|_| CustomError::BadRequestError(format!("Invalid {} ID", what)))
}

/// Parent id of a submission, parsed so it is stored in the same form as
/// the `_id` it refers to.
pub fn parent_reference(payload: &CommentPayload) -> Result<Option<ObjectId>, CustomError> {
    payload
        .parent_comment
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(|raw| parse_object_id(raw, "parent comment"))
        .transpose()
}

/// A reply must point at a live root comment of the same subject.
pub fn check_parent(parent: Option<&CommentDocument>, post_slug: &str) -> Result<(), CustomError> {
    let parent = parent
        .ok_or_else(|| CustomError::NotFoundError("Parent comment not found".to_string()))?;

    if parent.post_slug != post_slug {
        return Err(CustomError::BadRequestError(
            "Parent comment belongs to another post".to_string(),
        ));
    }
    if parent.parent_comment.is_some() {
        return Err(CustomError::BadRequestError(
            "Replies can only be attached to top-level comments".to_string(),
        ));
    }
    if parent.is_deleted {
        return Err(CustomError::BadRequestError(
            "Cannot reply to a deleted comment".to_string(),
        ));
    }
    Ok(())
}

/// Server-side repeat of the client's ownership check. The claim is
/// compared to the stored token and nothing else.
pub fn ensure_owner(stored: &CommentDocument, claimed: &str) -> Result<(), CustomError> {
    let comment = Comment::from(stored.clone());
    if !can_modify(&comment, Some(claimed)) {
        warn!(
            "Rejected modification of comment {} by non-matching author id",
            comment.id
        );
        return Err(CustomError::ForbiddenError(
            "You can only modify your own comments".to_string(),
        ));
    }
    if stored.is_deleted {
        return Err(CustomError::NotFoundError("Comment not found".to_string()));
    }
    Ok(())
}

impl CommentService {
    pub fn new(client: &Client, database: &str) -> Self {
        let collection = client
            .database(database)
            .collection::<CommentDocument>(COMMENTS_COLLECTION);
        CommentService { collection }
    }

    /// Every approved comment of a subject, oldest first, soft-deleted ones
    /// included so their replies keep a parent.
    pub async fn get_comments_for_post(&self, post_slug: &str) -> Result<Vec<Comment>, CustomError> {
        let cursor = self
            .collection
            .find(doc! { "post_slug": post_slug, "approved": true })
            .sort(doc! { "_id": 1 })
            .await
            .map_err(|e| {
                CustomError::InternalServerError(format!("Failed to fetch comments: {}", e))
            })?;

        let documents: Vec<CommentDocument> = cursor.try_collect().await.map_err(|e| {
            CustomError::InternalServerError(format!("Failed to collect comments: {}", e))
        })?;

        let comments: Vec<Comment> = documents.into_iter().map(Comment::from).collect();
        debug!(
            "Fetched {} comments for {} ({} roots, {} orphans)",
            comments.len(),
            post_slug,
            build_tree(&comments).len(),
            orphans(&comments).len()
        );
        Ok(comments)
    }

    pub async fn get_comment_by_id(
        &self,
        comment_id: &ObjectId,
    ) -> Result<Option<CommentDocument>, CustomError> {
        self.collection
            .find_one(doc! { "_id": comment_id })
            .await
            .map_err(|e| {
                CustomError::InternalServerError(format!("Failed to fetch comment: {}", e))
            })
    }

    /// Insert a validated, normalized submission.
    pub async fn add_comment(
        &self,
        payload: &CommentPayload,
        author_id: &str,
    ) -> Result<ObjectId, CustomError> {
        let post_slug = payload.post_slug.trim();
        let parent_id = parent_reference(payload)?;
        if let Some(parent_id) = &parent_id {
            let parent = self.get_comment_by_id(parent_id).await?;
            check_parent(parent.as_ref(), post_slug)?;
        }

        let comment = CommentDocument {
            id: None,
            post_slug: post_slug.to_string(),
            post_title: payload.post_title.clone(),
            content: payload.content.trim().to_string(),
            author: Author {
                name: payload.name.trim().to_string(),
                email: payload.email.trim().to_string(),
            },
            author_id: author_id.to_string(),
            rating: payload.rating.and_then(|r| i32::try_from(r).ok()),
            approved: true,
            is_edited: false,
            is_deleted: false,
            parent_comment: parent_id.map(|id| id.to_hex()),
            admin_reply: None,
            admin_reply_published: false,
            admin_reply_date: None,
            created_at: Utc::now(),
            updated_at: None,
        };

        let result = self.collection.insert_one(comment).await.map_err(|e| {
            CustomError::InternalServerError(format!("Failed to add comment: {}", e))
        })?;

        let id = result.inserted_id.as_object_id().ok_or_else(|| {
            CustomError::InternalServerError("Failed to get inserted comment ID".to_string())
        })?;
        info!("Comment {} added on {}", id.to_hex(), payload.post_slug);
        Ok(id)
    }

    /// Overwrite content and rating in place, marking the comment edited.
    pub async fn update_comment(
        &self,
        comment_id: &ObjectId,
        author_id: &str,
        payload: &CommentPayload,
    ) -> Result<(), CustomError> {
        let stored = self
            .get_comment_by_id(comment_id)
            .await?
            .ok_or_else(|| CustomError::NotFoundError("Comment not found".to_string()))?;
        ensure_owner(&stored, author_id)?;

        let rating = match stored.parent_comment {
            Some(_) => None,
            None => payload.rating.and_then(|r| i32::try_from(r).ok()),
        };

        self.collection
            .update_one(
                doc! { "_id": comment_id, "author_id": author_id },
                doc! {
                    "$set": {
                        "content": payload.content.trim(),
                        "rating": rating,
                        "is_edited": true,
                        "updated_at": Utc::now().to_rfc3339()
                    }
                },
            )
            .await
            .map_err(|e| {
                CustomError::InternalServerError(format!("Failed to update comment: {}", e))
            })?;

        info!("Comment {} edited", comment_id.to_hex());
        Ok(())
    }

    /// Soft-delete: the record stays so replies keep their parent.
    pub async fn delete_comment(
        &self,
        comment_id: &ObjectId,
        author_id: &str,
    ) -> Result<(), CustomError> {
        let stored = self
            .get_comment_by_id(comment_id)
            .await?
            .ok_or_else(|| CustomError::NotFoundError("Comment not found".to_string()))?;
        ensure_owner(&stored, author_id)?;

        self.collection
            .update_one(
                doc! { "_id": comment_id, "author_id": author_id },
                doc! {
                    "$set": {
                        "is_deleted": true,
                        "updated_at": Utc::now().to_rfc3339()
                    }
                },
            )
            .await
            .map_err(|e| {
                CustomError::InternalServerError(format!("Failed to delete comment: {}", e))
            })?;

        info!("Comment {} soft-deleted", comment_id.to_hex());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(author_id: &str) -> CommentDocument {
        CommentDocument {
            id: Some(ObjectId::new()),
            post_slug: "keto-brownies".to_string(),
            post_title: None,
            content: "So good".to_string(),
            author: Author::default(),
            author_id: author_id.to_string(),
            rating: Some(5),
            approved: true,
            is_edited: false,
            is_deleted: false,
            parent_comment: None,
            admin_reply: None,
            admin_reply_published: false,
            admin_reply_date: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_ensure_owner() {
        let stored = document("author_123");
        assert!(ensure_owner(&stored, "author_123").is_ok());
        assert!(matches!(
            ensure_owner(&stored, "author_456"),
            Err(CustomError::ForbiddenError(_))
        ));
        assert!(matches!(
            ensure_owner(&stored, ""),
            Err(CustomError::ForbiddenError(_))
        ));
    }

    #[test]
    fn test_ensure_owner_rejects_deleted() {
        let mut stored = document("author_123");
        stored.is_deleted = true;
        assert!(matches!(
            ensure_owner(&stored, "author_123"),
            Err(CustomError::NotFoundError(_))
        ));
    }

    #[test]
    fn test_check_parent() {
        let root = document("author_123");
        assert!(check_parent(Some(&root), "keto-brownies").is_ok());
        assert!(matches!(
            check_parent(None, "keto-brownies"),
            Err(CustomError::NotFoundError(_))
        ));
        assert!(matches!(
            check_parent(Some(&root), "lemon-tart"),
            Err(CustomError::BadRequestError(_))
        ));

        let mut reply = document("author_123");
        reply.parent_comment = Some(ObjectId::new().to_hex());
        assert!(matches!(
            check_parent(Some(&reply), "keto-brownies"),
            Err(CustomError::BadRequestError(_))
        ));

        let mut deleted = document("author_123");
        deleted.is_deleted = true;
        assert!(check_parent(Some(&deleted), "keto-brownies").is_err());
    }

    #[test]
    fn test_parent_reference_is_stored_canonically() {
        let root = document("author_123");
        let root_id = root.id.unwrap();

        let payload = CommentPayload {
            post_slug: " keto-brownies ".to_string(),
            parent_comment: Some(format!("  {}  ", root_id.to_hex())),
            ..Default::default()
        };
        let parent = parent_reference(&payload).unwrap().unwrap();
        assert_eq!(parent.to_hex(), root_id.to_hex());

        // the stored reference resolves in the tree like any other reply
        let mut reply = document("author_123");
        reply.parent_comment = Some(parent.to_hex());
        let comments = vec![Comment::from(root.clone()), Comment::from(reply)];
        assert_eq!(build_tree(&comments)[0].replies.len(), 1);

        assert!(check_parent(Some(&root), payload.post_slug.trim()).is_ok());

        let blank = CommentPayload {
            parent_comment: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(parent_reference(&blank).unwrap(), None);
    }

    #[test]
    fn test_parse_object_id() {
        let id = ObjectId::new();
        assert_eq!(parse_object_id(&id.to_hex(), "comment").unwrap(), id);
        assert!(matches!(
            parse_object_id("nope", "comment"),
            Err(CustomError::BadRequestError(msg)) if msg == "Invalid comment ID"
        ));
    }
}
