use crate::comment::model::{Comment, CommentDocument};
use crate::comment::service::COMMENTS_COLLECTION;
use crate::utils::error::CustomError;
use chrono::Utc;
use futures_util::TryStreamExt;
use log::info;
use mongodb::bson::{Document, doc, oid::ObjectId};
use mongodb::{Client, Collection};
use serde::Deserialize;

const QUEUE_LIMIT: i64 = 200;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    #[default]
    Pending,
    Approved,
    Deleted,
    All,
}

pub fn status_filter(status: ModerationStatus) -> Document {
    match status {
        ModerationStatus::Pending => doc! { "approved": false, "is_deleted": false },
        ModerationStatus::Approved => doc! { "approved": true, "is_deleted": false },
        ModerationStatus::Deleted => doc! { "is_deleted": true },
        ModerationStatus::All => doc! {},
    }
}

pub struct ModerationService {
    collection: Collection<CommentDocument>,
}

impl ModerationService {
    pub fn new(client: &Client, database: &str) -> Self {
        let collection = client
            .database(database)
            .collection::<CommentDocument>(COMMENTS_COLLECTION);
        ModerationService { collection }
    }

    /// Comments across all subjects in a given state, newest first.
    pub async fn list_by_status(&self, status: ModerationStatus) -> Result<Vec<Comment>, CustomError> {
        let cursor = self
            .collection
            .find(status_filter(status))
            .sort(doc! { "_id": -1 })
            .limit(QUEUE_LIMIT)
            .await
            .map_err(|e| {
                CustomError::InternalServerError(format!("Failed to fetch moderation queue: {}", e))
            })?;

        let documents: Vec<CommentDocument> = cursor.try_collect().await.map_err(|e| {
            CustomError::InternalServerError(format!("Failed to collect moderation queue: {}", e))
        })?;

        Ok(documents.into_iter().map(Comment::from).collect())
    }

    async fn set_fields(&self, comment_id: &ObjectId, fields: Document) -> Result<(), CustomError> {
        let result = self
            .collection
            .update_one(doc! { "_id": comment_id }, doc! { "$set": fields })
            .await
            .map_err(|e| {
                CustomError::InternalServerError(format!("Failed to update comment: {}", e))
            })?;

        if result.matched_count == 0 {
            return Err(CustomError::NotFoundError("Comment not found".to_string()));
        }
        Ok(())
    }

    pub async fn set_approval(
        &self,
        comment_id: &ObjectId,
        approved: bool,
        moderator: &str,
    ) -> Result<(), CustomError> {
        self.set_fields(comment_id, doc! { "approved": approved })
            .await?;
        info!(
            "Comment {} {} by {}",
            comment_id.to_hex(),
            if approved { "approved" } else { "unapproved" },
            moderator
        );
        Ok(())
    }

    /// Attach the single official reply to a root comment.
    pub async fn set_admin_reply(
        &self,
        comment_id: &ObjectId,
        reply: &str,
        published: bool,
        moderator: &str,
    ) -> Result<(), CustomError> {
        let stored = self
            .collection
            .find_one(doc! { "_id": comment_id })
            .await
            .map_err(|e| {
                CustomError::InternalServerError(format!("Failed to fetch comment: {}", e))
            })?
            .ok_or_else(|| CustomError::NotFoundError("Comment not found".to_string()))?;

        if stored.parent_comment.is_some() {
            return Err(CustomError::BadRequestError(
                "Official replies can only be attached to top-level comments".to_string(),
            ));
        }

        self.set_fields(
            comment_id,
            doc! {
                "admin_reply": reply.trim(),
                "admin_reply_published": published,
                "admin_reply_date": Utc::now().to_rfc3339()
            },
        )
        .await?;
        info!("Official reply set on {} by {}", comment_id.to_hex(), moderator);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_filter() {
        let pending = status_filter(ModerationStatus::Pending);
        assert!(!pending.get_bool("approved").unwrap());
        assert!(!pending.get_bool("is_deleted").unwrap());

        let deleted = status_filter(ModerationStatus::Deleted);
        assert!(deleted.get_bool("is_deleted").unwrap());
        assert!(deleted.get("approved").is_none());

        assert!(status_filter(ModerationStatus::All).is_empty());
    }

    #[test]
    fn test_status_parses_lowercase() {
        let status: ModerationStatus = serde_json::from_str("\"approved\"").unwrap();
        assert_eq!(status, ModerationStatus::Approved);
    }
}
