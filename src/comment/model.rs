use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Identity typed in by the submitter. Never checked against any account.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    /// Left out of public listings, see [`Comment::public`].
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
}

/// Comment as stored in the `comments` collection.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CommentDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub post_slug: String,
    #[serde(default)]
    pub post_title: Option<String>,
    pub content: String,
    pub author: Author,
    pub author_id: String,
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default = "default_true")]
    pub approved: bool,
    #[serde(default)]
    pub is_edited: bool,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub parent_comment: Option<String>,
    #[serde(default)]
    pub admin_reply: Option<String>,
    #[serde(default)]
    pub admin_reply_published: bool,
    #[serde(default)]
    pub admin_reply_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Flat comment record as served by `GET /api/comments`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub post_slug: String,
    #[serde(default)]
    pub post_title: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    pub content: String,
    pub author: Author,
    pub author_id: String,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default = "default_true")]
    pub approved: bool,
    #[serde(default)]
    pub is_edited: bool,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub parent_comment: Option<String>,
    #[serde(default)]
    pub admin_reply: Option<String>,
    #[serde(default)]
    pub admin_reply_published: bool,
    #[serde(default)]
    pub admin_reply_date: Option<DateTime<Utc>>,
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        self.parent_comment.is_some()
    }

    /// Copy fit for anonymous readers: the submitter's email is dropped.
    pub fn public(mut self) -> Self {
        self.author.email.clear();
        self
    }
}

impl From<CommentDocument> for Comment {
    fn from(doc: CommentDocument) -> Self {
        Comment {
            id: doc.id.map(|id| id.to_hex()).unwrap_or_default(),
            post_slug: doc.post_slug,
            post_title: doc.post_title,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
            content: doc.content,
            author: doc.author,
            author_id: doc.author_id,
            // replies never surface a rating, whatever the document holds
            rating: match doc.parent_comment {
                Some(_) => None,
                None => doc.rating.and_then(|r| u8::try_from(r).ok()),
            },
            approved: doc.approved,
            is_edited: doc.is_edited,
            is_deleted: doc.is_deleted,
            parent_comment: doc.parent_comment,
            admin_reply: doc.admin_reply,
            admin_reply_published: doc.admin_reply_published,
            admin_reply_date: doc.admin_reply_date,
        }
    }
}

/// Body of `POST /api/comments` and `PUT /api/comments`.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommentPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub parent_comment: Option<String>,
    #[serde(default)]
    pub post_slug: String,
    #[serde(default)]
    pub post_title: Option<String>,
    #[serde(default)]
    pub author_id: Option<String>,
    /// Set only when editing.
    #[serde(default)]
    pub comment_id: Option<String>,
}

/// Body of `DELETE /api/comments`.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCommentRequest {
    pub comment_id: String,
    pub author_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentListQuery {
    pub post_slug: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentTreeQuery {
    pub post_slug: String,
    pub author_id: Option<String>,
    pub lang: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentListResponse {
    pub comments: Vec<Comment>,
}

/// `{ message }` success body shared by the mutation endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_uses_camel_case_keys() {
        let payload: CommentPayload = serde_json::from_value(serde_json::json!({
            "name": "Ana",
            "email": "ana@example.com",
            "content": "Made it twice already",
            "rating": 5,
            "parentComment": null,
            "postSlug": "keto-brownies",
            "postTitle": "Keto brownies",
            "authorId": "author_0123456789abcdef",
            "commentId": null
        }))
        .unwrap();
        assert_eq!(payload.post_slug, "keto-brownies");
        assert_eq!(payload.rating, Some(5));
        assert_eq!(payload.author_id.as_deref(), Some("author_0123456789abcdef"));
    }

    #[test]
    fn test_document_conversion_hides_reply_rating() {
        let doc = CommentDocument {
            id: Some(ObjectId::new()),
            post_slug: "keto-brownies".to_string(),
            post_title: None,
            content: "Agreed".to_string(),
            author: Author::default(),
            author_id: "author_x".to_string(),
            rating: Some(5),
            approved: true,
            is_edited: false,
            is_deleted: false,
            parent_comment: Some(ObjectId::new().to_hex()),
            admin_reply: None,
            admin_reply_published: false,
            admin_reply_date: None,
            created_at: Utc::now(),
            updated_at: None,
        };
        let id = doc.id.unwrap().to_hex();
        let comment = Comment::from(doc);
        assert_eq!(comment.id, id);
        assert_eq!(comment.rating, None);
        assert!(comment.is_reply());
    }

    #[test]
    fn test_public_comment_omits_email() {
        let doc = CommentDocument {
            id: Some(ObjectId::new()),
            post_slug: "keto-brownies".to_string(),
            post_title: None,
            content: "So fudgy".to_string(),
            author: Author {
                name: "Ana".to_string(),
                email: "ana@example.com".to_string(),
            },
            author_id: "author_x".to_string(),
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
        };

        let full = serde_json::to_value(Comment::from(doc.clone())).unwrap();
        assert_eq!(full["author"]["email"], "ana@example.com");

        let public = serde_json::to_value(Comment::from(doc).public()).unwrap();
        assert_eq!(public["author"]["name"], "Ana");
        assert!(public["author"].get("email").is_none());
        let back: Comment = serde_json::from_value(public).unwrap();
        assert_eq!(back.author.email, "");
    }
}
