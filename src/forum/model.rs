use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::comment::model::Author;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ForumCategory {
    General,
    Recipes,
    Nutrition,
    WeightLoss,
    Fitness,
    Testimonials,
}

impl ForumCategory {
    pub const ALL: [ForumCategory; 6] = [
        ForumCategory::General,
        ForumCategory::Recipes,
        ForumCategory::Nutrition,
        ForumCategory::WeightLoss,
        ForumCategory::Fitness,
        ForumCategory::Testimonials,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ForumCategory::General => "general",
            ForumCategory::Recipes => "recipes",
            ForumCategory::Nutrition => "nutrition",
            ForumCategory::WeightLoss => "weight-loss",
            ForumCategory::Fitness => "fitness",
            ForumCategory::Testimonials => "testimonials",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(raw))
    }
}

/// Forum thread as stored in the `forum_posts` collection.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ForumPostDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub category: ForumCategory,
    pub author: Author,
    pub author_id: String,
    #[serde(default)]
    pub views: i64,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub replies: i64,
    #[serde(default)]
    pub is_edited: bool,
    #[serde(default)]
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ForumPost {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub category: ForumCategory,
    pub author: Author,
    pub author_id: String,
    pub views: i64,
    pub likes: i64,
    pub replies: i64,
    pub is_edited: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<ForumPostDocument> for ForumPost {
    fn from(doc: ForumPostDocument) -> Self {
        ForumPost {
            id: doc.id.map(|id| id.to_hex()).unwrap_or_default(),
            slug: doc.slug,
            title: doc.title,
            content: doc.content,
            category: doc.category,
            // forum listings are public, the email stays in the store
            author: Author {
                name: doc.author.name,
                email: String::new(),
            },
            author_id: doc.author_id,
            views: doc.views,
            likes: doc.likes,
            replies: doc.replies,
            is_edited: doc.is_edited,
            is_deleted: doc.is_deleted,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

/// Body of `POST /api/forum` and `PUT /api/forum`.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ForumPostPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub author_email: String,
    #[serde(default)]
    pub author_id: Option<String>,
    /// Set only when editing.
    #[serde(default)]
    pub post_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DeleteForumPostRequest {
    pub post_id: String,
    pub author_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ForumListQuery {
    pub category: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ForumSearchQuery {
    pub q: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ForumListResponse {
    pub posts: Vec<ForumPost>,
}
