use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::comment::model::CommentPayload;
use crate::forum::model::{ForumCategory, ForumPostPayload};
use crate::utils::i18n::Language;

/// `local@domain.tld` shape check. Deliverability is never verified.
static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("compile email regex"));

pub const MIN_COMMENT_LENGTH: usize = 4;
pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Content,
    Title,
    Category,
    AuthorName,
    AuthorEmail,
}

impl Field {
    fn label(self, lang: Language) -> &'static str {
        match (self, lang) {
            (Field::Name, Language::En) => "Name",
            (Field::Name, Language::Fr) => "Le nom",
            (Field::Email, Language::En) => "Email",
            (Field::Email, Language::Fr) => "L'email",
            (Field::Content, Language::En) => "Content",
            (Field::Content, Language::Fr) => "Le contenu",
            (Field::Title, Language::En) => "Title",
            (Field::Title, Language::Fr) => "Le titre",
            (Field::Category, Language::En) => "Category",
            (Field::Category, Language::Fr) => "La catégorie",
            (Field::AuthorName, Language::En) => "Author name",
            (Field::AuthorName, Language::Fr) => "Le nom de l'auteur",
            (Field::AuthorEmail, Language::En) => "Author email",
            (Field::AuthorEmail, Language::Fr) => "L'email de l'auteur",
        }
    }
}

/// The rule a submission broke.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field {0:?}")]
    MissingField(Field),
    #[error("malformed email address")]
    InvalidEmail(Field),
    #[error("content shorter than {min} characters")]
    ContentTooShort { min: usize },
    #[error("rating {0} outside 1-5")]
    InvalidRating(i64),
    #[error("unknown category {0:?}")]
    UnknownCategory(String),
}

impl ValidationError {
    /// User-facing text naming the failed rule.
    pub fn message(&self, lang: Language) -> String {
        match (self, lang) {
            (ValidationError::MissingField(field), Language::En) => {
                format!("{} is required.", field.label(lang))
            }
            (ValidationError::MissingField(field), Language::Fr) => {
                format!("{} est obligatoire.", field.label(lang))
            }
            (ValidationError::InvalidEmail(field), Language::En) => {
                format!("{} must be a valid email address.", field.label(lang))
            }
            (ValidationError::InvalidEmail(field), Language::Fr) => {
                format!("{} doit être une adresse email valide.", field.label(lang))
            }
            (ValidationError::ContentTooShort { min }, Language::En) => {
                format!("Comment must be at least {} characters long.", min)
            }
            (ValidationError::ContentTooShort { min }, Language::Fr) => {
                format!("Le commentaire doit contenir au moins {} caractères.", min)
            }
            (ValidationError::InvalidRating(_), Language::En) => {
                format!("Rating must be between {} and {}.", MIN_RATING, MAX_RATING)
            }
            (ValidationError::InvalidRating(_), Language::Fr) => {
                format!("La note doit être comprise entre {} et {}.", MIN_RATING, MAX_RATING)
            }
            (ValidationError::UnknownCategory(category), Language::En) => {
                format!("Unknown category \"{}\".", category)
            }
            (ValidationError::UnknownCategory(category), Language::Fr) => {
                format!("Catégorie inconnue « {} ».", category)
            }
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email.trim())
}

fn require(value: &str, field: Field) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

fn require_email(value: &str, field: Field) -> Result<(), ValidationError> {
    require(value, field)?;
    if !is_valid_email(value) {
        return Err(ValidationError::InvalidEmail(field));
    }
    Ok(())
}

/// Force the reply rules onto a comment submission: replies never carry a
/// rating, and an empty parent reference means "root". References are
/// trimmed so they match stored ids and slugs exactly.
pub fn normalize_comment(mut payload: CommentPayload) -> CommentPayload {
    payload.post_slug = payload.post_slug.trim().to_string();
    payload.parent_comment = payload
        .parent_comment
        .map(|parent| parent.trim().to_string())
        .filter(|parent| !parent.is_empty());
    if payload.parent_comment.is_some() {
        payload.rating = None;
    }
    payload
}

/// Validate a comment or reply submission. Rules are checked in form order
/// so the first message matches the first offending field.
pub fn validate_comment(payload: &CommentPayload) -> Result<(), ValidationError> {
    require(&payload.name, Field::Name)?;
    require_email(&payload.email, Field::Email)?;
    require(&payload.content, Field::Content)?;

    if payload.content.trim().chars().count() < MIN_COMMENT_LENGTH {
        return Err(ValidationError::ContentTooShort {
            min: MIN_COMMENT_LENGTH,
        });
    }

    if let Some(rating) = payload.rating {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(ValidationError::InvalidRating(rating));
        }
    }

    Ok(())
}

/// Validate a forum post submission and resolve its category.
pub fn validate_forum_post(payload: &ForumPostPayload) -> Result<ForumCategory, ValidationError> {
    require(&payload.title, Field::Title)?;
    require(&payload.content, Field::Content)?;
    require(&payload.category, Field::Category)?;
    require(&payload.author_name, Field::AuthorName)?;
    require_email(&payload.author_email, Field::AuthorEmail)?;

    ForumCategory::parse(&payload.category)
        .ok_or_else(|| ValidationError::UnknownCategory(payload.category.trim().to_string()))
}
