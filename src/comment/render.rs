use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::comment::model::Comment;
use crate::comment::tree::{CommentNode, can_modify};
use crate::utils::i18n::Language;

/// Official reply shown inline under its parent.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdminReplyView {
    pub label: String,
    pub content: String,
    pub date: Option<DateTime<Utc>>,
}

/// View model of one comment, ready for a template.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RenderedView {
    /// Soft-deleted comment: nothing but the placeholder and its replies.
    #[serde(rename_all = "camelCase")]
    Deleted {
        id: String,
        is_reply: bool,
        placeholder: String,
        replies: Vec<RenderedView>,
    },
    #[serde(rename_all = "camelCase")]
    Visible {
        id: String,
        is_reply: bool,
        author_name: String,
        content: String,
        created_at: DateTime<Utc>,
        rating: Option<u8>,
        edited_marker: Option<String>,
        admin_reply: Option<AdminReplyView>,
        can_edit: bool,
        can_delete: bool,
        can_reply: bool,
        replies: Vec<RenderedView>,
    },
}

impl RenderedView {
    pub fn id(&self) -> &str {
        match self {
            RenderedView::Deleted { id, .. } | RenderedView::Visible { id, .. } => id,
        }
    }

    pub fn replies(&self) -> &[RenderedView] {
        match self {
            RenderedView::Deleted { replies, .. } | RenderedView::Visible { replies, .. } => {
                replies
            }
        }
    }
}

fn admin_reply(comment: &Comment, lang: Language) -> Option<AdminReplyView> {
    if !comment.admin_reply_published {
        return None;
    }
    comment
        .admin_reply
        .as_deref()
        .filter(|reply| !reply.trim().is_empty())
        .map(|reply| AdminReplyView {
            label: lang.admin_reply_label().to_string(),
            content: reply.to_string(),
            date: comment.admin_reply_date,
        })
}

fn render_comment(
    comment: &Comment,
    is_reply: bool,
    viewer: Option<&str>,
    lang: Language,
    replies: Vec<RenderedView>,
) -> RenderedView {
    if comment.is_deleted {
        return RenderedView::Deleted {
            id: comment.id.clone(),
            is_reply,
            placeholder: lang.deleted_placeholder().to_string(),
            replies,
        };
    }

    let owned = can_modify(comment, viewer);
    RenderedView::Visible {
        id: comment.id.clone(),
        is_reply,
        author_name: comment.author.name.clone(),
        content: comment.content.clone(),
        created_at: comment.created_at,
        rating: if is_reply { None } else { comment.rating },
        edited_marker: comment
            .is_edited
            .then(|| lang.edited_marker().to_string()),
        admin_reply: admin_reply(comment, lang),
        can_edit: owned,
        can_delete: owned,
        can_reply: !is_reply,
        replies,
    }
}

/// Render a root node and its replies. `viewer` is the pseudo-identity held
/// locally, if any; ownership is re-evaluated on every call.
pub fn render_node(
    node: &CommentNode,
    is_reply: bool,
    viewer: Option<&str>,
    lang: Language,
) -> RenderedView {
    let replies = node
        .replies
        .iter()
        .map(|reply| render_comment(reply, true, viewer, lang, Vec::new()))
        .collect();
    render_comment(&node.comment, is_reply, viewer, lang, replies)
}

pub fn render_tree(tree: &[CommentNode], viewer: Option<&str>, lang: Language) -> Vec<RenderedView> {
    tree.iter()
        .map(|node| render_node(node, false, viewer, lang))
        .collect()
}
