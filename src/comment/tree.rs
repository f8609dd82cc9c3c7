//! Flat comment list to threaded view.
//!
//! The store hands back every comment of a subject as a flat, unordered
//! list. [`build_tree`] regroups it into roots with their direct replies.
//! Only one level of nesting is materialized: a reply attached to another
//! reply is linked under that reply's index entry, which is never emitted.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::comment::model::Comment;

/// A root comment with its direct replies, in input order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<Comment>,
}

impl CommentNode {
    fn new(comment: Comment) -> Self {
        Self {
            comment,
            replies: Vec::new(),
        }
    }

    /// Number of comments carried by this node, itself included.
    pub fn comment_count(&self) -> usize {
        1 + self.replies.len()
    }
}

/// Rebuild the thread of one subject. Never mutates `comments`; calling it
/// twice on the same input yields equal output.
pub fn build_tree(comments: &[Comment]) -> Vec<CommentNode> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(comments.len());
    let mut nodes: Vec<CommentNode> = Vec::with_capacity(comments.len());

    for (i, comment) in comments.iter().enumerate() {
        index.insert(comment.id.as_str(), i);
        nodes.push(CommentNode::new(comment.clone()));
    }

    let mut roots = Vec::new();
    for (i, comment) in comments.iter().enumerate() {
        let parent = comment
            .parent_comment
            .as_deref()
            .and_then(|parent_id| index.get(parent_id).copied());

        match parent {
            Some(parent) => nodes[parent].replies.push(comment.clone()),
            None if comment.parent_comment.is_none() => roots.push(i),
            // orphan: its parent is not part of this fetch
            None => {}
        }
    }

    let mut slots: Vec<Option<CommentNode>> = nodes.into_iter().map(Some).collect();
    roots
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect()
}

/// Replies whose parent is absent from `comments`.
pub fn orphans(comments: &[Comment]) -> Vec<&Comment> {
    let ids: std::collections::HashSet<&str> = comments.iter().map(|c| c.id.as_str()).collect();
    comments
        .iter()
        .filter(|c| {
            c.parent_comment
                .as_deref()
                .is_some_and(|parent| !ids.contains(parent))
        })
        .collect()
}

/// Whether the holder of `local_author_id` may edit or delete `comment`.
///
/// This is plain string equality on a client-generated token. It keeps
/// people from editing each other's comments by accident; it does not stop
/// anyone who copies a token.
pub fn can_modify(comment: &Comment, local_author_id: Option<&str>) -> bool {
    match local_author_id {
        Some(id) if !id.is_empty() => id == comment.author_id,
        _ => false,
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    pub average: f64,
    pub count: usize,
}

/// Average rating over live root comments. `None` when nobody rated.
pub fn rating_summary(comments: &[Comment]) -> Option<RatingSummary> {
    let ratings: Vec<u8> = comments
        .iter()
        .filter(|c| !c.is_reply() && !c.is_deleted)
        .filter_map(|c| c.rating)
        .collect();

    if ratings.is_empty() {
        return None;
    }

    let total: u32 = ratings.iter().map(|&r| u32::from(r)).sum();
    let average = f64::from(total) / ratings.len() as f64;
    Some(RatingSummary {
        average: (average * 10.0).round() / 10.0,
        count: ratings.len(),
    })
}

/// Comments the thread header counts: everything rendered and not deleted.
pub fn count_visible(tree: &[CommentNode]) -> usize {
    tree.iter()
        .map(|node| {
            usize::from(!node.comment.is_deleted)
                + node.replies.iter().filter(|r| !r.is_deleted).count()
        })
        .sum()
}
