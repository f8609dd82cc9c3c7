use log::debug;

use crate::client::ClientError;
use crate::client::api::CommentApi;
use crate::comment::model::{Comment, CommentPayload, DeleteCommentRequest};
use crate::comment::render::{RenderedView, render_tree};
use crate::comment::tree::{CommentNode, build_tree, can_modify};
use crate::identity::{LocalStorage, PseudoIdentity};
use crate::utils::i18n::Language;
use crate::utils::validation::{normalize_comment, validate_comment};

/// What the user has typed. Survives every failed submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentForm {
    pub name: String,
    pub email: String,
    pub content: String,
    pub rating: Option<i64>,
    /// Root being replied to.
    pub reply_to: Option<String>,
    /// Comment being edited.
    pub editing: Option<String>,
}

/// One subject's comment section.
pub struct CommentBoard<A, S> {
    api: A,
    identity: PseudoIdentity<S>,
    post_slug: String,
    post_title: Option<String>,
    lang: Language,
    comments: Vec<Comment>,
    tree: Vec<CommentNode>,
    pub form: CommentForm,
    loading: bool,
    error: Option<String>,
    notice: Option<String>,
}

impl<A: CommentApi, S: LocalStorage> CommentBoard<A, S> {
    pub fn new(api: A, storage: S, post_slug: &str, post_title: Option<&str>, lang: Language) -> Self {
        Self {
            api,
            identity: PseudoIdentity::mount(storage),
            post_slug: post_slug.to_string(),
            post_title: post_title.map(str::to_string),
            lang,
            comments: Vec::new(),
            tree: Vec::new(),
            form: CommentForm::default(),
            loading: false,
            error: None,
            notice: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn author_id(&self) -> Option<&str> {
        self.identity.author_id()
    }

    pub fn tree(&self) -> &[CommentNode] {
        &self.tree
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn can_modify(&self, comment: &Comment) -> bool {
        can_modify(comment, self.identity.author_id())
    }

    pub fn views(&self) -> Vec<RenderedView> {
        render_tree(&self.tree, self.identity.author_id(), self.lang)
    }

    fn find(&self, comment_id: &str) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == comment_id)
    }

    /// Refetch the flat list and rebuild the tree from scratch. On failure
    /// the previous tree stays on screen.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        self.loading = true;
        let result = self.api.fetch_comments(&self.post_slug).await;
        self.loading = false;

        match result {
            Ok(comments) => {
                self.tree = build_tree(&comments);
                self.comments = comments;
                debug!(
                    "Rebuilt {} with {} roots from {} comments",
                    self.post_slug,
                    self.tree.len(),
                    self.comments.len()
                );
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Switch the form to replying under `parent_id`.
    pub fn start_reply(&mut self, parent_id: &str) {
        self.form.editing = None;
        self.form.reply_to = Some(parent_id.to_string());
    }

    /// Load one of the user's own comments into the form.
    pub fn start_edit(&mut self, comment_id: &str) -> Result<(), ClientError> {
        let comment = self
            .find(comment_id)
            .filter(|c| self.can_modify(c) && !c.is_deleted)
            .cloned()
            .ok_or_else(|| {
                ClientError::NotAllowed("You can only edit your own comments".to_string())
            })?;

        // public listings carry no email, so keep the one already typed
        let email = if comment.author.email.is_empty() {
            std::mem::take(&mut self.form.email)
        } else {
            comment.author.email
        };
        self.form = CommentForm {
            name: comment.author.name,
            email,
            content: comment.content,
            rating: comment.rating.map(i64::from),
            reply_to: comment.parent_comment,
            editing: Some(comment.id),
        };
        Ok(())
    }

    /// Leave reply or edit mode, keeping name and email.
    pub fn cancel(&mut self) {
        self.form.reply_to = None;
        self.form.editing = None;
        self.form.content.clear();
        self.form.rating = None;
    }

    /// The request body the current form would produce.
    pub fn submission(&self) -> CommentPayload {
        normalize_comment(CommentPayload {
            name: self.form.name.clone(),
            email: self.form.email.clone(),
            content: self.form.content.clone(),
            rating: self.form.rating,
            parent_comment: self.form.reply_to.clone(),
            post_slug: self.post_slug.clone(),
            post_title: self.post_title.clone(),
            author_id: self.identity.author_id().map(str::to_string),
            comment_id: self.form.editing.clone(),
        })
    }

    /// Validate, then create or update, then refetch.
    pub async fn submit(&mut self) -> Result<String, ClientError> {
        self.error = None;
        self.notice = None;

        let mut payload = self.submission();
        if let Err(rule) = validate_comment(&payload) {
            let message = rule.message(self.lang);
            self.error = Some(message.clone());
            return Err(ClientError::Validation { rule, message });
        }

        let author_id = match self.identity.ensure(&payload.email) {
            Ok(id) => id,
            Err(e) => {
                self.error = Some(e.to_string());
                return Err(e.into());
            }
        };
        payload.author_id = Some(author_id);

        self.loading = true;
        let result = match payload.comment_id {
            Some(_) => self.api.update_comment(&payload).await,
            None => self.api.create_comment(&payload).await,
        };
        self.loading = false;

        match result {
            Ok(message) => {
                self.cancel();
                self.notice = Some(message.clone());
                // the write went through even if this refetch fails
                let _ = self.refresh().await;
                Ok(message)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Soft-delete one of the user's own comments, then refetch.
    pub async fn delete(&mut self, comment_id: &str) -> Result<String, ClientError> {
        self.error = None;

        let author_id = match (self.find(comment_id), self.identity.author_id()) {
            (Some(comment), Some(author_id)) if can_modify(comment, Some(author_id)) => {
                author_id.to_string()
            }
            _ => {
                let e = ClientError::NotAllowed("You can only delete your own comments".to_string());
                self.error = Some(e.to_string());
                return Err(e);
            }
        };

        self.loading = true;
        let result = self
            .api
            .delete_comment(&DeleteCommentRequest {
                comment_id: comment_id.to_string(),
                author_id,
            })
            .await;
        self.loading = false;

        match result {
            Ok(message) => {
                if self.form.editing.as_deref() == Some(comment_id) {
                    self.cancel();
                }
                self.notice = Some(message.clone());
                let _ = self.refresh().await;
                Ok(message)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }
}
