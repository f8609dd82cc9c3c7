use crate::client::ClientError;
use crate::client::api::ForumApi;
use crate::forum::model::{ForumCategory, ForumPost, ForumPostPayload};
use crate::identity::{LocalStorage, PseudoIdentity};
use crate::utils::i18n::Language;
use crate::utils::validation::validate_forum_post;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForumPostForm {
    pub title: String,
    pub content: String,
    pub category: String,
    pub author_name: String,
    pub author_email: String,
}

/// The forum landing page: a filtered list, a search box and the new post form.
pub struct ForumBoard<A, S> {
    api: A,
    identity: PseudoIdentity<S>,
    lang: Language,
    posts: Vec<ForumPost>,
    category: Option<ForumCategory>,
    pub form: ForumPostForm,
    error: Option<String>,
}

impl<A: ForumApi, S: LocalStorage> ForumBoard<A, S> {
    pub fn new(api: A, storage: S, lang: Language) -> Self {
        Self {
            api,
            identity: PseudoIdentity::mount(storage),
            lang,
            posts: Vec::new(),
            category: None,
            form: ForumPostForm::default(),
            error: None,
        }
    }

    pub fn posts(&self) -> &[ForumPost] {
        &self.posts
    }

    pub fn category(&self) -> Option<ForumCategory> {
        self.category
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn author_id(&self) -> Option<&str> {
        self.identity.author_id()
    }

    fn keep<T>(&mut self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        if let Err(e) = &result {
            self.error = Some(e.to_string());
        }
        result
    }

    /// Load the newest posts, optionally within one category.
    pub async fn load(&mut self, category: Option<ForumCategory>) -> Result<(), ClientError> {
        self.error = None;
        let result = self.api.list_posts(category.map(ForumCategory::as_str)).await;
        let posts = self.keep(result)?;
        self.category = category;
        self.posts = posts;
        Ok(())
    }

    /// Search within the current category. A blank query reloads the list.
    pub async fn search(&mut self, query: &str) -> Result<(), ClientError> {
        let query = query.trim();
        if query.is_empty() {
            return self.load(self.category).await;
        }

        self.error = None;
        let result = self
            .api
            .search_posts(query, self.category.map(ForumCategory::as_str))
            .await;
        self.posts = self.keep(result)?;
        Ok(())
    }

    /// Validate and publish the form. Nothing is sent if validation fails.
    pub async fn create(&mut self) -> Result<ForumPost, ClientError> {
        self.error = None;

        let mut payload = ForumPostPayload {
            title: self.form.title.clone(),
            content: self.form.content.clone(),
            category: self.form.category.clone(),
            author_name: self.form.author_name.clone(),
            author_email: self.form.author_email.clone(),
            author_id: None,
            post_id: None,
        };

        if let Err(rule) = validate_forum_post(&payload) {
            let message = rule.message(self.lang);
            self.error = Some(message.clone());
            return Err(ClientError::Validation { rule, message });
        }

        let issued = self.identity.ensure(&payload.author_email);
        let author_id = self.keep(issued.map_err(ClientError::from))?;
        payload.author_id = Some(author_id);

        let result = self.api.create_post(&payload).await;
        let post = self.keep(result)?;

        self.form.title.clear();
        self.form.content.clear();
        if self.category.is_none_or(|category| category == post.category) {
            self.posts.insert(0, post.clone());
        }
        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::model::Author;
    use crate::identity::MemoryStorage;
    use chrono::Utc;
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeForum {
        listed: RefCell<Vec<Option<String>>>,
        searched: RefCell<Vec<(String, Option<String>)>>,
        created: RefCell<Vec<ForumPostPayload>>,
    }

    fn post(title: &str, category: ForumCategory) -> ForumPost {
        ForumPost {
            id: "66f0c0ffee0000000000beef".to_string(),
            title: title.to_string(),
            slug: "some-title-abc123".to_string(),
            content: "body".to_string(),
            category,
            author: Author {
                name: "Ana".to_string(),
                email: "ana@example.com".to_string(),
            },
            author_id: "author_123".to_string(),
            views: 0,
            likes: 0,
            replies: 0,
            is_edited: false,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    impl ForumApi for FakeForum {
        async fn list_posts(&self, category: Option<&str>) -> Result<Vec<ForumPost>, ClientError> {
            self.listed.borrow_mut().push(category.map(str::to_string));
            let category = category
                .and_then(ForumCategory::parse)
                .unwrap_or(ForumCategory::Recipes);
            Ok(vec![post("Protein pancakes", category)])
        }

        async fn search_posts(
            &self,
            query: &str,
            category: Option<&str>,
        ) -> Result<Vec<ForumPost>, ClientError> {
            self.searched
                .borrow_mut()
                .push((query.to_string(), category.map(str::to_string)));
            Ok(Vec::new())
        }

        async fn create_post(&self, payload: &ForumPostPayload) -> Result<ForumPost, ClientError> {
            self.created.borrow_mut().push(payload.clone());
            let category = ForumCategory::parse(&payload.category).unwrap_or(ForumCategory::General);
            Ok(post(&payload.title, category))
        }
    }

    fn filled() -> ForumPostForm {
        ForumPostForm {
            title: "Plateau after six weeks".to_string(),
            content: "Any advice?".to_string(),
            category: "weight-loss".to_string(),
            author_name: "Ana".to_string(),
            author_email: "ana@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_load_and_search_use_category() {
        let mut board = ForumBoard::new(FakeForum::default(), MemoryStorage::new(), Language::En);
        board.load(Some(ForumCategory::Nutrition)).await.unwrap();
        assert_eq!(board.posts().len(), 1);
        assert_eq!(board.api.listed.borrow()[0].as_deref(), Some("nutrition"));

        board.search("  keto ").await.unwrap();
        assert!(board.posts().is_empty());
        assert_eq!(
            board.api.searched.borrow()[0],
            ("keto".to_string(), Some("nutrition".to_string()))
        );

        // blank search falls back to the list
        board.search("   ").await.unwrap();
        assert_eq!(board.api.listed.borrow().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_post_is_not_sent() {
        let mut board = ForumBoard::new(FakeForum::default(), MemoryStorage::new(), Language::Fr);
        board.form = ForumPostForm {
            title: "   ".to_string(),
            ..filled()
        };

        let err = board.create().await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(board.error(), Some("Le titre est obligatoire."));
        assert!(board.api.created.borrow().is_empty());
        assert_eq!(board.author_id(), None);
    }

    #[tokio::test]
    async fn test_unknown_category_is_not_sent() {
        let mut board = ForumBoard::new(FakeForum::default(), MemoryStorage::new(), Language::En);
        board.form = ForumPostForm {
            category: "desserts".to_string(),
            ..filled()
        };
        assert!(board.create().await.unwrap_err().is_validation());
        assert!(board.api.created.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_create_issues_identity_and_prepends() {
        let mut board = ForumBoard::new(FakeForum::default(), MemoryStorage::new(), Language::En);
        board.load(None).await.unwrap();
        board.form = filled();

        let created = board.create().await.unwrap();
        assert_eq!(created.title, "Plateau after six weeks");
        assert_eq!(board.posts()[0].title, "Plateau after six weeks");
        assert_eq!(board.posts().len(), 2);

        let author_id = board.author_id().unwrap();
        assert!(author_id.starts_with("author_"));
        assert_eq!(
            board.api.created.borrow()[0].author_id.as_deref(),
            Some(author_id)
        );
        assert_eq!(board.form.title, "");
        assert_eq!(board.form.author_email, "ana@example.com");
    }
}
