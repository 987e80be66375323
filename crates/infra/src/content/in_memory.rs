use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use quillpost_core::{ArticleId, CommentId, DomainError, DomainResult, UserId};

use super::{
    validate_article, validate_comment, Article, Comment, ContentStore, Like, LikeTarget,
    LikeToggle,
};

#[derive(Debug, Default)]
struct ContentState {
    articles: HashMap<ArticleId, Article>,
    comments: HashMap<CommentId, Comment>,
    likes: HashSet<Like>,
}

impl ContentState {
    fn target_exists(&self, target: LikeTarget) -> bool {
        match target {
            LikeTarget::Article(id) => self.articles.contains_key(&id),
            LikeTarget::Comment(id) => self.comments.contains_key(&id),
        }
    }
}

/// In-memory content store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryContentStore {
    inner: RwLock<ContentState>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, ContentState> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ContentState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ContentStore for InMemoryContentStore {
    fn create_article(&self, owner_id: UserId, title: &str, content: &str) -> DomainResult<Article> {
        validate_article(title, content)?;

        let article = Article {
            id: ArticleId::new(),
            title: title.trim().to_string(),
            content: content.trim().to_string(),
            owner_id,
            published_on: Utc::now().date_naive(),
            modified_on: None,
        };
        self.write().articles.insert(article.id, article.clone());
        Ok(article)
    }

    fn article(&self, id: ArticleId) -> Option<Article> {
        self.read().articles.get(&id).cloned()
    }

    fn update_article(&self, id: ArticleId, title: &str, content: &str) -> DomainResult<Article> {
        validate_article(title, content)?;

        let mut state = self.write();
        let article = state.articles.get_mut(&id).ok_or(DomainError::NotFound)?;
        article.title = title.trim().to_string();
        article.content = content.trim().to_string();
        article.modified_on = Some(Utc::now().date_naive());
        Ok(article.clone())
    }

    fn delete_article(&self, id: ArticleId) -> DomainResult<()> {
        let mut state = self.write();
        state.articles.remove(&id).ok_or(DomainError::NotFound)?;

        let orphaned: HashSet<CommentId> = state
            .comments
            .values()
            .filter(|c| c.article_id == id)
            .map(|c| c.id)
            .collect();
        state.comments.retain(|cid, _| !orphaned.contains(cid));
        state.likes.retain(|like| match like.target {
            LikeTarget::Article(aid) => aid != id,
            LikeTarget::Comment(cid) => !orphaned.contains(&cid),
        });

        tracing::debug!(article_id = %id, comments = orphaned.len(), "article deleted");
        Ok(())
    }

    fn articles_by_owner(&self, owner_id: UserId) -> Vec<Article> {
        let mut out: Vec<Article> = self
            .read()
            .articles
            .values()
            .filter(|a| a.owner_id == owner_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.id.cmp(&a.id));
        out
    }

    fn create_comment(
        &self,
        owner_id: UserId,
        article_id: ArticleId,
        content: &str,
    ) -> DomainResult<Comment> {
        validate_comment(content)?;

        let mut state = self.write();
        if !state.articles.contains_key(&article_id) {
            return Err(DomainError::NotFound);
        }

        let comment = Comment {
            id: CommentId::new(),
            article_id,
            owner_id,
            content: content.trim().to_string(),
            published_on: Utc::now().date_naive(),
        };
        state.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    fn comment(&self, id: CommentId) -> Option<Comment> {
        self.read().comments.get(&id).cloned()
    }

    fn update_comment(&self, id: CommentId, content: &str) -> DomainResult<Comment> {
        validate_comment(content)?;

        let mut state = self.write();
        let comment = state.comments.get_mut(&id).ok_or(DomainError::NotFound)?;
        comment.content = content.trim().to_string();
        Ok(comment.clone())
    }

    fn delete_comment(&self, id: CommentId) -> DomainResult<()> {
        let mut state = self.write();
        state.comments.remove(&id).ok_or(DomainError::NotFound)?;
        state
            .likes
            .retain(|like| like.target != LikeTarget::Comment(id));
        Ok(())
    }

    fn comments_by_owner(&self, owner_id: UserId) -> Vec<Comment> {
        let mut out: Vec<Comment> = self
            .read()
            .comments
            .values()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.id.cmp(&a.id));
        out
    }

    fn comments_for_article(&self, article_id: ArticleId) -> Vec<Comment> {
        let mut out: Vec<Comment> = self
            .read()
            .comments
            .values()
            .filter(|c| c.article_id == article_id)
            .cloned()
            .collect();
        out.sort_by_key(|c| c.id);
        out
    }

    fn toggle_like(&self, owner_id: UserId, target: LikeTarget) -> DomainResult<LikeToggle> {
        let mut state = self.write();
        if !state.target_exists(target) {
            return Err(DomainError::NotFound);
        }

        let like = Like { owner_id, target };
        if state.likes.remove(&like) {
            Ok(LikeToggle::Unliked)
        } else {
            state.likes.insert(like);
            Ok(LikeToggle::Liked)
        }
    }

    fn like_count(&self, target: LikeTarget) -> usize {
        self.read()
            .likes
            .iter()
            .filter(|like| like.target == target)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> String {
        "lorem ipsum ".repeat(20)
    }

    fn store_with_article() -> (InMemoryContentStore, UserId, Article) {
        let store = InMemoryContentStore::new();
        let owner = UserId::new();
        let article = store
            .create_article(owner, "First post", &body())
            .unwrap();
        (store, owner, article)
    }

    #[test]
    fn create_and_fetch_article() {
        let (store, owner, article) = store_with_article();
        assert_eq!(article.owner_id, owner);
        assert_eq!(article.modified_on, None);
        assert_eq!(store.article(article.id), Some(article));
    }

    #[test]
    fn invalid_article_is_rejected() {
        let store = InMemoryContentStore::new();
        let err = store.create_article(UserId::new(), "hey", &body()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn update_sets_modified_on() {
        let (store, _, article) = store_with_article();
        let updated = store
            .update_article(article.id, "Renamed post", &body())
            .unwrap();
        assert_eq!(updated.title, "Renamed post");
        assert!(updated.modified_on.is_some());
    }

    #[test]
    fn update_of_missing_article_is_not_found() {
        let store = InMemoryContentStore::new();
        let err = store
            .update_article(ArticleId::new(), "Some title", &body())
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn comment_requires_existing_article() {
        let store = InMemoryContentStore::new();
        let err = store
            .create_comment(UserId::new(), ArticleId::new(), "nice one")
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn deleting_article_cascades_to_comments_and_likes() {
        let (store, owner, article) = store_with_article();
        let reader = UserId::new();
        let comment = store
            .create_comment(reader, article.id, "great read")
            .unwrap();
        store
            .toggle_like(owner, LikeTarget::Comment(comment.id))
            .unwrap();
        store
            .toggle_like(reader, LikeTarget::Article(article.id))
            .unwrap();

        store.delete_article(article.id).unwrap();

        assert!(store.article(article.id).is_none());
        assert!(store.comment(comment.id).is_none());
        assert_eq!(store.like_count(LikeTarget::Article(article.id)), 0);
        assert_eq!(store.like_count(LikeTarget::Comment(comment.id)), 0);
        assert!(store.comments_by_owner(reader).is_empty());
    }

    #[test]
    fn like_toggles_per_user() {
        let (store, _, article) = store_with_article();
        let target = LikeTarget::Article(article.id);
        let alice = UserId::new();
        let bob = UserId::new();

        assert_eq!(store.toggle_like(alice, target).unwrap(), LikeToggle::Liked);
        assert_eq!(store.toggle_like(bob, target).unwrap(), LikeToggle::Liked);
        assert_eq!(store.like_count(target), 2);

        assert_eq!(store.toggle_like(alice, target).unwrap(), LikeToggle::Unliked);
        assert_eq!(store.like_count(target), 1);
    }

    #[test]
    fn like_on_missing_target_is_not_found() {
        let store = InMemoryContentStore::new();
        let err = store
            .toggle_like(UserId::new(), LikeTarget::Comment(CommentId::new()))
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn listings_are_scoped_to_owner() {
        let (store, owner, first) = store_with_article();
        let second = store.create_article(owner, "Second post", &body()).unwrap();
        store
            .create_article(UserId::new(), "Someone else", &body())
            .unwrap();

        let ids: Vec<ArticleId> = store.articles_by_owner(owner).iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn comments_for_article_oldest_first() {
        let (store, _, article) = store_with_article();
        let a = store.create_comment(UserId::new(), article.id, "first!").unwrap();
        let b = store.create_comment(UserId::new(), article.id, "second").unwrap();

        let ids: Vec<CommentId> = store
            .comments_for_article(article.id)
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }
}
