//! Articles, comments and likes.
//!
//! Only what authorization and the HTTP surface need: every entity exposes its
//! owner through [`OwnedResource`].

pub mod in_memory;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use quillpost_auth::OwnedResource;
use quillpost_core::{ArticleId, CommentId, DomainError, DomainResult, UserId};

pub use in_memory::InMemoryContentStore;

pub const TITLE_LEN: (usize, usize) = (5, 120);
pub const ARTICLE_CONTENT_LEN: (usize, usize) = (200, 25_000);
pub const COMMENT_CONTENT_LEN: (usize, usize) = (3, 500);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub content: String,
    pub owner_id: UserId,
    pub published_on: NaiveDate,
    pub modified_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub article_id: ArticleId,
    pub owner_id: UserId,
    pub content: String,
    pub published_on: NaiveDate,
}

/// What a like points at.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum LikeTarget {
    Article(ArticleId),
    Comment(CommentId),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Like {
    pub owner_id: UserId,
    pub target: LikeTarget,
}

/// Result of [`ContentStore::toggle_like`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeToggle {
    Liked,
    Unliked,
}

impl OwnedResource for Article {
    fn owner_id(&self) -> UserId {
        self.owner_id
    }
}

impl OwnedResource for Comment {
    fn owner_id(&self) -> UserId {
        self.owner_id
    }
}

impl OwnedResource for Like {
    fn owner_id(&self) -> UserId {
        self.owner_id
    }
}

/// Content storage (dev/test oriented, synchronous like the other read stores).
pub trait ContentStore: Send + Sync {
    fn create_article(&self, owner_id: UserId, title: &str, content: &str) -> DomainResult<Article>;
    fn article(&self, id: ArticleId) -> Option<Article>;
    fn update_article(&self, id: ArticleId, title: &str, content: &str) -> DomainResult<Article>;
    /// Removes the article together with its comments and every related like.
    fn delete_article(&self, id: ArticleId) -> DomainResult<()>;
    /// Newest first.
    fn articles_by_owner(&self, owner_id: UserId) -> Vec<Article>;

    fn create_comment(
        &self,
        owner_id: UserId,
        article_id: ArticleId,
        content: &str,
    ) -> DomainResult<Comment>;
    fn comment(&self, id: CommentId) -> Option<Comment>;
    fn update_comment(&self, id: CommentId, content: &str) -> DomainResult<Comment>;
    fn delete_comment(&self, id: CommentId) -> DomainResult<()>;
    fn comments_by_owner(&self, owner_id: UserId) -> Vec<Comment>;
    /// Oldest first.
    fn comments_for_article(&self, article_id: ArticleId) -> Vec<Comment>;

    /// Like the target if `owner_id` has not liked it yet, otherwise unlike it.
    fn toggle_like(&self, owner_id: UserId, target: LikeTarget) -> DomainResult<LikeToggle>;
    fn like_count(&self, target: LikeTarget) -> usize;
}

pub fn validate_article(title: &str, content: &str) -> DomainResult<()> {
    check_len("title", title, TITLE_LEN)?;
    check_len("content", content, ARTICLE_CONTENT_LEN)
}

pub fn validate_comment(content: &str) -> DomainResult<()> {
    check_len("content", content, COMMENT_CONTENT_LEN)
}

fn check_len(field: &str, value: &str, (min, max): (usize, usize)) -> DomainResult<()> {
    let len = value.trim().chars().count();
    if len < min || len > max {
        return Err(DomainError::validation(format!(
            "{field} must be between {min} and {max} characters (got {len})"
        )));
    }
    Ok(())
}
