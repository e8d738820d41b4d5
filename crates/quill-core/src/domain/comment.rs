use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Comment entity - a free-text reply attached to a post.
///
/// The author is a plain string, not a user reference: commenting does not
/// require an account. Comments start unapproved and become visible to
/// moderating callers once `approved_comment` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post: Uuid,
    pub author: String,
    pub text: String,
    pub created_date: DateTime<Utc>,
    pub approved_comment: bool,
}

impl Comment {
    /// Create a new unapproved comment. Fails if `author` or `text` is empty.
    pub fn new(post: Uuid, author: String, text: String) -> Result<Self, DomainError> {
        Self::validate(&author, &text)?;
        Ok(Self {
            id: Uuid::new_v4(),
            post,
            author,
            text,
            created_date: Utc::now(),
            approved_comment: false,
        })
    }

    /// Overwrite author and text.
    pub fn edit(&mut self, author: String, text: String) -> Result<(), DomainError> {
        Self::validate(&author, &text)?;
        self.author = author;
        self.text = text;
        Ok(())
    }

    /// Mark the comment as approved. Idempotent.
    pub fn approve(&mut self) {
        self.approved_comment = true;
    }

    fn validate(author: &str, text: &str) -> Result<(), DomainError> {
        if author.trim().is_empty() {
            return Err(DomainError::validation("author must not be empty"));
        }
        if text.trim().is_empty() {
            return Err(DomainError::validation("text must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_comment_starts_unapproved() {
        let comment = Comment::new(Uuid::new_v4(), "ann".into(), "nice post".into()).unwrap();
        assert!(!comment.approved_comment);
    }

    #[test]
    fn missing_author_is_rejected() {
        let result = Comment::new(Uuid::new_v4(), "".into(), "text".into());
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn approve_is_idempotent() {
        let mut comment = Comment::new(Uuid::new_v4(), "ann".into(), "text".into()).unwrap();
        comment.approve();
        assert!(comment.approved_comment);
        comment.approve();
        assert!(comment.approved_comment);
    }
}
