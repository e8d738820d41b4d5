use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Post entity - a blog entry with a title and body, optionally published.
///
/// A post with no `published_date` is a draft. Publishing stamps the post
/// with the current time; re-publishing advances the stamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author: Uuid,
    pub title: String,
    pub text: String,
    pub created_date: DateTime<Utc>,
    pub published_date: Option<DateTime<Utc>>,
}

impl Post {
    /// Create a new draft post. Fails if `title` or `text` is empty.
    pub fn new(author: Uuid, title: String, text: String) -> Result<Self, DomainError> {
        Self::validate(&title, &text)?;
        Ok(Self {
            id: Uuid::new_v4(),
            author,
            title,
            text,
            created_date: Utc::now(),
            published_date: None,
        })
    }

    /// Overwrite title and text, reassigning the author to the caller.
    ///
    /// Authorship is intentionally not checked: any authenticated caller
    /// becomes the author of the post it edits.
    pub fn edit(&mut self, author: Uuid, title: String, text: String) -> Result<(), DomainError> {
        Self::validate(&title, &text)?;
        self.author = author;
        self.title = title;
        self.text = text;
        Ok(())
    }

    /// Stamp the post with the current time, making it publicly visible.
    pub fn publish(&mut self) {
        self.published_date = Some(Utc::now());
    }

    /// A post is published iff its publication stamp exists and is not in
    /// the future.
    pub fn is_published(&self) -> bool {
        self.published_date.is_some_and(|date| date <= Utc::now())
    }

    fn validate(title: &str, text: &str) -> Result<(), DomainError> {
        if title.trim().is_empty() {
            return Err(DomainError::validation("title must not be empty"));
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
    use chrono::TimeDelta;

    #[test]
    fn new_post_is_a_draft() {
        let post = Post::new(Uuid::new_v4(), "title".into(), "text".into()).unwrap();
        assert!(post.published_date.is_none());
        assert!(!post.is_published());
    }

    #[test]
    fn empty_title_is_rejected() {
        let result = Post::new(Uuid::new_v4(), "".into(), "text".into());
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn empty_text_is_rejected() {
        let result = Post::new(Uuid::new_v4(), "title".into(), "  ".into());
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn publish_stamps_and_republish_advances() {
        let mut post = Post::new(Uuid::new_v4(), "title".into(), "text".into()).unwrap();
        post.publish();
        let first = post.published_date.unwrap();
        assert!(post.is_published());

        post.publish();
        let second = post.published_date.unwrap();
        assert!(second >= first);
    }

    #[test]
    fn future_publication_date_is_not_published() {
        let mut post = Post::new(Uuid::new_v4(), "title".into(), "text".into()).unwrap();
        post.published_date = Some(Utc::now() + TimeDelta::hours(1));
        assert!(!post.is_published());
    }

    #[test]
    fn edit_reassigns_author() {
        let original = Uuid::new_v4();
        let editor = Uuid::new_v4();
        let mut post = Post::new(original, "title".into(), "text".into()).unwrap();

        post.edit(editor, "new title".into(), "new text".into()).unwrap();

        assert_eq!(post.author, editor);
        assert_eq!(post.title, "new title");
    }
}
