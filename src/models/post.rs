//! Blog post model
//!
//! This module provides:
//! - `Post` entity representing a blog post
//! - `PostStatus` enum for publication states
//! - Input types for creating and updating posts
//! - Pagination types for list queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Blog post entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug
    pub slug: String,
    /// Post title
    pub title: String,
    /// Short summary shown on the listing page
    pub excerpt: String,
    /// Markdown content
    pub content: String,
    /// Rendered HTML content
    pub content_html: String,
    /// Featured image URL
    #[serde(default)]
    pub featured_image: Option<String>,
    /// Category name
    pub category: String,
    /// Tags as a JSON array string, matching the wire format consumers expect
    pub tags: String,
    /// Author display name
    pub author: String,
    /// Publication status
    pub status: PostStatus,
    /// Publication timestamp
    pub published_at: Option<DateTime<Utc>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post with the given parameters
    pub fn new(
        slug: String,
        title: String,
        excerpt: String,
        content: String,
        content_html: String,
        category: String,
        tags: String,
        author: String,
        status: PostStatus,
    ) -> Self {
        let now = Utc::now();
        let published_at = if status == PostStatus::Published {
            Some(now)
        } else {
            None
        };

        Self {
            id: 0, // Will be set by database
            slug,
            title,
            excerpt,
            content,
            content_html,
            featured_image: None,
            category,
            tags,
            author,
            status,
            published_at,
            created_at: now,
            updated_at: now,
        }
    }

    /// Parse the JSON tags string into a list, tolerating legacy plain values
    pub fn tag_list(&self) -> Vec<String> {
        serde_json::from_str(&self.tags).unwrap_or_default()
    }
}

/// Post publication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Draft - not visible to public
    #[default]
    Draft,
    /// Published - visible to public
    Published,
    /// Archived - hidden but not deleted
    Archived,
}

impl PostStatus {
    /// Convert status to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Archived => "archived",
        }
    }

    /// Parse status from database string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(PostStatus::Draft),
            "published" => Some(PostStatus::Published),
            "archived" => Some(PostStatus::Archived),
            _ => None,
        }
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input for creating a new post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostInput {
    /// URL-friendly slug
    pub slug: String,
    /// Post title
    pub title: String,
    /// Short summary
    #[serde(default)]
    pub excerpt: String,
    /// Markdown content
    pub content: String,
    /// Featured image URL
    #[serde(default)]
    pub featured_image: Option<String>,
    /// Category name
    #[serde(default)]
    pub category: String,
    /// Tag names (serialized to a JSON array string on save)
    #[serde(default)]
    pub tags: Vec<String>,
    /// Author display name
    pub author: String,
    /// Publication status
    #[serde(default)]
    pub status: PostStatus,
}

/// Input for updating an existing post; None fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostInput {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub featured_image: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<PostStatus>,
}

/// A page of results from a list query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    /// Total number of pages for this result set
    pub fn total_pages(&self) -> u32 {
        if self.page_size == 0 {
            return 0;
        }
        ((self.total as u64).div_ceil(self.page_size as u64)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_published_post_gets_published_at() {
        let post = Post::new(
            "grit-vs-shot".into(),
            "Grit vs Shot".into(),
            "Which abrasive?".into(),
            "content".into(),
            "<p>content</p>".into(),
            "guides".into(),
            "[\"abrasive\"]".into(),
            "Site Team".into(),
            PostStatus::Published,
        );
        assert!(post.published_at.is_some());
        assert_eq!(post.created_at, post.updated_at);
    }

    #[test]
    fn new_draft_post_has_no_published_at() {
        let post = Post::new(
            "draft".into(),
            "Draft".into(),
            String::new(),
            "c".into(),
            "<p>c</p>".into(),
            String::new(),
            "[]".into(),
            "Site Team".into(),
            PostStatus::Draft,
        );
        assert!(post.published_at.is_none());
    }

    #[test]
    fn status_roundtrip() {
        for status in [PostStatus::Draft, PostStatus::Published, PostStatus::Archived] {
            assert_eq!(PostStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(PostStatus::from_str("deleted"), None);
    }

    #[test]
    fn tag_list_parses_json_and_tolerates_garbage() {
        let mut post = Post::new(
            "s".into(),
            "t".into(),
            String::new(),
            "c".into(),
            String::new(),
            String::new(),
            "[\"steel\",\"bridges\"]".into(),
            "a".into(),
            PostStatus::Draft,
        );
        assert_eq!(post.tag_list(), vec!["steel", "bridges"]);

        post.tags = "not json".into();
        assert!(post.tag_list().is_empty());
    }

    #[test]
    fn page_total_pages_rounds_up() {
        let page = Page::<()> {
            items: vec![],
            total: 21,
            page: 1,
            page_size: 10,
        };
        assert_eq!(page.total_pages(), 3);
    }
}
