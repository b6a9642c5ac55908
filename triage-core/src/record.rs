//! Record types shared by every stage.

use serde::{Deserialize, Serialize};

/// Which export a row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Submission: `title` + `selftext`
    Post,
    /// Comment: `body`
    Comment,
}

const POST_COLUMNS: &[&str] = &["submission_id", "author", "subreddit", "title", "selftext"];
const COMMENT_COLUMNS: &[&str] = &["comment_id", "parent_id", "author", "subreddit", "body"];

impl SourceKind {
    /// Narrow schema kept by the sanitizer, in output order.
    pub const fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Post => POST_COLUMNS,
            Self::Comment => COMMENT_COLUMNS,
        }
    }

    /// Position within `columns()` of the text the sanitizer checks.
    pub const fn body_index(self) -> usize {
        4
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Comment => "comment",
        }
    }

    /// Build the unified record from a row projected onto `columns()`.
    pub fn to_record(self, fields: &[&str]) -> Record {
        match self {
            Self::Post => Record::new(
                fields[0],
                fields[1],
                fields[2],
                format!("{} {}", fields[3], fields[4]),
            ),
            Self::Comment => Record::new(fields[0], fields[2], fields[3], fields[4]),
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One post or comment in the unified schema.
///
/// Field order is the column order of ranked, pool, and bucket files:
/// `score, id, author, subreddit, body`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Relevance score, set by the scorer
    pub score: Option<f64>,
    /// `submission_id` for posts, `comment_id` for comments
    #[serde(alias = "submission_id")]
    pub id: String,
    pub author: String,
    pub subreddit: String,
    /// Title and selftext for posts, comment text for comments
    pub body: String,
}

impl Record {
    pub fn new(
        id: impl Into<String>,
        author: impl Into<String>,
        subreddit: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            score: None,
            id: id.into(),
            author: author.into(),
            subreddit: subreddit.into(),
            body: body.into(),
        }
    }

    /// A copy of this record carrying `score`.
    #[must_use]
    pub fn with_score(self, score: f64) -> Self {
        Self {
            score: Some(score),
            ..self
        }
    }

    /// Score, treating unscored records as 0.
    pub fn score_or_zero(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_body_joins_title_and_selftext() {
        let record = SourceKind::Post.to_record(&["p1", "ann", "depression", "Title", "Text here"]);
        assert_eq!(record.id, "p1");
        assert_eq!(record.author, "ann");
        assert_eq!(record.subreddit, "depression");
        assert_eq!(record.body, "Title Text here");
        assert_eq!(record.score, None);
    }

    #[test]
    fn test_comment_skips_parent_id() {
        let record =
            SourceKind::Comment.to_record(&["c1", "t3_p1", "bob", "anxiety", "comment text"]);
        assert_eq!(record.id, "c1");
        assert_eq!(record.author, "bob");
        assert_eq!(record.subreddit, "anxiety");
        assert_eq!(record.body, "comment text");
    }

    #[test]
    fn test_with_score_leaves_original_fields() {
        let record = Record::new("x", "a", "s", "b").with_score(0.5);
        assert_eq!(record.score, Some(0.5));
        assert_eq!(record.id, "x");
        assert_eq!(Record::new("y", "a", "s", "b").score_or_zero(), 0.0);
    }

    #[test]
    fn test_body_index_points_at_checked_column() {
        assert_eq!(SourceKind::Post.columns()[SourceKind::Post.body_index()], "selftext");
        assert_eq!(
            SourceKind::Comment.columns()[SourceKind::Comment.body_index()],
            "body"
        );
    }
}
