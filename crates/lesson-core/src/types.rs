use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::color::RgbColor;

/// Subject + lesson pair that owns a set of mark collections.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonKey {
    pub subject_id: String,
    pub lesson_id: String,
}

impl LessonKey {
    pub fn new(subject_id: impl Into<String>, lesson_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            lesson_id: lesson_id.into(),
        }
    }

    pub fn collection(&self, kind: MarkKind) -> CollectionKey {
        CollectionKey {
            subject_id: self.subject_id.clone(),
            lesson_id: self.lesson_id.clone(),
            kind,
        }
    }

    /// Same subject, different lesson.
    pub fn sibling(&self, lesson_id: &str) -> Self {
        Self::new(self.subject_id.clone(), lesson_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkKind {
    Highlights,
    Annotations,
}

impl MarkKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MarkKind::Highlights => "highlights",
            MarkKind::Annotations => "annotations",
        }
    }
}

/// Address of one persisted collection: `(subjectId, lessonId, kind)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionKey {
    pub subject_id: String,
    pub lesson_id: String,
    pub kind: MarkKind,
}

/// Half-open byte range into the lesson text stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn intersects(&self, other: TextRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub id: String,
    pub text: String,
    pub lesson_id: String,
    pub timestamp: DateTime<Utc>,
    pub color: RgbColor,
    #[serde(default)]
    pub occurrence: usize,
}

impl Highlight {
    pub fn new(
        lesson_id: impl Into<String>,
        text: impl Into<String>,
        color: RgbColor,
        occurrence: usize,
    ) -> Self {
        Self {
            id: new_mark_id(),
            text: text.into(),
            lesson_id: lesson_id.into(),
            timestamp: Utc::now(),
            color,
            occurrence,
        }
    }
}

/// Original selection offsets; advisory only, never used for relocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PositionHint {
    pub start: usize,
    pub end: usize,
}

impl From<TextRange> for PositionHint {
    fn from(range: TextRange) -> Self {
        Self {
            start: range.start,
            end: range.end,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub comment: String,
    pub lesson_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub position_hint: PositionHint,
    #[serde(default)]
    pub occurrence: usize,
}

impl Annotation {
    pub fn new(
        lesson_id: impl Into<String>,
        text: impl Into<String>,
        range: TextRange,
        occurrence: usize,
    ) -> Self {
        Self {
            id: new_mark_id(),
            text: text.into(),
            tags: BTreeSet::new(),
            comment: String::new(),
            lesson_id: lesson_id.into(),
            timestamp: Utc::now(),
            position_hint: range.into(),
            occurrence,
        }
    }

    /// Only complete annotations are persisted.
    pub fn is_complete(&self) -> bool {
        is_complete(&self.tags, &self.comment)
    }
}

pub(crate) fn is_complete(tags: &BTreeSet<String>, comment: &str) -> bool {
    !tags.is_empty() || !comment.trim().is_empty()
}

/// Trims tags, drops empty ones and collapses duplicates.
pub fn normalize_tags<I, T>(tags: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Splits a comma separated tag line as typed into the composer.
pub fn parse_tag_line(line: &str) -> BTreeSet<String> {
    normalize_tags(line.split(','))
}

fn new_mark_id() -> String {
    Uuid::new_v4().to_string()
}
