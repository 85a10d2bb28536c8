pub mod apply;
pub mod collection;
pub mod color;
pub mod config;
pub mod content;
pub mod controller;
pub mod error;
pub mod locate;
pub mod overlap;
pub mod restore;
pub mod segments;
pub mod store;
pub mod types;

pub use apply::{ApplyError, ApplyMode, MarkLayer};
pub use color::{contrast, Palette, RgbColor};
pub use content::RenderedContent;
pub use controller::{Mode, Outcome, Selection, SelectionController, State};
pub use error::MarkError;
pub use segments::{SegmentModel, TextSegment};
pub use types::{Annotation, Highlight, LessonKey, TextRange};
