//! Templated text shared by the document header and the review-questions block

pub mod questions;
pub mod section;
pub mod template;

pub use questions::{QuestionSource, normalize_questions};
pub use section::{
    DEFAULT_REVIEW_HEADING, FALLBACK_QUESTION, ReviewMetrics, Separators, build_review_section,
    review_heading_line,
};
pub use template::{TemplateContext, render};
