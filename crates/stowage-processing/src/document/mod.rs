//! Document processing module

pub mod extract;

pub use extract::{extract_text, extract_text_async};
