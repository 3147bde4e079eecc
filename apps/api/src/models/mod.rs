pub mod document;
pub mod submission;
