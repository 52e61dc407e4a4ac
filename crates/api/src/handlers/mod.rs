pub mod issue;
pub mod milestone;
pub mod project;
pub mod schedule;
