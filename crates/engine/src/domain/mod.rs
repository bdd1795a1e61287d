pub mod anchors;
pub mod collection;
pub mod error;
pub mod root_program;
pub mod source;
pub mod system;
pub mod types;
