pub mod status;
pub mod submission;
