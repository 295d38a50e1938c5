pub mod multipart;
pub mod request_id;
pub mod sheets;
pub mod status;
pub mod workflow;
