//! n8n media generation relay
//!
//! This library provides the pieces of the media-relay system: an HTTP relay
//! that tags submissions with a request id before handing them to an n8n
//! workflow, a status resolver that looks that id up in the workflow's Google
//! Sheet, and a client-side controller that submits and polls until the
//! generated image and video are ready.

pub mod app_state;
pub mod client;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
