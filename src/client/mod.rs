//! Submitting side: validates a draft, hands it to the relay and polls the
//! status endpoint until the workflow's results show up.

pub mod api;
pub mod controller;
pub mod session;
pub mod submission;
