pub mod jobs;
pub mod service;
