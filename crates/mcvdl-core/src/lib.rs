pub mod config;
pub mod logging;

pub mod control;
pub mod downloader;
pub mod job;
pub mod listing;
pub mod retry;
pub mod scheduler;
pub mod shutdown;
pub mod storage;
pub mod url_model;
