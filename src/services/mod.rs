//! Services: the archive lifecycle manager and the local storage backend it
//! is exercised against.

pub mod archive_manager;
pub mod storage_service;
