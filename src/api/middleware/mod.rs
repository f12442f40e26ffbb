//! API middleware.

pub mod access_log;
