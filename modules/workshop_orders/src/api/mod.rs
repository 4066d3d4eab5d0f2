//! API layer: REST handlers and the in-process native client

pub mod native;
pub mod rest;
