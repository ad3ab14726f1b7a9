//! Progress reporting for consensus rounds

pub mod reporter;
