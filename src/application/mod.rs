//! Application layer - Services that drive the ports.

pub mod dispatcher;
pub mod tracker;
