//! Ports - Trait definitions implemented by adapters.

pub mod renderer;
pub mod repository;
