//! Domain objects returned by the dispatcher.

pub mod common;
pub mod github;
pub mod gitlab;

pub use common::*;
