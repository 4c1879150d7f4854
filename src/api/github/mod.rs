//! `GitHub`-style routes.

pub mod issues;
pub mod repos;

pub use issues::*;
pub use repos::*;
