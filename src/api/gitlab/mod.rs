//! `GitLab`-style routes.

pub mod commits;
pub mod projects;

pub use commits::*;
pub use projects::*;
