//! Route families, one module per provider dialect.
//!
//! Every family is an enum implementing [`crate::Route`]; attach a
//! [`crate::Configuration`] and hand it to [`crate::Session::execute`].

pub mod github;
pub mod gitlab;
