//! Metadata provider module
//!
//! Defines the MovieProvider trait and the OMDb implementation behind it.

mod models;
mod omdb;
mod traits;

#[cfg(test)]
pub(crate) mod mock;

pub use models::*;
pub use omdb::Omdb;
pub use traits::*;
