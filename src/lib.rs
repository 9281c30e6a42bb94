// Public API for integration tests and embedding applications

pub mod collab;
pub mod controller;
pub mod error;
pub mod inventory;
pub mod memory;
pub mod protocol;
pub mod registry;
pub mod resolver;
pub mod roll;
pub mod strings;
pub mod sync;
pub mod transport;
pub mod types;

pub use error::{Error, Result};
