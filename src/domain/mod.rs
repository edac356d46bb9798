//! Domain types and DTOs
//!
//! Records for leads and the entities a conversion produces, plus the request
//! and result shapes of every engine operation.

pub mod accounts;
pub mod bulk;
pub mod contacts;
pub mod conversions;
pub mod deals;
pub mod duplicates;
pub mod errors;
pub mod leads;
pub mod notices;
pub mod numbers;
pub mod views;

// Re-export commonly used types
pub use accounts::*;
pub use bulk::*;
pub use contacts::*;
pub use conversions::*;
pub use deals::*;
pub use duplicates::*;
pub use errors::*;
pub use leads::*;
pub use notices::*;
pub use views::*;
