//! Dashboard state.
//!
//! Holds the working copy of the merged catalog and the local table
//! operations over it: cell edits, search, sorting and pagination. Nothing
//! here is ever written back to the catalog API.

pub mod state;

pub use state::{Dashboard, LoadState, SortDirection};
