//! Relational storage for the turf booking demo.
//!
//! - **TurfStore**: libsql-backed catalog and bookings with an atomic
//!   conditional insert for new bookings
//! - **DatabaseProvider**: picks an in-memory or file-backed database

mod seed;
pub mod store;
pub mod traits;

pub use store::TurfStore;
pub use traits::DatabaseProvider;
