//! The catalog browse adapter: session handling, browse routing, playable
//! resolution and the pure projections between catalog and host shapes.

mod adapter;
mod error;
pub mod projection;
mod session;

pub use adapter::{AdapterSettings, CatalogAdapter};
pub use error::{AdapterError, AdapterResult};
pub use session::{CatalogSession, SessionManager};
