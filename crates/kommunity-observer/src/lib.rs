//! Read-only HTTP observer for a Kommunity topic store.
//!
//! Serves an HTML index and topic pages for people, and the same data as
//! JSON under `/api/` for tools. It shares the [`RecordStore`] with the
//! actor loop and sees every write as soon as the loop's atomic rename
//! lands.
//!
//! [`RecordStore`]: kommunity_store::RecordStore

pub mod error;
pub mod handlers;
pub mod pages;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;

pub use error::ObserverError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError};
pub use startup::spawn_observer;
pub use state::AppState;
