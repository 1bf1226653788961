//! Access to the hosted backend that stores the site's content.

mod api_types;
mod client;
mod error;
mod supabase;

pub use client::{Disconnected, RemoteStore, Session};
pub use error::{AuthError, RemoteError, RemoteResult};
pub use supabase::SupabaseStore;
