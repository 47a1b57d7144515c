//! Supabase integration
//!
//! The gateway keeps no data of its own. Rows live in a PostgREST table and
//! files in a Storage bucket; this module is the only place that speaks
//! either API.
//!
//! ```text
//!   handlers ──► SubmissionStore ──► /rest/v1/{table}
//!            └─► ObjectStorage   ──► /storage/v1/object/...
//! ```

pub mod traits;
pub mod client;
pub mod rest;
pub mod storage;

#[cfg(test)]
pub mod fake;
#[cfg(test)]
pub mod memory;

// Re-export commonly used types
pub use traits::{ObjectStorage, SubmissionStore, UpstreamError};
pub use client::SupabaseClient;
pub use storage::{ATTACHMENTS_PREFIX, IMAGES_PREFIX, UPLOADS_PREFIX};
