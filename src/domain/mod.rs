//! Domain types and models

pub mod files;
pub mod intake;
mod submission;

pub use files::{signed_upload_name, DecodedFile, FilePayload};
pub use intake::{SubmissionRules, SubmitRequest, ValidationError};
pub use submission::{
    ListFilter, NewSubmission, RawRow, Submission, SubmissionId, SubmissionStatus,
};
