pub mod pipeline;
pub mod rate_limit;
pub mod render;
pub mod validate;

pub use crate::domain::model::{Attachment, OutboundEmail, Submission, SubmissionKind};
pub use crate::domain::ports::{Mailer, Verifier};
pub use crate::utils::error::Result;
