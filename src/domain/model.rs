/// Field length limits, counted in Unicode scalar values.
pub mod limits {
    pub const NAME_MIN: usize = 2;
    pub const NAME_MAX: usize = 50;
    pub const SUBJECT_MIN: usize = 3;
    pub const SUBJECT_MAX: usize = 100;
    pub const MESSAGE_MIN: usize = 10;
    pub const MESSAGE_MAX: usize = 1000;
    pub const COMPANY_MAX: usize = 100;
    pub const EXPERIENCE_MAX: usize = 2000;
    pub const APPROACH_MAX: usize = 2000;
    pub const REFERENCES_MAX: usize = 1000;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionKind {
    Contact,
    Rfp,
}

impl SubmissionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::Rfp => "rfp",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactFields {
    pub subject: String,
    pub message: String,
}

/// RFP-specific fields; every one of them is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RfpFields {
    pub company: Option<String>,
    pub experience: Option<String>,
    pub approach: Option<String>,
    pub references: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionBody {
    Contact(ContactFields),
    Rfp(RfpFields),
}

/// An uploaded file forwarded verbatim to the email provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content: Vec<u8>,
}

/// A validated form submission, ready for verification and dispatch.
///
/// Constructed per request by the schema validator and discarded after
/// dispatch; it has no identity beyond the request lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub verification_token: String,
    pub body: SubmissionBody,
    pub attachments: Vec<Attachment>,
}

impl Submission {
    pub fn kind(&self) -> SubmissionKind {
        match self.body {
            SubmissionBody::Contact(_) => SubmissionKind::Contact,
            SubmissionBody::Rfp(_) => SubmissionKind::Rfp,
        }
    }
}

/// A rendered message handed to the outbound email provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub reply_to: String,
    pub subject: String,
    pub text: String,
    pub attachments: Vec<Attachment>,
}
