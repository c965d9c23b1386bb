//! Plain-text rendering of a submission into an outbound email.

use crate::domain::model::{OutboundEmail, RfpFields, Submission, SubmissionBody};

pub fn render_subject(submission: &Submission) -> String {
    match &submission.body {
        SubmissionBody::Contact(fields) => format!("Contact Form: {}", fields.subject),
        SubmissionBody::Rfp(fields) => match &fields.company {
            Some(company) => format!(
                "Executive Coach RFP: {} from {}",
                submission.name, company
            ),
            None => format!("Executive Coach RFP: {}", submission.name),
        },
    }
}

pub fn render_body(submission: &Submission) -> String {
    match &submission.body {
        SubmissionBody::Contact(fields) => format!(
            "Contact Form Submission\n\nName: {}\nEmail: {}\nSubject: {}\n\nMessage:\n{}",
            submission.name, submission.email, fields.subject, fields.message
        ),
        SubmissionBody::Rfp(fields) => render_rfp_body(submission, fields),
    }
}

fn render_rfp_body(submission: &Submission, fields: &RfpFields) -> String {
    let mut out = format!(
        "Executive Coach RFP Submission\n\nName: {}\nEmail: {}",
        submission.name, submission.email
    );

    if let Some(company) = &fields.company {
        out.push_str(&format!("\nCompany/Organization: {company}"));
    }

    // Each long-form section appears only when the submitter filled it in.
    let sections = [
        ("Coaching Experience", &fields.experience),
        ("Coaching Approach", &fields.approach),
        ("References", &fields.references),
    ];
    for (heading, value) in sections {
        if let Some(value) = value {
            out.push_str(&format!("\n\n{heading}:\n{value}"));
        }
    }

    out
}

/// Builds the full provider send call: fixed sender identity, configured
/// destination, reply-to pointing back at the submitter.
pub fn render_email(submission: &Submission, from: &str, to: &str) -> OutboundEmail {
    OutboundEmail {
        from: from.to_string(),
        to: to.to_string(),
        reply_to: submission.email.clone(),
        subject: render_subject(submission),
        text: render_body(submission),
        attachments: submission.attachments.clone(),
    }
}
