use crate::domain::model::{
    limits, Attachment, ContactFields, RfpFields, Submission, SubmissionBody,
};
use crate::utils::error::FieldError;
use crate::utils::validation::{check_char_range, check_email, check_max_chars};
use serde_json::Value;

/// Validates an untyped payload into a [`Submission`], or reports every
/// field violation at once.
///
/// Kind discrimination: an explicit `kind` field (`"contact"` or `"rfp"`)
/// wins. Without one, the kind is inferred from which exclusive fields are
/// present (`subject`/`message` select contact, any of
/// `company`/`experience`/`approach`/`references` selects rfp). A payload
/// matching both sets or neither is rejected rather than defaulted.
///
/// Pure function of its input; no side effects.
pub fn validate_payload(
    payload: &Value,
    attachments: Vec<Attachment>,
) -> Result<Submission, Vec<FieldError>> {
    let Some(map) = payload.as_object() else {
        return Err(vec![FieldError::new("body", "must be a JSON object")]);
    };

    let mut errors = Vec::new();

    let kind = match discriminate(map) {
        Ok(kind) => Some(kind),
        Err(e) => {
            errors.push(e);
            None
        }
    };

    let name = required_string(map, "name", &mut errors);
    if let Some(name) = &name {
        if let Err(e) = check_char_range("name", name, limits::NAME_MIN, limits::NAME_MAX) {
            errors.push(e);
        }
    }

    let email = required_string(map, "email", &mut errors);
    if let Some(email) = &email {
        if let Err(e) = check_email("email", email) {
            errors.push(e);
        }
    }

    // `hcaptchaToken` is accepted as a legacy alias for the token field.
    let token = match get_string(map, "verificationToken", &mut errors) {
        Some(t) if !t.trim().is_empty() => Some(t),
        Some(_) => {
            errors.push(FieldError::new("verificationToken", "must not be empty"));
            None
        }
        None => match get_string(map, "hcaptchaToken", &mut errors) {
            Some(t) if !t.trim().is_empty() => Some(t),
            Some(_) => {
                errors.push(FieldError::new("verificationToken", "must not be empty"));
                None
            }
            None => {
                errors.push(FieldError::new("verificationToken", "is required"));
                None
            }
        },
    };

    let body = match kind {
        Some(SubmissionKindTag::Contact) => validate_contact(map, &mut errors),
        Some(SubmissionKindTag::Rfp) => validate_rfp(map, &mut errors),
        None => None,
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    // An empty error list implies every component parsed.
    match (name, email, token, body) {
        (Some(name), Some(email), Some(verification_token), Some(body)) => Ok(Submission {
            name,
            email,
            verification_token,
            body,
            attachments,
        }),
        _ => Err(vec![FieldError::new("body", "payload could not be validated")]),
    }
}

enum SubmissionKindTag {
    Contact,
    Rfp,
}

fn discriminate(
    map: &serde_json::Map<String, Value>,
) -> Result<SubmissionKindTag, FieldError> {
    if let Some(kind) = map.get("kind") {
        return match kind.as_str() {
            Some("contact") => Ok(SubmissionKindTag::Contact),
            Some("rfp") => Ok(SubmissionKindTag::Rfp),
            _ => Err(FieldError::new("kind", "must be \"contact\" or \"rfp\"")),
        };
    }

    let has_contact = map.contains_key("subject") || map.contains_key("message");
    let has_rfp = ["company", "experience", "approach", "references"]
        .iter()
        .any(|f| map.contains_key(*f));

    match (has_contact, has_rfp) {
        (true, false) => Ok(SubmissionKindTag::Contact),
        (false, true) => Ok(SubmissionKindTag::Rfp),
        (true, true) => Err(FieldError::new(
            "kind",
            "payload mixes contact and rfp fields; set kind explicitly",
        )),
        (false, false) => Err(FieldError::new(
            "kind",
            "payload matches neither the contact nor the rfp shape",
        )),
    }
}

fn validate_contact(
    map: &serde_json::Map<String, Value>,
    errors: &mut Vec<FieldError>,
) -> Option<SubmissionBody> {
    let subject = required_string(map, "subject", errors);
    if let Some(subject) = &subject {
        if let Err(e) = check_char_range(
            "subject",
            subject,
            limits::SUBJECT_MIN,
            limits::SUBJECT_MAX,
        ) {
            errors.push(e);
        }
    }

    let message = required_string(map, "message", errors);
    if let Some(message) = &message {
        if let Err(e) = check_char_range(
            "message",
            message,
            limits::MESSAGE_MIN,
            limits::MESSAGE_MAX,
        ) {
            errors.push(e);
        }
    }

    match (subject, message) {
        (Some(subject), Some(message)) => {
            Some(SubmissionBody::Contact(ContactFields { subject, message }))
        }
        _ => None,
    }
}

fn validate_rfp(
    map: &serde_json::Map<String, Value>,
    errors: &mut Vec<FieldError>,
) -> Option<SubmissionBody> {
    let fields = RfpFields {
        company: optional_limited(map, "company", limits::COMPANY_MAX, errors),
        experience: optional_limited(map, "experience", limits::EXPERIENCE_MAX, errors),
        approach: optional_limited(map, "approach", limits::APPROACH_MAX, errors),
        references: optional_limited(map, "references", limits::REFERENCES_MAX, errors),
    };

    Some(SubmissionBody::Rfp(fields))
}

/// Optional length-capped field; whitespace-only values count as absent.
fn optional_limited(
    map: &serde_json::Map<String, Value>,
    field: &str,
    max: usize,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    let value = get_string(map, field, errors)?;
    if value.trim().is_empty() {
        return None;
    }
    if let Err(e) = check_max_chars(field, &value, max) {
        errors.push(e);
        return None;
    }
    Some(value)
}

/// Reads an optional string field; a present non-string value is an error.
fn get_string(
    map: &serde_json::Map<String, Value>,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match map.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(FieldError::new(field, "must be a string"));
            None
        }
    }
}

fn required_string(
    map: &serde_json::Map<String, Value>,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    let before = errors.len();
    match get_string(map, field, errors) {
        Some(s) => Some(s),
        None => {
            // Only report "required" when the field wasn't a type error.
            if errors.len() == before {
                errors.push(FieldError::new(field, "is required"));
            }
            None
        }
    }
}
