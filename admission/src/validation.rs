//! Submission checks run before capacity is considered.

use crate::AdmissionError;
use regdesk_types::{EventConfig, Submission};
use std::collections::HashSet;

/// Check team size and member details against the event's rules.
pub fn validate_submission(event: &EventConfig, submission: &Submission) -> Result<(), AdmissionError> {
    let (min, max) = event.member_bounds();
    let count = submission.member_count();
    if count < min || count > max {
        return Err(AdmissionError::Validation(if min == max {
            format!("{:?} registration needs exactly {min} member(s), got {count}", event.registration_type)
        } else {
            format!("team size must be between {min} and {max}, got {count}")
        }));
    }

    let mut seen = HashSet::new();
    for (i, member) in submission.members.iter().enumerate() {
        if member.name.trim().is_empty() {
            return Err(AdmissionError::Validation(format!(
                "member {} has no name",
                i + 1
            )));
        }
        if !plausible_email(&member.email) {
            return Err(AdmissionError::Validation(format!(
                "member {} has an invalid email address",
                i + 1
            )));
        }
        if !seen.insert(member.email.trim().to_ascii_lowercase()) {
            return Err(AdmissionError::Validation(format!(
                "email {} appears more than once",
                member.email.trim()
            )));
        }
    }
    Ok(())
}

fn plausible_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
