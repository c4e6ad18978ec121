// Query-identity enhancement: turn a bare first name into a full name using
// the local part of the contact's email address.

use tracing::info;

use crate::identity::Identity;

/// Particles kept lower-case when title-casing a derived name.
const LOWERCASE_PARTICLES: &[&str] = &["van", "de", "der", "den", "von", "zu", "ter", "ten", "het"];

/// Derive a display name from an email local part such as
/// `cees.vandehaar` → `Cees van de Haar`. Returns `None` when the local part
/// has no `.` separator.
pub fn name_from_email(email: &str) -> Option<String> {
    let lower = email.trim().to_lowercase();
    let local = lower.split('@').next()?;
    if !local.contains('.') {
        return None;
    }

    let expanded: Vec<String> = local
        .split('.')
        .filter(|part| !part.is_empty())
        .enumerate()
        .map(|(i, part)| if i == 0 { part.to_string() } else { expand_particles(part) })
        .collect();

    let name = expanded
        .join(" ")
        .split_whitespace()
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ");

    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Split a fused Dutch surname particle off the front of a segment.
fn expand_particles(part: &str) -> String {
    if LOWERCASE_PARTICLES.contains(&part) {
        return part.to_string();
    }
    for (fused, spaced) in [("vander", "van der "), ("vande", "van de "), ("van", "van "), ("de", "de ")] {
        if let Some(rest) = part.strip_prefix(fused) {
            if !rest.is_empty() {
                return format!("{spaced}{rest}");
            }
        }
    }
    part.to_string()
}

fn title_case(word: &str) -> String {
    if LOWERCASE_PARTICLES.contains(&word) {
        return word.to_string();
    }
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Replace a bare first name with the email-derived full name, as long as
/// the derived name still contains the original name.
pub fn enhance_identity(identity: Identity) -> Identity {
    if !identity.is_bare_name() {
        return identity;
    }
    let Some(email) = identity.source_email() else {
        return identity;
    };
    let Some(derived) = name_from_email(email) else {
        return identity;
    };

    let original = identity.display_name().to_lowercase();
    if !derived.to_lowercase().contains(&original) {
        info!(
            original = identity.display_name(),
            derived = derived.as_str(),
            "Email-derived name does not contain the original name, keeping original"
        );
        return identity;
    }

    match Identity::new(&derived) {
        Ok(enhanced) => {
            info!(
                original = identity.display_name(),
                enhanced = enhanced.display_name(),
                "Enhanced search name from email"
            );
            enhanced
                .with_employer(identity.employer())
                .with_email(identity.source_email())
        }
        Err(_) => identity,
    }
}
