//! User-facing text, behind a typed key table.
//!
//! Keys are enumerated ahead of time so every lookup is statically
//! verifiable; there is no dynamic key synthesis.

use crate::types::DegreeOfSuccess;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    DegreeCriticalFailure,
    DegreeFailure,
    DegreeSuccess,
    DegreeCriticalSuccess,
    PickDestroyed,
    MissingActor,
}

pub fn lookup(key: MessageKey) -> &'static str {
    match key {
        MessageKey::DegreeCriticalFailure => "Critical Failure",
        MessageKey::DegreeFailure => "Failure",
        MessageKey::DegreeSuccess => "Success",
        MessageKey::DegreeCriticalSuccess => "Critical Success",
        MessageKey::PickDestroyed => "Lock pick destroyed.",
        MessageKey::MissingActor => "<Missing Actor>",
    }
}

pub fn degree_label(degree: DegreeOfSuccess) -> &'static str {
    lookup(match degree {
        DegreeOfSuccess::CriticalFailure => MessageKey::DegreeCriticalFailure,
        DegreeOfSuccess::Failure => MessageKey::DegreeFailure,
        DegreeOfSuccess::Success => MessageKey::DegreeSuccess,
        DegreeOfSuccess::CriticalSuccess => MessageKey::DegreeCriticalSuccess,
    })
}

/// Chat line for one attempt, with the destroyed-pick sentence on a critical
/// failure.
pub fn attempt_message(actor_name: &str, degree: DegreeOfSuccess) -> String {
    let mut message = format!(
        "{} attempts to pick the lock. Result: {}.",
        actor_name,
        degree_label(degree)
    );
    if degree == DegreeOfSuccess::CriticalFailure {
        message.push(' ');
        message.push_str(lookup(MessageKey::PickDestroyed));
    }
    message
}

/// Chat line posted once the challenge resolves.
pub fn lock_picked_message(actor_name: &str) -> String {
    format!("{} successfully picks the lock.", actor_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_message_per_degree() {
        assert_eq!(
            attempt_message("Merisiel", DegreeOfSuccess::Success),
            "Merisiel attempts to pick the lock. Result: Success."
        );
        assert_eq!(
            attempt_message("Merisiel", DegreeOfSuccess::CriticalFailure),
            "Merisiel attempts to pick the lock. Result: Critical Failure. Lock pick destroyed."
        );
    }

    #[test]
    fn test_lock_picked_message() {
        assert_eq!(
            lock_picked_message("Merisiel"),
            "Merisiel successfully picks the lock."
        );
    }
}
