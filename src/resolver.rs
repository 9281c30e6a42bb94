//! Degree-of-success resolution for a check total against a DC.

use crate::types::DegreeOfSuccess;

/// Resolve a raw check total against a DC into a degree of success.
///
/// Beating the DC by 10 or more is a critical success, missing it by 10 or
/// more a critical failure. A natural 20 on the die upgrades the degree one
/// step, a natural 1 downgrades it one step, capped at the ends of the
/// ladder. Pure and total over its inputs.
pub fn resolve(total: i32, dc: i32, natural_die: Option<u8>) -> DegreeOfSuccess {
    let diff = total - dc;

    let mut index: i8 = if diff >= 10 {
        3
    } else if diff >= 0 {
        2
    } else if diff > -10 {
        1
    } else {
        0
    };

    match natural_die {
        Some(20) => index = (index + 1).min(3),
        Some(1) => index -= 1,
        _ => {}
    }

    DegreeOfSuccess::from_index(index)
}
