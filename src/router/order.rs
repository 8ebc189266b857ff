//! Route precedence.
//!
//! Two rules decide which of several overlapping routes is tried first:
//!
//! 1. **Specificity** - templates are compared character by character with
//!    parameter markers ranked after every other character, so `/users/login`
//!    precedes `/users/:id`.
//! 2. **Priority** - a higher effective priority always wins. Explicit
//!    priorities default to `0`, index routes default to `-1`.
//!
//! Both are applied in a single stable sort on the composite key
//! `(priority desc, specificity asc)`. Routes equal on both keep their
//! discovery order.
//!
//! Priorities are `f64`, so `0.5` sits between `0` and `1`. They are compared
//! with [`f64::total_cmp`]; `-0.0` ties with `0.0`.

use std::cmp::{Ordering, Reverse};

use super::core::Route;
use super::pattern::is_param_marker;

/// Rank given to `:` and `%`; above every Unicode scalar value.
const PARAM_RANK: u32 = u32::MAX;

/// Total order over priorities for use inside a sort key.
#[derive(Debug, Clone, Copy)]
struct PriorityKey(f64);

impl PriorityKey {
    fn new(priority: f64) -> Self {
        // Adding +0.0 turns -0.0 into +0.0 and leaves every other value alone.
        Self(priority + 0.0)
    }
}

impl PartialEq for PriorityKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PriorityKey {}

impl PartialOrd for PriorityKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PriorityKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Sort key implementing the specificity rule for a residual template.
#[must_use]
pub fn specificity_key(template: &str) -> Vec<u32> {
    template
        .chars()
        .map(|c| if is_param_marker(c) { PARAM_RANK } else { c as u32 })
        .collect()
}

/// Order routes in place into final evaluation order.
///
/// `sort_by_cached_key` is stable, which is what keeps discovery order as the
/// last tie-breaker.
pub fn order_routes<H>(routes: &mut [Route<H>]) {
    routes.sort_by_cached_key(|route| {
        (
            Reverse(PriorityKey::new(route.effective_priority())),
            specificity_key(route.path()),
        )
    });
}
