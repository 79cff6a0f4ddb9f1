//! Walking reference chains that may contain cycles.

use crate::gradmesh_log;

/// Follows `next` from `start` until it finds an item for which `matches`
/// returns true.
///
/// Returns `None` if the chain ends without a match, or if it loops back
/// on itself.  Loops are found with Floyd's tortoise and hare: a second
/// cursor advances every other step, and the walk stops when the two
/// meet, after a number of steps proportional to the length of the chain.
pub fn chase_references<T, N, M>(start: T, mut next: N, mut matches: M) -> Option<T>
where
    T: Copy + PartialEq + std::fmt::Debug,
    N: FnMut(T) -> Option<T>,
    M: FnMut(T) -> bool,
{
    let mut slow = start;
    let mut fast = start;
    let mut advance_slow = false;

    loop {
        if matches(fast) {
            return Some(fast);
        }

        fast = next(fast)?;

        if advance_slow {
            slow = next(slow)?;
        }
        advance_slow = !advance_slow;

        if fast == slow {
            gradmesh_log!("(reference cycle through {:?})", fast);
            return None;
        }
    }
}
