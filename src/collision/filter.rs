//! Collision group and mask helpers.
//!
//! Two bodies may collide only when each body's group intersects the other
//! body's mask. Groups and masks are 16-bit sets.

/// Returns the group bit for slot `index`.
///
/// Negative indices produce the empty group, indices past 15 produce all
/// bits set.
pub fn group(index: i32) -> u16 {
    if index < 0 {
        0
    } else if index > 15 {
        0xFFFF
    } else {
        1 << index
    }
}

/// Returns the mask bit for slot `index`, with the same clamping as
/// [`group`].
pub fn mask(index: i32) -> u16 {
    group(index)
}

/// Returns true if the filter allows the pair to collide.
#[inline]
pub fn filter_allows(group_a: u16, mask_a: u16, group_b: u16, mask_b: u16) -> bool {
    group_a & mask_b != 0 && group_b & mask_a != 0
}
