//! Bit helpers for the FAST segment test

/// Length of the Bresenham circle sampled around each candidate pixel
pub const CIRCLE_LEN: usize = 16;

/// True when `mask` holds at least `arc_len` set bits that are contiguous on
/// the 16-pixel circle (wrapping from bit 15 back to bit 0).
pub fn has_contiguous_arc(mask: u16, arc_len: usize) -> bool {
    if arc_len == 0 || arc_len > CIRCLE_LEN {
        return false;
    }
    if mask == u16::MAX {
        return true;
    }

    // AND the mask with its rotations; a surviving bit marks the start of a
    // run of `arc_len` ones.
    let mut runs = mask;
    for shift in 1..arc_len {
        runs &= mask.rotate_right(shift as u32);
        if runs == 0 {
            return false;
        }
    }

    runs != 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Reference implementation walking the circle twice; used to cross-check
    /// the bitmask version.
    fn longest_arc(mask: u16) -> usize {
        let mut longest = 0;
        let mut current = 0;

        for i in 0..(CIRCLE_LEN * 2) {
            if mask & (1 << (i % CIRCLE_LEN)) != 0 {
                current += 1;
                longest = longest.max(current);
            } else {
                current = 0;
            }
        }

        longest.min(CIRCLE_LEN)
    }

    #[test]
    fn straight_run_of_nine() {
        let mask = 0b0000_0001_1111_1111;
        assert!(has_contiguous_arc(mask, 9));
        assert!(!has_contiguous_arc(mask, 10));
    }

    #[test]
    fn run_wrapping_around_the_circle() {
        // bits 12..16 and 0..5 form a single nine-pixel arc
        let mask: u16 = 0b1111_0000_0001_1111;
        assert!(has_contiguous_arc(mask, 9));
        assert_eq!(longest_arc(mask), 9);
    }

    #[test]
    fn alternating_pixels_never_form_an_arc() {
        let mask: u16 = 0b0101_0101_0101_0101;
        assert!(!has_contiguous_arc(mask, 2));
        assert_eq!(longest_arc(mask), 1);
    }

    #[test]
    fn full_and_empty_circles() {
        assert!(has_contiguous_arc(u16::MAX, 16));
        assert!(!has_contiguous_arc(0, 1));
        assert!(!has_contiguous_arc(u16::MAX, 0));
    }

    proptest! {
        #[test]
        fn bitmask_agrees_with_walk(mask in any::<u16>(), arc_len in 1usize..=16) {
            prop_assert_eq!(has_contiguous_arc(mask, arc_len), longest_arc(mask) >= arc_len);
        }
    }
}
