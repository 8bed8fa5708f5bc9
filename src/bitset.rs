//! Bit-mask helpers for visited sets and subset enumeration.
//!
//! Node `i` is represented by bit `1 << i` of a `u64`, so every helper here
//! supports at most 64 nodes.

use crate::error::{Result, TspError};

/// Widest mask supported by the helpers
pub const MAX_WIDTH: usize = u64::BITS as usize;

/// Mask with the lowest `n` bits set. Valid for `n == 64`.
#[inline]
pub fn full_mask(n: usize) -> u64 {
    if n >= MAX_WIDTH {
        u64::MAX
    } else {
        (1u64 << n) - 1
    }
}

/// Iterator over the set bits of a mask, lowest first, each yielded as a
/// single-bit value (a power of two).
#[derive(Debug, Clone)]
pub struct SetBits {
    remaining: u64,
}

impl Iterator for SetBits {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.remaining == 0 {
            return None;
        }
        let bit = self.remaining & self.remaining.wrapping_neg();
        self.remaining ^= bit;
        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for SetBits {}

/// Lazily iterate the set bits of `mask`. Empty when `mask == 0`.
pub fn set_bits(mask: u64) -> SetBits {
    SetBits { remaining: mask }
}

/// Position of a single-bit value, e.g. `0b100 -> 2`.
pub fn bit_index(bit: u64) -> Result<usize> {
    if !bit.is_power_of_two() {
        return Err(TspError::invalid_input(format!(
            "bit_index expects a power of two, got {}",
            bit
        )));
    }
    Ok(bit.trailing_zeros() as usize)
}

/// Is `node` a member of `mask`
#[inline]
pub fn is_member(node: usize, mask: u64) -> bool {
    node < MAX_WIDTH && mask & (1u64 << node) != 0
}

/// Iterator over every `width`-bit mask with exactly `k` bits set, in
/// ascending numeric order (Gosper's hack).
#[derive(Debug, Clone)]
pub struct Combinations {
    next: Option<u64>,
    limit: u64,
}

impl Iterator for Combinations {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let current = self.next?;
        self.next = if current == 0 {
            None
        } else {
            let lowest = current & current.wrapping_neg();
            match current.checked_add(lowest) {
                Some(ripple) => {
                    let ones = ((current ^ ripple) >> 2) / lowest;
                    let candidate = ripple | ones;
                    (candidate <= self.limit).then_some(candidate)
                }
                // The highest k bits of a 64-bit word were the last pattern
                None => None,
            }
        };
        Some(current)
    }
}

/// Lazily enumerate the masks of `width` bits with exactly `k` set.
///
/// `k == 0` yields the empty mask once; `k > width` yields nothing.
pub fn combinations(k: usize, width: usize) -> Combinations {
    let width = width.min(MAX_WIDTH);
    let next = if k > width { None } else { Some(full_mask(k)) };
    Combinations {
        next,
        limit: full_mask(width),
    }
}
