use crate::types::PacketIndex;

/// Number of distinct values a PacketIndex can take
pub const SEQUENCE_MODULUS: u32 = 1 << 16;

/// Returns the sequence index following `index`, skipping 0, which is
/// reserved for service packets
/// next_sequence_index(1) will return 2
/// next_sequence_index(65535) will return 1
pub fn next_sequence_index(index: PacketIndex) -> PacketIndex {
    match index.wrapping_add(1) {
        0 => 1,
        next => next,
    }
}

/// Extends `index` past the 16-bit boundary so it can be ordered against
/// packets buffered before the wrap. `low_water_mark` is the lowest index the
/// receiver still expects. Returns None when the packet is stale.
pub fn effective_index(
    index: PacketIndex,
    low_water_mark: PacketIndex,
    wraparound_window: u16,
) -> Option<u32> {
    if index >= low_water_mark {
        return Some(u32::from(index));
    }
    if index < wraparound_window / 2 && low_water_mark > u16::MAX - wraparound_window {
        return Some(u32::from(index) + SEQUENCE_MODULUS);
    }
    None
}
