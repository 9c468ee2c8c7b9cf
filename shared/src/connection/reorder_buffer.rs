use std::collections::BTreeMap;

use crate::{
    types::PacketIndex,
    wrapping_number::{effective_index, next_sequence_index},
};

/// Holds received data packets until they are read, always handing back the
/// lowest sequence id first. Ids are extended past the 16-bit wrap so packets
/// on either side of it still come out in send order.
pub struct ReorderBuffer {
    low_water_mark: PacketIndex,
    wraparound_window: u16,
    packets: BTreeMap<u32, (PacketIndex, Box<[u8]>)>,
}

impl ReorderBuffer {
    pub fn new(wraparound_window: u16) -> Self {
        Self {
            low_water_mark: 1,
            wraparound_window,
            packets: BTreeMap::new(),
        }
    }

    /// Buffer a packet's payload. Returns false if it was stale or already
    /// buffered, in which case it is discarded.
    pub fn insert(&mut self, index: PacketIndex, payload: Box<[u8]>) -> bool {
        let Some(effective) = effective_index(index, self.low_water_mark, self.wraparound_window)
        else {
            return false;
        };
        if self.packets.contains_key(&effective) {
            return false;
        }
        self.packets.insert(effective, (index, payload));
        true
    }

    /// Take the buffered packet with the lowest effective id
    pub fn pop(&mut self) -> Option<Box<[u8]>> {
        let (_, (index, payload)) = self.packets.pop_first()?;

        let previous_mark = self.low_water_mark;
        self.low_water_mark = next_sequence_index(index);
        if self.low_water_mark < previous_mark {
            // The mark crossed the boundary, so every remaining packet is on
            // the far side of it
            let packets = std::mem::take(&mut self.packets);
            self.packets = packets
                .into_values()
                .map(|(index, payload)| (u32::from(index), (index, payload)))
                .collect();
        }

        Some(payload)
    }

    pub fn low_water_mark(&self) -> PacketIndex {
        self.low_water_mark
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    pub fn clear(&mut self) {
        self.packets.clear();
    }
}
