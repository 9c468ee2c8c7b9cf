use std::{
    collections::{HashMap, VecDeque},
    time::{Duration, Instant},
};

use crate::{connection::packet_notifiable::PacketNotifiable, types::PacketIndex};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Dropped,
}

/// Tracks reliably-sent packets until each is either acknowledged or times
/// out. Every tracked packet produces exactly one outcome.
pub struct DeliveryLedger {
    records: HashMap<PacketIndex, Instant>,
    // Sent since the last update; merged after the timeout scan
    staged: Vec<(PacketIndex, Instant)>,
    outcomes: VecDeque<(PacketIndex, DeliveryOutcome)>,
}

impl DeliveryLedger {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            staged: Vec::new(),
            outcomes: VecDeque::new(),
        }
    }

    pub fn stage(&mut self, packet_index: PacketIndex, sent_at: Instant) {
        self.staged.push((packet_index, sent_at));
    }

    pub fn merge_staged(&mut self) {
        self.records.extend(self.staged.drain(..));
    }

    /// Resolve an acknowledged packet, returning when it was sent. Unknown ids
    /// are late or duplicate acks and yield None.
    pub fn acknowledge(&mut self, packet_index: PacketIndex) -> Option<Instant> {
        let sent_at = match self.records.remove(&packet_index) {
            Some(sent_at) => sent_at,
            None => {
                let position = self
                    .staged
                    .iter()
                    .position(|(index, _)| *index == packet_index)?;
                self.staged.swap_remove(position).1
            }
        };
        self.outcomes
            .push_back((packet_index, DeliveryOutcome::Delivered));
        Some(sent_at)
    }

    /// Drop every record older than `timeout`. Returns how many were dropped.
    pub fn expire(&mut self, now: Instant, timeout: Duration) -> usize {
        let mut expired: Vec<(PacketIndex, Instant)> = self
            .records
            .iter()
            .filter(|(_, sent_at)| now.saturating_duration_since(**sent_at) >= timeout)
            .map(|(index, sent_at)| (*index, *sent_at))
            .collect();
        expired.sort_by_key(|(index, sent_at)| (*sent_at, *index));

        for (packet_index, _) in &expired {
            self.records.remove(packet_index);
            self.outcomes
                .push_back((*packet_index, DeliveryOutcome::Dropped));
        }
        expired.len()
    }

    /// Report every outstanding packet as dropped
    pub fn drop_all(&mut self) {
        self.merge_staged();
        let mut remaining: Vec<(PacketIndex, Instant)> = self.records.drain().collect();
        remaining.sort_by_key(|(index, sent_at)| (*sent_at, *index));
        self.outcomes.extend(
            remaining
                .into_iter()
                .map(|(index, _)| (index, DeliveryOutcome::Dropped)),
        );
    }

    /// Hand every outcome collected so far to `notifiable`
    pub fn notify(&mut self, notifiable: &mut dyn PacketNotifiable) {
        while let Some((packet_index, outcome)) = self.outcomes.pop_front() {
            match outcome {
                DeliveryOutcome::Delivered => notifiable.notify_packet_delivered(packet_index),
                DeliveryOutcome::Dropped => notifiable.notify_packet_dropped(packet_index),
            }
        }
    }

    pub fn outstanding(&self) -> usize {
        self.records.len() + self.staged.len()
    }
}

impl Default for DeliveryLedger {
    fn default() -> Self {
        Self::new()
    }
}
