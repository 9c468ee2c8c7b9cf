use std::collections::{HashMap, VecDeque};

use skein_shared::{PacketIndex, PacketNotifiable, RpcCall};

/// Reliable calls sent to the server, kept until their packet is known to
/// have arrived. Calls in lost packets are queued to be sent again.
#[derive(Default)]
pub struct CallTracker {
    in_flight: HashMap<PacketIndex, RpcCall>,
    resend: VecDeque<RpcCall>,
}

impl CallTracker {
    pub fn track(&mut self, packet_index: PacketIndex, call: RpcCall) {
        self.in_flight.insert(packet_index, call);
    }

    pub fn take_resend(&mut self) -> Option<RpcCall> {
        self.resend.pop_front()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn clear(&mut self) {
        self.in_flight.clear();
        self.resend.clear();
    }
}

impl PacketNotifiable for CallTracker {
    fn notify_packet_delivered(&mut self, packet_index: PacketIndex) {
        self.in_flight.remove(&packet_index);
    }

    fn notify_packet_dropped(&mut self, packet_index: PacketIndex) {
        if let Some(call) = self.in_flight.remove(&packet_index) {
            self.resend.push_back(call);
        }
    }
}
