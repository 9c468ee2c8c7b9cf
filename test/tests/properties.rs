/// PROPERTY-BASED TESTS: ordering invariants
///
/// Uses proptest to verify ordering properties hold across random delivery
/// orders.
///
/// Key invariants:
/// 1. A Connection hands payloads to its owner in send order, however the
///    datagrams were shuffled on the way
/// 2. Reliable remote calls run exactly once each, in call order, whatever
///    order and duplication they arrive in
use std::{net::SocketAddr, time::Instant};

use proptest::prelude::*;
use skein_shared::{ByteReader, ByteWriter, Connection, ConnectionConfig, RpcCall, RpcEndpoint};
use skein_test::{rpc_table, CallLog, Chat};

fn address(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

fn connected_pair(now: Instant) -> (Connection, Connection) {
    let config = ConnectionConfig::default();
    let mut client = Connection::new(&config, address(1), now);
    client.connect(address(2)).unwrap();
    let _ = client.drain_outgoing();

    let mut server = Connection::new_incoming(&config, address(2), address(1), now);
    server.start();
    for datagram in server.drain_outgoing().collect::<Vec<_>>() {
        client.buffer_incoming(&datagram);
    }
    client.update(now);
    let _ = client.drain_outgoing();
    (client, server)
}

// Strategy for a shuffled delivery order of `0..count`
fn shuffled_order(max_count: usize) -> impl Strategy<Value = Vec<usize>> {
    (1..=max_count).prop_flat_map(|count| Just((0..count).collect::<Vec<_>>()).prop_shuffle())
}

// Strategy for a call count and a delivery order in which every call appears
// at least once, some of them several times
fn order_with_duplicates() -> impl Strategy<Value = (usize, Vec<usize>)> {
    (1usize..40)
        .prop_flat_map(|count| (Just(count), prop::collection::vec(0..count, 0..20)))
        .prop_flat_map(|(count, duplicates)| {
            let order: Vec<usize> = (0..count).chain(duplicates).collect();
            (Just(count), Just(order).prop_shuffle())
        })
}

proptest! {
    /// Test that payloads come out of a Connection in send order
    #[test]
    fn prop_connection_restores_send_order(order in shuffled_order(32)) {
        let now = Instant::now();
        let (mut client, mut server) = connected_pair(now);

        for value in 0..order.len() {
            client.send(&(value as u32).to_le_bytes()).unwrap();
        }
        let datagrams: Vec<Box<[u8]>> = client.drain_outgoing().collect();
        prop_assert_eq!(datagrams.len(), order.len());

        for position in &order {
            prop_assert!(server.buffer_incoming(&datagrams[*position]));
        }
        server.update(now);

        let mut received = Vec::new();
        while let Some(payload) = server.receive() {
            let mut bytes = [0; 4];
            bytes.copy_from_slice(&payload);
            received.push(u32::from_le_bytes(bytes) as usize);
        }
        prop_assert_eq!(received, (0..order.len()).collect::<Vec<_>>());
    }

    /// Test that reliable calls run once each and in order, whatever order
    /// and duplication they arrive in
    #[test]
    fn prop_reliable_calls_run_once_in_order((count, order) in order_with_duplicates()) {
        let mut sender = RpcEndpoint::new();
        let entries: Vec<Box<[u8]>> = (0..count)
            .map(|value| {
                let mut call = RpcCall::new(&Chat::new(&value.to_string()));
                sender.assign_index(&mut call);
                let mut writer = ByteWriter::new();
                call.write(&mut writer);
                writer.to_bytes()
            })
            .collect();

        let mut receiver = RpcEndpoint::new();
        let mut table = rpc_table();
        let mut log = CallLog::default();
        for position in &order {
            let mut reader = ByteReader::new(&entries[*position]);
            prop_assert!(receiver.read_execute(&mut reader, &mut table, &mut log, None).is_ok());
        }

        let expected: Vec<String> = (0..count).map(|value| value.to_string()).collect();
        prop_assert_eq!(log.chat_texts(), expected.iter().map(String::as_str).collect::<Vec<_>>());
        prop_assert_eq!(receiver.buffered_calls(), 0);
    }
}
