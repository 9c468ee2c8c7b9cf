/// INTEGRATION: ordered remote calls
///
/// Reliable calls run exactly once and in call order on the receiving side,
/// whatever the network loses. Unreliable calls are never resent.
use std::sync::{Arc, Mutex};

use skein_shared::{peek_packet_type, PacketType};
use skein_test::{init_logging, Chat, Harness, Move, Ping, SERVER_PORT};

#[test]
fn test_server_calls_run_in_order_despite_loss() {
    init_logging();
    let mut harness = Harness::new();
    harness.connect_clients(1);
    let key = harness.server.server.user_keys()[0];

    // Lose the first data packet the server sends from now on
    let dropped = Arc::new(Mutex::new(false));
    let dropped_flag = dropped.clone();
    harness.network.set_filter(move |from, _, datagram| {
        let is_data = matches!(peek_packet_type(datagram), Some(PacketType::Data(_)));
        let mut dropped = dropped_flag.lock().unwrap();
        if is_data && from.port() == SERVER_PORT && !*dropped {
            *dropped = true;
            return false;
        }
        true
    });

    harness.server.server.call(&key, &Chat::new("first")).unwrap();
    harness.tick();
    harness.server.server.call(&key, &Chat::new("second")).unwrap();
    harness.tick_n(3);
    assert!(*dropped.lock().unwrap());

    // "second" has arrived but waits for "first"
    assert!(harness.client(0).log.chats.is_empty());

    let delivered = harness.tick_until(100, |harness| harness.client(0).log.chats.len() == 2);
    assert!(delivered, "lost call was never resent");
    assert_eq!(harness.client(0).log.chat_texts(), vec!["first", "second"]);
    assert!(harness.client(0).log.chats.iter().all(|(caller, _)| caller.is_none()));
}

#[test]
fn test_call_all_reaches_every_client_once() {
    init_logging();
    let mut harness = Harness::new();
    harness.connect_clients(3);

    for text in ["a", "b", "c"] {
        harness.server.server.call_all(&Chat::new(text));
    }
    harness.tick_n(5);

    for client in &harness.clients {
        assert_eq!(client.log.chat_texts(), vec!["a", "b", "c"]);
    }
}

#[test]
fn test_client_calls_run_in_order_with_caller() {
    init_logging();
    let mut harness = Harness::new();
    harness.connect_clients(2);
    harness.network.set_loss(0.3);

    for step in 0..20 {
        let movement = Move {
            dx: step as f32,
            dy: 0.0,
        };
        harness.client_mut(0).client.call(&movement).unwrap();
        harness.tick();
    }
    harness.network.set_loss(0.0);
    let delivered = harness.tick_until(300, |harness| harness.server.log.moves.len() == 20);
    assert!(delivered, "lost client calls were never resent");

    let steps: Vec<f32> = harness
        .server
        .log
        .moves
        .iter()
        .map(|(_, movement)| movement.dx)
        .collect();
    let expected: Vec<f32> = (0..20).map(|step| step as f32).collect();
    assert_eq!(steps, expected);

    let caller = harness.server.log.moves[0].0;
    assert!(caller.is_some());
    assert!(harness.server.log.moves.iter().all(|(key, _)| *key == caller));

    let settled = harness.tick_until(200, |harness| {
        harness.client(0).client.calls_in_flight() == 0
    });
    assert!(settled);
    assert_eq!(harness.server.log.moves.len(), 20);
}

#[test]
fn test_unreliable_calls_are_not_resent() {
    init_logging();
    let mut harness = Harness::new();
    harness.connect_clients(1);
    harness.network.set_filter(|from, _, datagram| {
        // Drop every client data packet carrying an odd ping
        let is_data = matches!(peek_packet_type(datagram), Some(PacketType::Data(_)));
        let is_odd = datagram.len() >= 4 && datagram[datagram.len() - 4] % 2 == 1;
        !(is_data && from.port() != SERVER_PORT && is_odd)
    });

    for sequence in 0..10_u32 {
        harness.client_mut(0).client.call(&Ping { sequence }).unwrap();
        harness.tick();
    }
    harness.tick_n(60);

    assert_eq!(harness.server.log.pings, vec![0, 2, 4, 6, 8]);
    assert_eq!(harness.client(0).client.calls_in_flight(), 0);
}

#[test]
fn test_calls_before_connecting_fail() {
    init_logging();
    let mut harness = Harness::new();
    let index = harness.add_client();
    assert!(harness.client_mut(index).client.call(&Chat::new("early")).is_err());
}
