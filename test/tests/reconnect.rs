/// INTEGRATION: disconnection and reconnection
///
/// Either side can close a session. A client can then connect again and
/// receives the whole world afresh.
use std::net::SocketAddr;

use skein_client::ClientEvent;
use skein_test::{init_logging, unit, Chat, Harness, Move};

fn reconnect(harness: &mut Harness, index: usize) {
    let server_address = harness.server_address;
    let local_address = SocketAddr::from(([127, 0, 0, 1], 0));
    let now = harness.now;
    harness
        .client_mut(index)
        .client
        .connect(&local_address, &server_address, now)
        .unwrap();
}

#[test]
fn test_client_disconnect_reaches_server() {
    init_logging();
    let mut harness = Harness::new();
    harness.connect_clients(1);
    let network_id = harness.server.server.spawn_object(unit(1.0, 1.0));
    harness.tick_n(5);

    harness.client_mut(0).client.disconnect();
    harness.tick_n(2);

    let client = harness.client(0);
    assert!(!client.client.is_connected());
    assert!(client.client.objects().is_empty());
    assert!(client.has_event(ClientEvent::Despawn(network_id)));
    assert!(client.has_event(ClientEvent::Disconnect));
    assert_eq!(harness.server.disconnect_count(), 1);
    assert_eq!(harness.server.server.users_count(), 0);
}

#[test]
fn test_server_disconnect_reaches_client() {
    init_logging();
    let mut harness = Harness::new();
    harness.connect_clients(2);
    let key = harness.server.server.user_keys()[0];

    harness.server.server.disconnect_user(&key);
    harness.tick_n(2);

    assert_eq!(harness.server.disconnect_count(), 1);
    assert_eq!(harness.server.server.users_count(), 1);
    let disconnected = harness
        .clients
        .iter()
        .filter(|client| client.has_event(ClientEvent::Disconnect))
        .count();
    assert_eq!(disconnected, 1);
}

#[test]
fn test_reconnect_receives_world_again() {
    init_logging();
    let mut harness = Harness::new();
    harness.connect_clients(1);
    let network_id = harness.server.server.spawn_object(unit(3.0, 4.0));
    harness.server.server.call_all(&Chat::new("before"));
    harness.tick_n(5);

    harness.client_mut(0).client.disconnect();
    harness.tick_n(2);
    harness.client_mut(0).events.clear();

    reconnect(&mut harness, 0);
    let connected = harness.tick_until(100, |harness| harness.client(0).client.is_connected());
    assert!(connected);
    harness.tick_n(3);

    let client = harness.client(0);
    assert!(client.has_event(ClientEvent::Connect));
    assert!(client.has_event(ClientEvent::Spawn(network_id)));
    assert!(client.client.object(&network_id).is_some());
    assert_eq!(harness.server.connect_count(), 2);
    assert_eq!(harness.server.server.users_count(), 1);

    // Call numbering starts over on both sides
    let key = harness.server.server.user_keys()[0];
    harness.server.server.call(&key, &Chat::new("after")).unwrap();
    harness
        .client_mut(0)
        .client
        .call(&Move { dx: 1.0, dy: 0.0 })
        .unwrap();
    harness.tick_n(3);
    assert_eq!(harness.client(0).log.chat_texts(), vec!["before", "after"]);
    assert_eq!(harness.server.log.moves.len(), 1);
    assert_eq!(harness.server.log.moves[0].0, Some(key));
}

#[test]
fn test_silent_network_times_out_both_sides() {
    init_logging();
    let mut harness = Harness::new();
    harness.connect_clients(1);
    harness.network.set_loss(1.0);

    let timed_out = harness.tick_until(700, |harness| {
        harness.server.disconnect_count() == 1
            && harness.client(0).has_event(ClientEvent::Disconnect)
    });
    assert!(timed_out);
    assert!(!harness.client(0).client.is_connected());
    assert_eq!(harness.server.server.users_count(), 0);
}
