/// END-TO-END: object replication from server to clients
///
/// A server spawns, changes and despawns objects; connected clients must end
/// up with exactly the server's view.
use skein_client::ClientEvent;
use skein_shared::{ReplicatedObject, SyncVar};
use skein_test::{init_logging, unit, Harness, Label, Position};

fn position_of(object: Option<&ReplicatedObject>) -> Option<(f32, f32)> {
    let position = object?.find_component::<Position>()?;
    Some((*position.x.get(), *position.y.get()))
}

#[test]
fn e2e_create_reaches_client_with_matching_state() {
    init_logging();
    let mut harness = Harness::new();
    harness.connect_clients(1);

    let network_id = harness.server.server.spawn_object(unit(3.5, -2.25));
    let spawned = harness.tick_until(20, |harness| {
        harness.client(0).has_event(ClientEvent::Spawn(network_id))
    });
    assert!(spawned, "client never received the create");

    let client = &harness.client(0).client;
    let object = client.object(&network_id).unwrap();
    assert_eq!(object.network_id(), network_id);
    assert_eq!(object.type_name(), "Unit");
    assert_eq!(position_of(Some(object)), Some((3.5, -2.25)));
}

#[test]
fn e2e_objects_spawned_before_connecting_are_sent() {
    init_logging();
    let mut harness = Harness::new();
    let first = harness.server.server.spawn_object(unit(1.0, 1.0));
    let second = harness.server.server.spawn_object(unit(2.0, 2.0));

    harness.connect_clients(1);
    harness.tick_n(5);

    let client = &harness.client(0).client;
    assert_eq!(position_of(client.object(&first)), Some((1.0, 1.0)));
    assert_eq!(position_of(client.object(&second)), Some((2.0, 2.0)));
}

#[test]
fn e2e_field_changes_follow_the_server() {
    init_logging();
    let mut harness = Harness::new();
    harness.connect_clients(2);
    let network_id = harness.server.server.spawn_object(unit(0.0, 0.0));
    harness.tick_n(5);

    for step in 1..=10 {
        let object = harness.server.server.object_mut(&network_id).unwrap();
        let position = object.find_component_mut::<Position>().unwrap();
        position.x.set(step as f32);
        harness.tick();
    }
    harness.tick_n(5);

    for index in 0..2 {
        let client = &harness.client(index).client;
        assert_eq!(position_of(client.object(&network_id)), Some((10.0, 0.0)));
    }
}

#[test]
fn e2e_multi_component_object() {
    init_logging();
    let mut harness = Harness::new();
    harness.connect_clients(1);

    let marker = ReplicatedObject::new("Marker")
        .with_component(Position::new(4.0, 8.0))
        .with_component(Label {
            text: SyncVar::new("flag".to_string()),
            visible: SyncVar::new(true),
        });
    let network_id = harness.server.server.spawn_object(marker);
    harness.tick_n(5);

    // Change only the second component
    let object = harness.server.server.object_mut(&network_id).unwrap();
    object
        .find_component_mut::<Label>()
        .unwrap()
        .text
        .set("captured".to_string());
    harness.tick_n(5);

    let object = harness.client(0).client.object(&network_id).unwrap();
    let label = object.find_component::<Label>().unwrap();
    assert_eq!(label.text.get(), "captured");
    assert!(*label.visible.get());
    assert_eq!(position_of(Some(object)), Some((4.0, 8.0)));
}

#[test]
fn e2e_despawn_removes_object_on_client() {
    init_logging();
    let mut harness = Harness::new();
    harness.connect_clients(1);
    let network_id = harness.server.server.spawn_object(unit(0.0, 0.0));
    harness.tick_n(5);
    assert!(harness.client(0).client.object(&network_id).is_some());

    assert!(harness.server.server.despawn_object(&network_id).is_some());
    let despawned = harness.tick_until(20, |harness| {
        harness.client(0).has_event(ClientEvent::Despawn(network_id))
    });
    assert!(despawned);
    assert!(harness.client(0).client.object(&network_id).is_none());
    assert_eq!(harness.client(0).factory.destroyed, vec![network_id]);
}

#[test]
fn e2e_local_viewer_receives_no_replication() {
    init_logging();
    let mut harness = Harness::new();
    harness.connect_clients(2);
    let viewer_key = harness.server.server.user_keys()[0];
    harness.server.server.set_local_viewer(&viewer_key).unwrap();

    let network_id = harness.server.server.spawn_object(unit(1.0, 1.0));
    harness.tick_n(10);

    let received: Vec<bool> = harness
        .clients
        .iter()
        .map(|client| client.client.object(&network_id).is_some())
        .collect();
    assert_eq!(received.iter().filter(|received| **received).count(), 1);
    assert!(harness.server.server.user(&viewer_key).unwrap().is_local_viewer());
}
