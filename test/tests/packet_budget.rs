/// INTEGRATION: state packets respect the configured size limit
use std::sync::{Arc, Mutex};

use skein_server::ServerConfig;
use skein_shared::{peek_packet_type, NetworkId, PacketType};
use skein_test::{init_logging, unit, Harness, SERVER_PORT};

fn record_server_data(harness: &Harness) -> Arc<Mutex<Vec<usize>>> {
    let sizes = Arc::new(Mutex::new(Vec::new()));
    let filter_sizes = sizes.clone();
    harness.network.set_filter(move |from, _, datagram| {
        if from.port() == SERVER_PORT
            && matches!(peek_packet_type(datagram), Some(PacketType::Data(_)))
        {
            filter_sizes.lock().unwrap().push(datagram.len() - PacketType::HEADER_SIZE);
        }
        true
    });
    sizes
}

#[test]
fn test_creates_split_across_packets_under_budget() {
    init_logging();
    let config = ServerConfig {
        max_packet_size: 100,
        ..Default::default()
    };
    let mut harness = Harness::with_config(config);
    harness.connect_clients(1);
    let sizes = record_server_data(&harness);

    let ids: Vec<NetworkId> = (0..5)
        .map(|index| harness.server.server.spawn_object(unit(index as f32, 0.0)))
        .collect();
    harness.tick_n(5);

    let sizes = sizes.lock().unwrap().clone();
    // Each create takes 25 bytes: three fit in the first packet
    assert_eq!(sizes[0], 4 + 3 * 25);
    assert_eq!(sizes[1], 4 + 2 * 25);
    assert!(sizes.iter().all(|size| *size <= 100));

    for network_id in ids {
        assert!(harness.client(0).client.object(&network_id).is_some());
    }
}

#[test]
fn test_many_objects_converge_under_budget() {
    init_logging();
    let config = ServerConfig {
        max_packet_size: 300,
        ..Default::default()
    };
    let mut harness = Harness::with_config(config);
    harness.connect_clients(2);
    let sizes = record_server_data(&harness);

    for index in 0..200 {
        harness.server.server.spawn_object(unit(index as f32, 1.0));
    }
    harness.tick_n(5);

    assert!(sizes.lock().unwrap().iter().all(|size| *size <= 300));
    for client in &harness.clients {
        assert_eq!(client.client.objects().len(), 200);
    }
}
