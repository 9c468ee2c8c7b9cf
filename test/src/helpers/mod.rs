/// Drives one server and its clients over a LocalNetwork, one tick at a time
use std::{
    net::SocketAddr,
    time::{Duration, Instant},
};

use skein_client::{Client, ClientConfig, ClientEvent};
use skein_server::{Server, ServerConfig, ServerEvent};
use skein_shared::RpcTable;

use crate::{
    local_socket::LocalNetwork,
    test_protocol::{rpc_table, CallLog, TestFactory},
};

pub const SERVER_PORT: u16 = 4000;

/// Long enough that every tick is also a state update
pub const TICK: Duration = Duration::from_millis(34);

/// Install env_logger for the current test
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub struct TestServer {
    pub server: Server,
    pub table: RpcTable<CallLog>,
    pub log: CallLog,
    pub events: Vec<ServerEvent>,
}

impl TestServer {
    pub fn tick(&mut self, now: Instant) {
        let events = self.server.update(now);
        self.events.extend(events);
        self.server.process_input(&mut self.table, &mut self.log);
        self.server.send_state_updates(now);
    }

    pub fn connect_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, ServerEvent::Connect(_)))
            .count()
    }

    pub fn disconnect_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, ServerEvent::Disconnect(_)))
            .count()
    }
}

pub struct TestClient {
    pub client: Client,
    pub factory: TestFactory,
    pub table: RpcTable<CallLog>,
    pub log: CallLog,
    pub events: Vec<ClientEvent>,
}

impl TestClient {
    pub fn tick(&mut self, now: Instant) {
        let events = self.client.update(now);
        self.events.extend(events);
        let events =
            self.client
                .process_state_updates(&mut self.factory, &mut self.table, &mut self.log);
        self.events.extend(events);
    }

    pub fn has_event(&self, event: ClientEvent) -> bool {
        self.events.contains(&event)
    }
}

pub struct Harness {
    pub network: LocalNetwork,
    pub server: TestServer,
    pub clients: Vec<TestClient>,
    pub server_address: SocketAddr,
    pub now: Instant,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    pub fn with_config(config: ServerConfig) -> Self {
        Self::with_network(LocalNetwork::new(), config)
    }

    /// A listening server on `network`
    pub fn with_network(network: LocalNetwork, config: ServerConfig) -> Self {
        let server_address = SocketAddr::from(([127, 0, 0, 1], SERVER_PORT));
        let mut server = Server::with_socket_factory(config, network.clone());
        if let Err(error) = server.listen(&server_address) {
            panic!("test server failed to listen: {}", error);
        }
        Self {
            network,
            server: TestServer {
                server,
                table: rpc_table(),
                log: CallLog::default(),
                events: Vec::new(),
            },
            clients: Vec::new(),
            server_address,
            now: Instant::now(),
        }
    }

    /// Add a client and start its handshake. Returns its index.
    pub fn add_client(&mut self) -> usize {
        let mut client =
            Client::with_socket_factory(ClientConfig::default(), self.network.clone());
        let local_address = SocketAddr::from(([127, 0, 0, 1], 0));
        if let Err(error) = client.connect(&local_address, &self.server_address, self.now) {
            panic!("test client failed to connect: {}", error);
        }
        self.clients.push(TestClient {
            client,
            factory: TestFactory::default(),
            table: rpc_table(),
            log: CallLog::default(),
            events: Vec::new(),
        });
        self.clients.len() - 1
    }

    /// Add `count` clients and tick until all of them are connected
    pub fn connect_clients(&mut self, count: usize) {
        for _ in 0..count {
            self.add_client();
        }
        let connected = self.tick_until(100, |harness| {
            harness
                .clients
                .iter()
                .all(|client| client.client.is_connected())
        });
        assert!(connected, "clients did not connect");
    }

    pub fn client(&self, index: usize) -> &TestClient {
        &self.clients[index]
    }

    pub fn client_mut(&mut self, index: usize) -> &mut TestClient {
        &mut self.clients[index]
    }

    /// Advance time by one tick: clients first, then the server
    pub fn tick(&mut self) {
        self.now += TICK;
        for client in &mut self.clients {
            client.tick(self.now);
        }
        self.server.tick(self.now);
    }

    pub fn tick_n(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// Tick until `condition` holds, at most `max_ticks` times. Returns
    /// whether it held.
    pub fn tick_until<F>(&mut self, max_ticks: usize, mut condition: F) -> bool
    where
        F: FnMut(&Harness) -> bool,
    {
        for _ in 0..max_ticks {
            if condition(self) {
                return true;
            }
            self.tick();
        }
        condition(self)
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
