/// Minimal test protocol for E2E testing
use skein_shared::{
    impl_replicate, ByteReader, ByteWrite, ConnectionKey, NetworkId, ObjectFactory,
    ReplicatedObject, Rpc, RpcTable, Serde, SerdeErr, SyncVar,
};

#[derive(Default)]
pub struct Position {
    pub x: SyncVar<f32>,
    pub y: SyncVar<f32>,
}

impl_replicate!(Position { x, y });

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x: SyncVar::new(x),
            y: SyncVar::new(y),
        }
    }
}

#[derive(Default)]
pub struct Label {
    pub text: SyncVar<String>,
    pub visible: SyncVar<bool>,
}

impl_replicate!(Label { text, visible });

/// A "Unit" object at (x, y)
pub fn unit(x: f32, y: f32) -> ReplicatedObject {
    ReplicatedObject::new("Unit").with_component(Position::new(x, y))
}

/// Builds "Unit" and "Marker" objects, and remembers what it was asked to
/// destroy
#[derive(Default)]
pub struct TestFactory {
    pub destroyed: Vec<NetworkId>,
}

impl ObjectFactory for TestFactory {
    fn create_object(&mut self, type_name: &str) -> Option<ReplicatedObject> {
        match type_name {
            "Unit" => Some(ReplicatedObject::new("Unit").with_component(Position::default())),
            "Marker" => Some(
                ReplicatedObject::new("Marker")
                    .with_component(Position::default())
                    .with_component(Label::default()),
            ),
            _ => None,
        }
    }

    fn destroy_object(&mut self, object: ReplicatedObject) {
        self.destroyed.push(object.network_id());
    }
}

// Remote calls

/// Reliable text message
#[derive(Clone, Debug, PartialEq)]
pub struct Chat {
    pub text: String,
}

impl Chat {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

impl Rpc for Chat {
    const NAME: &'static str = "Chat";
    const RELIABLE: bool = true;

    fn write_args(&self, writer: &mut dyn ByteWrite) {
        self.text.ser(writer);
    }

    fn read_args(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            text: String::de(reader)?,
        })
    }
}

/// Unreliable probe
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ping {
    pub sequence: u32,
}

impl Rpc for Ping {
    const NAME: &'static str = "Ping";
    const RELIABLE: bool = false;

    fn write_args(&self, writer: &mut dyn ByteWrite) {
        self.sequence.ser(writer);
    }

    fn read_args(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            sequence: u32::de(reader)?,
        })
    }
}

/// Reliable movement input from a client
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Move {
    pub dx: f32,
    pub dy: f32,
}

impl Rpc for Move {
    const NAME: &'static str = "Move";
    const RELIABLE: bool = true;

    fn write_args(&self, writer: &mut dyn ByteWrite) {
        self.dx.ser(writer);
        self.dy.ser(writer);
    }

    fn read_args(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            dx: f32::de(reader)?,
            dy: f32::de(reader)?,
        })
    }
}

/// Everything the handlers in `rpc_table` have run, in execution order
#[derive(Default, Debug)]
pub struct CallLog {
    pub chats: Vec<(Option<ConnectionKey>, String)>,
    pub pings: Vec<u32>,
    pub moves: Vec<(Option<ConnectionKey>, Move)>,
}

impl CallLog {
    pub fn chat_texts(&self) -> Vec<&str> {
        self.chats.iter().map(|(_, text)| text.as_str()).collect()
    }
}

/// A table that records every call into a CallLog
pub fn rpc_table() -> RpcTable<CallLog> {
    let mut table = RpcTable::new();
    table.register::<Chat, _>(|log: &mut CallLog, caller, chat: Chat| {
        log.chats.push((caller, chat.text));
    });
    table.register::<Ping, _>(|log: &mut CallLog, _, ping: Ping| {
        log.pings.push(ping.sequence);
    });
    table.register::<Move, _>(|log: &mut CallLog, caller, movement: Move| {
        log.moves.push((caller, movement));
    });
    table
}
