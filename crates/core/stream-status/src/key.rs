use protocol::StreamDescriptor;
use uuid::Uuid;

/// Identity of a stream within a sync.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamKey {
    pub connection_id: Uuid,
    pub namespace: Option<String>,
    pub name: String,
}

impl StreamKey {
    pub fn new(connection_id: Uuid, stream: &StreamDescriptor) -> Self {
        Self {
            connection_id,
            namespace: stream.namespace.clone(),
            name: stream.name.clone(),
        }
    }
}

impl std::fmt::Display for StreamKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{}/{namespace}.{}", self.connection_id, self.name),
            None => write!(f, "{}/{}", self.connection_id, self.name),
        }
    }
}
