//! Connected participants, keyed by connection.

use crate::types::ConnectionId;

/// Connection -> display name, in join order
#[derive(Debug, Clone, Default)]
pub struct Roster {
    entries: Vec<(ConnectionId, String)>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection, or rename it in place if it already joined
    pub fn join(&mut self, connection_id: &str, name: String) {
        if let Some(entry) = self.entries.iter_mut().find(|(id, _)| id == connection_id) {
            entry.1 = name;
        } else {
            self.entries.push((connection_id.to_string(), name));
        }
    }

    /// Returns the name the connection had joined as, if any
    pub fn leave(&mut self, connection_id: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(id, _)| id == connection_id)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn name_of(&self, connection_id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(id, _)| id == connection_id)
            .map(|(_, name)| name.as_str())
    }

    /// Display names only; duplicates are kept
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(_, name)| name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
