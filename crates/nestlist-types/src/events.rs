use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    Gifts,
    Contributions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Insert,
    Update,
    Delete,
}

/// Events sent over the WebSocket gateway.
///
/// Row changes carry no payload: clients refetch the list when one arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum GatewayEvent {
    /// Sent once right after the socket opens
    Ready {
        server_time: chrono::DateTime<chrono::Utc>,
    },

    /// A row in one of the registry tables was written
    RowChanged {
        table: Table,
        action: ChangeAction,
        id: Uuid,
    },
}

impl GatewayEvent {
    pub fn gift(action: ChangeAction, id: Uuid) -> Self {
        Self::RowChanged {
            table: Table::Gifts,
            action,
            id,
        }
    }

    pub fn contribution(action: ChangeAction, id: Uuid) -> Self {
        Self::RowChanged {
            table: Table::Contributions,
            action,
            id,
        }
    }
}
