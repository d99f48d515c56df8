use crate::navigation::Menu;

/// Core error type.
///
/// Adapter crates map their specific failures into this type so the engine
/// can pick the right corrective reply for each class.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    /// Empty or structurally unusable payload.
    #[error("malformed payload")]
    MalformedPayload,

    /// Resolution produced an identifier no table knows.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A parameter failed typed decoding (wrong arity or type).
    ///
    /// Carries the menu the user was most likely interacting with, so the
    /// error path can re-render it instead of stranding the chat.
    #[error("invalid parameter for {identifier}: {reason}")]
    InvalidParameter {
        identifier: String,
        reason: String,
        recover: Menu,
    },

    /// A render/data-access collaborator failed.
    #[error("collaborator failure: {0}")]
    Collaborator(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
