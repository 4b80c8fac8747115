mod editor_model;
mod editor_state;
mod persistence;

pub use editor_model::{EditorModel, TableSelection};
pub use editor_state::EditorState;
pub use persistence::{
    DocumentSnapshot,
    PersistenceError,
    PersistenceResult,
    StatePersistence,
};
