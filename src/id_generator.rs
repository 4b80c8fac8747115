use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque element identity, stable for the element's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "element-{}", self.0.simple())
    }
}

pub fn generate_id() -> ElementId {
    ElementId(Uuid::new_v4())
}
