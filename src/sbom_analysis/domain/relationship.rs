use super::ComponentId;

/// "parent depends on child"
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Relationship {
    parent: ComponentId,
    child: ComponentId,
}

impl Relationship {
    pub fn new(parent: ComponentId, child: ComponentId) -> Self {
        Self { parent, child }
    }

    pub fn parent(&self) -> &ComponentId {
        &self.parent
    }

    pub fn child(&self) -> &ComponentId {
        &self.child
    }
}
