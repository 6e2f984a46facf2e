//! Arena handles.

/// Handle to a heap-allocated object (plain instances, modules and classes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub usize);

/// Handle to a node of a shape tree.
///
/// Two objects whose handles compare equal have the same class and the same
/// ordered attribute history, so the handle doubles as an inline-cache guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MapId(pub u32);

impl MapId {
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
