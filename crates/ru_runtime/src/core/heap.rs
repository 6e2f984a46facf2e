//! Heap arena.
//!
//! Objects are addressed by `ObjectId` and never freed here: reclamation is
//! left to the host, so an id stays valid for the lifetime of the runtime.

use ru_core::ObjectId;

use super::module::RModule;
use super::object::RObject;
use crate::errors::messages;

pub enum ManagedObject {
    Object(Box<RObject>),
    Module(Box<RModule>),
}

pub struct Heap {
    pub(crate) objects: Vec<ManagedObject>,
}

/// Object counts by kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeapStats {
    pub objects: usize,
    pub modules: usize,
}

impl Heap {
    pub fn new() -> Self {
        Self {
            objects: Vec::with_capacity(1024),
        }
    }

    /// Allocate a managed object on the heap.
    pub fn alloc(&mut self, obj: ManagedObject) -> ObjectId {
        let id = self.objects.len();
        self.objects.push(obj);
        ObjectId(id)
    }

    pub fn get(&self, id: ObjectId) -> &ManagedObject {
        self.objects.get(id.0).expect(messages::DANGLING_HANDLE)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> &mut ManagedObject {
        self.objects.get_mut(id.0).expect(messages::DANGLING_HANDLE)
    }

    pub fn is_module(&self, id: ObjectId) -> bool {
        matches!(self.get(id), ManagedObject::Module(_))
    }

    pub fn object(&self, id: ObjectId) -> &RObject {
        match self.get(id) {
            ManagedObject::Object(o) => o,
            ManagedObject::Module(_) => panic!("{}", messages::NOT_AN_OBJECT),
        }
    }

    pub fn object_mut(&mut self, id: ObjectId) -> &mut RObject {
        match self.get_mut(id) {
            ManagedObject::Object(o) => o,
            ManagedObject::Module(_) => panic!("{}", messages::NOT_AN_OBJECT),
        }
    }

    pub fn module(&self, id: ObjectId) -> &RModule {
        match self.get(id) {
            ManagedObject::Module(m) => m,
            ManagedObject::Object(_) => panic!("{}", messages::NOT_A_MODULE),
        }
    }

    pub fn module_mut(&mut self, id: ObjectId) -> &mut RModule {
        match self.get_mut(id) {
            ManagedObject::Module(m) => m,
            ManagedObject::Object(_) => panic!("{}", messages::NOT_A_MODULE),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn stats(&self) -> HeapStats {
        let mut stats = HeapStats::default();
        for obj in &self.objects {
            match obj {
                ManagedObject::Object(_) => stats.objects += 1,
                ManagedObject::Module(_) => stats.modules += 1,
            }
        }
        stats
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}
