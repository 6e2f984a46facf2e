//! Object allocation, class-of and lazily materialized singleton classes.

use ru_core::{ObjectId, Value};
use tracing::debug;

use crate::core::{ManagedObject, ModuleKind, RObject};
use crate::errors::RuntimeError;

use super::Runtime;

impl Runtime {
    /// Allocate an attribute-free instance of `class`.
    pub fn new_object(&mut self, class: ObjectId) -> Value {
        let root = self.shapes.root_for(class);
        let id = self.heap.alloc(ManagedObject::Object(Box::new(RObject::new(root))));
        Value::object(id)
    }

    /// Class used for method dispatch on `value`, singleton classes included.
    pub fn class_of(&self, value: Value) -> ObjectId {
        if value.is_f64() {
            self.classes.float
        } else if value.is_int() {
            self.classes.integer
        } else if value.is_nil() {
            self.classes.nil_class
        } else if value.is_bool() {
            if value.as_bool() {
                self.classes.true_class
            } else {
                self.classes.false_class
            }
        } else if value.is_symbol() {
            self.classes.symbol
        } else if value.is_module() {
            let md = self.heap.module(value.as_obj_id());
            match md.singleton() {
                Some(singleton) => singleton,
                None if md.is_class() => self.classes.class,
                None => self.classes.module,
            }
        } else {
            self.shapes.class_of(self.heap.object(value.as_obj_id()).map())
        }
    }

    /// `class_of` with singleton classes skipped.
    pub fn nonsingleton_class_of(&self, value: Value) -> ObjectId {
        let mut class = self.class_of(value);
        loop {
            let md = self.heap.module(class);
            match md.superclass() {
                Some(sup) if md.is_singleton() => class = sup,
                _ => return class,
            }
        }
    }

    /// Singleton class of `value`, created on first request. Singletons of
    /// anonymous classes and modules are anonymous too.
    ///
    /// Immediates have none; `nil`, `true` and `false` answer with their
    /// ordinary class.
    pub fn singleton_class(&mut self, value: Value) -> Result<ObjectId, RuntimeError> {
        if value.is_int() || value.is_f64() || value.is_symbol() {
            return Err(RuntimeError::NoSingleton);
        }
        if !value.is_heap() {
            return Ok(self.class_of(value));
        }
        if value.is_module() {
            self.module_singleton(value.as_obj_id())
        } else {
            Ok(self.object_singleton(value))
        }
    }

    fn object_singleton(&mut self, value: Value) -> ObjectId {
        let id = value.as_obj_id();
        let class = self.class_of(value);
        if self.heap.module(class).is_singleton() {
            return class;
        }
        let name = self
            .heap
            .module(class)
            .name()
            .map(|owner| format!("#<Class:#<{}:0x{:x}>>", owner, id.0));
        let singleton = self.alloc_module(
            name,
            ModuleKind::Class {
                superclass: Some(class),
                is_singleton: true,
                attached: Some(value),
            },
        );
        let map = self.heap.object(id).map();
        let rebased = self.shapes.rebase(map, singleton);
        self.heap.object_mut(id).map = rebased;
        debug!(?id, ?singleton, "object singleton class created");
        singleton
    }

    fn module_singleton(&mut self, module: ObjectId) -> Result<ObjectId, RuntimeError> {
        if let Some(singleton) = self.heap.module(module).singleton() {
            return Ok(singleton);
        }
        let superclass = {
            let md = self.heap.module(module);
            match (md.is_class(), md.superclass()) {
                (true, Some(sup)) => self.module_singleton(sup)?,
                (true, None) => self.classes.class,
                (false, _) => self.classes.module,
            }
        };
        let name = self
            .heap
            .module(module)
            .name()
            .map(|owner| format!("#<Class:{}>", owner));
        let singleton = self.alloc_module(
            name,
            ModuleKind::Class {
                superclass: Some(superclass),
                is_singleton: true,
                attached: Some(Value::module(module)),
            },
        );
        self.heap.module_mut(module).singleton = Some(singleton);
        debug!(?module, ?singleton, "module singleton class created");
        Ok(singleton)
    }
}
