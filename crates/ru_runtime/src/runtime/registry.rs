//! Module/class registry: definition, inclusion, and method and constant
//! resolution across the ancestor chain.

use std::rc::Rc;

use ru_core::value::{FastHashSet, fast_set_new};
use ru_core::{ObjectId, Symbol, Value};
use tracing::debug;

use crate::core::{ManagedObject, Method, MethodBody, MethodRef, ModuleKind, RModule};
use crate::errors::RuntimeError;

use super::Runtime;

fn valid_const_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_uppercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || !c.is_ascii())
}

impl Runtime {
    pub(crate) fn alloc_module(&mut self, name: Option<String>, kind: ModuleKind) -> ObjectId {
        let id = self
            .heap
            .alloc(ManagedObject::Module(Box::new(RModule::new(name, kind))));
        if let ModuleKind::Class {
            superclass: Some(sup),
            ..
        } = kind
        {
            self.heap.module_mut(sup).descendants.push(id);
        }
        debug!(?id, ?kind, "module allocated");
        id
    }

    /// Anonymous or explicitly named module, not bound to any constant.
    pub fn new_module(&mut self, name: Option<&str>) -> ObjectId {
        self.alloc_module(name.map(str::to_string), ModuleKind::Module)
    }

    /// Class not bound to any constant. `superclass = None` makes a root class.
    pub fn new_class(&mut self, name: Option<&str>, superclass: Option<ObjectId>) -> ObjectId {
        self.alloc_module(
            name.map(str::to_string),
            ModuleKind::Class {
                superclass,
                is_singleton: false,
                attached: None,
            },
        )
    }

    fn qualified_name(&self, scope: ObjectId, name: &str) -> String {
        if scope == self.classes.object {
            name.to_string()
        } else {
            format!("{}::{}", self.module_name(scope), name)
        }
    }

    /// `module Name` at top level: reopens an existing module or creates one.
    pub fn define_module(&mut self, name: &str) -> Result<ObjectId, RuntimeError> {
        self.define_module_under(self.classes.object, name)
    }

    pub fn define_module_under(&mut self, scope: ObjectId, name: &str) -> Result<ObjectId, RuntimeError> {
        let sym = self.intern(name);
        if let Some(existing) = self.heap.module(scope).local_const(sym) {
            if existing.is_module() && !self.heap.module(existing.as_obj_id()).is_class() {
                return Ok(existing.as_obj_id());
            }
            return Err(RuntimeError::WrongKind {
                name: name.to_string(),
                expected: "module",
            });
        }
        let id = self.new_module(None);
        self.set_const(scope, sym, Value::module(id))?;
        Ok(id)
    }

    /// `class Name < superclass` at top level. `None` means `Object` for a new
    /// class and "don't check" when reopening.
    pub fn define_class(&mut self, name: &str, superclass: Option<ObjectId>) -> Result<ObjectId, RuntimeError> {
        self.define_class_under(self.classes.object, name, superclass)
    }

    pub fn define_class_under(
        &mut self,
        scope: ObjectId,
        name: &str,
        superclass: Option<ObjectId>,
    ) -> Result<ObjectId, RuntimeError> {
        let sym = self.intern(name);
        if let Some(existing) = self.heap.module(scope).local_const(sym) {
            if !existing.is_module() || !self.heap.module(existing.as_obj_id()).is_class() {
                return Err(RuntimeError::WrongKind {
                    name: name.to_string(),
                    expected: "class",
                });
            }
            let id = existing.as_obj_id();
            if let Some(sup) = superclass {
                if self.heap.module(id).superclass() != Some(sup) {
                    return Err(RuntimeError::SuperclassMismatch(name.to_string()));
                }
            }
            return Ok(id);
        }
        let superclass = superclass.unwrap_or(self.classes.object);
        if !self.heap.module(superclass).is_class() {
            return Err(RuntimeError::WrongArgumentType {
                given: self.module_name(superclass),
                expected: "Class",
            });
        }
        let id = self.new_class(None, Some(superclass));
        self.set_const(scope, sym, Value::module(id))?;
        Ok(id)
    }

    /// `[self] + included_modules`, followed by the superclass's ancestors
    /// for classes. Included modules' own includes are not flattened in.
    pub fn ancestors(&self, module: ObjectId) -> Vec<ObjectId> {
        let mut out = Vec::new();
        let mut cur = Some(module);
        while let Some(id) = cur {
            let md = self.heap.module(id);
            out.push(id);
            out.extend_from_slice(&md.included_modules);
            cur = md.superclass();
        }
        out
    }

    /// Every module reachable through includes and superclasses, each once,
    /// in lookup order.
    pub fn all_ancestors(&self, module: ObjectId) -> Vec<ObjectId> {
        let mut out = Vec::new();
        let mut seen = fast_set_new();
        self.collect_ancestors(module, &mut out, &mut seen);
        out
    }

    fn collect_ancestors(&self, module: ObjectId, out: &mut Vec<ObjectId>, seen: &mut FastHashSet<ObjectId>) {
        if !seen.insert(module) {
            return;
        }
        out.push(module);
        let md = self.heap.module(module);
        for &inc in &md.included_modules {
            self.collect_ancestors(inc, out, seen);
        }
        if let Some(sup) = md.superclass() {
            self.collect_ancestors(sup, out, seen);
        }
    }

    /// Whether `module` is `class` or appears anywhere in its ancestry.
    pub fn is_ancestor_of(&self, module: ObjectId, class: ObjectId) -> bool {
        self.all_ancestors(class).contains(&module)
    }

    /// Prepend `included` to `module`'s included modules. Returns `false`
    /// (and changes nothing) when it is already an ancestor.
    pub fn include_module(&mut self, module: ObjectId, included: ObjectId) -> Result<bool, RuntimeError> {
        if !self.heap.is_module(included) || self.heap.module(included).is_class() {
            let given = if self.heap.is_module(included) {
                Value::module(included)
            } else {
                Value::object(included)
            };
            return Err(RuntimeError::WrongArgumentType {
                given: self.module_name(self.nonsingleton_class_of(given)),
                expected: "Module",
            });
        }
        if self.all_ancestors(module).contains(&included) {
            return Ok(false);
        }
        if self.all_ancestors(included).contains(&module) {
            return Err(RuntimeError::CyclicInclude);
        }
        let md = self.heap.module_mut(module);
        md.included_modules.insert(0, included);
        md.mutated();
        self.heap.module_mut(included).descendants.push(module);
        debug!(?module, ?included, "module included");
        Ok(true)
    }

    /// Include `module` into the singleton class of `target`.
    pub fn extend_object(&mut self, target: Value, module: ObjectId) -> Result<bool, RuntimeError> {
        let singleton = self.singleton_class(target)?;
        debug!(?target, ?module, "extending object");
        self.include_module(singleton, module)
    }

    // Resolution including `Undefined` placeholders, which the public
    // lookups turn into misses.
    fn lookup_method(&self, module: ObjectId, name: Symbol) -> Option<MethodRef> {
        let md = self.heap.module(module);
        if let Some(method) = md.methods.get(&name) {
            return Some(method.clone());
        }
        self.lookup_method_super(module, name)
    }

    fn lookup_method_super(&self, module: ObjectId, name: Symbol) -> Option<MethodRef> {
        let md = self.heap.module(module);
        for &inc in &md.included_modules {
            if let Some(method) = self.lookup_method(inc, name) {
                return Some(method);
            }
        }
        md.superclass().and_then(|sup| self.lookup_method(sup, name))
    }

    /// Own table, then included modules (most recent first, each resolved
    /// recursively), then the superclass.
    pub fn find_method(&self, module: ObjectId, name: Symbol) -> Option<MethodRef> {
        self.lookup_method(module, name)
            .filter(|m| !matches!(m.body, MethodBody::Undefined))
    }

    /// Like `find_method` but skips the module's own table.
    pub fn find_method_super(&self, module: ObjectId, name: Symbol) -> Option<MethodRef> {
        self.lookup_method_super(module, name)
            .filter(|m| !matches!(m.body, MethodBody::Undefined))
    }

    pub fn define_method(&mut self, module: ObjectId, name: Symbol, body: MethodBody) -> MethodRef {
        let method = Rc::new(Method {
            name,
            owner: module,
            body,
        });
        let md = self.heap.module_mut(module);
        md.methods.insert(name, method.clone());
        md.mutated();
        method
    }

    /// Define a method backed by a Rust closure.
    pub fn define_native<F>(&mut self, module: ObjectId, name: &str, f: F) -> MethodRef
    where
        F: Fn(&mut Runtime, Value, &[Value]) -> Result<Value, RuntimeError> + 'static,
    {
        let sym = self.intern(name);
        self.define_method(module, sym, MethodBody::Native(Rc::new(f)))
    }

    /// Hide `name` from lookup on `module` and everything below it.
    pub fn undef_method(&mut self, module: ObjectId, name: Symbol) -> Result<(), RuntimeError> {
        if self.find_method(module, name).is_none() {
            return Err(RuntimeError::UndefinedMethod {
                name: self.symbol_name(name).to_string(),
                module: self.module_name(module),
            });
        }
        self.define_method(module, name, MethodBody::Undefined);
        Ok(())
    }

    /// Drop `module`'s own definition so lookup falls through to ancestors.
    pub fn remove_method(&mut self, module: ObjectId, name: Symbol) -> Result<(), RuntimeError> {
        let removable = matches!(
            self.heap.module(module).methods.get(&name),
            Some(m) if !matches!(m.body, MethodBody::Undefined)
        );
        if !removable {
            return Err(RuntimeError::MethodNotDefined {
                name: self.symbol_name(name).to_string(),
                module: self.module_name(module),
            });
        }
        let md = self.heap.module_mut(module);
        md.methods.shift_remove(&name);
        md.mutated();
        Ok(())
    }

    pub fn alias_method(&mut self, module: ObjectId, new_name: Symbol, old_name: Symbol) -> Result<(), RuntimeError> {
        let Some(old) = self.find_method(module, old_name) else {
            return Err(RuntimeError::UndefinedMethod {
                name: self.symbol_name(old_name).to_string(),
                module: self.module_name(module),
            });
        };
        self.define_method(module, new_name, old.body.clone());
        Ok(())
    }

    pub fn method_defined(&self, module: ObjectId, name: Symbol) -> bool {
        self.find_method(module, name).is_some()
    }

    /// Names callable on instances of `module`, in definition order of the
    /// module that provides them.
    pub fn instance_methods(&self, module: ObjectId, inherit: bool) -> Vec<Symbol> {
        let sources = if inherit {
            self.all_ancestors(module)
        } else {
            vec![module]
        };
        let mut seen = fast_set_new();
        let mut out = Vec::new();
        for src in sources {
            for &name in self.heap.module(src).methods.keys() {
                if seen.insert(name) && self.find_method(module, name).is_some() {
                    out.push(name);
                }
            }
        }
        out
    }

    /// Define `name` (reader) for each `@name` instance variable.
    pub fn attr_reader(&mut self, module: ObjectId, names: &[&str]) {
        for name in names {
            let ivar = self.intern(&format!("@{name}"));
            let sym = self.intern(name);
            self.define_method(module, sym, MethodBody::AttrReader(ivar));
        }
    }

    /// Define `name=` (writer) for each `@name` instance variable.
    pub fn attr_writer(&mut self, module: ObjectId, names: &[&str]) {
        for name in names {
            let ivar = self.intern(&format!("@{name}"));
            let sym = self.intern(&format!("{name}="));
            self.define_method(module, sym, MethodBody::AttrWriter(ivar));
        }
    }

    pub fn attr_accessor(&mut self, module: ObjectId, names: &[&str]) {
        self.attr_reader(module, names);
        self.attr_writer(module, names);
    }

    /// Bind a constant. An anonymous module assigned to a constant takes
    /// the constant's qualified name.
    pub fn set_const(&mut self, module: ObjectId, name: Symbol, value: Value) -> Result<(), RuntimeError> {
        let text = self.symbol_name(name).to_string();
        if !valid_const_name(&text) {
            return Err(RuntimeError::WrongConstName(text));
        }
        if value.is_module() && self.heap.module(value.as_obj_id()).name.is_none() {
            let full = self.qualified_name(module, &text);
            self.heap.module_mut(value.as_obj_id()).name = Some(full);
        }
        let md = self.heap.module_mut(module);
        md.constants.insert(name, value);
        md.mutated();
        Ok(())
    }

    pub fn find_local_const(&self, module: ObjectId, name: Symbol) -> Option<Value> {
        self.heap.module(module).local_const(name)
    }

    /// Own constants, then each included module's own constants. An
    /// included module's includes are not consulted.
    pub fn find_included_const(&self, module: ObjectId, name: Symbol) -> Option<Value> {
        let md = self.heap.module(module);
        md.local_const(name).or_else(|| {
            md.included_modules
                .iter()
                .find_map(|&inc| self.heap.module(inc).local_const(name))
        })
    }

    /// Full constant lookup: included constants along the superclass chain,
    /// then `Object` for plain modules.
    pub fn find_const(&self, module: ObjectId, name: Symbol) -> Option<Value> {
        let mut cur = Some(module);
        while let Some(id) = cur {
            if let Some(v) = self.find_included_const(id, name) {
                return Some(v);
            }
            cur = self.heap.module(id).superclass();
        }
        if self.heap.module(module).is_class() {
            None
        } else {
            self.find_const(self.classes.object, name)
        }
    }

    pub fn const_defined(&self, module: ObjectId, name: Symbol, inherit: bool) -> bool {
        if inherit {
            self.find_const(module, name).is_some()
        } else {
            self.find_local_const(module, name).is_some()
        }
    }

    pub fn remove_const(&mut self, module: ObjectId, name: Symbol) -> Result<Value, RuntimeError> {
        if self.find_local_const(module, name).is_none() {
            return Err(RuntimeError::ConstNotDefined {
                name: self.symbol_name(name).to_string(),
                module: self.module_name(module),
            });
        }
        let md = self.heap.module_mut(module);
        let removed = md.constants.shift_remove(&name).unwrap_or_default();
        md.mutated();
        Ok(removed)
    }

    /// Constant names visible from `module`: its own, then those of its
    /// ancestors, stopping short of `Object` unless asked about `Object`.
    pub fn constants(&self, module: ObjectId) -> Vec<Symbol> {
        let mut seen = fast_set_new();
        let mut out = Vec::new();
        for anc in self.all_ancestors(module) {
            if anc != module && (anc == self.classes.object || anc == self.classes.basic_object) {
                continue;
            }
            for &name in self.heap.module(anc).constants.keys() {
                if seen.insert(name) {
                    out.push(name);
                }
            }
        }
        out
    }
}
