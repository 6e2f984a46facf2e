use ru_core::{ObjectId, Symbol, SymbolTable, Value};
use tracing::debug;

use crate::core::{CellDict, Heap, HeapStats, ModuleKind, RModule, RObject, ShapeTree};

use super::config::RuntimeConfig;

/// Classes and modules created by the bootstrap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WellKnownClasses {
    pub basic_object: ObjectId,
    pub object: ObjectId,
    pub module: ObjectId,
    pub class: ObjectId,
    pub kernel: ObjectId,
    pub nil_class: ObjectId,
    pub true_class: ObjectId,
    pub false_class: ObjectId,
    pub integer: ObjectId,
    pub float: ObjectId,
    pub symbol: ObjectId,
}

pub struct Runtime {
    pub(crate) config: RuntimeConfig,
    pub(crate) heap: Heap,
    pub(crate) shapes: ShapeTree,
    pub(crate) symbols: SymbolTable,
    pub(crate) globals: CellDict,
    pub(crate) classes: WellKnownClasses,
    pub(crate) sym_frozen: Symbol,
}

impl Runtime {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        let mut symbols = SymbolTable::new();
        let sym_frozen = symbols.intern("frozen?");
        let placeholder = ObjectId(usize::MAX);
        let mut rt = Self {
            config,
            heap: Heap::new(),
            shapes: ShapeTree::new(),
            symbols,
            globals: CellDict::new(),
            classes: WellKnownClasses {
                basic_object: placeholder,
                object: placeholder,
                module: placeholder,
                class: placeholder,
                kernel: placeholder,
                nil_class: placeholder,
                true_class: placeholder,
                false_class: placeholder,
                integer: placeholder,
                float: placeholder,
                symbol: placeholder,
            },
            sym_frozen,
        };
        rt.bootstrap();
        rt
    }

    fn bootstrap(&mut self) {
        let class = |superclass: Option<ObjectId>| ModuleKind::Class {
            superclass,
            is_singleton: false,
            attached: None,
        };
        let basic_object = self.alloc_module(Some("BasicObject".into()), class(None));
        let object = self.alloc_module(Some("Object".into()), class(Some(basic_object)));
        let module = self.alloc_module(Some("Module".into()), class(Some(object)));
        let class_class = self.alloc_module(Some("Class".into()), class(Some(module)));
        let kernel = self.alloc_module(Some("Kernel".into()), ModuleKind::Module);
        let leaf = |rt: &mut Self, name: &str| rt.alloc_module(Some(name.into()), class(Some(object)));
        let nil_class = leaf(self, "NilClass");
        let true_class = leaf(self, "TrueClass");
        let false_class = leaf(self, "FalseClass");
        let integer = leaf(self, "Integer");
        let float = leaf(self, "Float");
        let symbol = leaf(self, "Symbol");

        self.classes = WellKnownClasses {
            basic_object,
            object,
            module,
            class: class_class,
            kernel,
            nil_class,
            true_class,
            false_class,
            integer,
            float,
            symbol,
        };

        for id in [
            basic_object,
            object,
            module,
            class_class,
            kernel,
            nil_class,
            true_class,
            false_class,
            integer,
            float,
            symbol,
        ] {
            let name = self.module_name(id);
            let sym = self.symbols.intern(&name);
            let md = self.heap.module_mut(object);
            md.constants.insert(sym, Value::module(id));
            md.mutated();
        }

        // Kernel can't be cyclic or already present at this point.
        let md = self.heap.module_mut(object);
        md.included_modules.insert(0, kernel);
        md.mutated();
        self.heap.module_mut(kernel).descendants.push(object);
        debug!(modules = self.heap.len(), "runtime bootstrapped");
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn classes(&self) -> &WellKnownClasses {
        &self.classes
    }

    pub fn shapes(&self) -> &ShapeTree {
        &self.shapes
    }

    pub fn heap_stats(&self) -> HeapStats {
        self.heap.stats()
    }

    pub fn intern(&mut self, name: &str) -> Symbol {
        self.symbols.intern(name)
    }

    /// Symbol for `name` if it has been interned before.
    pub fn lookup_symbol(&self, name: &str) -> Option<Symbol> {
        self.symbols.lookup(name)
    }

    pub fn symbol_name(&self, sym: Symbol) -> &str {
        self.symbols.name(sym)
    }

    pub fn module(&self, id: ObjectId) -> &RModule {
        self.heap.module(id)
    }

    pub fn object(&self, id: ObjectId) -> &RObject {
        self.heap.object(id)
    }

    /// Display name of a module, or an address-style placeholder for
    /// anonymous ones.
    pub fn module_name(&self, id: ObjectId) -> String {
        let md = self.heap.module(id);
        match md.name() {
            Some(name) => name.to_string(),
            None if md.is_class() => format!("#<Class:0x{:x}>", id.0),
            None => format!("#<Module:0x{:x}>", id.0),
        }
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}
