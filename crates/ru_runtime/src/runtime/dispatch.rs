//! Minimal method dispatch over the registry.

use ru_core::{ObjectId, Symbol, Value};

use crate::core::{MethodBody, MethodRef};
use crate::errors::RuntimeError;

use super::Runtime;

impl Runtime {
    /// Call `name` on `recv` through `class_of(recv)`.
    pub fn send(&mut self, recv: Value, name: Symbol, args: &[Value]) -> Result<Value, RuntimeError> {
        let class = self.class_of(recv);
        match self.find_method(class, name) {
            Some(method) => self.invoke(&method, recv, args),
            None => Err(self.no_method(recv, name)),
        }
    }

    /// Call the next definition of `name` above `owner` in the ancestry.
    pub fn send_super(
        &mut self,
        owner: ObjectId,
        recv: Value,
        name: Symbol,
        args: &[Value],
    ) -> Result<Value, RuntimeError> {
        match self.find_method_super(owner, name) {
            Some(method) => self.invoke(&method, recv, args),
            None => Err(self.no_method(recv, name)),
        }
    }

    pub fn invoke(&mut self, method: &MethodRef, recv: Value, args: &[Value]) -> Result<Value, RuntimeError> {
        match &method.body {
            MethodBody::Native(f) => {
                let f = f.clone();
                f(self, recv, args)
            }
            MethodBody::AttrReader(ivar) => {
                expect_args(args, 0)?;
                Ok(self.get_attribute(recv, *ivar).unwrap_or(Value::NIL))
            }
            MethodBody::AttrWriter(ivar) => {
                expect_args(args, 1)?;
                self.set_attribute(recv, *ivar, args[0])?;
                Ok(args[0])
            }
            MethodBody::Undefined => Err(self.no_method(recv, method.name)),
        }
    }

    fn no_method(&self, recv: Value, name: Symbol) -> RuntimeError {
        RuntimeError::NoMethod {
            name: self.symbol_name(name).to_string(),
            class: self.module_name(self.nonsingleton_class_of(recv)),
        }
    }
}

fn expect_args(args: &[Value], expected: usize) -> Result<(), RuntimeError> {
    if args.len() != expected {
        return Err(RuntimeError::ArgumentCount {
            given: args.len(),
            expected,
        });
    }
    Ok(())
}
