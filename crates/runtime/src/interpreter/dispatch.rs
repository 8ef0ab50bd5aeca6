use std::rc::Rc;

use tracing::trace;

use super::{Flow, Interpreter, InterpreterError};
use crate::environment::{Context, Env};
use crate::types::TypeObject;
use crate::values::{FunctionVal, Instance, RuntimeVal};

impl Interpreter {
    /// Resolves `name` on `receiver` without failing.
    ///
    /// Instances look at their own members, then their type's chain, binding
    /// what comes from the type. Type values return their chain's members
    /// unbound and fall back to the members of `type` itself, bound to the
    /// type value. Any other value resolves through its built-in type.
    pub(crate) fn lookup_attribute(&self, receiver: &RuntimeVal, name: &str) -> Option<RuntimeVal> {
        match receiver {
            RuntimeVal::Instance(inst) => {
                if let Some(own) = inst.members.borrow().get(name) {
                    return Some(own.clone());
                }

                inst.class.lookup(name).map(|m| m.bind(receiver))
            }
            RuntimeVal::Type(t) => t
                .lookup_excluding(name, &[self.registry.object.as_ref()])
                .or_else(|| self.registry.type_.lookup(name).map(|m| m.bind(receiver))),
            other => self.registry.type_of(other).lookup(name).map(|m| m.bind(receiver)),
        }
    }

    pub(crate) fn get_attribute(&self, receiver: &RuntimeVal, name: &str) -> Result<RuntimeVal, InterpreterError> {
        self.lookup_attribute(receiver, name).ok_or_else(|| match receiver {
            RuntimeVal::Type(t) => {
                InterpreterError::Attribute(format!("type object '{}' has no attribute '{}'", t.name, name))
            }
            other => InterpreterError::no_attribute(&other.type_name(), name),
        })
    }

    pub(crate) fn set_attribute(&self, receiver: &RuntimeVal, name: &str, value: RuntimeVal) -> Result<(), InterpreterError> {
        match receiver {
            RuntimeVal::Instance(inst) => {
                inst.members.borrow_mut().insert(name.into(), value);
                Ok(())
            }
            RuntimeVal::Type(t) => Err(InterpreterError::Type(format!(
                "cannot set '{}' attribute of immutable type '{}'",
                name, t.name
            ))),
            other => Err(InterpreterError::no_attribute(&other.type_name(), name)),
        }
    }

    pub(crate) fn delete_attribute(&self, receiver: &RuntimeVal, name: &str) -> Result<(), InterpreterError> {
        match receiver {
            RuntimeVal::Instance(inst) => {
                let removed = inst.members.borrow_mut().shift_remove(name);

                removed
                    .map(|_| ())
                    .ok_or_else(|| InterpreterError::no_attribute(&inst.class.name, name))
            }
            RuntimeVal::Type(t) => Err(InterpreterError::Type(format!(
                "cannot delete '{}' attribute of immutable type '{}'",
                name, t.name
            ))),
            other => Err(InterpreterError::no_attribute(&other.type_name(), name)),
        }
    }

    pub(crate) fn call_method(
        &self,
        receiver: &RuntimeVal,
        name: &str,
        args: Vec<RuntimeVal>,
        env: &mut Env,
    ) -> Result<RuntimeVal, InterpreterError> {
        let method = self.get_attribute(receiver, name)?;

        self.call_value(&method, args, env)
    }

    pub(crate) fn call_value(
        &self,
        callee: &RuntimeVal,
        args: Vec<RuntimeVal>,
        env: &mut Env,
    ) -> Result<RuntimeVal, InterpreterError> {
        match callee {
            RuntimeVal::NativeFunction(native) => {
                let args = with_receiver(&native.receiver, args);
                (native.func)(self, env, &args)
            }
            RuntimeVal::Function(func) => self.call_function(func, args, env),
            RuntimeVal::Type(class) => self.instantiate(class, args, env),
            other => Err(InterpreterError::Type(format!(
                "'{}' object is not callable",
                other.type_name()
            ))),
        }
    }

    fn call_function(&self, func: &FunctionVal, args: Vec<RuntimeVal>, env: &mut Env) -> Result<RuntimeVal, InterpreterError> {
        let args = with_receiver(&func.receiver, args);

        if args.len() != func.params.len() {
            return Err(InterpreterError::wrong_arg_number(&func.name, func.params.len(), args.len()));
        }

        trace!(function = %func.name, arity = args.len(), "call");

        let locals = func.params.iter().cloned().zip(args).collect();
        let saved = env.enter(Context::Function(locals));
        let res = self.exec_block(&func.body, env);
        env.leave(saved);

        match res? {
            Flow::Return(value) => Ok(value),
            _ => Ok(RuntimeVal::None),
        }
    }

    fn instantiate(&self, class: &Rc<TypeObject>, args: Vec<RuntimeVal>, env: &mut Env) -> Result<RuntimeVal, InterpreterError> {
        let instance = RuntimeVal::Instance(Rc::new(Instance::new(class.clone())));

        match self.call_method(&instance, "__init__", args, env)? {
            RuntimeVal::None => Ok(instance),
            other => Err(InterpreterError::Type(format!(
                "__init__() should return None, not '{}'",
                other.type_name()
            ))),
        }
    }

    // Special methods are looked up on the type of a type value, never on the
    // type value itself
    fn special_method(&self, value: &RuntimeVal, name: &str) -> Option<RuntimeVal> {
        match value {
            RuntimeVal::Type(_) => self.registry.type_.lookup(name).map(|m| m.bind(value)),
            _ => self.lookup_attribute(value, name),
        }
    }

    pub(crate) fn call_special(
        &self,
        value: &RuntimeVal,
        name: &str,
        args: Vec<RuntimeVal>,
        env: &mut Env,
    ) -> Result<Option<RuntimeVal>, InterpreterError> {
        match self.special_method(value, name) {
            Some(method) => self.call_value(&method, args, env).map(Some),
            None => Ok(None),
        }
    }

    /// `__bool__`, then `__len__` being nonzero, then true.
    pub(crate) fn is_truthy(&self, value: &RuntimeVal, env: &mut Env) -> Result<bool, InterpreterError> {
        match value {
            RuntimeVal::None => return Ok(false),
            RuntimeVal::Bool(b) => return Ok(*b),
            RuntimeVal::Int(nb) => return Ok(*nb != 0),
            RuntimeVal::Float(nb) => return Ok(*nb != 0.0),
            RuntimeVal::Str(s) => return Ok(!s.is_empty()),
            _ => {}
        }

        if let Some(res) = self.call_special(value, "__bool__", vec![], env)? {
            return match res {
                RuntimeVal::Bool(b) => Ok(b),
                other => Err(InterpreterError::Type(format!(
                    "__bool__ should return bool, returned {}",
                    other.type_name()
                ))),
            };
        }

        if let Some(len) = self.call_special(value, "__len__", vec![], env)? {
            return match len.as_int() {
                Some(nb) => Ok(nb != 0),
                None => Err(InterpreterError::Type(format!(
                    "'{}' object cannot be interpreted as an integer",
                    len.type_name()
                ))),
            };
        }

        Ok(true)
    }

    /// Display string, through `__str__`.
    pub(crate) fn str_of(&self, value: &RuntimeVal, env: &mut Env) -> Result<String, InterpreterError> {
        if let RuntimeVal::Str(s) = value {
            return Ok(s.to_string());
        }

        self.text_of(value, "__str__", env)
    }

    pub(crate) fn repr_of(&self, value: &RuntimeVal, env: &mut Env) -> Result<String, InterpreterError> {
        self.text_of(value, "__repr__", env)
    }

    fn text_of(&self, value: &RuntimeVal, method: &str, env: &mut Env) -> Result<String, InterpreterError> {
        let res = self
            .call_special(value, method, vec![], env)?
            .ok_or_else(|| InterpreterError::no_attribute(&value.type_name(), method))?;

        match res {
            RuntimeVal::Str(s) => Ok(s.to_string()),
            other => Err(InterpreterError::Type(format!(
                "{}() returned non-string (type {})",
                method,
                other.type_name()
            ))),
        }
    }

    pub(crate) fn equals(&self, lhs: &RuntimeVal, rhs: &RuntimeVal, env: &mut Env) -> Result<bool, InterpreterError> {
        match self.call_special(lhs, "__eq__", vec![rhs.clone()], env)? {
            Some(res) => self.is_truthy(&res, env),
            None => Ok(lhs.is_same(rhs)),
        }
    }

    pub(crate) fn less_than(&self, lhs: &RuntimeVal, rhs: &RuntimeVal, env: &mut Env) -> Result<bool, InterpreterError> {
        match self.call_special(lhs, "__lt__", vec![rhs.clone()], env)? {
            Some(res) => self.is_truthy(&res, env),
            None => Err(InterpreterError::Type(format!(
                "'<' not supported between instances of '{}' and '{}'",
                lhs.type_name(),
                rhs.type_name()
            ))),
        }
    }

    /// Snapshot of the elements a `for` loop visits.
    pub(crate) fn iterate(&self, value: &RuntimeVal) -> Result<Vec<RuntimeVal>, InterpreterError> {
        match value {
            RuntimeVal::List(list) => Ok(list.borrow().clone()),
            RuntimeVal::Str(s) => Ok(s.chars().map(|c| RuntimeVal::new_str(&c.to_string())).collect()),
            RuntimeVal::Dict(dict) => Ok(dict.borrow().keys().map(|k| k.value().clone()).collect()),
            RuntimeVal::Set(set) => Ok(set.borrow().iter().map(|k| k.value().clone()).collect()),
            other => Err(InterpreterError::Type(format!(
                "'{}' object is not iterable",
                other.type_name()
            ))),
        }
    }
}

fn with_receiver(receiver: &Option<RuntimeVal>, args: Vec<RuntimeVal>) -> Vec<RuntimeVal> {
    match receiver {
        Some(r) => {
            let mut full = Vec::with_capacity(args.len() + 1);
            full.push(r.clone());
            full.extend(args);
            full
        }
        None => args,
    }
}
