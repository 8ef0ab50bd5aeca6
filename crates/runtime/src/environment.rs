use std::collections::HashMap;
use std::mem;
use std::rc::Rc;

use indexmap::IndexMap;
use thiserror::Error;

use crate::interpreter::InterpreterError;
use crate::native_functions::{self, self_hosted};
use crate::types::{Registry, TypeObject};
use crate::values::{HashKey, MemberMap, RuntimeVal};


#[derive(Error, Debug, PartialEq)]
pub enum EnvError {
    #[error("name '{0}' is not defined")]
    UndeclaredVar(String),
}

impl From<EnvError> for InterpreterError {
    fn from(value: EnvError) -> Self {
        InterpreterError::Name(value.to_string())
    }
}

/// The innermost scope names are read from and written to.
pub enum Context {
    Module,
    Function(MemberMap),
    // Writes go straight into the type being defined
    Class(Rc<TypeObject>),
}

/// Context and loop nesting to put back once a body has run.
pub struct SavedContext {
    context: Context,
    loop_depth: usize,
}

/// Everything owned by one `interpret` call.
pub struct Env {
    globals: MemberMap,
    builtins: HashMap<String, RuntimeVal>,
    context: Context,
    pub(crate) loop_depth: usize,
    output: String,
}

pub fn create_global_env(registry: &Registry) -> Env {
    let mut builtins = HashMap::new();

    for (name, value) in native_functions::natives() {
        builtins.insert(name.to_string(), value);
    }
    for (name, value) in self_hosted::definitions() {
        builtins.insert(name.to_string(), value);
    }

    // So classes can name it as a base
    builtins.insert("object".into(), RuntimeVal::Type(registry.object.clone()));

    Env::new(builtins)
}

impl Env {
    pub fn new(builtins: HashMap<String, RuntimeVal>) -> Self {
        Self {
            globals: IndexMap::new(),
            builtins,
            context: Context::Module,
            loop_depth: 0,
            output: String::new(),
        }
    }

    /// Active context first, then module globals, then builtins.
    pub fn lookup_var(&self, name: &str) -> Result<RuntimeVal, EnvError> {
        let local = match &self.context {
            Context::Module => None,
            Context::Function(locals) => locals.get(name).cloned(),
            Context::Class(class) => class.members.borrow().get(name).cloned(),
        };

        local
            .or_else(|| self.globals.get(name).cloned())
            .or_else(|| self.builtins.get(name).cloned())
            .ok_or_else(|| EnvError::UndeclaredVar(name.into()))
    }

    pub fn assign_var(&mut self, name: &str, value: RuntimeVal) {
        match &mut self.context {
            Context::Module => {
                self.globals.insert(name.into(), value);
            }
            Context::Function(locals) => {
                locals.insert(name.into(), value);
            }
            Context::Class(class) => {
                class.members.borrow_mut().insert(name.into(), value);
            }
        }
    }

    pub fn delete_var(&mut self, name: &str) -> Result<(), EnvError> {
        let removed = match &mut self.context {
            Context::Module => self.globals.shift_remove(name),
            Context::Function(locals) => locals.shift_remove(name),
            Context::Class(class) => class.members.borrow_mut().shift_remove(name),
        };

        removed
            .map(|_| ())
            .ok_or_else(|| EnvError::UndeclaredVar(name.into()))
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Makes `context` the active one. Loops of the caller do not extend into
    /// the new body.
    pub fn enter(&mut self, context: Context) -> SavedContext {
        SavedContext {
            context: mem::replace(&mut self.context, context),
            loop_depth: mem::replace(&mut self.loop_depth, 0),
        }
    }

    pub fn leave(&mut self, saved: SavedContext) {
        self.context = saved.context;
        self.loop_depth = saved.loop_depth;
    }

    pub fn in_function(&self) -> bool {
        matches!(self.context, Context::Function(_))
    }

    pub fn in_module(&self) -> bool {
        matches!(self.context, Context::Module)
    }

    /// Copy of the module bindings as a dict.
    pub fn globals_snapshot(&self) -> Result<RuntimeVal, InterpreterError> {
        snapshot(&self.globals)
    }

    /// Copy of the active context's bindings as a dict.
    pub fn locals_snapshot(&self) -> Result<RuntimeVal, InterpreterError> {
        match &self.context {
            Context::Module => snapshot(&self.globals),
            Context::Function(locals) => snapshot(locals),
            Context::Class(class) => snapshot(&class.members.borrow()),
        }
    }

    pub fn write_output(&mut self, text: &str) {
        self.output.push_str(text);
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn take_output(&mut self) -> String {
        mem::take(&mut self.output)
    }
}

fn snapshot(bindings: &MemberMap) -> Result<RuntimeVal, InterpreterError> {
    let mut entries = IndexMap::new();

    for (name, value) in bindings {
        entries.insert(HashKey::new(RuntimeVal::new_str(name))?, value.clone());
    }

    Ok(RuntimeVal::new_dict(entries))
}
