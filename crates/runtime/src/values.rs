use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};

mod dict;
mod hash_key;
mod list;
pub(crate) mod numeric;
mod object;
mod set;
mod string;

pub use hash_key::HashKey;
use frontend::ast::Block;

use crate::environment::Env;
use crate::interpreter::{Interpreter, InterpreterError};
use crate::types::TypeObject;

pub(crate) use dict::members as dict_members;
pub(crate) use list::members as list_members;
pub(crate) use numeric::{
    bool_members, float_members, int_members, members as numeric_members,
};
pub(crate) use object::{
    members as object_members, none_members, type_members,
};
pub(crate) use set::members as set_members;
pub(crate) use string::members as str_members;

pub(crate) fn method<F>(name: &'static str, func: F) -> (&'static str, NativeFn)
where
    F: Fn(&Interpreter, &mut Env, &[RuntimeVal]) -> Result<RuntimeVal, InterpreterError> + 'static,
{
    (name, Rc::new(func))
}

/// Native operation. The receiver, when there is one, is the first argument.
pub type NativeFn = Rc<dyn Fn(&Interpreter, &mut Env, &[RuntimeVal]) -> Result<RuntimeVal, InterpreterError>>;

pub type MemberMap = IndexMap<String, RuntimeVal>;
pub type ListRef = Rc<RefCell<Vec<RuntimeVal>>>;
pub type DictRef = Rc<RefCell<IndexMap<HashKey, RuntimeVal>>>;
pub type SetRef = Rc<RefCell<IndexSet<HashKey>>>;

// Containers, instances and types are shared by reference: mutation through
// one alias is visible through all of them. Scalars are plain values.
#[derive(Clone)]
pub enum RuntimeVal {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    List(ListRef),
    Dict(DictRef),
    Set(SetRef),
    Function(Rc<FunctionVal>),
    NativeFunction(Rc<NativeFunction>),
    Instance(Rc<Instance>),
    Type(Rc<TypeObject>),
}

/// Self-hosted function: a statement body run by the evaluator.
#[derive(Clone)]
pub struct FunctionVal {
    pub name: String,
    pub params: Rc<[String]>,
    pub body: Rc<Block>,
    // Set on method values obtained through attribute access
    pub receiver: Option<RuntimeVal>,
}

#[derive(Clone)]
pub struct NativeFunction {
    pub name: String,
    pub func: NativeFn,
    pub receiver: Option<RuntimeVal>,
}

pub struct Instance {
    pub class: Rc<TypeObject>,
    pub members: RefCell<MemberMap>,
}

impl Instance {
    pub fn new(class: Rc<TypeObject>) -> Self {
        Self {
            class,
            members: RefCell::new(IndexMap::new()),
        }
    }
}

impl Debug for RuntimeVal {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RuntimeVal::None => write!(f, "None"),
            RuntimeVal::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            RuntimeVal::Int(nb) => write!(f, "{}", nb),
            RuntimeVal::Float(nb) => write!(f, "{}", numeric::format_float(*nb)),
            RuntimeVal::Str(s) => write!(f, "{:?}", s),
            RuntimeVal::List(list) => f.debug_list().entries(list.borrow().iter()).finish(),
            RuntimeVal::Dict(dict) => f
                .debug_map()
                .entries(dict.borrow().iter().map(|(k, v)| (k.value().clone(), v.clone())))
                .finish(),
            RuntimeVal::Set(set) => f.debug_set().entries(set.borrow().iter().map(|k| k.value().clone())).finish(),
            RuntimeVal::Function(func) => write!(f, "<function {}>", func.name),
            RuntimeVal::NativeFunction(func) => write!(f, "<built-in function {}>", func.name),
            RuntimeVal::Instance(inst) => write!(f, "<{} object>", inst.class.name),
            RuntimeVal::Type(t) => write!(f, "<class '{}'>", t.name),
        }
    }
}

// Structural equality, used by tests and host code. Language-level `==` goes
// through `__eq__`.
impl PartialEq for RuntimeVal {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RuntimeVal::List(a), RuntimeVal::List(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (RuntimeVal::Dict(a), RuntimeVal::Dict(b)) => {
                Rc::ptr_eq(a, b) || {
                    let (a, b) = (a.borrow(), b.borrow());
                    a.len() == b.len() && a.iter().all(|(k, v)| b.get(k) == Some(v))
                }
            }
            (RuntimeVal::Set(a), RuntimeVal::Set(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            _ => self.is_same(other),
        }
    }
}

impl RuntimeVal {
    pub fn new_str(value: &str) -> Self {
        RuntimeVal::Str(Rc::from(value))
    }

    pub fn new_list(values: Vec<RuntimeVal>) -> Self {
        RuntimeVal::List(Rc::new(RefCell::new(values)))
    }

    pub fn new_dict(entries: IndexMap<HashKey, RuntimeVal>) -> Self {
        RuntimeVal::Dict(Rc::new(RefCell::new(entries)))
    }

    pub fn new_set(keys: IndexSet<HashKey>) -> Self {
        RuntimeVal::Set(Rc::new(RefCell::new(keys)))
    }

    pub fn new_native<F>(name: &str, func: F) -> Self
    where
        F: Fn(&Interpreter, &mut Env, &[RuntimeVal]) -> Result<RuntimeVal, InterpreterError> + 'static,
    {
        RuntimeVal::NativeFunction(Rc::new(NativeFunction {
            name: name.into(),
            func: Rc::new(func),
            receiver: None,
        }))
    }

    pub fn new_function(name: &str, params: &[&str], body: Block) -> Self {
        RuntimeVal::Function(Rc::new(FunctionVal {
            name: name.into(),
            params: params.iter().map(|p| p.to_string()).collect(),
            body: Rc::new(body),
            receiver: None,
        }))
    }

    pub fn type_name(&self) -> String {
        match self {
            RuntimeVal::None => "NoneType".into(),
            RuntimeVal::Bool(_) => "bool".into(),
            RuntimeVal::Int(_) => "int".into(),
            RuntimeVal::Float(_) => "float".into(),
            RuntimeVal::Str(_) => "str".into(),
            RuntimeVal::List(_) => "list".into(),
            RuntimeVal::Dict(_) => "dict".into(),
            RuntimeVal::Set(_) => "set".into(),
            RuntimeVal::Function(_) => "function".into(),
            RuntimeVal::NativeFunction(_) => "builtin_function_or_method".into(),
            RuntimeVal::Instance(inst) => inst.class.name.clone(),
            RuntimeVal::Type(_) => "type".into(),
        }
    }

    /// The `is` operator. None, True and False are singletons; other scalars
    /// are identical when their primitive values are; everything else compares
    /// by reference.
    pub fn is_same(&self, other: &RuntimeVal) -> bool {
        match (self, other) {
            (RuntimeVal::None, RuntimeVal::None) => true,
            (RuntimeVal::Bool(a), RuntimeVal::Bool(b)) => a == b,
            (RuntimeVal::Int(a), RuntimeVal::Int(b)) => a == b,
            (RuntimeVal::Float(a), RuntimeVal::Float(b)) => a == b,
            (RuntimeVal::Str(a), RuntimeVal::Str(b)) => a == b,
            (RuntimeVal::List(a), RuntimeVal::List(b)) => Rc::ptr_eq(a, b),
            (RuntimeVal::Dict(a), RuntimeVal::Dict(b)) => Rc::ptr_eq(a, b),
            (RuntimeVal::Set(a), RuntimeVal::Set(b)) => Rc::ptr_eq(a, b),
            (RuntimeVal::Function(a), RuntimeVal::Function(b)) => Rc::ptr_eq(a, b),
            (RuntimeVal::NativeFunction(a), RuntimeVal::NativeFunction(b)) => Rc::ptr_eq(a, b),
            (RuntimeVal::Instance(a), RuntimeVal::Instance(b)) => Rc::ptr_eq(a, b),
            (RuntimeVal::Type(a), RuntimeVal::Type(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    // Immutable scalars: in-place operators rebind them instead of mutating
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            RuntimeVal::None | RuntimeVal::Bool(_) | RuntimeVal::Int(_) | RuntimeVal::Float(_) | RuntimeVal::Str(_)
        )
    }

    /// Integer value of an `int` or `bool`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            RuntimeVal::Int(nb) => Some(*nb),
            RuntimeVal::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Binds a member found on a type to `receiver`. Every bind produces an
    /// independent copy of the function descriptor; plain attributes and
    /// already bound methods are returned untouched.
    pub fn bind(&self, receiver: &RuntimeVal) -> RuntimeVal {
        match self {
            RuntimeVal::Function(func) if func.receiver.is_none() => RuntimeVal::Function(Rc::new(FunctionVal {
                receiver: Some(receiver.clone()),
                ..FunctionVal::clone(func)
            })),
            RuntimeVal::NativeFunction(func) if func.receiver.is_none() => {
                RuntimeVal::NativeFunction(Rc::new(NativeFunction {
                    receiver: Some(receiver.clone()),
                    ..NativeFunction::clone(func)
                }))
            }
            _ => self.clone(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_of_scalars_is_by_value() {
        assert!(RuntimeVal::None.is_same(&RuntimeVal::None));
        assert!(RuntimeVal::Int(257).is_same(&RuntimeVal::Int(257)));
        assert!(RuntimeVal::new_str("pen").is_same(&RuntimeVal::new_str("pen")));
        assert!(!RuntimeVal::Int(1).is_same(&RuntimeVal::Bool(true)));
        assert!(!RuntimeVal::Int(1).is_same(&RuntimeVal::Float(1.)));
    }

    #[test]
    fn identity_of_containers_is_by_reference() {
        let list = RuntimeVal::new_list(vec![RuntimeVal::Int(1)]);
        let alias = list.clone();
        let other = RuntimeVal::new_list(vec![RuntimeVal::Int(1)]);

        assert!(list.is_same(&alias));
        assert!(!list.is_same(&other));
        // Structurally equal though
        assert_eq!(list, other);
    }

    #[test]
    fn aliasing_is_visible() {
        let list = RuntimeVal::new_list(vec![]);
        let alias = list.clone();

        if let RuntimeVal::List(l) = &alias {
            l.borrow_mut().push(RuntimeVal::Int(6));
        }

        assert_eq!(list, RuntimeVal::new_list(vec![RuntimeVal::Int(6)]));
    }

    #[test]
    fn bind_produces_independent_copies() {
        let method = RuntimeVal::new_function("get", &["self"], vec![]);
        let a = RuntimeVal::Int(1);
        let b = RuntimeVal::Int(2);

        let bound_a = method.bind(&a);
        let bound_b = method.bind(&b);

        match (&method, &bound_a, &bound_b) {
            (RuntimeVal::Function(m), RuntimeVal::Function(fa), RuntimeVal::Function(fb)) => {
                assert!(m.receiver.is_none());
                assert_eq!(fa.receiver, Some(a));
                assert_eq!(fb.receiver, Some(b));
                // The body is shared, the descriptor is not
                assert!(Rc::ptr_eq(&fa.body, &fb.body));
                assert!(!Rc::ptr_eq(fa, fb));
            }
            _ => panic!("expected functions"),
        }
    }

    #[test]
    fn bind_leaves_bound_methods_alone() {
        let method = RuntimeVal::new_function("get", &["self"], vec![]);
        let bound = method.bind(&RuntimeVal::Int(1));

        assert!(bound.bind(&RuntimeVal::Int(2)).is_same(&bound));
        assert!(RuntimeVal::Int(3).bind(&RuntimeVal::Int(2)).is_same(&RuntimeVal::Int(3)));
    }

    #[test]
    fn as_int_accepts_bool() {
        assert_eq!(RuntimeVal::Bool(true).as_int(), Some(1));
        assert_eq!(RuntimeVal::Int(-4).as_int(), Some(-4));
        assert_eq!(RuntimeVal::Float(1.).as_int(), None);
    }
}
