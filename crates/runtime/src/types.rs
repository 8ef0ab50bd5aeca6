use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::values::{self, MemberMap, NativeFn, NativeFunction, RuntimeVal};

/// A type: built-in or created by a `class` statement.
pub struct TypeObject {
    pub name: String,
    pub bases: Vec<Rc<TypeObject>>,
    pub members: RefCell<MemberMap>,
}

impl TypeObject {
    pub fn new(name: &str, bases: Vec<Rc<TypeObject>>, members: MemberMap) -> Self {
        Self {
            name: name.into(),
            bases,
            members: RefCell::new(members),
        }
    }

    /// Finds `name` on this type or, depth-first and left to right, on its
    /// bases. A base reached twice through a diamond is only visited once.
    pub fn lookup(&self, name: &str) -> Option<RuntimeVal> {
        self.lookup_excluding(name, &[])
    }

    /// Same as [`TypeObject::lookup`] but never looks into `excluded` types.
    pub fn lookup_excluding(&self, name: &str, excluded: &[&TypeObject]) -> Option<RuntimeVal> {
        let mut visited: HashSet<*const TypeObject> = excluded.iter().map(|t| *t as *const _).collect();

        self.find(name, &mut visited)
    }

    fn find(&self, name: &str, visited: &mut HashSet<*const TypeObject>) -> Option<RuntimeVal> {
        if !visited.insert(self as *const _) {
            return None;
        }

        if let Some(member) = self.members.borrow().get(name) {
            return Some(member.clone());
        }

        self.bases.iter().find_map(|base| base.find(name, visited))
    }

    pub fn is_subtype_of(&self, other: &TypeObject) -> bool {
        std::ptr::eq(self, other) || self.bases.iter().any(|b| b.is_subtype_of(other))
    }
}


/// The built-in type hierarchy. Built once per interpreter and never mutated
/// afterwards.
pub struct Registry {
    pub object: Rc<TypeObject>,
    pub none: Rc<TypeObject>,
    pub numeric: Rc<TypeObject>,
    pub int: Rc<TypeObject>,
    pub bool: Rc<TypeObject>,
    pub float: Rc<TypeObject>,
    pub str: Rc<TypeObject>,
    pub list: Rc<TypeObject>,
    pub dict: Rc<TypeObject>,
    pub set: Rc<TypeObject>,
    pub function: Rc<TypeObject>,
    pub builtin_function: Rc<TypeObject>,
    pub type_: Rc<TypeObject>,
}

impl Registry {
    pub fn new() -> Self {
        let object = builtin_type("object", vec![], values::object_members());
        let base = || vec![object.clone()];

        let numeric = builtin_type("numeric", base(), values::numeric_members());
        let int = builtin_type("int", vec![numeric.clone()], values::int_members());
        let bool = builtin_type("bool", vec![numeric.clone()], values::bool_members());
        let float = builtin_type("float", vec![numeric.clone()], values::float_members());

        Self {
            none: builtin_type("NoneType", base(), values::none_members()),
            str: builtin_type("str", base(), values::str_members()),
            list: builtin_type("list", base(), values::list_members()),
            dict: builtin_type("dict", base(), values::dict_members()),
            set: builtin_type("set", base(), values::set_members()),
            function: builtin_type("function", base(), vec![]),
            builtin_function: builtin_type("builtin_function_or_method", base(), vec![]),
            type_: builtin_type("type", base(), values::type_members()),
            numeric,
            int,
            bool,
            float,
            object,
        }
    }

    pub fn type_of(&self, value: &RuntimeVal) -> Rc<TypeObject> {
        let t = match value {
            RuntimeVal::None => &self.none,
            RuntimeVal::Bool(_) => &self.bool,
            RuntimeVal::Int(_) => &self.int,
            RuntimeVal::Float(_) => &self.float,
            RuntimeVal::Str(_) => &self.str,
            RuntimeVal::List(_) => &self.list,
            RuntimeVal::Dict(_) => &self.dict,
            RuntimeVal::Set(_) => &self.set,
            RuntimeVal::Function(_) => &self.function,
            RuntimeVal::NativeFunction(_) => &self.builtin_function,
            RuntimeVal::Instance(inst) => &inst.class,
            RuntimeVal::Type(_) => &self.type_,
        };

        t.clone()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn builtin_type(name: &str, bases: Vec<Rc<TypeObject>>, members: Vec<(&'static str, NativeFn)>) -> Rc<TypeObject> {
    let members = members
        .into_iter()
        .map(|(member, func)| {
            let native = NativeFunction {
                name: member.into(),
                func,
                receiver: None,
            };

            (member.to_string(), RuntimeVal::NativeFunction(Rc::new(native)))
        })
        .collect();

    Rc::new(TypeObject::new(name, bases, members))
}
