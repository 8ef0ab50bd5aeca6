use std::hash::{Hash, Hasher};

use super::RuntimeVal;
use crate::interpreter::InterpreterError;

/// A dict key or set element. Only None, bool, int, float and str qualify.
///
/// Numbers hash and compare by numeric value, so `1`, `1.0` and `True` are the
/// same key; the first value inserted is the one kept for display.
#[derive(Clone, Debug)]
pub struct HashKey(RuntimeVal);

#[derive(PartialEq, Eq, Hash)]
enum Primitive<'a> {
    None,
    Int(i64),
    Float(u64),
    Str(&'a str),
}

impl HashKey {
    pub fn new(value: RuntimeVal) -> Result<Self, InterpreterError> {
        if value.is_scalar() {
            Ok(HashKey(value))
        } else {
            Err(InterpreterError::Type(format!("unhashable type: '{}'", value.type_name())))
        }
    }

    pub fn value(&self) -> &RuntimeVal {
        &self.0
    }

    pub fn into_value(self) -> RuntimeVal {
        self.0
    }

    fn primitive(&self) -> Primitive<'_> {
        match &self.0 {
            RuntimeVal::Bool(b) => Primitive::Int(i64::from(*b)),
            RuntimeVal::Int(nb) => Primitive::Int(*nb),
            RuntimeVal::Float(nb) => {
                // 2^63 is exactly representable, so the range check is exact
                if nb.fract() == 0.0 && *nb >= i64::MIN as f64 && *nb < i64::MAX as f64 {
                    Primitive::Int(*nb as i64)
                } else {
                    Primitive::Float(nb.to_bits())
                }
            }
            RuntimeVal::Str(s) => Primitive::Str(s),
            _ => Primitive::None,
        }
    }
}

impl PartialEq for HashKey {
    fn eq(&self, other: &Self) -> bool {
        self.primitive() == other.primitive()
    }
}

impl Eq for HashKey {}

impl Hash for HashKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.primitive().hash(state)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexSet;

    #[test]
    fn scalars_are_hashable() {
        for value in [
            RuntimeVal::None,
            RuntimeVal::Bool(false),
            RuntimeVal::Int(3),
            RuntimeVal::Float(2.5),
            RuntimeVal::new_str("apple"),
        ] {
            assert!(HashKey::new(value).is_ok());
        }
    }

    #[test]
    fn containers_are_not_hashable() {
        let err = HashKey::new(RuntimeVal::new_list(vec![])).unwrap_err();

        assert_eq!(err, InterpreterError::Type("unhashable type: 'list'".into()));
        assert!(HashKey::new(RuntimeVal::new_set(IndexSet::new())).is_err());
    }

    #[test]
    fn numeric_keys_collapse() {
        let mut set = IndexSet::new();
        set.insert(HashKey::new(RuntimeVal::Int(1)).unwrap());
        set.insert(HashKey::new(RuntimeVal::Float(1.)).unwrap());
        set.insert(HashKey::new(RuntimeVal::Bool(true)).unwrap());
        set.insert(HashKey::new(RuntimeVal::new_str("1")).unwrap());

        assert_eq!(set.len(), 2);
        // First inserted key is kept
        assert_eq!(set[0].value(), &RuntimeVal::Int(1));
    }
}
