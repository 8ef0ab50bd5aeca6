use indexmap::{IndexMap, IndexSet};

use super::{Interpreter, InterpreterError};
use crate::environment::Env;
use crate::values::numeric::BinOp;
use crate::values::{HashKey, RuntimeVal};
use frontend::ast::ExpressionKind;

/// An assignable place, with its sub-expressions already evaluated.
pub(crate) enum Location {
    Name(String),
    Attribute { target: RuntimeVal, name: String },
    Item { target: RuntimeVal, key: RuntimeVal },
}

impl Interpreter {
    pub(super) fn evaluate(&self, expr: &ExpressionKind, env: &mut Env) -> Result<RuntimeVal, InterpreterError> {
        match expr {
            ExpressionKind::IntLiteral { value } => Ok(RuntimeVal::Int(*value)),
            ExpressionKind::FloatLiteral { value } => Ok(RuntimeVal::Float(*value)),
            ExpressionKind::BoolLiteral { value } => Ok(RuntimeVal::Bool(*value)),
            ExpressionKind::StrLiteral { value } => Ok(RuntimeVal::new_str(value)),
            ExpressionKind::NoneLiteral => Ok(RuntimeVal::None),
            ExpressionKind::ListLiteral { values } => {
                let mut val: Vec<RuntimeVal> = vec![];
                for v in values {
                    val.push(self.evaluate(v, env)?);
                }

                Ok(RuntimeVal::new_list(val))
            }
            ExpressionKind::DictLiteral { entries } => {
                let mut dict = IndexMap::new();
                for (k, v) in entries {
                    let key = HashKey::new(self.evaluate(k, env)?)?;
                    let value = self.evaluate(v, env)?;

                    dict.insert(key, value);
                }

                Ok(RuntimeVal::new_dict(dict))
            }
            ExpressionKind::SetLiteral { values } => {
                let mut set = IndexSet::new();
                for v in values {
                    set.insert(HashKey::new(self.evaluate(v, env)?)?);
                }

                Ok(RuntimeVal::new_set(set))
            }
            ExpressionKind::Primary { location } => {
                let location = self.locate(location, env)?;
                self.load(&location, env)
            }
            ExpressionKind::Identifier { .. }
            | ExpressionKind::AttributeRef { .. }
            | ExpressionKind::Subscription { .. } => {
                let location = self.locate(expr, env)?;
                self.load(&location, env)
            }
            ExpressionKind::Call { caller, args } => self.evaluate_call(caller, args, env),
            ExpressionKind::Truth { operand } => {
                let value = self.evaluate(operand, env)?;
                Ok(RuntimeVal::Bool(self.is_truthy(&value, env)?))
            }
            ExpressionKind::Not { operand } => {
                let value = self.evaluate(operand, env)?;
                Ok(RuntimeVal::Bool(!self.is_truthy(&value, env)?))
            }
            ExpressionKind::Conditional {
                condition,
                then,
                otherwise,
            } => {
                let condition = self.evaluate(condition, env)?;

                if self.is_truthy(&condition, env)? {
                    self.evaluate(then, env)
                } else {
                    self.evaluate(otherwise, env)
                }
            }
            // Both return the deciding operand, not a bool
            ExpressionKind::And { left, right } => {
                let lhs = self.evaluate(left, env)?;

                if self.is_truthy(&lhs, env)? {
                    self.evaluate(right, env)
                } else {
                    Ok(lhs)
                }
            }
            ExpressionKind::Or { left, right } => {
                let lhs = self.evaluate(left, env)?;

                if self.is_truthy(&lhs, env)? {
                    Ok(lhs)
                } else {
                    self.evaluate(right, env)
                }
            }
            ExpressionKind::Is { left, right } => {
                let lhs = self.evaluate(left, env)?;
                let rhs = self.evaluate(right, env)?;

                Ok(RuntimeVal::Bool(lhs.is_same(&rhs)))
            }
        }
    }

    // In-place special methods called on an assignable receiver store their
    // result back when the receiver is an immutable scalar
    fn evaluate_call(
        &self,
        caller: &ExpressionKind,
        args: &[ExpressionKind],
        env: &mut Env,
    ) -> Result<RuntimeVal, InterpreterError> {
        if let Some(ExpressionKind::AttributeRef { member, attribute }) = caller.as_location() {
            if let (true, Some(place)) = (BinOp::is_inplace(attribute), member.as_location()) {
                let location = self.locate(place, env)?;
                let receiver = self.load(&location, env)?;
                let method = self.get_attribute(&receiver, attribute)?;

                let args = self.evaluate_args(args, env)?;
                let res = self.call_value(&method, args, env)?;

                if receiver.is_scalar() {
                    self.store(location, res.clone(), env)?;
                }

                return Ok(res);
            }
        }

        let callee = self.evaluate(caller, env)?;
        let args = self.evaluate_args(args, env)?;

        self.call_value(&callee, args, env)
    }

    fn evaluate_args(&self, args: &[ExpressionKind], env: &mut Env) -> Result<Vec<RuntimeVal>, InterpreterError> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.evaluate(arg, env)?);
        }

        Ok(values)
    }

    // ----------
    //  Locations
    // ----------

    pub(super) fn locate(&self, expr: &ExpressionKind, env: &mut Env) -> Result<Location, InterpreterError> {
        match expr {
            ExpressionKind::Identifier { symbol } => Ok(Location::Name(symbol.clone())),
            ExpressionKind::AttributeRef { member, attribute } => Ok(Location::Attribute {
                target: self.evaluate(member, env)?,
                name: attribute.clone(),
            }),
            ExpressionKind::Subscription { member, key } => {
                let target = self.evaluate(member, env)?;
                let key = self.evaluate(key, env)?;

                Ok(Location::Item { target, key })
            }
            ExpressionKind::Primary { location } => self.locate(location, env),
            _ => Err(InterpreterError::Syntax("cannot assign to expression".into())),
        }
    }

    pub(super) fn load(&self, location: &Location, env: &mut Env) -> Result<RuntimeVal, InterpreterError> {
        match location {
            Location::Name(name) => Ok(env.lookup_var(name)?),
            Location::Attribute { target, name } => self.get_attribute(target, name),
            Location::Item { target, key } => {
                self.item_method(target, "__getitem__", "is not subscriptable")?;
                self.call_method(target, "__getitem__", vec![key.clone()], env)
            }
        }
    }

    pub(super) fn store(&self, location: Location, value: RuntimeVal, env: &mut Env) -> Result<(), InterpreterError> {
        match location {
            Location::Name(name) => {
                env.assign_var(&name, value);
                Ok(())
            }
            Location::Attribute { target, name } => self.set_attribute(&target, &name, value),
            Location::Item { target, key } => {
                self.item_method(&target, "__setitem__", "does not support item assignment")?;
                self.call_method(&target, "__setitem__", vec![key, value], env)?;
                Ok(())
            }
        }
    }

    pub(super) fn delete(&self, location: Location, env: &mut Env) -> Result<(), InterpreterError> {
        match location {
            Location::Name(name) => Ok(env.delete_var(&name)?),
            Location::Attribute { target, name } => self.delete_attribute(&target, &name),
            Location::Item { target, key } => {
                self.item_method(&target, "__delitem__", "doesn't support item deletion")?;
                self.call_method(&target, "__delitem__", vec![key], env)?;
                Ok(())
            }
        }
    }

    // Subscription on a value without the matching method is a TypeError
    fn item_method(&self, target: &RuntimeVal, method: &str, complaint: &str) -> Result<(), InterpreterError> {
        match self.lookup_attribute(target, method) {
            Some(_) => Ok(()),
            None => Err(InterpreterError::Type(format!(
                "'{}' object {}",
                target.type_name(),
                complaint
            ))),
        }
    }
}
