//! Runtime value representation for the Moonlet VM.
//!
//! Values are what live on the operand stack and in scope bindings. Every
//! operator is defined per concrete pairing; any other pairing fails with an
//! [`OperationError`] that carries both operand representations.

use std::fmt;
use std::rc::Rc;

use crate::error::OperationError;
use crate::scope::Scope;

/// Signature of a host callback. Arguments arrive resolved and in call order.
pub type HostFn = dyn Fn(&[Value]) -> Result<Value, OperationError>;

/// A function implemented by the host and registered into the global scope.
#[derive(Clone)]
pub struct BuiltinFunction {
    name: Rc<str>,
    callback: Rc<HostFn>,
}

impl BuiltinFunction {
    pub fn new(
        name: &str,
        callback: impl Fn(&[Value]) -> Result<Value, OperationError> + 'static,
    ) -> Self {
        Self {
            name: Rc::from(name),
            callback: Rc::new(callback),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the host callback.
    pub fn call(&self, args: &[Value]) -> Result<Value, OperationError> {
        (self.callback)(args)
    }
}

/// A function compiled into the program.
pub struct CustomFunction {
    pub name: String,
    /// Address of the `BEGIN_SCOPE` that opens the body.
    pub entry: usize,
    /// Number of declared parameters.
    pub arity: usize,
    /// Scope active where the function was declared.
    pub captured: Scope,
}

/// Runtime value.
#[derive(Clone)]
pub enum Value {
    Number(f64),
    String(String),
    Boolean(bool),
    Nil,
    /// Deferred reference to a binding. Never a valid operator operand; the
    /// VM resolves it against the current scope first.
    Identifier(String),
    BuiltinFunction(BuiltinFunction),
    CustomFunction(Rc<CustomFunction>),
}

impl Value {
    /// `nil` and `false` are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Boolean(false))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::Nil => "nil",
            Value::Identifier(_) => "identifier",
            Value::BuiltinFunction(_) | Value::CustomFunction(_) => "function",
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::BuiltinFunction(_) | Value::CustomFunction(_))
    }

    // ---- Arithmetic ----

    pub fn add(&self, other: &Value) -> Result<Value, OperationError> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            _ => Err(invalid_operands("+", self, other)),
        }
    }

    pub fn subtract(&self, other: &Value) -> Result<Value, OperationError> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),
            _ => Err(invalid_operands("-", self, other)),
        }
    }

    pub fn multiply(&self, other: &Value) -> Result<Value, OperationError> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),
            _ => Err(invalid_operands("*", self, other)),
        }
    }

    pub fn divide(&self, other: &Value) -> Result<Value, OperationError> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),
            _ => Err(invalid_operands("/", self, other)),
        }
    }

    pub fn negate(&self) -> Result<Value, OperationError> {
        match self {
            Value::Number(a) => Ok(Value::Number(-a)),
            _ => Err(invalid_operand("unary '-'", self)),
        }
    }

    pub fn concat(&self, other: &Value) -> Result<Value, OperationError> {
        match (self, other) {
            (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{a}{b}"))),
            _ => Err(invalid_operands("..", self, other)),
        }
    }

    // ---- Logic ----

    pub fn boolean_and(&self, other: &Value) -> Result<Value, OperationError> {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(*a && *b)),
            _ => Err(invalid_operands("and", self, other)),
        }
    }

    pub fn boolean_or(&self, other: &Value) -> Result<Value, OperationError> {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(*a || *b)),
            _ => Err(invalid_operands("or", self, other)),
        }
    }

    pub fn boolean_not(&self) -> Result<Value, OperationError> {
        match self {
            Value::Boolean(a) => Ok(Value::Boolean(!a)),
            _ => Err(invalid_operand("'not'", self)),
        }
    }

    // ---- Comparison ----

    pub fn equal(&self, other: &Value) -> Result<Value, OperationError> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Boolean(a == b)),
            (Value::String(a), Value::String(b)) => Ok(Value::Boolean(a == b)),
            (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(a == b)),
            _ => Err(invalid_operands("==", self, other)),
        }
    }

    pub fn less_than(&self, other: &Value) -> Result<Value, OperationError> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Boolean(a < b)),
            (Value::String(a), Value::String(b)) => Ok(Value::Boolean(a < b)),
            (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(a < b)),
            _ => Err(invalid_operands("<", self, other)),
        }
    }

    /// `a ~= b` is `not (a == b)`.
    pub fn not_equal(&self, other: &Value) -> Result<Value, OperationError> {
        self.equal(other)
            .and_then(|eq| eq.boolean_not())
            .map_err(|_| invalid_operands("~=", self, other))
    }

    /// `a >= b` is `not (a < b)`.
    pub fn greater_equal(&self, other: &Value) -> Result<Value, OperationError> {
        self.less_than(other)
            .and_then(|lt| lt.boolean_not())
            .map_err(|_| invalid_operands(">=", self, other))
    }

    /// `a <= b` is `(a < b) or (a == b)`.
    pub fn less_equal(&self, other: &Value) -> Result<Value, OperationError> {
        self.less_than(other)
            .and_then(|lt| lt.boolean_or(&self.equal(other)?))
            .map_err(|_| invalid_operands("<=", self, other))
    }

    /// `a > b` is `not (a <= b)`.
    pub fn greater_than(&self, other: &Value) -> Result<Value, OperationError> {
        self.less_equal(other)
            .and_then(|le| le.boolean_not())
            .map_err(|_| invalid_operands(">", self, other))
    }
}

fn invalid_operands(op: &'static str, left: &Value, right: &Value) -> OperationError {
    OperationError::InvalidOperands {
        op,
        left: format!("{left:?}"),
        right: format!("{right:?}"),
    }
}

fn invalid_operand(op: &'static str, operand: &Value) -> OperationError {
    OperationError::InvalidOperand {
        op,
        operand: format!("{operand:?}"),
    }
}

/// Host-side identity, used by tests and by the embedding API. Functions
/// compare by reference.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::Identifier(a), Value::Identifier(b)) => a == b,
            (Value::BuiltinFunction(a), Value::BuiltinFunction(b)) => {
                Rc::ptr_eq(&a.callback, &b.callback)
            }
            (Value::CustomFunction(a), Value::CustomFunction(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// The representation used in error messages: `Number(1)`, `String("x")`.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "Number({n})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Boolean(b) => write!(f, "Boolean({b})"),
            Value::Nil => f.write_str("Nil"),
            Value::Identifier(name) => write!(f, "Identifier({name:?})"),
            Value::BuiltinFunction(b) => write!(f, "BuiltinFunction({:?})", b.name()),
            Value::CustomFunction(func) => write!(
                f,
                "CustomFunction(name={:?}, addr={})",
                func.name, func.entry
            ),
        }
    }
}

/// The form `print` writes.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Nil => f.write_str("nil"),
            Value::Identifier(name) => f.write_str(name),
            Value::BuiltinFunction(b) => {
                write!(f, "builtin_function_instance(name=\"{}\")", b.name())
            }
            Value::CustomFunction(func) => write!(
                f,
                "function_instance(name=\"{}\", addr={})",
                func.name, func.entry
            ),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}
