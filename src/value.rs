//! The closed set of setting kinds and the owned [`Value`] tree.
//!
//! A [`Value`] is a detached copy of a setting and everything below it. It is
//! what [`Config::to_value`](crate::Config::to_value) returns, what
//! [`Config::add_value`](crate::Config::add_value) inserts, and what the serde
//! export walks.

use std::fmt;

/// The kind of a setting. The declaration order is the display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    Group,
    Int,
    Int64,
    Float,
    String,
    Bool,
    Array,
    List,
}

impl Kind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Kind::Group => "group",
            Kind::Int => "int",
            Kind::Int64 => "int64",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::Bool => "bool",
            Kind::Array => "array",
            Kind::List => "list",
        }
    }

    /// Scalars are the kinds an array may hold.
    #[must_use]
    pub const fn is_scalar(self) -> bool {
        !self.is_aggregate()
    }

    #[must_use]
    pub const fn is_aggregate(self) -> bool {
        matches!(self, Kind::Group | Kind::Array | Kind::List)
    }

    #[must_use]
    pub const fn is_number(self) -> bool {
        matches!(self, Kind::Int | Kind::Int64 | Kind::Float)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Output base for integer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegerBase {
    #[default]
    Decimal,
    Hex,
    Octal,
}

/// An owned setting value. Equality is kind-exact: `Float(1.0) != Int(1)`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i32),
    Int64(i64),
    Float(f64),
    String(String),
    /// Named members in insertion order.
    Group(Vec<(String, Value)>),
    Array(Vec<Value>),
    List(Vec<Value>),
}

impl Value {
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Int64(_) => Kind::Int64,
            Value::Float(_) => Kind::Float,
            Value::String(_) => Kind::String,
            Value::Group(_) => Kind::Group,
            Value::Array(_) => Kind::Array,
            Value::List(_) => Kind::List,
        }
    }

    /// The value a freshly added setting of `kind` starts with.
    #[must_use]
    pub fn default_for(kind: Kind) -> Value {
        match kind {
            Kind::Group => Value::Group(Vec::new()),
            Kind::Int => Value::Int(0),
            Kind::Int64 => Value::Int64(0),
            Kind::Float => Value::Float(0.0),
            Kind::String => Value::String(String::new()),
            Kind::Bool => Value::Bool(false),
            Kind::Array => Value::Array(Vec::new()),
            Kind::List => Value::List(Vec::new()),
        }
    }

    #[must_use]
    pub fn group() -> Value {
        Value::Group(Vec::new())
    }

    /// Appends a member to a group value. Does nothing on other kinds.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Value {
        if let Value::Group(members) = &mut self {
            members.push((name.into(), value.into()));
        }
        self
    }

    /// Looks up a direct member of a group value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Group(members) => members.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}
