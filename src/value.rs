//! Dynamically typed values that expectations are made about.
//!
//! Scalars are plain data. Arrays and objects are shared handles
//! (`Rc<RefCell<..>>`): cloning a `Value` clones the handle, so two clones
//! are the *same* composite as far as `toBe` is concerned, and a composite can
//! be made to contain itself.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use serde_json::Value as Json;

use crate::asymmetric::AsymmetricTester;

pub type ArrayRef = Rc<RefCell<Vec<Value>>>;
pub type ObjectRef = Rc<RefCell<BTreeMap<String, Value>>>;

#[derive(Clone)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(ArrayRef),
    Object(ObjectRef),
    /// A value that decides equality itself, e.g. `any(Number)`.
    Asymmetric(Rc<dyn AsymmetricTester>),
}

/// Coarse type of a value, named the way messages and `any(..)` spell it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
    Asymmetric,
}

impl Kind {
    pub fn name(self) -> &'static str {
        match self {
            Kind::Undefined => "Undefined",
            Kind::Null => "Null",
            Kind::Boolean => "Boolean",
            Kind::Number => "Number",
            Kind::String => "String",
            Kind::Array => "Array",
            Kind::Object => "Object",
            Kind::Asymmetric => "Asymmetric",
        }
    }

    pub fn from_name(name: &str) -> Option<Kind> {
        let kind = match name {
            "Undefined" => Kind::Undefined,
            "Null" => Kind::Null,
            "Boolean" => Kind::Boolean,
            "Number" => Kind::Number,
            "String" => Kind::String,
            "Array" => Kind::Array,
            "Object" => Kind::Object,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let map = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Value::Object(Rc::new(RefCell::new(map)))
    }

    pub fn empty_object() -> Self {
        Value::Object(Rc::new(RefCell::new(BTreeMap::new())))
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Undefined => Kind::Undefined,
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Boolean,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
            Value::Asymmetric(_) => Kind::Asymmetric,
        }
    }

    /// Stable identity of a composite: the address of its shared cell.
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::Array(a) => Some(Rc::as_ptr(a) as *const () as usize),
            Value::Object(o) => Some(Rc::as_ptr(o) as *const () as usize),
            Value::Asymmetric(t) => Some(Rc::as_ptr(t) as *const () as usize),
            _ => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Truthiness as a scripting language sees it: `false`, `0`, `NaN`, `""`,
    /// `null` and `undefined` are falsy; every composite is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) | Value::Asymmetric(_) => true,
        }
    }

    /// Appends to an array in place. Returns `false` for non-arrays.
    pub fn push(&self, item: Value) -> bool {
        match self {
            Value::Array(a) => {
                a.borrow_mut().push(item);
                true
            }
            _ => false,
        }
    }

    /// Sets a member of an object in place. Returns `false` for non-objects.
    pub fn insert(&self, key: impl Into<String>, item: Value) -> bool {
        match self {
            Value::Object(o) => {
                o.borrow_mut().insert(key.into(), item);
                true
            }
            _ => false,
        }
    }

    /// Member of an object or element of an array (for numeric keys).
    pub fn get(&self, key: &str) -> Option<Value> {
        match self {
            Value::Object(o) => o.borrow().get(key).cloned(),
            Value::Array(a) => key.parse::<usize>().ok().and_then(|i| a.borrow().get(i).cloned()),
            _ => None,
        }
    }

    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Array(a) => Some(a.borrow().len()),
            Value::Object(o) => Some(o.borrow().len()),
            Value::String(s) => Some(s.chars().count()),
            _ => None,
        }
    }

    /// Structural copy with fresh identities. Shared and cyclic substructure
    /// is copied once and re-linked, so the copy has the same shape.
    pub fn deep_copy(&self) -> Value {
        let mut copies = HashMap::new();
        self.copy_into(&mut copies)
    }

    fn copy_into(&self, copies: &mut HashMap<usize, Value>) -> Value {
        let Some(id) = self.identity() else {
            return self.clone();
        };
        if let Some(done) = copies.get(&id) {
            return done.clone();
        }
        match self {
            Value::Array(items) => {
                let copy = Value::array(Vec::new());
                copies.insert(id, copy.clone());
                let items = items.borrow().clone();
                for item in items {
                    copy.push(item.copy_into(copies));
                }
                copy
            }
            Value::Object(members) => {
                let copy = Value::empty_object();
                copies.insert(id, copy.clone());
                let members = members.borrow().clone();
                for (k, v) in members {
                    copy.insert(k, v.copy_into(copies));
                }
                copy
            }
            _ => self.clone(),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Undefined
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::pretty::pretty_print(self, &Default::default()))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::pretty::pretty_print(self, &Default::default()))
    }
}

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::array(items.into_iter().map(Value::from).collect()),
            Json::Object(map) => Value::object(map.into_iter().map(|(k, v)| (k, Value::from(v)))),
        }
    }
}

impl From<&Json> for Value {
    fn from(json: &Json) -> Self {
        Value::from(json.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::array(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Undefined)
    }
}
