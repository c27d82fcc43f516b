//! Dynamic prop values
//!
//! Props in a declarative UI are untyped: strings, numbers, nested elements,
//! event handlers. `Value` is the closed set of shapes the adapter understands.
//!
//! Two notions of equality live here:
//! - `PartialEq` is structural (used to compare snapshots)
//! - `Value::same` is identity, matching `Object.is` (used by memoization)

use crate::element::Element;
use crate::types::NativeHandle;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use smallvec::SmallVec;
use std::fmt;
use std::rc::Rc;

/// Shared, immutable handler (`onClick`, render-prop children, ...)
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn(&[Value]) -> Value>);

impl Callback {
    pub fn new(f: impl Fn(&[Value]) -> Value + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, args: &[Value]) -> Value {
        (self.0)(args)
    }

    pub fn ptr_eq(&self, other: &Callback) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

/// A single prop value
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Str(Rc<str>),
    List(Rc<[Value]>),
    Object(Props),
    Element(Rc<Element>),
    Callback(Callback),
    Native(NativeHandle),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Value::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Props> {
        match self {
            Value::Object(props) => Some(props),
            _ => None,
        }
    }

    pub fn as_callback(&self) -> Option<&Callback> {
        match self {
            Value::Callback(cb) => Some(cb),
            _ => None,
        }
    }

    /// `Object.is`: primitives by value, everything else by reference.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            // NaN is the same as NaN, +0 is not the same as -0
            (Value::Number(a), Value::Number(b)) => {
                a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan())
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Props::same(a, b),
            (Value::Element(a), Value::Element(b)) => Rc::ptr_eq(a, b),
            (Value::Callback(a), Value::Callback(b)) => a.ptr_eq(b),
            (Value::Native(a), Value::Native(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b) || a[..] == b[..],
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Element(a), Value::Element(b)) => Rc::ptr_eq(a, b) || **a == **b,
            (Value::Callback(a), Value::Callback(b)) => a.ptr_eq(b),
            (Value::Native(a), Value::Native(b)) => a == b,
            _ => false,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Str(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(props) => props.serialize(serializer),
            Value::Element(el) => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("type", &el.ty)?;
                map.serialize_entry("key", &el.key)?;
                map.serialize_entry("props", &el.props)?;
                map.end()
            }
            Value::Callback(_) => serializer.serialize_str("[Function]"),
            Value::Native(handle) => handle.serialize(serializer),
        }
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
        Value::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Rc::from(s))
    }
}

impl From<Element> for Value {
    fn from(el: Element) -> Self {
        Value::Element(Rc::new(el))
    }
}

impl From<Props> for Value {
    fn from(props: Props) -> Self {
        Value::Object(props)
    }
}

impl From<Callback> for Value {
    fn from(cb: Callback) -> Self {
        Value::Callback(cb)
    }
}

impl From<NativeHandle> for Value {
    fn from(handle: NativeHandle) -> Self {
        Value::Native(handle)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(Rc::from(items))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Flatten nested lists into one sequence (iterative, any depth).
pub fn flatten_values(items: &[Value]) -> Vec<Value> {
    let mut out = Vec::with_capacity(items.len());
    let mut stack = vec![items.iter()];

    loop {
        let next = match stack.last_mut() {
            Some(iter) => iter.next(),
            None => break,
        };
        match next {
            Some(Value::List(inner)) => stack.push(inner.iter()),
            Some(item) => out.push(item.clone()),
            None => {
                stack.pop();
            }
        }
    }

    out
}

type Entries = SmallVec<[(Rc<str>, Value); 4]>;

/// Ordered prop map with reference identity
///
/// Cloning shares the underlying storage, so two clones are `Props::same`.
/// Writes go through `Rc::make_mut`: a shared map is copied first, which gives
/// the writer a new identity and leaves every other holder untouched.
#[derive(Clone, Default)]
pub struct Props(Rc<Entries>);

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        let entries = Rc::make_mut(&mut self.0);
        match entries.iter_mut().find(|(key, _)| &**key == name) {
            Some(slot) => slot.1 = value,
            None => entries.push((Rc::from(name), value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let position = self.0.iter().position(|(key, _)| &**key == name)?;
        Some(Rc::make_mut(&mut self.0).remove(position).1)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(key, _)| &**key == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn children(&self) -> Option<&Value> {
        self.get("children")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (&**key, value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(key, _)| &**key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reference identity
    pub fn same(a: &Props, b: &Props) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    /// Same contents, fresh identity
    pub fn detached(&self) -> Props {
        Props(Rc::new((*self.0).clone()))
    }

    /// `{ ...defaults, ...self }`. Keeps the identity of `self` when there
    /// is nothing to merge.
    pub fn with_defaults(&self, defaults: Option<&Props>) -> Props {
        match defaults {
            Some(defaults) if !defaults.is_empty() => {
                let mut merged = defaults.detached();
                for (key, value) in self.iter() {
                    merged.insert(key, value.clone());
                }
                merged
            }
            _ => self.clone(),
        }
    }

    /// `{ ...self, ...patch }`, always a new identity
    pub fn merge(&self, patch: &Props) -> Props {
        let mut merged = self.detached();
        for (key, value) in patch.iter() {
            merged.insert(key, value.clone());
        }
        merged
    }

    /// Keep only the listed keys (in the order given)
    pub fn pick<S: AsRef<str>>(&self, keys: &[S]) -> Props {
        let mut picked = Props::new();
        for key in keys {
            if let Some(value) = self.get(key.as_ref()) {
                picked.insert(key.as_ref(), value.clone());
            }
        }
        picked
    }
}

impl PartialEq for Props {
    fn eq(&self, other: &Self) -> bool {
        Props::same(self, other)
            || (self.len() == other.len()
                && self
                    .0
                    .iter()
                    .zip(other.0.iter())
                    .all(|((ka, va), (kb, vb))| ka == kb && va == vb))
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl Serialize for Props {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Shallow equality over props: same key count, every value `Value::same`.
pub fn shallow_equal(a: &Props, b: &Props) -> bool {
    if Props::same(a, b) {
        return true;
    }
    if a.len() != b.len() {
        return false;
    }
    a.iter()
        .all(|(key, value)| b.get(key).is_some_and(|other| value.same(other)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_props_insert_keeps_order() {
        let props = Props::new().with("b", 1).with("a", 2).with("b", 3);
        let keys: Vec<_> = props.keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(props.get("b"), Some(&Value::from(3)));
    }

    #[test]
    fn test_write_to_shared_props_changes_identity() {
        let original = Props::new().with("a", 1);
        let mut copy = original.clone();
        assert!(Props::same(&original, &copy));

        copy.insert("a", 2);
        assert!(!Props::same(&original, &copy));
        assert_eq!(original.get("a"), Some(&Value::from(1)));
    }

    #[test]
    fn test_with_defaults() {
        let defaults = Props::new().with("color", "red").with("size", 2);
        let props = Props::new().with("size", 5);
        let merged = props.with_defaults(Some(&defaults));

        assert_eq!(merged.get("color"), Some(&Value::from("red")));
        assert_eq!(merged.get("size"), Some(&Value::from(5)));

        let untouched = props.with_defaults(None);
        assert!(Props::same(&props, &untouched));
    }

    #[test]
    fn test_shallow_equal_uses_identity_for_objects() {
        let shared = Value::from(vec![Value::from(1)]);
        let a = Props::new().with("x", 1).with("list", shared.clone());
        let b = Props::new().with("x", 1).with("list", shared);
        assert!(shallow_equal(&a, &b));

        let c = Props::new().with("x", 1).with("list", vec![Value::from(1)]);
        assert!(!shallow_equal(&a, &c));
        // structurally still equal
        assert_eq!(a, c);
    }

    #[test]
    fn test_same_number_semantics() {
        assert!(Value::from(f64::NAN).same(&Value::from(f64::NAN)));
        assert!(!Value::from(0.0).same(&Value::from(-0.0)));
    }

    #[test]
    fn test_flatten_values() {
        let nested = vec![
            Value::from(1),
            Value::from(vec![Value::from(2), Value::from(vec![Value::from(3)])]),
            Value::from(4),
        ];
        let flat = flatten_values(&nested);
        assert_eq!(
            flat,
            vec![Value::from(1), Value::from(2), Value::from(3), Value::from(4)]
        );
    }
}
