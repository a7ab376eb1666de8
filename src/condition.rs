//! Struct-to-conditions mapping.
//!
//! [`Where`] turns the named fields of a record into a flat key/value map
//! that can be used as query predicates. A field's key is its serde name, so
//! `#[serde(rename = "...")]` sets the key and `#[serde(skip)]` keeps a field
//! out of the conditions entirely.
//!
//! ```rust
//! use serde::Serialize;
//! use sqlkit::Where;
//!
//! #[derive(Serialize)]
//! struct UserQuery {
//!     #[serde(rename = "name")]
//!     name: String,
//!     #[serde(rename = "email")]
//!     email: Option<String>,
//! }
//!
//! let query = UserQuery { name: "John".into(), email: None };
//! let conditions = Where::from_record(&query, false).unwrap();
//! assert_eq!(conditions.to_string(), "name=John");
//! ```

use std::collections::{btree_map, BTreeMap};
use std::fmt;

use sea_orm::sea_query::{Alias, Expr, SimpleExpr};
use sea_orm::{Condition, QueryFilter};
use serde::ser::{self, Impossible, Serialize, Serializer};
use serde_json::value::Serializer as JsonSerializer;
use serde_json::Value;

use crate::error::{Error, Result};

/// Condition map built from a record's fields, ordered by key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Where(BTreeMap<String, Value>);

impl Where {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map the fields of a struct.
    ///
    /// With `include_empty` false, fields whose value is empty according to
    /// [`is_empty_value`] are skipped. A present `Option` (`Some(_)`) is never
    /// empty, whatever it holds. When two fields share a name the later
    /// one wins.
    ///
    /// Fields pulled in with `#[serde(flatten)]` are mapped like the record's
    /// own fields.
    ///
    /// # Errors
    /// Returns [`Error::NotAStruct`] when `record` does not serialize as a
    /// struct, or [`Error::Serialize`] when a field fails to serialize,
    /// including floats that are NaN or infinite.
    pub fn from_record<T>(record: &T, include_empty: bool) -> Result<Self>
    where
        T: Serialize + ?Sized,
    {
        record.serialize(RecordSerializer { include_empty })
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.0
    }

    /// AND of one predicate per key.
    ///
    /// `null` tests `IS NULL`, an array tests `IN (...)`, anything else `=`.
    pub fn to_condition(&self) -> Condition {
        self.0
            .iter()
            .fold(Condition::all(), |condition, (key, value)| condition.add(predicate(key, value)))
    }

    /// Add these conditions to a SeaORM query. An empty map leaves it unchanged.
    pub fn apply<S: QueryFilter>(&self, query: S) -> S {
        if self.is_empty() {
            query
        } else {
            query.filter(self.to_condition())
        }
    }
}

/// Shorthand for [`Where::from_record`].
pub fn new_where_condition<T>(record: &T, include_empty: bool) -> Result<Where>
where
    T: Serialize + ?Sized,
{
    Where::from_record(record, include_empty)
}

/// Whether a value counts as empty for condition mapping.
///
/// Empty strings, arrays and objects, `false`, numeric zero and `null` (an
/// absent `Option`) are empty. Everything else is not.
///
/// Nested structs are judged by their serialized form, so a struct without
/// fields (`{}`) and a unit struct (`null`) both count as empty, the same as
/// an empty map.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Where {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl IntoIterator for Where {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Where {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Where {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match value {
                Value::String(s) => write!(f, "{}={}", key, s)?,
                other => write!(f, "{}={}", key, other)?,
            }
        }
        Ok(())
    }
}

fn predicate(key: &str, value: &Value) -> SimpleExpr {
    let column = Expr::col(Alias::new(key));
    match value {
        Value::Null => column.is_null(),
        Value::Array(items) => column.is_in(items.iter().map(to_sql_value)),
        other => column.eq(to_sql_value(other)),
    }
}

fn to_sql_value(value: &Value) -> sea_orm::Value {
    match value {
        Value::Bool(b) => (*b).into(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.into()
            } else if let Some(u) = n.as_u64() {
                u.into()
            } else {
                n.as_f64().into()
            }
        }
        Value::String(s) => s.as_str().into(),
        Value::Null | Value::Array(_) | Value::Object(_) => value.clone().into(),
    }
}

/// Serializer accepting only struct-shaped values.
struct RecordSerializer {
    include_empty: bool,
}

macro_rules! reject {
    ($($method:ident($ty:ty) => $kind:literal),* $(,)?) => {
        $(
            fn $method(self, _: $ty) -> Result<Where> {
                Err(Error::NotAStruct($kind))
            }
        )*
    };
}

impl Serializer for RecordSerializer {
    type Ok = Where;
    type Error = Error;

    type SerializeSeq = Impossible<Where, Error>;
    type SerializeTuple = Impossible<Where, Error>;
    type SerializeTupleStruct = UnnamedFields;
    type SerializeTupleVariant = Impossible<Where, Error>;
    type SerializeMap = NamedFields;
    type SerializeStruct = NamedFields;
    type SerializeStructVariant = Impossible<Where, Error>;

    reject! {
        serialize_bool(bool) => "bool",
        serialize_i8(i8) => "integer",
        serialize_i16(i16) => "integer",
        serialize_i32(i32) => "integer",
        serialize_i64(i64) => "integer",
        serialize_u8(u8) => "integer",
        serialize_u16(u16) => "integer",
        serialize_u32(u32) => "integer",
        serialize_u64(u64) => "integer",
        serialize_f32(f32) => "float",
        serialize_f64(f64) => "float",
        serialize_char(char) => "char",
        serialize_str(&str) => "string",
        serialize_bytes(&[u8]) => "bytes",
    }

    fn serialize_none(self) -> Result<Where> {
        Err(Error::NotAStruct("none"))
    }

    fn serialize_some<T>(self, value: &T) -> Result<Where>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Where> {
        Err(Error::NotAStruct("unit"))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Where> {
        Ok(Where::new())
    }

    fn serialize_unit_variant(self, _name: &'static str, _index: u32, _variant: &'static str) -> Result<Where> {
        Err(Error::NotAStruct("enum"))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Where>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Where>
    where
        T: ?Sized + Serialize,
    {
        Err(Error::NotAStruct("enum"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(Error::NotAStruct("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(Error::NotAStruct("tuple"))
    }

    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeTupleStruct> {
        Ok(UnnamedFields)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(Error::NotAStruct("enum"))
    }

    /// Structs with flattened fields serialize as maps of unknown length.
    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap> {
        match len {
            None => Ok(NamedFields::new(self.include_empty)),
            Some(_) => Err(Error::NotAStruct("map")),
        }
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Ok(NamedFields::new(self.include_empty))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(Error::NotAStruct("enum"))
    }
}

struct NamedFields {
    include_empty: bool,
    fields: Where,
    pending_key: Option<String>,
}

impl NamedFields {
    fn new(include_empty: bool) -> Self {
        Self {
            include_empty,
            fields: Where::new(),
            pending_key: None,
        }
    }

    fn push<T>(&mut self, key: impl Into<String>, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let mut present = false;
        let value = value.serialize(FieldSerializer { some: &mut present })?;
        if self.include_empty || present || !is_empty_value(&value) {
            self.fields.insert(key, value);
        }
        Ok(())
    }
}

impl ser::SerializeStruct for NamedFields {
    type Ok = Where;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(key, value)
    }

    fn end(self) -> Result<Where> {
        Ok(self.fields)
    }
}

impl ser::SerializeMap for NamedFields {
    type Ok = Where;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match key.serialize(JsonSerializer)? {
            Value::String(key) => {
                self.pending_key = Some(key);
                Ok(())
            }
            other => Err(Error::Serialize(format!("field name must be a string, got {}", other))),
        }
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| Error::Serialize("field value without a name".to_string()))?;
        self.push(key, value)
    }

    fn end(self) -> Result<Where> {
        Ok(self.fields)
    }
}

type JsonResult<T = Value> = std::result::Result<T, serde_json::Error>;

/// Serializes a field to JSON and records whether it was a present `Option`.
///
/// `Some(0)` and `0` both become `0`, but only the bare zero is empty.
struct FieldSerializer<'a> {
    some: &'a mut bool,
}

macro_rules! forward {
    ($($method:ident($ty:ty)),* $(,)?) => {
        $(
            fn $method(self, v: $ty) -> JsonResult {
                JsonSerializer.$method(v)
            }
        )*
    };
}

impl Serializer for FieldSerializer<'_> {
    type Ok = Value;
    type Error = serde_json::Error;

    type SerializeSeq = <JsonSerializer as Serializer>::SerializeSeq;
    type SerializeTuple = <JsonSerializer as Serializer>::SerializeTuple;
    type SerializeTupleStruct = <JsonSerializer as Serializer>::SerializeTupleStruct;
    type SerializeTupleVariant = <JsonSerializer as Serializer>::SerializeTupleVariant;
    type SerializeMap = <JsonSerializer as Serializer>::SerializeMap;
    type SerializeStruct = <JsonSerializer as Serializer>::SerializeStruct;
    type SerializeStructVariant = <JsonSerializer as Serializer>::SerializeStructVariant;

    forward! {
        serialize_bool(bool),
        serialize_i8(i8),
        serialize_i16(i16),
        serialize_i32(i32),
        serialize_i64(i64),
        serialize_i128(i128),
        serialize_u8(u8),
        serialize_u16(u16),
        serialize_u32(u32),
        serialize_u64(u64),
        serialize_u128(u128),
        serialize_char(char),
        serialize_str(&str),
        serialize_bytes(&[u8]),
    }

    fn serialize_f32(self, v: f32) -> JsonResult {
        if !v.is_finite() {
            return Err(non_finite(v));
        }
        JsonSerializer.serialize_f32(v)
    }

    fn serialize_f64(self, v: f64) -> JsonResult {
        if !v.is_finite() {
            return Err(non_finite(v));
        }
        JsonSerializer.serialize_f64(v)
    }

    fn serialize_none(self) -> JsonResult {
        JsonSerializer.serialize_none()
    }

    fn serialize_some<T>(self, value: &T) -> JsonResult
    where
        T: ?Sized + Serialize,
    {
        let some = self.some;
        *some = true;
        value.serialize(FieldSerializer { some })
    }

    fn serialize_unit(self) -> JsonResult {
        JsonSerializer.serialize_unit()
    }

    fn serialize_unit_struct(self, name: &'static str) -> JsonResult {
        JsonSerializer.serialize_unit_struct(name)
    }

    fn serialize_unit_variant(self, name: &'static str, index: u32, variant: &'static str) -> JsonResult {
        JsonSerializer.serialize_unit_variant(name, index, variant)
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> JsonResult
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        index: u32,
        variant: &'static str,
        value: &T,
    ) -> JsonResult
    where
        T: ?Sized + Serialize,
    {
        JsonSerializer.serialize_newtype_variant(name, index, variant, value)
    }

    fn serialize_seq(self, len: Option<usize>) -> JsonResult<Self::SerializeSeq> {
        JsonSerializer.serialize_seq(len)
    }

    fn serialize_tuple(self, len: usize) -> JsonResult<Self::SerializeTuple> {
        JsonSerializer.serialize_tuple(len)
    }

    fn serialize_tuple_struct(self, name: &'static str, len: usize) -> JsonResult<Self::SerializeTupleStruct> {
        JsonSerializer.serialize_tuple_struct(name, len)
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        index: u32,
        variant: &'static str,
        len: usize,
    ) -> JsonResult<Self::SerializeTupleVariant> {
        JsonSerializer.serialize_tuple_variant(name, index, variant, len)
    }

    fn serialize_map(self, len: Option<usize>) -> JsonResult<Self::SerializeMap> {
        JsonSerializer.serialize_map(len)
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> JsonResult<Self::SerializeStruct> {
        JsonSerializer.serialize_struct(name, len)
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        index: u32,
        variant: &'static str,
        len: usize,
    ) -> JsonResult<Self::SerializeStructVariant> {
        JsonSerializer.serialize_struct_variant(name, index, variant, len)
    }
}

/// JSON has no NaN or infinity and would store them as `null`.
fn non_finite(v: impl fmt::Display) -> serde_json::Error {
    ser::Error::custom(format!("float {} has no SQL value", v))
}

/// Tuple struct fields carry no name, so none of them map to a key.
struct UnnamedFields;

impl ser::SerializeTupleStruct for UnnamedFields {
    type Ok = Where;
    type Error = Error;

    fn serialize_field<T>(&mut self, _value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        Ok(())
    }

    fn end(self) -> Result<Where> {
        Ok(Where::new())
    }
}
