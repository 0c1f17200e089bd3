//! Strict-mode shape classification.
//!
//! Decides whether a value is a record-like (struct-shaped) type by running
//! its `Serialize` impl against a serializer that produces no output: only
//! `serialize_struct`/`serialize_struct_variant` count as record-like.
//! Maps, sequences, and primitives do not. Transparent wrappers (newtype
//! structs, `Some`, newtype variants) classify as their inner value.

use std::fmt;

use serde::ser::{
    self, SerializeMap, SerializeSeq, SerializeStruct, SerializeStructVariant, SerializeTuple,
    SerializeTupleStruct, SerializeTupleVariant,
};
use serde::Serialize;

/// Whether `value` serializes as a struct. Values whose `Serialize` impl
/// fails classify as not-a-struct; encoding reports those failures
/// properly.
pub(crate) fn is_struct_like<T: Serialize + ?Sized>(value: &T) -> bool {
    value.serialize(Classifier).unwrap_or(false)
}

struct Classifier;

/// Raised only by the value's own `Serialize` impl, never by the
/// classifier itself.
#[derive(Debug)]
struct Unclassifiable;

impl fmt::Display for Unclassifiable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("value failed to serialize during shape classification")
    }
}

impl std::error::Error for Unclassifiable {}

impl ser::Error for Unclassifiable {
    fn custom<T: fmt::Display>(_msg: T) -> Self {
        Unclassifiable
    }
}

/// Swallows compound-type elements and reports the verdict at `end`.
struct Verdict(bool);

macro_rules! scalar {
    ($method:ident, $ty:ty) => {
        fn $method(self, _value: $ty) -> Result<bool, Unclassifiable> {
            Ok(false)
        }
    };
}

impl ser::Serializer for Classifier {
    type Ok = bool;
    type Error = Unclassifiable;
    type SerializeSeq = Verdict;
    type SerializeTuple = Verdict;
    type SerializeTupleStruct = Verdict;
    type SerializeTupleVariant = Verdict;
    type SerializeMap = Verdict;
    type SerializeStruct = Verdict;
    type SerializeStructVariant = Verdict;

    scalar!(serialize_bool, bool);
    scalar!(serialize_i8, i8);
    scalar!(serialize_i16, i16);
    scalar!(serialize_i32, i32);
    scalar!(serialize_i64, i64);
    scalar!(serialize_i128, i128);
    scalar!(serialize_u8, u8);
    scalar!(serialize_u16, u16);
    scalar!(serialize_u32, u32);
    scalar!(serialize_u64, u64);
    scalar!(serialize_u128, u128);
    scalar!(serialize_f32, f32);
    scalar!(serialize_f64, f64);
    scalar!(serialize_char, char);
    scalar!(serialize_str, &str);
    scalar!(serialize_bytes, &[u8]);

    fn serialize_none(self) -> Result<bool, Unclassifiable> {
        Ok(false)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<bool, Unclassifiable> {
        value.serialize(Classifier)
    }

    fn serialize_unit(self) -> Result<bool, Unclassifiable> {
        Ok(false)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<bool, Unclassifiable> {
        Ok(false)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
    ) -> Result<bool, Unclassifiable> {
        Ok(false)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<bool, Unclassifiable> {
        value.serialize(Classifier)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<bool, Unclassifiable> {
        value.serialize(Classifier)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Verdict, Unclassifiable> {
        Ok(Verdict(false))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Verdict, Unclassifiable> {
        Ok(Verdict(false))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Verdict, Unclassifiable> {
        Ok(Verdict(false))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Verdict, Unclassifiable> {
        Ok(Verdict(false))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Verdict, Unclassifiable> {
        Ok(Verdict(false))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Verdict, Unclassifiable> {
        Ok(Verdict(true))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Verdict, Unclassifiable> {
        Ok(Verdict(true))
    }
}

impl SerializeSeq for Verdict {
    type Ok = bool;
    type Error = Unclassifiable;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<(), Unclassifiable> {
        Ok(())
    }

    fn end(self) -> Result<bool, Unclassifiable> {
        Ok(self.0)
    }
}

impl SerializeTuple for Verdict {
    type Ok = bool;
    type Error = Unclassifiable;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<(), Unclassifiable> {
        Ok(())
    }

    fn end(self) -> Result<bool, Unclassifiable> {
        Ok(self.0)
    }
}

impl SerializeTupleStruct for Verdict {
    type Ok = bool;
    type Error = Unclassifiable;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<(), Unclassifiable> {
        Ok(())
    }

    fn end(self) -> Result<bool, Unclassifiable> {
        Ok(self.0)
    }
}

impl SerializeTupleVariant for Verdict {
    type Ok = bool;
    type Error = Unclassifiable;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<(), Unclassifiable> {
        Ok(())
    }

    fn end(self) -> Result<bool, Unclassifiable> {
        Ok(self.0)
    }
}

impl SerializeMap for Verdict {
    type Ok = bool;
    type Error = Unclassifiable;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, _key: &T) -> Result<(), Unclassifiable> {
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<(), Unclassifiable> {
        Ok(())
    }

    fn end(self) -> Result<bool, Unclassifiable> {
        Ok(self.0)
    }
}

impl SerializeStruct for Verdict {
    type Ok = bool;
    type Error = Unclassifiable;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _key: &'static str,
        _value: &T,
    ) -> Result<(), Unclassifiable> {
        Ok(())
    }

    fn end(self) -> Result<bool, Unclassifiable> {
        Ok(self.0)
    }
}

impl SerializeStructVariant for Verdict {
    type Ok = bool;
    type Error = Unclassifiable;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _key: &'static str,
        _value: &T,
    ) -> Result<(), Unclassifiable> {
        Ok(())
    }

    fn end(self) -> Result<bool, Unclassifiable> {
        Ok(self.0)
    }
}
