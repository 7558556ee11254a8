//! Tagged attribute values and the per-subject attribute list (spec.md §3,
//! §4.2). The attribute catalogue is the closed set agreed at both ends of
//! the exchange (spec.md §6): `PlayerAuthID` doubles as the subject
//! identifier, `PlayerName` and `IsOnline` are the two retrievable/settable
//! fields. Adding a name is a coordinated wire-format change.

use std::collections::HashMap;
use std::fmt;

/// Closed enum of attribute names. `None` is the sentinel used by an
/// attribute that has not been bound to a real name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeName {
    None,
    PlayerAuthId,
    PlayerName,
    IsOnline,
}

impl AttributeName {
    /// The canonical wire-format key, agreed at both ends. Unknown keys
    /// decode to `None` and are dropped by the codec.
    pub fn as_key(&self) -> &'static str {
        match self {
            AttributeName::None => "",
            AttributeName::PlayerAuthId => "PlayerAuthID",
            AttributeName::PlayerName => "PlayerName",
            AttributeName::IsOnline => "IsOnline",
        }
    }

    pub fn from_key(key: &str) -> AttributeName {
        match key {
            "PlayerAuthID" => AttributeName::PlayerAuthId,
            "PlayerName" => AttributeName::PlayerName,
            "IsOnline" => AttributeName::IsOnline,
            _ => AttributeName::None,
        }
    }
}

impl fmt::Display for AttributeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_key())
    }
}

/// A tagged value: string, 32-bit int, 32-bit float, or bool.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Str(String),
    Int(i32),
    Float(f32),
    Bool(bool),
}

impl AttributeValue {
    /// Textual encoding used on the wire: string verbatim, bool as `"1"`/
    /// `"0"`, int/float via their standard decimal renderings.
    pub fn to_wire(&self) -> String {
        match self {
            AttributeValue::Str(s) => s.clone(),
            AttributeValue::Int(i) => i.to_string(),
            AttributeValue::Float(fl) => fl.to_string(),
            AttributeValue::Bool(b) => if *b { "1" } else { "0" }.to_string(),
        }
    }
}

/// A set of (name -> value) bindings for one subject entity. Iteration
/// order is first-insertion order; each name appears at most once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeList {
    order: Vec<AttributeName>,
    values: HashMap<AttributeName, AttributeValue>,
}

impl AttributeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `value`. Idempotent with respect to the populated
    /// names set: setting the same name twice updates the value in place
    /// without duplicating the iteration entry.
    pub fn set(&mut self, name: AttributeName, value: AttributeValue) {
        if !self.values.contains_key(&name) {
            self.order.push(name);
        }
        self.values.insert(name, value);
    }

    pub fn get(&self, name: AttributeName) -> Option<&AttributeValue> {
        self.values.get(&name)
    }

    pub fn contains(&self, name: AttributeName) -> bool {
        self.values.contains_key(&name)
    }

    pub fn size(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Populated names in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (AttributeName, &AttributeValue)> {
        self.order.iter().map(move |n| (*n, self.values.get(n).expect("order/values kept in sync")))
    }

    /// Equality used by the round-trip laws (R1/R2): same name set and
    /// value bindings, independent of insertion order.
    pub fn equivalent(&self, other: &AttributeList) -> bool {
        if self.size() != other.size() {
            return false;
        }
        self.values.iter().all(|(name, value)| other.values.get(name) == Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_is_idempotent_on_names_populated() {
        let mut list = AttributeList::new();
        list.set(AttributeName::PlayerName, AttributeValue::Str("Ada".into()));
        list.set(AttributeName::PlayerName, AttributeValue::Str("Grace".into()));
        assert_eq!(list.size(), 1);
        assert_eq!(list.get(AttributeName::PlayerName), Some(&AttributeValue::Str("Grace".into())));
    }

    #[test]
    fn iteration_follows_first_insertion_order() {
        let mut list = AttributeList::new();
        list.set(AttributeName::IsOnline, AttributeValue::Bool(true));
        list.set(AttributeName::PlayerName, AttributeValue::Str("Ada".into()));
        let names: Vec<_> = list.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec![AttributeName::IsOnline, AttributeName::PlayerName]);
    }

    #[test]
    fn equivalent_ignores_order() {
        let mut a = AttributeList::new();
        a.set(AttributeName::PlayerName, AttributeValue::Str("Ada".into()));
        a.set(AttributeName::IsOnline, AttributeValue::Bool(true));

        let mut b = AttributeList::new();
        b.set(AttributeName::IsOnline, AttributeValue::Bool(true));
        b.set(AttributeName::PlayerName, AttributeValue::Str("Ada".into()));

        assert!(a.equivalent(&b));
    }

    #[test]
    fn unknown_key_decodes_to_none() {
        assert_eq!(AttributeName::from_key("UnknownKey"), AttributeName::None);
    }

    #[test]
    fn bool_wire_encoding() {
        assert_eq!(AttributeValue::Bool(true).to_wire(), "1");
        assert_eq!(AttributeValue::Bool(false).to_wire(), "0");
    }
}
