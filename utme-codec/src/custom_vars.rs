//! Slot-indexed custom variables and their compressed rendering
//!
//! Custom variables are rendered as three parallel lists:
//!
//! ```text
//! 8(NAMES)9(VALUES)11(SCOPES)
//! ```
//!
//! Fragments inside a list are separated by `*`. A fragment carries an
//! explicit `slot!` prefix only when its position cannot be inferred, i.e.
//! when the slot before it is empty:
//!
//! ```text
//! slots 1, 2        8(foo*bar)9(val*vok)
//! slots 1, 2, 4     8(foo*bar*4!baz)9(val*vok*4!vol)
//! slot 4 only       8(4!foo)9(4!bar)
//! ```
//!
//! Scopes are only listed for scoped variables, so the scope list decides its
//! markers on its own: a scope needs a marker unless the previous slot carries
//! a scope too.

use crate::types::{check_slot, CustomVariable, Result, UtmeError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Tag opening the names list
pub(crate) const NAMES_TAG: &str = "8(";
/// Tag separating names from values
pub(crate) const VALUES_TAG: &str = ")9(";
/// Tag opening the optional scopes list
pub(crate) const SCOPES_TAG: &str = "11(";

/// Up to five custom variables keyed by slot (1..=5)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<usize, CustomVariable>",
    into = "BTreeMap<usize, CustomVariable>"
)]
pub struct CustomVariableSet {
    contents: BTreeMap<usize, CustomVariable>,
}

impl CustomVariableSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the variable at `slot`
    ///
    /// Fails with [`UtmeError::InvalidSlot`] if `slot` is outside 1..=5, in
    /// which case the set is left untouched.
    pub fn set(&mut self, slot: usize, variable: CustomVariable) -> Result<()> {
        check_slot(slot)?;
        self.contents.insert(slot, variable);
        Ok(())
    }

    /// Remove the variable at `slot`, returning it if there was one
    pub fn unset(&mut self, slot: usize) -> Result<Option<CustomVariable>> {
        check_slot(slot)?;
        Ok(self.contents.remove(&slot))
    }

    /// Get the variable at `slot`
    pub fn get(&self, slot: usize) -> Option<&CustomVariable> {
        self.contents.get(&slot)
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    /// True if no slot is occupied
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Iterate over occupied slots in ascending order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &CustomVariable)> {
        self.contents.iter().map(|(slot, var)| (*slot, var))
    }

    /// Remove all variables
    pub fn clear(&mut self) {
        self.contents.clear();
    }

    fn has_scoped_predecessor(&self, slot: usize) -> bool {
        self.contents
            .get(&(slot - 1))
            .map_or(false, |prev| prev.scope.is_some())
    }
}

impl TryFrom<BTreeMap<usize, CustomVariable>> for CustomVariableSet {
    type Error = UtmeError;

    fn try_from(contents: BTreeMap<usize, CustomVariable>) -> Result<Self> {
        for slot in contents.keys() {
            check_slot(*slot)?;
        }
        Ok(Self { contents })
    }
}

impl From<CustomVariableSet> for BTreeMap<usize, CustomVariable> {
    fn from(set: CustomVariableSet) -> Self {
        set.contents
    }
}

/// Prefix for a fragment: `*` unless first in its list, then `slot!` unless
/// the position is implied
fn push_fragment(out: &mut String, slot: usize, implied: bool, text: &str) {
    if !out.is_empty() {
        out.push('*');
    }
    if !implied {
        out.push_str(&slot.to_string());
        out.push('!');
    }
    out.push_str(text);
}

impl fmt::Display for CustomVariableSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.contents.is_empty() {
            return Ok(());
        }

        let mut names = String::new();
        let mut values = String::new();
        let mut scopes = String::new();

        for (&slot, var) in &self.contents {
            let implied = slot == 1 || self.contents.contains_key(&(slot - 1));
            push_fragment(&mut names, slot, implied, &var.name);
            push_fragment(&mut values, slot, implied, &var.value);

            if let Some(scope) = &var.scope {
                let scope_implied = slot == 1 || self.has_scoped_predecessor(slot);
                push_fragment(&mut scopes, slot, scope_implied, scope);
            }
        }

        write!(f, "{}{}{}{})", NAMES_TAG, names, VALUES_TAG, values)?;
        if !scopes.is_empty() {
            write!(f, "{}{})", SCOPES_TAG, scopes)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_of(entries: &[(usize, &str, &str, Option<&str>)]) -> CustomVariableSet {
        let mut set = CustomVariableSet::new();
        for (slot, name, value, scope) in entries {
            let mut var = CustomVariable::new(*name, *value);
            var.scope = scope.map(str::to_string);
            set.set(*slot, var).unwrap();
        }
        set
    }

    #[test]
    fn test_empty_set_renders_nothing() {
        assert_eq!(CustomVariableSet::new().to_string(), "");
    }

    #[test]
    fn test_contiguous_slots_have_no_markers() {
        let set = set_of(&[(1, "foo", "val", None), (2, "bar", "vok", None)]);
        assert_eq!(set.to_string(), "8(foo*bar)9(val*vok)");
    }

    #[test]
    fn test_gap_adds_marker() {
        let set = set_of(&[
            (1, "foo", "val", Some("1")),
            (2, "bar", "vok", Some("3")),
            (4, "baz", "vol", Some("1")),
        ]);
        assert_eq!(set.to_string(), "8(foo*bar*4!baz)9(val*vok*4!vol)11(1*3*4!1)");
    }

    #[test]
    fn test_single_late_slot() {
        let set = set_of(&[(4, "foo", "bar", Some("1"))]);
        assert_eq!(set.to_string(), "8(4!foo)9(4!bar)11(4!1)");
    }

    #[test]
    fn test_scope_markers_follow_scoped_slots() {
        let set = set_of(&[
            (1, "a", "x", Some("1")),
            (2, "b", "y", None),
            (3, "c", "z", Some("3")),
        ]);
        assert_eq!(set.to_string(), "8(a*b*c)9(x*y*z)11(1*3!3)");
    }

    #[test]
    fn test_first_scope_not_in_slot_one() {
        let set = set_of(&[(1, "a", "x", None), (2, "b", "y", Some("2"))]);
        assert_eq!(set.to_string(), "8(a*b)9(x*y)11(2!2)");
    }

    #[test]
    fn test_invalid_slots_rejected() {
        let mut set = CustomVariableSet::new();
        assert_eq!(
            set.set(0, CustomVariable::new("a", "b")),
            Err(UtmeError::InvalidSlot(0))
        );
        assert_eq!(
            set.set(6, CustomVariable::new("a", "b")),
            Err(UtmeError::InvalidSlot(6))
        );
        assert_eq!(set.unset(0), Err(UtmeError::InvalidSlot(0)));
        assert_eq!(set.unset(6), Err(UtmeError::InvalidSlot(6)));
        assert!(set.is_empty());
    }

    #[test]
    fn test_set_replaces_and_unset_removes() {
        let mut set = set_of(&[(3, "a", "x", None)]);
        set.set(3, CustomVariable::new("b", "y")).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(3).unwrap().name, "b");

        assert_eq!(set.unset(3).unwrap().unwrap().value, "y");
        assert_eq!(set.unset(3).unwrap(), None);
        assert!(set.is_empty());
    }

    #[test]
    fn test_iter_is_ascending() {
        let set = set_of(&[(4, "d", "w", None), (1, "a", "x", None), (3, "c", "z", None)]);
        let slots: Vec<usize> = set.iter().map(|(slot, _)| slot).collect();
        assert_eq!(slots, vec![1, 3, 4]);
        assert_eq!(set.iter().next().unwrap().1.name, "a");
    }

    #[test]
    fn test_deserialize_rejects_bad_slot() {
        let ok: CustomVariableSet =
            serde_json::from_str(r#"{"2": {"name": "a", "value": "b"}}"#).unwrap();
        assert_eq!(ok.get(2).unwrap().name, "a");

        let bad = serde_json::from_str::<CustomVariableSet>(r#"{"7": {"name": "a", "value": "b"}}"#);
        assert!(bad.is_err());
    }
}
