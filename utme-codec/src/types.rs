//! Core types for the utme codec
//!
//! This module defines the error taxonomy and the two leaf records the codec
//! works with: an [`Event`] and a [`CustomVariable`]. Neither type knows how it
//! is laid out on the wire; rendering lives next to the owning component and
//! parsing lives in the grammar module.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, UtmeError>;

/// Slots that may hold a custom variable
pub const VALID_SLOTS: RangeInclusive<usize> = 1..=5;

/// Errors that can occur while mutating or parsing a utme value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UtmeError {
    #[error("Cannot use custom variable slot {0}, valid slots are 1..=5")]
    InvalidSlot(usize),

    #[error("Each custom variable must have a value defined: {names} names, {values} values")]
    MismatchedCounts { names: usize, values: usize },

    #[error("Custom variable value in slot {0} has no matching name")]
    UnmatchedValue(usize),

    #[error("Custom variable name in slot {0} has no matching value")]
    MissingValue(usize),

    #[error("Malformed custom variable fragment: {0:?}")]
    MalformedFragment(String),

    #[error("Could not parse argument as utme string or structured value: {0}")]
    UnsupportedInput(String),
}

/// Check that a slot lies in [`VALID_SLOTS`]
pub fn check_slot(slot: usize) -> Result<()> {
    if VALID_SLOTS.contains(&slot) {
        Ok(())
    } else {
        Err(UtmeError::InvalidSlot(slot))
    }
}

/// A tracked event
///
/// Category and action are always present together. An absent event is
/// modelled as `Option<Event>` on the owning [`Utme`](crate::Utme).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    /// Event category (e.g. "video")
    pub category: String,
    /// Event action (e.g. "play")
    pub action: String,
    /// Optional label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Optional value, usually an integer in string form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Event {
    /// Create an event with only category and action
    pub fn new(category: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            action: action.into(),
            label: None,
            value: None,
        }
    }

    /// Builder method: attach a label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Builder method: attach a value
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// A custom variable held by one slot of a
/// [`CustomVariableSet`](crate::CustomVariableSet)
///
/// The combined length of name and value is limited to 64 bytes by the
/// receiving service. That limit is not enforced here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomVariable {
    /// Variable name
    pub name: String,
    /// Variable value
    pub value: String,
    /// Optional scope (1 = visitor, 2 = session, 3 = page by convention)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl CustomVariable {
    /// Create an unscoped custom variable
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            scope: None,
        }
    }

    /// Builder method: attach a scope
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}
