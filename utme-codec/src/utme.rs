//! The utme codec
//!
//! [`Utme`] combines one optional [`Event`] with a [`CustomVariableSet`] and
//! is the only entry point for decoding. Mutations happen in place and return
//! the codec for chaining; [`Utme::serialize`] renders the wire string on
//! demand and [`Utme::parse`] rebuilds a codec from one.

use crate::custom_vars::CustomVariableSet;
use crate::grammar;
use crate::types::{CustomVariable, Event, Result, UtmeError};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Event plus custom variables, rendered as a single `utme` parameter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utme {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    event: Option<Event>,
    #[serde(default, skip_serializing_if = "CustomVariableSet::is_empty")]
    custom_variables: CustomVariableSet,
}

/// Anything [`Utme::parse`] accepts
#[derive(Debug, Clone, PartialEq)]
pub enum UtmeInput<'a> {
    /// No stored value
    Absent,
    /// A wire string
    Text(Cow<'a, str>),
    /// An already decoded value, passed through unchanged
    Structured(Utme),
}

impl<'a> From<&'a str> for UtmeInput<'a> {
    fn from(text: &'a str) -> Self {
        UtmeInput::Text(Cow::Borrowed(text))
    }
}

impl From<String> for UtmeInput<'_> {
    fn from(text: String) -> Self {
        UtmeInput::Text(Cow::Owned(text))
    }
}

impl<'a, T: Into<UtmeInput<'a>>> From<Option<T>> for UtmeInput<'a> {
    fn from(input: Option<T>) -> Self {
        input.map_or(UtmeInput::Absent, Into::into)
    }
}

impl From<Utme> for UtmeInput<'_> {
    fn from(utme: Utme) -> Self {
        UtmeInput::Structured(utme)
    }
}

impl<'a> TryFrom<&'a serde_json::Value> for UtmeInput<'a> {
    type Error = UtmeError;

    /// Strings are wire text, `null` is absent and objects must have the
    /// structured shape. Every other kind of value is rejected.
    fn try_from(value: &'a serde_json::Value) -> Result<Self> {
        use serde_json::Value;

        match value {
            Value::Null => Ok(UtmeInput::Absent),
            Value::String(text) => Ok(UtmeInput::Text(Cow::Borrowed(text))),
            Value::Object(_) => Utme::deserialize(value)
                .map(UtmeInput::Structured)
                .map_err(|e| UtmeError::UnsupportedInput(e.to_string())),
            Value::Bool(_) => Err(UtmeError::UnsupportedInput("boolean".to_string())),
            Value::Number(_) => Err(UtmeError::UnsupportedInput("number".to_string())),
            Value::Array(_) => Err(UtmeError::UnsupportedInput("array".to_string())),
        }
    }
}

impl Utme {
    /// Create an empty codec (no event, no custom variables)
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a stored value back into a codec
    ///
    /// Structured input is returned unchanged, absent or empty input yields an
    /// empty codec, and text is scanned for an event fragment first and then
    /// for a custom variable fragment in the remainder. Either fragment may be
    /// missing.
    ///
    /// # Example
    /// ```
    /// use utme_codec::Utme;
    ///
    /// let utme = Utme::parse("5(video*play*intro)(3)8(plan)9(pro)11(1)").unwrap();
    /// assert_eq!(utme.event().unwrap().action, "play");
    /// assert_eq!(utme.custom_variables().get(1).unwrap().value, "pro");
    /// ```
    pub fn parse<'a>(input: impl Into<UtmeInput<'a>>) -> Result<Self> {
        match input.into() {
            UtmeInput::Structured(utme) => Ok(utme),
            UtmeInput::Absent => Ok(Self::new()),
            UtmeInput::Text(text) => Self::from_text(&text),
        }
    }

    fn from_text(text: &str) -> Result<Self> {
        let mut utme = Self::new();
        if text.is_empty() {
            return Ok(utme);
        }

        let mut remainder = Cow::Borrowed(text);
        if let Some(found) = grammar::find_event(text) {
            log::trace!("Found event fragment at {:?}", found.span);
            let mut rest = String::with_capacity(text.len() - found.span.len());
            rest.push_str(&text[..found.span.start]);
            rest.push_str(&text[found.span.end..]);
            remainder = Cow::Owned(rest);
            utme.event = Some(found.event);
        }

        if let Some(lists) = grammar::find_custom_variables(&remainder) {
            log::trace!("Found custom variable lists {:?}", lists);
            utme.custom_variables = grammar::rebuild_custom_variables(&lists)?;
        }

        log::debug!(
            "Parsed utme: event={}, {} custom variable(s)",
            utme.event.is_some(),
            utme.custom_variables.len()
        );
        Ok(utme)
    }

    /// Render the wire string (empty for an empty codec)
    pub fn serialize(&self) -> String {
        self.to_string()
    }

    /// Replace the current event
    pub fn set_event(&mut self, event: Event) -> &mut Self {
        self.event = Some(event);
        self
    }

    /// Insert or replace the custom variable at `slot` (1..=5)
    pub fn set_custom_variable(&mut self, slot: usize, variable: CustomVariable) -> Result<&mut Self> {
        self.custom_variables.set(slot, variable)?;
        Ok(self)
    }

    /// Remove the custom variable at `slot` (1..=5), if any
    pub fn unset_custom_variable(&mut self, slot: usize) -> Result<&mut Self> {
        self.custom_variables.unset(slot)?;
        Ok(self)
    }

    /// Current event, if one was set
    pub fn event(&self) -> Option<&Event> {
        self.event.as_ref()
    }

    /// Current custom variables
    pub fn custom_variables(&self) -> &CustomVariableSet {
        &self.custom_variables
    }

    /// True if there is neither an event nor any custom variable
    pub fn is_empty(&self) -> bool {
        self.event.is_none() && self.custom_variables.is_empty()
    }

    /// Drop the event and all custom variables
    pub fn clear(&mut self) {
        self.event = None;
        self.custom_variables.clear();
    }
}

impl fmt::Display for Utme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(event) = &self.event {
            write!(f, "{}", event)?;
        }
        write!(f, "{}", self.custom_variables)
    }
}

impl FromStr for Utme {
    type Err = UtmeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
