//! Wire grammar for utme strings
//!
//! ```text
//! output     := event? customvars?
//! event      := "5(" category "*" action ("*" label)? ")" ( "(" value ")" )?
//! customvars := "8(" names ")9(" values ")" ("11(" scopes ")")?
//! list       := fragment ("*" fragment)*
//! fragment   := (slot "!")? text
//! ```
//!
//! Parsing isolates the event first and cuts it out of the input, then looks
//! for the custom variables in what is left. Both parts are optional and the
//! first match of each wins.

use crate::custom_vars::{CustomVariableSet, NAMES_TAG, SCOPES_TAG, VALUES_TAG};
use crate::event::EVENT_TAG;
use crate::types::{CustomVariable, Event, Result, UtmeError};
use std::collections::BTreeMap;
use std::ops::Range;

/// Characters that delimit fields and can never appear inside one
const RESERVED: [char; 3] = ['(', ')', '*'];

/// Minimal forward-only cursor over the input
struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn at(input: &'a str, pos: usize) -> Self {
        Self { input, pos }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Consume `token` if the input continues with it
    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    /// Like [`Cursor::eat`], for use with `?`
    fn expect(&mut self, token: &str) -> Option<()> {
        self.eat(token).then_some(())
    }

    /// Consume a non-empty field (no reserved characters)
    fn field(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        let len = rest.find(&RESERVED[..]).unwrap_or(rest.len());
        if len == 0 {
            return None;
        }
        self.pos += len;
        Some(&rest[..len])
    }

    /// Consume everything up to the next `)`, possibly nothing
    fn list(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        let len = rest.find(')')?;
        self.pos += len;
        Some(&rest[..len])
    }
}

/// An event found in the input together with the byte range it occupied
#[derive(Debug, PartialEq)]
pub(crate) struct EventMatch {
    pub event: Event,
    pub span: Range<usize>,
}

/// Find the first well-formed event fragment in `input`
pub(crate) fn find_event(input: &str) -> Option<EventMatch> {
    input
        .match_indices(EVENT_TAG)
        .find_map(|(start, _)| event_at(input, start))
}

fn event_at(input: &str, start: usize) -> Option<EventMatch> {
    let mut cur = Cursor::at(input, start);
    cur.expect(EVENT_TAG)?;

    let category = cur.field()?;
    cur.expect("*")?;
    let action = cur.field()?;

    let mut event = Event::new(category, action);
    if cur.eat("*") {
        event.label = Some(cur.field()?.to_string());
    }
    cur.expect(")")?;

    let before_value = cur.pos;
    if cur.eat("(") {
        match (cur.field(), cur.eat(")")) {
            (Some(value), true) => event.value = Some(value.to_string()),
            _ => cur.pos = before_value,
        }
    }

    Some(EventMatch {
        event,
        span: start..cur.pos,
    })
}

/// Raw lists of a custom variable fragment, before reconstruction
#[derive(Debug, PartialEq)]
pub(crate) struct CustomVariableLists<'a> {
    pub names: &'a str,
    pub values: &'a str,
    pub scopes: Option<&'a str>,
}

/// Find the first well-formed `8(..)9(..)[11(..)]` fragment in `input`
pub(crate) fn find_custom_variables(input: &str) -> Option<CustomVariableLists<'_>> {
    input
        .match_indices(NAMES_TAG)
        .find_map(|(start, _)| custom_variables_at(input, start))
}

fn custom_variables_at(input: &str, start: usize) -> Option<CustomVariableLists<'_>> {
    let mut cur = Cursor::at(input, start);
    cur.expect(NAMES_TAG)?;
    let names = cur.list()?;
    cur.expect(VALUES_TAG)?;
    let values = cur.list()?;
    cur.expect(")")?;

    let before_scopes = cur.pos;
    let mut scopes = None;
    if cur.eat(SCOPES_TAG) {
        match (cur.list(), cur.eat(")")) {
            (Some(list), true) => scopes = Some(list),
            _ => cur.pos = before_scopes,
        }
    }

    Some(CustomVariableLists {
        names,
        values,
        scopes,
    })
}

/// Split a list into `(slot, text)` pairs
///
/// A fragment without an explicit `slot!` prefix takes the slot right after
/// the previous fragment's slot (slot 1 for the first fragment).
pub(crate) fn split_list(list: &str) -> Result<Vec<(usize, &str)>> {
    if list.is_empty() {
        return Ok(Vec::new());
    }
    let mut previous = 0;
    list.split('*')
        .map(|fragment| {
            let (slot, text) = split_fragment(fragment, previous + 1)?;
            previous = slot;
            Ok((slot, text))
        })
        .collect()
}

fn split_fragment(fragment: &str, implied: usize) -> Result<(usize, &str)> {
    let digits = fragment
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(fragment.len());

    let (slot, text) = match fragment[digits..].strip_prefix('!') {
        Some(text) if digits > 0 => {
            let slot = fragment[..digits]
                .parse::<usize>()
                .map_err(|_| UtmeError::MalformedFragment(fragment.to_string()))?;
            (slot, text)
        }
        _ => (implied, fragment),
    };

    if text.is_empty() || text.contains(&RESERVED[..]) {
        return Err(UtmeError::MalformedFragment(fragment.to_string()));
    }
    Ok((slot, text))
}

#[derive(Default)]
struct PendingVariable<'a> {
    name: &'a str,
    value: Option<&'a str>,
    scope: Option<&'a str>,
}

/// Rebuild a [`CustomVariableSet`] from the three raw lists
pub(crate) fn rebuild_custom_variables(lists: &CustomVariableLists<'_>) -> Result<CustomVariableSet> {
    let names = split_list(lists.names)?;
    let values = split_list(lists.values)?;
    if names.len() != values.len() {
        return Err(UtmeError::MismatchedCounts {
            names: names.len(),
            values: values.len(),
        });
    }

    let mut pending: BTreeMap<usize, PendingVariable<'_>> = BTreeMap::new();
    for (slot, name) in names {
        pending.insert(
            slot,
            PendingVariable {
                name,
                ..Default::default()
            },
        );
    }
    for (slot, value) in values {
        let var = pending
            .get_mut(&slot)
            .ok_or(UtmeError::UnmatchedValue(slot))?;
        var.value = Some(value);
    }
    for (slot, scope) in split_list(lists.scopes.unwrap_or_default())? {
        match pending.get_mut(&slot) {
            Some(var) => var.scope = Some(scope),
            None => log::debug!("Dropping scope {:?} for empty slot {}", scope, slot),
        }
    }

    let mut set = CustomVariableSet::new();
    for (slot, var) in pending {
        let value = var.value.ok_or(UtmeError::MissingValue(slot))?;
        let mut variable = CustomVariable::new(var.name, value);
        variable.scope = var.scope.map(str::to_string);
        set.set(slot, variable)?;
    }
    Ok(set)
}
