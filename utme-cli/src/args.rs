//! Parsing of `--event`, `--var` and `--unset` values

use std::str::FromStr;
use utme_codec::{check_slot, CustomVariable, Event, UtmeError};

#[derive(Debug, thiserror::Error)]
pub enum ArgError {
    #[error("Expected CATEGORY,ACTION[,LABEL[,VALUE]], got {0:?}")]
    BadEvent(String),

    #[error("Expected SLOT=NAME=VALUE[=SCOPE], got {0:?}")]
    BadVariable(String),

    #[error("Slot is not a number: {0:?}")]
    BadSlot(String),

    #[error(transparent)]
    Codec(#[from] UtmeError),
}

/// `--event CATEGORY,ACTION[,LABEL[,VALUE]]`
#[derive(Debug, Clone, PartialEq)]
pub struct EventArg(pub Event);

impl FromStr for EventArg {
    type Err = ArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() < 2 || parts.len() > 4 || parts.iter().any(|p| p.is_empty()) {
            return Err(ArgError::BadEvent(s.to_string()));
        }

        let mut event = Event::new(parts[0], parts[1]);
        event.label = parts.get(2).map(|l| l.to_string());
        event.value = parts.get(3).map(|v| v.to_string());
        Ok(EventArg(event))
    }
}

/// `--var SLOT=NAME=VALUE[=SCOPE]`
#[derive(Debug, Clone, PartialEq)]
pub struct VarArg {
    pub slot: usize,
    pub variable: CustomVariable,
}

impl FromStr for VarArg {
    type Err = ArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.splitn(4, '=').collect();
        if parts.len() < 3 || parts[1].is_empty() || parts[2].is_empty() {
            return Err(ArgError::BadVariable(s.to_string()));
        }

        let slot = parse_slot(parts[0])?;
        let mut variable = CustomVariable::new(parts[1], parts[2]);
        variable.scope = parts.get(3).filter(|s| !s.is_empty()).map(|s| s.to_string());
        Ok(VarArg { slot, variable })
    }
}

/// Parse and range-check a slot number
pub fn parse_slot(s: &str) -> Result<usize, ArgError> {
    let slot = s
        .trim()
        .parse::<usize>()
        .map_err(|_| ArgError::BadSlot(s.to_string()))?;
    check_slot(slot)?;
    Ok(slot)
}
