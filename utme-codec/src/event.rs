//! Event fragment rendering
//!
//! An event is rendered as one of four shapes:
//!
//! ```text
//! 5(category*action)
//! 5(category*action*label)
//! 5(category*action)(value)
//! 5(category*action*label)(value)
//! ```

use crate::types::Event;
use std::fmt;

/// Fragment tag that opens an event
pub(crate) const EVENT_TAG: &str = "5(";

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}*{}", EVENT_TAG, self.category, self.action)?;
        if let Some(label) = &self.label {
            write!(f, "*{}", label)?;
        }
        f.write_str(")")?;
        if let Some(value) = &self.value {
            write!(f, "({})", value)?;
        }
        Ok(())
    }
}
