//! utme Codec Library
//!
//! Encodes and decodes the `utme` parameter of the legacy `__utm.gif`
//! analytics beacon: one event and up to five custom variables packed into a
//! single positional string.
//!
//! # Architecture
//!
//! This library is intentionally minimal and focused on the wire format:
//! - Renders an event as `5(category*action*label)(value)`
//! - Renders custom variables as `8(names)9(values)11(scopes)` with slot
//!   markers only where a gap makes positions ambiguous
//! - Parses both fragments back from a stored string
//!
//! The library does NOT:
//! - Send requests or know about HTTP
//! - Fill in beacon defaults (account id, random ids, version)
//! - Enforce the 64 byte name+value limit of the receiving service
//!
//! Request building is in the application layer (utme-cli).
//!
//! # Example Usage
//!
//! ```
//! use utme_codec::{CustomVariable, Event, Utme};
//!
//! let mut utme = Utme::new();
//! utme.set_event(Event::new("video", "play").with_label("intro"))
//!     .set_custom_variable(1, CustomVariable::new("plan", "pro").with_scope("1"))
//!     .unwrap()
//!     .set_custom_variable(4, CustomVariable::new("ab", "b"))
//!     .unwrap();
//!
//! let wire = utme.serialize();
//! assert_eq!(wire, "5(video*play*intro)8(plan*4!ab)9(pro*4!b)11(1)");
//!
//! // Rehydrate, mutate, re-send
//! let mut stored = Utme::parse(wire.as_str()).unwrap();
//! stored.unset_custom_variable(4).unwrap();
//! assert_eq!(stored.serialize(), "5(video*play*intro)8(plan)9(pro)11(1)");
//! ```

// Public modules
pub mod custom_vars;
pub mod types;
pub mod utme;

// Re-export main types for convenience
pub use custom_vars::CustomVariableSet;
pub use types::{check_slot, CustomVariable, Event, Result, UtmeError, VALID_SLOTS};
pub use utme::{Utme, UtmeInput};

// Internal modules (not exposed in public API)
mod event;
mod grammar;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
