//! Downstream integrations for the GramaSathi agent
//!
//! Actionable intents (complaints, pension and welfare requests) are
//! forwarded to the action server, known as M3, which files them with the
//! responsible office.

pub mod action;

pub use action::{
    create_dispatcher, ActionError, HttpActionClient, NoopActionDispatcher, STATUS_DISABLED,
    STATUS_UNREACHABLE,
};
