//! Registration form state and its reducer.
//!
//! [`FormState`] is only ever changed by [`reduce`], which takes the current
//! state and one [`FormEvent`] and returns the next state. The TUI turns key
//! presses into events; the app feeds transport results back in as
//! [`FormEvent::SubmitSucceeded`] or [`FormEvent::SubmitFailed`].

mod event;
mod state;

pub use event::{FailureKind, FormEvent, MembersKind, TextField};
pub use state::{Dialog, DialogKind, FormState, SubmitStatus, reduce};
