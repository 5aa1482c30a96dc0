//! Quiz session controller: a pure state machine over the application's
//! screens.
//!
//! The controller follows the reducer pattern. [`AppState`] is plain data,
//! [`Msg`] names everything that can happen, and [`update`] maps one onto
//! the other while emitting [`Effect`]s for the driver to execute (storage
//! writes, pipeline runs). Nothing in this module performs I/O, which is
//! what makes the full screen flow testable without a network or a
//! filesystem.
//!
//! ## Screen flow
//!
//! ```text
//! Login ──▶ ApiKeySetup ──▶ Dashboard ⇄ Upload ──▶ Processing
//!                               │                      │
//!                             Review ◀─ Results ◀─ Quiz ◀─ Generating
//! ```
//!
//! `Error` is reachable from the pipeline screens and routes back to
//! `Upload` or `ApiKeySetup` depending on what is still valid.

mod effect;
mod msg;
mod state;
mod update;

pub use effect::Effect;
pub use msg::Msg;
pub use state::{ActiveQuiz, AppState, ReviewSession, View};
pub use update::{update, EMPTY_QUIZ_MESSAGE};
