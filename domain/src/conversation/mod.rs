//! Conversation domain module
//!
//! A run is a sequence of [`Turn`]s held in a [`ConversationState`]. The
//! model sees the whole state on every call and answers with a
//! [`ModelResponse`] whose first [`Candidate`] drives the next step.

pub mod entities;
pub mod outcome;
pub mod response;

pub use entities::{ConversationState, Part, Role, Turn};
pub use outcome::Termination;
pub use response::{Candidate, ModelResponse};
