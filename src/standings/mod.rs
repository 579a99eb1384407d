//! The league table of a tournament's group phase.

pub mod compute;
pub mod view;
