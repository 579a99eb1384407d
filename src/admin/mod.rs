//! Pages only administrators can reach.

pub mod users;
