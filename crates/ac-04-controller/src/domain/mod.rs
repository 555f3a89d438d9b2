//! Domain layer: states, actions and the transition function.

pub mod action;
pub mod errors;
pub mod machine;
pub mod state;
pub mod timing;
