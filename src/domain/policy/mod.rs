//! Authorization policy
//!
//! Decides whether a caller may act on a target user's credentials. Gates are
//! pure functions of the caller identity, the target and the action.

mod gate;

pub use gate::{require, Action, Decision, DenyAll, DenyReason, FullAccess, PolicyGate, SelfOrAdmin, Union};

#[cfg(test)]
pub use gate::MockPolicyGate;
