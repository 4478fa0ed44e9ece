//! Policy gate trait and its implementations

use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

use crate::domain::user::{Caller, UserId};
use crate::domain::DomainError;

/// Actions guarded by a policy gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ModifyCredentials,
    ListCredentials,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ModifyCredentials => write!(f, "ModifyCredentials"),
            Self::ListCredentials => write!(f, "ListCredentials"),
        }
    }
}

/// Why a gate refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// Caller is neither the target nor an administrator
    NotOwnerOrAdmin { caller: UserId },
    /// Gate refuses everything
    Unconditional { policy: &'static str },
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotOwnerOrAdmin { caller } => {
                write!(f, "user {} is neither the target nor an administrator", caller)
            }
            Self::Unconditional { policy } => write!(f, "{} refuses all actions", policy),
        }
    }
}

/// Outcome of a policy check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Capability check consulted before any credential access
#[cfg_attr(test, automock)]
pub trait PolicyGate: Send + Sync {
    fn check(&self, caller: &Caller, target: UserId, action: Action) -> Decision;
}

/// Convert a gate's decision into a result, `PolicyDenied` on refusal
pub fn require(
    gate: &dyn PolicyGate,
    caller: &Caller,
    target: UserId,
    action: Action,
) -> Result<(), DomainError> {
    match gate.check(caller, target, action) {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => Err(DomainError::policy_denied(
            action.to_string(),
            target.value(),
            reason.to_string(),
        )),
    }
}

/// Self-service or administrative override, for every action
#[derive(Debug, Clone, Copy, Default)]
pub struct SelfOrAdmin;

impl PolicyGate for SelfOrAdmin {
    fn check(&self, caller: &Caller, target: UserId, _action: Action) -> Decision {
        if caller.user_id() == target || caller.is_admin() {
            Decision::Allow
        } else {
            Decision::Deny(DenyReason::NotOwnerOrAdmin {
                caller: caller.user_id(),
            })
        }
    }
}

/// Rejects every request
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

impl PolicyGate for DenyAll {
    fn check(&self, _caller: &Caller, _target: UserId, _action: Action) -> Decision {
        Decision::Deny(DenyReason::Unconditional { policy: "DenyAll" })
    }
}

/// Allows every request
#[derive(Debug, Clone, Copy, Default)]
pub struct FullAccess;

impl PolicyGate for FullAccess {
    fn check(&self, _caller: &Caller, _target: UserId, _action: Action) -> Decision {
        Decision::Allow
    }
}

/// Allows when either inner gate allows; reports the first gate's reason otherwise
#[derive(Clone)]
pub struct Union {
    first: Arc<dyn PolicyGate>,
    second: Arc<dyn PolicyGate>,
}

impl Union {
    pub fn new(first: Arc<dyn PolicyGate>, second: Arc<dyn PolicyGate>) -> Self {
        Self { first, second }
    }
}

impl PolicyGate for Union {
    fn check(&self, caller: &Caller, target: UserId, action: Action) -> Decision {
        match self.first.check(caller, target, action) {
            Decision::Allow => Decision::Allow,
            denied => {
                if self.second.check(caller, target, action).is_allowed() {
                    Decision::Allow
                } else {
                    denied
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTIONS: [Action; 2] = [Action::ModifyCredentials, Action::ListCredentials];

    #[test]
    fn test_self_service_always_allowed() {
        let caller = Caller::standard(3);
        for action in ACTIONS {
            assert_eq!(SelfOrAdmin.check(&caller, UserId::new(3), action), Decision::Allow);
        }
    }

    #[test]
    fn test_standard_user_denied_on_other_target() {
        let caller = Caller::standard(3);
        for action in ACTIONS {
            assert_eq!(
                SelfOrAdmin.check(&caller, UserId::new(4), action),
                Decision::Deny(DenyReason::NotOwnerOrAdmin {
                    caller: UserId::new(3)
                })
            );
        }
    }

    #[test]
    fn test_administrator_allowed_on_other_target() {
        let caller = Caller::administrator(1);
        for action in ACTIONS {
            assert!(SelfOrAdmin.check(&caller, UserId::new(4), action).is_allowed());
        }
    }

    #[test]
    fn test_require_maps_denial_to_policy_denied() {
        let caller = Caller::standard(3);
        let err = require(&SelfOrAdmin, &caller, UserId::new(4), Action::ModifyCredentials)
            .unwrap_err();

        match err {
            DomainError::PolicyDenied { action, target, .. } => {
                assert_eq!(action, "ModifyCredentials");
                assert_eq!(target, 4);
            }
            other => panic!("expected PolicyDenied, got {:?}", other),
        }
    }

    #[test]
    fn test_deny_all_and_full_access() {
        let admin = Caller::administrator(1);
        assert!(!DenyAll.check(&admin, UserId::new(1), Action::ListCredentials).is_allowed());
        assert!(FullAccess
            .check(&Caller::standard(2), UserId::new(9), Action::ModifyCredentials)
            .is_allowed());
    }

    #[test]
    fn test_union_allows_if_either_allows() {
        let union = Union::new(Arc::new(DenyAll), Arc::new(SelfOrAdmin));
        let caller = Caller::standard(5);

        assert!(union.check(&caller, UserId::new(5), Action::ListCredentials).is_allowed());
        assert_eq!(
            union.check(&caller, UserId::new(6), Action::ListCredentials),
            Decision::Deny(DenyReason::Unconditional { policy: "DenyAll" })
        );
    }
}
