use super::types::{PermissionScope, RequestKind};

/// Lifecycle of a single interaction.
///
/// `Received -> Handling -> Bound -> {Confirmed | Cancelled} -> Dismissed`.
/// A handler that fails on confirm goes `Confirmed -> Errored -> Dismissed`.
/// Confirmed and Cancelled hold while delivery is retried, and an undelivered
/// confirmation may still be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Received,
    Handling(RequestKind),
    Bound,
    Confirmed,
    Cancelled,
    Errored,
    Dismissed,
}

impl Phase {
    pub fn can_advance_to(self, next: Phase) -> bool {
        matches!(
            (self, next),
            (Phase::Received, Phase::Handling(_))
                | (Phase::Handling(_), Phase::Bound)
                | (Phase::Bound, Phase::Confirmed | Phase::Cancelled)
                | (Phase::Confirmed, Phase::Errored | Phase::Cancelled)
                | (
                    Phase::Confirmed | Phase::Cancelled | Phase::Errored,
                    Phase::Dismissed
                )
        )
    }

    pub fn is_terminal(self) -> bool {
        self == Phase::Dismissed
    }
}

/// One entry of the permission scope selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeInput {
    pub scope: PermissionScope,
    pub checked: bool,
}

impl ScopeInput {
    pub fn name(&self) -> &'static str {
        self.scope.name()
    }

    pub fn label_key(&self) -> &'static str {
        self.scope.label_key()
    }
}

/// Every known scope, checked iff it was requested.
pub fn scope_inputs(requested: &[PermissionScope]) -> Vec<ScopeInput> {
    PermissionScope::ALL
        .into_iter()
        .map(|scope| ScopeInput {
            scope,
            checked: requested.contains(&scope),
        })
        .collect()
}

pub fn selected_scopes(inputs: &[ScopeInput]) -> Vec<PermissionScope> {
    inputs
        .iter()
        .filter(|input| input.checked)
        .map(|input| input.scope)
        .collect()
}
