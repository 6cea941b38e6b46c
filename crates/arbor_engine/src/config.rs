//! Engine configuration.

/// What to do when two rules of equal rank match the same node.
///
/// The winner is always the rule with the higher declaration sequence; the
/// policy only decides whether the tie is reported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RecoveryPolicy {
    /// Pick the winner without comment.
    #[default]
    RecoverSilently,
    /// Pick the winner and emit a warning.
    RecoverWithWarnings,
    /// Fail the lookup with an ambiguous-match error.
    DoNotRecover,
}

/// Configuration shared by every mode a rule manager creates.
#[derive(Clone, Debug, Default)]
pub struct EngineConfig {
    /// Handling of ambiguous rule matches.
    pub recovery_policy: RecoveryPolicy,
    /// Emit a trace event for every dispatch decision.
    pub trace_dispatch: bool,
}

impl EngineConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration for stylesheet development: ties are warned about and
    /// every dispatch is traced.
    #[must_use]
    pub fn diagnostic() -> Self {
        Self {
            recovery_policy: RecoveryPolicy::RecoverWithWarnings,
            trace_dispatch: true,
        }
    }

    /// Configuration that treats ambiguous matches as errors.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            recovery_policy: RecoveryPolicy::DoNotRecover,
            trace_dispatch: false,
        }
    }

    /// Sets the recovery policy.
    #[must_use]
    pub fn with_recovery_policy(mut self, policy: RecoveryPolicy) -> Self {
        self.recovery_policy = policy;
        self
    }

    /// Enables or disables dispatch tracing.
    #[must_use]
    pub fn with_trace_dispatch(mut self, enabled: bool) -> Self {
        self.trace_dispatch = enabled;
        self
    }
}
