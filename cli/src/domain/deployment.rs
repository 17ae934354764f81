//! Template deployment state machine.
//!
//! Pure functions only, no I/O.

use std::fmt;
use std::time::Duration;

/// Provisioning state of one template deployment.
///
/// `Running` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningState {
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl ProvisioningState {
    /// Parse the provider's `provisioningState` string (case-insensitive).
    ///
    /// Intermediate provider states (`Accepted`, `Running`, `Deploying`, …)
    /// all collapse to [`ProvisioningState::Running`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("Succeeded") {
            Self::Succeeded
        } else if raw.eq_ignore_ascii_case("Failed") {
            Self::Failed
        } else if raw.eq_ignore_ascii_case("Canceled") || raw.eq_ignore_ascii_case("Cancelled") {
            Self::Cancelled
        } else {
            Self::Running
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl fmt::Display for ProvisioningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Running => "Running",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Cancelled => "Cancelled",
        })
    }
}

/// One submission of the instance template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentRun {
    pub resource_group: String,
    pub name: String,
    pub state: ProvisioningState,
    /// Time spent sleeping between refreshes.
    pub elapsed: Duration,
    /// Number of status refreshes performed.
    pub refreshes: u32,
}

impl DeploymentRun {
    #[must_use]
    pub fn submitted(resource_group: &str, name: &str, state: ProvisioningState) -> Self {
        Self {
            resource_group: resource_group.to_string(),
            name: name.to_string(),
            state,
            elapsed: Duration::ZERO,
            refreshes: 0,
        }
    }

    /// Record a refreshed state. Terminal states are final.
    pub fn observe(&mut self, state: ProvisioningState, slept: Duration) {
        if self.state.is_terminal() {
            return;
        }
        self.state = state;
        self.elapsed += slept;
        self.refreshes += 1;
    }
}
