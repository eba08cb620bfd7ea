use serde::{Deserialize, Serialize};
use std::fmt;

/// Publishing lifecycle of a client deliverable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliverableState {
    /// Work in progress, not yet shown to the client
    Draft,
    /// Sent to the client for sign-off
    AwaitingApproval,
    /// Client signed off
    Approved,
    /// Under internal quality review
    InQa,
    /// Quality review found problems
    QaFailed,
    /// Passed review, ready to go out
    Ready,
    /// Live with the client
    Published,
    /// Retired; no further transitions
    Archived,
}

impl DeliverableState {
    /// Every state, in lifecycle order
    pub const ALL: [DeliverableState; 8] = [
        Self::Draft,
        Self::AwaitingApproval,
        Self::Approved,
        Self::InQa,
        Self::QaFailed,
        Self::Ready,
        Self::Published,
        Self::Archived,
    ];

    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Archived)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::AwaitingApproval => "awaiting_approval",
            Self::Approved => "approved",
            Self::InQa => "in_qa",
            Self::QaFailed => "qa_failed",
            Self::Ready => "ready",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for DeliverableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DeliverableState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| format!("Invalid deliverable state: {s}"))
    }
}

/// Default state for new deliverables
impl Default for DeliverableState {
    fn default() -> Self {
        Self::Draft
    }
}

/// Lifecycle of a running pipeline instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FactoryStatus {
    /// Not yet bootstrapped
    Idle,
    /// Progressing through stages
    Active,
    /// Cannot advance until the recorded blockers are resolved
    Blocked,
    /// Every stage traversed
    Completed,
    /// Final deliverable produced, awaiting external sign-off
    Delivered,
}

impl FactoryStatus {
    /// Check if this is a terminal state (no further mutations allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// Check if the factory still moves through stages and is subject to blocker evaluation
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::Idle | Self::Active | Self::Blocked)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Active => "ACTIVE",
            Self::Blocked => "BLOCKED",
            Self::Completed => "COMPLETED",
            Self::Delivered => "DELIVERED",
        }
    }
}

impl fmt::Display for FactoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FactoryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IDLE" => Ok(Self::Idle),
            "ACTIVE" => Ok(Self::Active),
            "BLOCKED" => Ok(Self::Blocked),
            "COMPLETED" => Ok(Self::Completed),
            "DELIVERED" => Ok(Self::Delivered),
            _ => Err(format!("Invalid factory status: {s}")),
        }
    }
}

impl Default for FactoryStatus {
    fn default() -> Self {
        Self::Idle
    }
}

/// Readiness of a deliverable tracked inside a factory.
///
/// Only moves forward: `Pending -> Ready -> Approved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageDeliverableStatus {
    Pending,
    Ready,
    Approved,
}

impl StageDeliverableStatus {
    /// The next status in the cycle, saturating at `Approved`
    pub fn next(&self) -> Self {
        match self {
            Self::Pending => Self::Ready,
            Self::Ready | Self::Approved => Self::Approved,
        }
    }

    /// Check if a stage requiring this deliverable may advance
    pub fn satisfies_stage(&self) -> bool {
        matches!(self, Self::Ready | Self::Approved)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Ready => "READY",
            Self::Approved => "APPROVED",
        }
    }
}

impl fmt::Display for StageDeliverableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StageDeliverableStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "READY" => Ok(Self::Ready),
            "APPROVED" => Ok(Self::Approved),
            _ => Err(format!("Invalid stage deliverable status: {s}")),
        }
    }
}

impl Default for StageDeliverableStatus {
    fn default() -> Self {
        Self::Pending
    }
}
