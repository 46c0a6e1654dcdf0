//! Model endpoint domain - transport-agnostic contract and value types

mod provider;
mod pull;
mod response;

pub use provider::{ModelEndpoint, PullStream};
pub use pull::{PullProgress, PullState, PULL_SUCCESS_STATUS};
pub use response::{RawModelResponse, TokenUsage};

#[cfg(test)]
pub use provider::mock::ScriptedEndpoint;
#[cfg(test)]
pub use provider::MockModelEndpoint;
