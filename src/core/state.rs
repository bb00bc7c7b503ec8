//! Loop state types

/// Where the conversation loop currently is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoopState {
    /// Not started yet
    #[default]
    Idle,

    /// Waiting for the model's next reply
    AwaitingModel {
        /// Round number of the outstanding call
        round: usize,
    },

    /// Blocked on the operator (confirmation or requested input)
    AwaitingOperator {
        /// Tool that triggered the suspension
        tool_name: String,
    },

    /// Running a tool handler
    Dispatching {
        /// Name of the tool being executed
        tool_name: String,
    },

    /// The model produced a final answer
    Final,

    /// The run ended with a fatal error
    Failed {
        /// Error message
        message: String,
    },
}

impl LoopState {
    /// Create a failed state
    pub fn failed(msg: impl Into<String>) -> Self {
        LoopState::Failed {
            message: msg.into(),
        }
    }
}
