use near_sdk::env::panic_str;
use near_sdk::FunctionError;

/// Ledger errors. Both are detected before any state change.
#[cfg_attr(not(target_arch = "wasm32"), derive(PartialEq))]
#[derive(Debug, Clone, Copy)]
pub enum VotingError {
    /// question id is not lower than the number of questions.
    InvalidQuestion,
    /// answer index is not 0 or 1.
    InvalidAnswerIndex,
}

impl FunctionError for VotingError {
    fn panic(&self) -> ! {
        match self {
            VotingError::InvalidQuestion => panic_str("Invalid question"),
            VotingError::InvalidAnswerIndex => panic_str("Invalid answer index"),
        }
    }
}
