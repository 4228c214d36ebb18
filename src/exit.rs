// src/exit.rs
//! Process exit codes for `reeltree`, stable for scripting.

use std::process::Termination;

use crate::error::ReelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ReelExit {
    /// Command completed.
    Success = 0,
    /// I/O, parse or config failure.
    Error = 1,
    /// Unknown layout or group key.
    InvalidInput = 2,
    /// Nothing to show: no data, or a search matched no node.
    EmptyResult = 3,
}

impl ReelExit {
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Classifies a handler failure, looking through `anyhow` context for a
    /// library error.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<ReelError>() {
            Some(e) if e.is_invalid_input() => Self::InvalidInput,
            Some(ReelError::EmptyInput | ReelError::EmptyGraph) => Self::EmptyResult,
            _ => Self::Error,
        }
    }
}

impl Termination for ReelExit {
    fn report(self) -> std::process::ExitCode {
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        std::process::ExitCode::from(self.code() as u8)
    }
}
