//! Process exit codes.
//!
//! Callers can tell configuration mistakes from bad input files and from
//! failures inside the reduction itself.

use crate::loader::LoadError;
use crate::reduce::ReduceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    /// Worker failure or any other runtime error
    GeneralError = 1,
    /// Bad strategy selector, worker count or too little input
    ConfigError = 2,
    /// Missing or malformed input file
    InputError = 3,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Success
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.code() as u8)
    }
}

impl From<&LoadError> for ExitCode {
    fn from(_: &LoadError) -> Self {
        ExitCode::InputError
    }
}

impl From<&ReduceError> for ExitCode {
    fn from(_: &ReduceError) -> Self {
        ExitCode::GeneralError
    }
}
