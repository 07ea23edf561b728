//! Sensor permission prompt

use core::future::Future;

/// Answer given by the platform permission dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PermissionResponse {
    /// User allowed sensor access
    Granted,
    /// User explicitly refused
    Denied,
}

/// The permission call itself failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PermissionError {
    /// The request was not made from a qualifying user gesture
    NoUserGesture,
    /// The platform rejected the call for another reason
    Platform,
}

/// Trait for platforms that gate orientation access behind a prompt
pub trait PermissionPrompt {
    /// Show the platform prompt and wait for the user's answer
    fn request(&mut self) -> impl Future<Output = Result<PermissionResponse, PermissionError>>;
}
