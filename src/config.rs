//! Configuration options for the auth controller

use std::time::Duration;

use crate::error::Error;

const EVENT_BUFFER_VAR: &str = "HOME_HELPER_EVENT_BUFFER";
const REPOSITORY_TIMEOUT_VAR: &str = "HOME_HELPER_REPOSITORY_TIMEOUT_MS";

/// Configuration options for the auth controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Capacity of the pending event queue
    pub event_buffer: usize,

    /// Upper bound on the repository work done for one event. `None` waits forever.
    pub repository_timeout: Option<Duration>,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            event_buffer: 32,
            repository_timeout: None,
        }
    }
}

impl ControllerOptions {
    /// Set the event queue capacity
    pub fn with_event_buffer(mut self, value: usize) -> Self {
        self.event_buffer = value;
        self
    }

    /// Set the per-event repository timeout
    pub fn with_repository_timeout(mut self, value: Option<Duration>) -> Self {
        self.repository_timeout = value;
        self
    }

    /// Build options from `HOME_HELPER_*` environment variables, falling back
    /// to the defaults for unset ones.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Self::default();

        if let Some(value) = lookup(EVENT_BUFFER_VAR) {
            options.event_buffer = parse_positive(EVENT_BUFFER_VAR, &value)?;
        }
        if let Some(value) = lookup(REPOSITORY_TIMEOUT_VAR) {
            let millis = parse_positive(REPOSITORY_TIMEOUT_VAR, &value)?;
            options.repository_timeout = Some(Duration::from_millis(millis as u64));
        }

        options.validate()?;
        Ok(options)
    }

    /// Reject values tokio channels cannot be built with
    pub fn validate(&self) -> Result<(), Error> {
        if self.event_buffer == 0 {
            return Err(Error::config("event_buffer must be greater than zero"));
        }
        if self.repository_timeout == Some(Duration::ZERO) {
            return Err(Error::config("repository_timeout must be greater than zero"));
        }
        Ok(())
    }
}

fn parse_positive(key: &str, value: &str) -> Result<usize, Error> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err(Error::config(format!("{} must be greater than zero", key))),
        Ok(parsed) => Ok(parsed),
        Err(e) => Err(Error::config(format!("{} is not a number: {}", key, e))),
    }
}
