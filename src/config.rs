//! # Global runtime configuration.
//!
//! [`Config`] defines the dispatcher's behavior: channel capacities for the
//! registration, intake, and per-atom channels, the event bus capacity, and
//! the shutdown grace period.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use covalent::Config;
//!
//! let mut cfg = Config::default();
//! cfg.grace = Duration::from_secs(10);
//! cfg.intake_capacity = 8;
//!
//! assert_eq!(cfg.intake_capacity, 8);
//! ```

use std::time::Duration;

/// Global configuration for the dispatcher.
///
/// Controls channel capacities and the graceful-shutdown window.
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the runtime registration channel.
    ///
    /// `register` calls are non-blocking up to this many buffered entries.
    pub registration_capacity: usize,
    /// Capacity of the shared intake channel between conductor adapters and
    /// the distribution loop. Small values preserve back-pressure onto
    /// conductors that outpace the dispatcher.
    pub intake_capacity: usize,
    /// Capacity of each per-atom-kind instance channel.
    pub atom_capacity: usize,
    /// Capacity of the event bus channel.
    pub bus_capacity: usize,
    /// Maximum time `wait` spends waiting for workers after cancellation.
    pub grace: Duration,
}

impl Default for Config {
    /// Provides a default configuration:
    /// - `registration_capacity = 64`
    /// - `intake_capacity = 1` (rendezvous-like back-pressure)
    /// - `atom_capacity = 1`
    /// - `bus_capacity = 1024`
    /// - `grace = 30s`
    fn default() -> Self {
        Self {
            registration_capacity: 64,
            intake_capacity: 1,
            atom_capacity: 1,
            bus_capacity: 1024,
            grace: Duration::from_secs(30),
        }
    }
}
