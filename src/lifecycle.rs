// ABOUTME: Delayed process termination so HTTP responses flush before the listener dies
// ABOUTME: The exit primitive is a trait object, letting tests record codes instead of exiting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 dexctl contributors

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Delay between scheduling an exit and performing it. Long enough for the
/// final response body to reach the browser's socket buffer, short enough
/// that the command still feels instant.
pub const EXIT_DELAY: Duration = Duration::from_millis(300);

/// The primitive that actually ends the process.
pub trait ProcessExit: Send + Sync {
    fn exit(&self, code: i32);
}

/// Production exit: terminates the process.
pub struct OsExit;

impl ProcessExit for OsExit {
    fn exit(&self, code: i32) {
        std::process::exit(code);
    }
}

/// Schedules a delayed, detached process exit.
///
/// The caller is never blocked: scheduling spawns a task that sleeps for the
/// configured delay and then invokes the exit primitive. If several terminal
/// branches race, the first exit to fire wins and the rest are moot.
#[derive(Clone)]
pub struct ExitScheduler {
    delay: Duration,
    process: Arc<dyn ProcessExit>,
}

impl ExitScheduler {
    #[must_use]
    pub fn new(delay: Duration, process: Arc<dyn ProcessExit>) -> Self {
        Self { delay, process }
    }

    /// Scheduler with the standard delay and the real process exit.
    #[must_use]
    pub fn with_os_exit() -> Self {
        Self::new(EXIT_DELAY, Arc::new(OsExit))
    }

    /// Schedule the process to exit with `code` after the delay. Returns
    /// immediately.
    pub fn schedule(&self, code: i32) {
        debug!("scheduling process exit with code {code}");
        let process = Arc::clone(&self.process);
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            process.exit(code);
        });
    }
}
