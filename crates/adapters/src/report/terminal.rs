// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal reporter
//!
//! Renders the classic console transcript:
//!
//! ```text
//! Waiting for project "web" playbook "deploy.yml" to become idle....
//! Running playbook
//! ```
//!
//! Every write is flushed so progress dots show up while waiting.

use super::ReportAdapter;
use std::io::Write;
use std::sync::{Arc, Mutex};
use sz_core::LockEvent;

type Sink = Box<dyn Write + Send>;

struct Streams {
    out: Sink,
    err: Sink,
    /// A waiting line has been started and not yet terminated
    line_open: bool,
}

/// Reporter writing human-readable progress to stdout and stderr
#[derive(Clone)]
pub struct TerminalReporter {
    streams: Arc<Mutex<Streams>>,
}

impl TerminalReporter {
    /// Reporter on the process's stdout and stderr
    pub fn stdio() -> Self {
        Self::with_writers(std::io::stdout(), std::io::stderr())
    }

    pub fn with_writers(out: impl Write + Send + 'static, err: impl Write + Send + 'static) -> Self {
        Self {
            streams: Arc::new(Mutex::new(Streams {
                out: Box::new(out),
                err: Box::new(err),
                line_open: false,
            })),
        }
    }
}

impl Streams {
    fn render(&mut self, event: &LockEvent) -> std::io::Result<()> {
        if event.ends_wait() && self.line_open {
            writeln!(self.out)?;
            self.line_open = false;
        }

        match event {
            LockEvent::Waiting { project, job } => {
                write!(
                    self.out,
                    "Waiting for project \"{project}\" playbook \"{job}\" to become idle"
                )?;
                self.line_open = true;
            }
            LockEvent::Polled { .. } => write!(self.out, ".")?,
            LockEvent::AlreadyWaiting { project, job } => writeln!(
                self.out,
                "Project \"{project}\" playbook \"{job}\" is already waiting"
            )?,
            LockEvent::Blocked { project, .. } => {
                writeln!(self.out, "Project \"{project}\" is blocked")?
            }
            LockEvent::TimedOut { project, job } => writeln!(
                self.out,
                "Timed out waiting for project \"{project}\" playbook \"{job}\""
            )?,
            LockEvent::JobStarted { .. } => writeln!(self.out, "Running playbook")?,
            LockEvent::Interrupted { .. } => {
                self.out.flush()?;
                writeln!(self.err, "Interrupted")?;
                self.err.flush()?;
            }
            LockEvent::Activated { .. }
            | LockEvent::JobExited { .. }
            | LockEvent::TerminateRequested { .. }
            | LockEvent::Killed { .. }
            | LockEvent::Deactivated { .. } => {}
        }
        self.out.flush()
    }
}

impl ReportAdapter for TerminalReporter {
    fn report(&self, event: &LockEvent) {
        let mut streams = self.streams.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = streams.render(event) {
            tracing::debug!(event = event.name(), error = %e, "failed to write progress");
        }
    }
}

#[cfg(test)]
#[path = "terminal_tests.rs"]
mod tests;
