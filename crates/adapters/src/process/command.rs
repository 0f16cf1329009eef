// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OS process runner

use super::{JobExit, JobHandle, JobRunner, ProcessError};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::{Child, Command};

/// Runs `<program> <args...> <job>` as a child process
#[derive(Debug, Clone)]
pub struct CommandRunner {
    program: String,
    args: Vec<String>,
}

impl CommandRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

#[async_trait]
impl JobRunner for CommandRunner {
    type Handle = ChildHandle;

    async fn start(&self, job: &str) -> Result<ChildHandle, ProcessError> {
        // The job never reads input; stdout and stderr stay attached
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(job)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProcessError::Launch {
                program: self.program.clone(),
                source,
            })?;
        Ok(ChildHandle { child })
    }
}

/// Handle to a job started by [`CommandRunner`]
#[derive(Debug)]
pub struct ChildHandle {
    child: Child,
}

#[async_trait]
impl JobHandle for ChildHandle {
    fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    async fn wait(&mut self) -> Result<JobExit, ProcessError> {
        let status = self.child.wait().await.map_err(ProcessError::Wait)?;
        Ok(JobExit::from(status))
    }

    fn try_wait(&mut self) -> Result<Option<JobExit>, ProcessError> {
        let status = self.child.try_wait().map_err(ProcessError::Wait)?;
        Ok(status.map(JobExit::from))
    }

    fn terminate(&mut self) -> Result<(), ProcessError> {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        // Already reaped: nothing to signal
        let Some(pid) = self.child.id() else {
            return Ok(());
        };
        let pid = i32::try_from(pid).map_err(|e| ProcessError::Signal(e.to_string()))?;
        match kill(Pid::from_raw(pid), Signal::SIGTERM) {
            Ok(()) | Err(nix::errno::Errno::ESRCH) => Ok(()),
            Err(e) => Err(ProcessError::Signal(e.to_string())),
        }
    }

    fn kill(&mut self) -> Result<(), ProcessError> {
        match self.child.start_kill() {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => Ok(()),
            Err(e) => Err(ProcessError::Signal(e.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
