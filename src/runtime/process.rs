//! Shell execution, command output capture and console output.

use anyhow::{Context, Result};
use duct::cmd;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn run_shell_impl(&self, command: &str) -> Result<bool> {
        let output = cmd("sh", ["-c", command])
            .unchecked()
            .run()
            .with_context(|| format!("Failed to run '{}'", command))?;
        Ok(output.status.success())
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn read_command_impl(&self, program: &str, args: &[String]) -> Result<String> {
        let output = cmd(program, args)
            .stdout_capture()
            .stderr_null()
            .unchecked()
            .run()
            .with_context(|| format!("Failed to run '{}'", program))?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    pub(crate) fn print_line_impl(&self, line: &str) {
        println!("{}", line);
    }
}
