//! Runtime abstraction for system operations.
//!
//! This module provides a trait-based abstraction over everything the
//! reconciliation engine needs from the host, enabling dependency injection
//! and testability.
//!
//! # Structure
//!
//! - `path` - Path utility functions (normalize, resolve_relative_path)
//! - `env` - Privilege and platform information
//! - `fs` - File system queries
//! - `process` - Shell execution, command output capture and console output

mod env;
mod fs;
pub mod path;
mod process;

use anyhow::Result;
use std::path::{Path, PathBuf};

pub use path::resolve_relative_path;

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    // File System
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn exists(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;

    /// Canonicalize a path by resolving all symlinks and returning the canonical absolute path.
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;

    // Privilege
    fn is_privileged(&self) -> bool;

    /// Host platform descriptor, e.g. `Linux-5.15.0-91-generic-x86_64-with-ubuntu-22.04-jammy`.
    fn platform(&self) -> String;

    // Processes
    /// Run a command line through the shell with inherited stdio.
    /// Returns whether the command exited successfully.
    fn run_shell(&self, command: &str) -> Result<bool>;

    /// Run a program and capture its stdout. Stderr is discarded and a
    /// non-zero exit status is not an error.
    fn read_command(&self, program: &str, args: &[String]) -> Result<String>;

    // Console
    /// Write one line of user-facing output to stdout.
    fn print_line(&self, line: &str);
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.exists_impl(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.is_file_impl(path)
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        self.canonicalize_impl(path)
    }

    fn is_privileged(&self) -> bool {
        self.is_privileged_impl()
    }

    fn platform(&self) -> String {
        self.platform_impl()
    }

    fn run_shell(&self, command: &str) -> Result<bool> {
        self.run_shell_impl(command)
    }

    fn read_command(&self, program: &str, args: &[String]) -> Result<String> {
        self.read_command_impl(program, args)
    }

    fn print_line(&self, line: &str) {
        self.print_line_impl(line)
    }
}
