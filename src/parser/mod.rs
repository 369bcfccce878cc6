//! Text parsers for package manager output.
//!
//! Backend commands are treated as opaque text protocols. A line that does
//! not match its pattern is reported as "not found" rather than an error.

pub mod apt;
pub mod pip;

pub use apt::{AptPolicy, DPKG_QUERY_FORMAT, parse_apt_policy, parse_dpkg_line, parse_dpkg_listing};
pub use pip::{parse_pip_list, parse_pip_list_line, parse_pip_search, search_term};
