use anyhow::Result;
use std::io::Write;

use super::Selection;
use crate::package::PackageRecord;

/// Print what each manager reported.
///
/// Without `verbose` only packages that are not installed are shown.
/// Markers: `h` held, `i` installed, `_` not installed, `m` unknown to the
/// manager, `c` provided by a custom action.
pub fn print_selections<W: Write>(out: &mut W, selections: &[Selection], verbose: bool) -> Result<()> {
    for selection in selections {
        writeln!(out, "{} PACKAGES", selection.manager.name().to_uppercase())?;
        for record in &selection.records {
            let marker = if record.is_on_hold() {
                'h'
            } else if record.is_installed() {
                'i'
            } else {
                '_'
            };
            if verbose || marker == '_' {
                writeln!(out, "  {} {}", marker, record.name)?;
            }
        }
        for request in &selection.missing {
            writeln!(out, "  m {}", request.name)?;
        }
        for request in &selection.custom {
            writeln!(out, "  c {}", request.name)?;
        }
    }
    Ok(())
}

/// Installed, required and candidate versions of `records`, one per line.
pub fn write_status_table<W: Write>(out: &mut W, records: &[PackageRecord]) -> Result<()> {
    writeln!(out, "  {:<16} {:<14} {:<12} {:<14}", "Package Name", "Installed", "Required", "Candidate")?;
    writeln!(out, "  {:<16} {:<14} {:<12} {:<14}", "------------", "---------", "--------", "---------")?;
    for record in records {
        writeln!(
            out,
            "  {:<16} {:<14} {:<12} {:<14}",
            record.name,
            record.version_raw(),
            record.required_version_raw(),
            record.candidate_version_raw()
        )?;
    }
    Ok(())
}
