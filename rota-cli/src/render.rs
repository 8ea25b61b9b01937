//! Text and JSON rendering of solve results.
//!
//! The text layout prints one row per staff member: a `[..]` cell per day
//! holding a digit per service (or duty), an extra gap before each Monday,
//! then the per-column totals and the row total.

use std::io::{self, Write};

use rota_core::{RosterGrids, RosterOutcome, RosterReport, SolveStatus, StaffReport};
use serde::Serialize;

use crate::CliError;

/// Search figures shown alongside a roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct SearchSummary {
    pub(crate) status: &'static str,
    pub(crate) objective: Option<i64>,
    pub(crate) elapsed_ms: u64,
    pub(crate) attempts: u32,
    pub(crate) nodes: u64,
    pub(crate) failures: u64,
    pub(crate) restarts: u64,
    pub(crate) solutions: u64,
}

impl SearchSummary {
    fn new(outcome: &RosterOutcome) -> Self {
        Self {
            status: status_label(outcome.status),
            objective: outcome.objective,
            elapsed_ms: u64::try_from(outcome.stats.elapsed.as_millis()).unwrap_or(u64::MAX),
            attempts: outcome.attempts,
            nodes: outcome.stats.nodes,
            failures: outcome.stats.failures,
            restarts: outcome.stats.restarts,
            solutions: outcome.stats.solutions,
        }
    }
}

const fn status_label(status: SolveStatus) -> &'static str {
    match status {
        SolveStatus::Optimal => "optimal",
        SolveStatus::Feasible => "feasible",
        SolveStatus::Infeasible => "infeasible",
        SolveStatus::Unknown => "unknown",
    }
}

/// Everything `rota solve` prints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct SolveDocument {
    pub(crate) summary: SearchSummary,
    pub(crate) report: Option<RosterReport>,
}

impl SolveDocument {
    pub(crate) fn new(grids: &RosterGrids, outcome: &RosterOutcome) -> Self {
        Self {
            summary: SearchSummary::new(outcome),
            report: outcome
                .roster
                .as_ref()
                .map(|solved| RosterReport::new(grids, solved)),
        }
    }
}

pub(crate) fn write_json(writer: &mut dyn Write, document: &SolveDocument) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(document).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)
}

pub(crate) fn write_text(writer: &mut dyn Write, document: &SolveDocument) -> io::Result<()> {
    if let Some(report) = &document.report {
        writeln!(writer, "Shifts")?;
        write_grid(writer, report, &report.services, |staff| {
            (
                staff.shifts.as_slice(),
                staff.service_totals.as_slice(),
                staff.shift_total,
            )
        })?;
        writeln!(writer)?;
        writeln!(writer, "Standby")?;
        write_grid(writer, report, &report.duties, |staff| {
            (
                staff.standby.as_slice(),
                staff.duty_totals.as_slice(),
                staff.standby_total,
            )
        })?;
        writeln!(writer)?;
    }
    write_status(writer, &document.summary)
}

type Columns<'a> = (&'a [Vec<bool>], &'a [usize], usize);

fn write_grid(
    writer: &mut dyn Write,
    report: &RosterReport,
    names: &[String],
    columns: impl for<'a> Fn(&'a StaffReport) -> Columns<'a>,
) -> io::Result<()> {
    let width = report
        .staff
        .iter()
        .map(|member| member.name.chars().count())
        .max()
        .unwrap_or(0);
    for staff in &report.staff {
        let (cells, totals, total) = columns(staff);
        write!(writer, "{:<width$}  ", staff.name)?;
        for (day, cell) in cells.iter().enumerate() {
            if report.starts_week(day) {
                write!(writer, "   ")?;
            }
            let digits: String = cell
                .iter()
                .map(|&held| if held { '1' } else { '0' })
                .collect();
            write!(writer, "[{digits}] ")?;
        }
        for (name, count) in names.iter().zip(totals) {
            write!(writer, " {name}: {count}")?;
        }
        writeln!(writer, "  Total: {total}")?;
    }
    Ok(())
}

fn write_status(writer: &mut dyn Write, summary: &SearchSummary) -> io::Result<()> {
    write!(
        writer,
        "status: {} after {} ms",
        summary.status, summary.elapsed_ms
    )?;
    if let Some(objective) = summary.objective {
        write!(writer, ", objective {objective}")?;
    }
    writeln!(
        writer,
        " ({} attempts, {} nodes, {} failures, {} restarts)",
        summary.attempts, summary.nodes, summary.failures, summary.restarts
    )
}
