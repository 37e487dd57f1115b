//! Terminal rendering of cycle reports

use comfy_table::{modifiers, presets, Attribute, Cell, Color, Table};
use rust_decimal::Decimal;
use std::io::{Stdout, Write};
use tracing::warn;

use super::traits::CycleHandler;
use super::types::ActionType;
use crate::strategy::{CycleReport, CycleStatus};

pub const HEADERS: [&str; 9] = [
    "Action",
    "Previous Price",
    "Action Price",
    "Symbol",
    "Amount",
    "Trigger",
    "Change",
    "Date",
    "Status",
];

/// Prints one table per cycle
pub struct TableReporter<W> {
    out: W,
    cycles: usize,
}

impl TableReporter<Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TableReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out, cycles: 0 }
    }

    /// Number of cycles rendered so far
    pub fn cycles(&self) -> usize {
        self.cycles
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Build the table for one report
pub fn render(report: &CycleReport) -> Table {
    let row = &report.row;

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS);

    table.set_header(
        HEADERS
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );

    let action_cell = match row.action_type {
        ActionType::Buy => Cell::new(row.action_type).fg(Color::Green),
        ActionType::Sell => Cell::new(row.action_type).fg(Color::Red),
        ActionType::Idle => Cell::new(row.action_type),
    };

    let change_cell = if row.change_percent > Decimal::ZERO {
        Cell::new(format!("+{}%", row.change_percent)).fg(Color::Green)
    } else if row.change_percent < Decimal::ZERO {
        Cell::new(format!("{}%", row.change_percent)).fg(Color::Red)
    } else {
        Cell::new(format!("{}%", row.change_percent))
    };

    table.add_row(vec![
        action_cell,
        Cell::new(row.previous_price),
        Cell::new(row.action_price),
        Cell::new(&row.symbol),
        Cell::new(
            row.quantity
                .map(|q| q.normalize().to_string())
                .unwrap_or_else(|| "-".to_string()),
        ),
        Cell::new(format!("{}%", row.threshold)),
        change_cell,
        Cell::new(row.timestamp.format("%Y-%m-%d %H:%M:%S")),
        status_cell(&report.status),
    ]);

    table
}

fn status_cell(status: &CycleStatus) -> Cell {
    match status {
        CycleStatus::Idle => Cell::new("idle"),
        CycleStatus::Suppressed(reason) => Cell::new(format!("suppressed: {}", reason)),
        CycleStatus::Executed { order_id } => {
            Cell::new(format!("order {}", order_id)).fg(Color::Green)
        }
        CycleStatus::Simulated => Cell::new("dry run").fg(Color::Cyan),
        CycleStatus::Failed(reason) => Cell::new(format!("failed: {}", reason)).fg(Color::Red),
        CycleStatus::Unrecorded(reason) => Cell::new(format!("NOT RECORDED: {}", reason))
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
    }
}

impl<W: Write + Send> CycleHandler for TableReporter<W> {
    fn handle_cycle(&mut self, report: &CycleReport) {
        self.cycles += 1;
        if let Err(e) = writeln!(self.out, "{}", render(report)) {
            warn!("Failed to print cycle report: {}", e);
        }
    }

    fn on_terminate(&mut self) {
        if let Err(e) = writeln!(self.out, "Stopped after {} cycles.", self.cycles) {
            warn!("Failed to print summary: {}", e);
        }
    }
}
