use chrono::{Datelike, Local};
use comfy_table::{Attribute, Cell, CellAlignment, Table, modifiers, presets};

use crate::{
    core::{rollover::AggregationState, totals::DAYS_PER_WEEK},
    quantity::energy::KilowattHours,
};

const WEEKDAYS: [&str; DAYS_PER_WEEK] =
    ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"];

/// Render the weekly state: one row per weekday, today in bold, untouched
/// slots dimmed, and the recomputed week totals at the bottom.
#[must_use]
pub fn build_weekly_table(state: &AggregationState) -> Table {
    let today = Local::now().weekday().num_days_from_monday() as usize;

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table.set_header(vec!["Day", "Energy", "Cost"]);

    for (index, weekday) in WEEKDAYS.iter().enumerate() {
        let tally = state.weekly.day(index);
        let mut day_cell = Cell::new(weekday);
        if index == today {
            day_cell = day_cell.add_attribute(Attribute::Bold);
        }
        let mut energy_cell = Cell::new(tally.energy).set_alignment(CellAlignment::Right);
        let mut cost_cell = Cell::new(tally.cost).set_alignment(CellAlignment::Right);
        if tally.energy == KilowattHours::ZERO {
            energy_cell = energy_cell.add_attribute(Attribute::Dim);
            cost_cell = cost_cell.add_attribute(Attribute::Dim);
        }
        table.add_row(vec![day_cell, energy_cell, cost_cell]);
    }

    table.add_row(vec![
        Cell::new(format!("Week {}", state.weekly.last_reset_week)).add_attribute(Attribute::Bold),
        Cell::new(state.weekly.energy)
            .set_alignment(CellAlignment::Right)
            .add_attribute(Attribute::Bold),
        Cell::new(state.weekly.cost)
            .set_alignment(CellAlignment::Right)
            .add_attribute(Attribute::Bold),
    ]);
    table
}
