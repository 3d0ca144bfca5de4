use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::core::{DateRange, OverlapGroup};

pub fn build_overlaps_table(groups: &[OverlapGroup]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table.set_header(vec!["Supplier", "Rate 1", "Period 1", "Rate 2", "Period 2", "Overlap", "Days"]);
    for group in groups {
        for pair in &group.pairs {
            let is_ongoing = pair.first.period.is_open_ended() && pair.second.period.is_open_ended();
            table.add_row(vec![
                Cell::new(format!("{} #{}", group.supplier_name, group.supplier_id)),
                Cell::new(pair.first.value).set_alignment(CellAlignment::Right),
                Cell::new(format_period(pair.first.period)).add_attribute(Attribute::Dim),
                Cell::new(pair.second.value).set_alignment(CellAlignment::Right),
                Cell::new(format_period(pair.second.period)).add_attribute(Attribute::Dim),
                Cell::new(format!("{} .. {}", pair.start, pair.end)).fg(if is_ongoing {
                    Color::Red
                } else {
                    Color::DarkYellow
                }),
                Cell::new(pair.n_days).set_alignment(CellAlignment::Right),
            ]);
        }
    }
    table
}

fn format_period(period: DateRange) -> String {
    match period.end {
        Some(end) => format!("{} .. {end}", period.start),
        None => format!("{} ..", period.start),
    }
}
