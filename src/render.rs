use breach_lens::analysis::CategoryBreakdown;
use breach_lens::{AggregateGroup, BreachRecord, ChartSink, ChartSlot, ChartView};
use colored::*;
use serde::Serialize;
use tracing::error;

/// Prints each chart slot as a plain terminal table.
pub struct TableSink;

impl ChartSink for TableSink {
    fn on_load_failed(&self, reason: &str) {
        eprintln!("{} {}", "Could not load breach data:".red(), reason);
    }

    fn render(&self, slot: ChartSlot, view: ChartView<'_>) {
        println!();
        println!("{}", slot.title().bold().cyan());
        match view {
            ChartView::Records(records) => print_records(records),
            ChartView::Groups(groups) => print_groups(groups),
            ChartView::Breakdown(breakdown) => print_breakdown(breakdown),
        }
    }
}

fn print_records(records: &[BreachRecord]) {
    if records.is_empty() {
        println!("  {}", "no data".dimmed());
        return;
    }
    for (rank, record) in records.iter().enumerate() {
        println!(
            "  {:>3}. {:<40} {:>8} {:>15}",
            rank + 1,
            record.entity,
            record.year,
            format_count(record.records_exposed).green()
        );
    }
}

fn print_groups(groups: &[AggregateGroup]) {
    if groups.is_empty() {
        println!("  {}", "no data".dimmed());
        return;
    }
    for group in groups {
        println!(
            "  {:<40} {:>15} {:>8}",
            group.key.to_string(),
            format_count(group.total_records).green(),
            group.incident_count
        );
    }
}

fn print_breakdown(breakdown: &CategoryBreakdown) {
    if breakdown.by_category.is_empty() {
        println!("  {}", "no data".dimmed());
        return;
    }
    for group in &breakdown.by_category {
        println!(
            "  {:<40} {:>8} incidents {:>15}",
            group.key.first().yellow(),
            group.incident_count,
            format_count(group.total_records).green()
        );
        for detail in breakdown
            .by_category_and_organization
            .iter()
            .filter(|detail| detail.key.first() == group.key.first())
        {
            let organization = detail.key.parts().get(1).map(String::as_str).unwrap_or("");
            println!(
                "      {:<36} {:>8} incidents {:>15}",
                organization,
                detail.incident_count,
                format_count(detail.total_records)
            );
        }
    }
}

/// Group digits in thousands: 1234567 -> "1,234,567".
fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[derive(Serialize)]
#[serde(untagged)]
enum JsonLine<'a> {
    Slot { slot: ChartSlot, view: ChartView<'a> },
    Failure { error: &'a str },
}

fn json_line(line: &JsonLine<'_>) -> Option<String> {
    match serde_json::to_string(line) {
        Ok(text) => Some(text),
        Err(e) => {
            error!("Failed to serialize JSON output: {}", e);
            None
        }
    }
}

/// Writes one JSON line per chart slot to stdout.
pub struct JsonSink;

impl ChartSink for JsonSink {
    fn on_load_failed(&self, reason: &str) {
        if let Some(text) = json_line(&JsonLine::Failure { error: reason }) {
            println!("{}", text);
        }
    }

    fn render(&self, slot: ChartSlot, view: ChartView<'_>) {
        if let Some(text) = json_line(&JsonLine::Slot { slot, view }) {
            println!("{}", text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn test_json_line_shape() {
        let groups = vec![AggregateGroup {
            key: breach_lens::GroupKey::single("Firewall"),
            total_records: 10,
            incident_count: 2,
        }];
        let text = json_line(&JsonLine::Slot {
            slot: ChartSlot::DefenseMechanisms,
            view: ChartView::Groups(&groups),
        })
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["slot"], "defense_mechanisms");
        assert_eq!(value["view"]["kind"], "groups");
        assert_eq!(value["view"]["data"][0]["key"][0], "Firewall");

        let failure = json_line(&JsonLine::Failure { error: "offline" }).unwrap();
        assert_eq!(failure, r#"{"error":"offline"}"#);
    }

    #[test]
    fn test_json_line_writes_non_finite_loss_as_null() {
        let records = vec![BreachRecord {
            financial_loss: Some(f64::NAN),
            ..BreachRecord::default()
        }];
        let text = json_line(&JsonLine::Slot {
            slot: ChartSlot::Entities,
            view: ChartView::Records(&records),
        })
        .unwrap();
        assert!(text.contains(r#""financial_loss":null"#));
    }
}
