use super::ui;
use crate::core::history::{self, DividendHistoryProvider};
use crate::core::yearly::{YearlyAggregate, aggregate_by_year, chart_window};
use anyhow::Result;
use comfy_table::Cell;
use tracing::info;

pub async fn run(
    history_provider: &(dyn DividendHistoryProvider + Send + Sync),
    symbol: &str,
    years_back: u32,
) -> Result<()> {
    info!(%symbol, "Building yearly dividend totals");

    let history = history::load_history(history_provider, None, symbol, years_back).await;
    let aggregates = aggregate_by_year(&history.records);
    println!("{}", render_yearly(&history.symbol, &aggregates));
    Ok(())
}

pub fn render_yearly(symbol: &str, aggregates: &[YearlyAggregate]) -> String {
    let mut output = format!(
        "Symbol: {}\n\n",
        ui::style_text(symbol, ui::StyleType::Title)
    );
    let shown = chart_window(aggregates);
    if shown.is_empty() {
        output.push_str(&ui::style_text(
            "No valid dividend payments.",
            ui::StyleType::Subtle,
        ));
        return output;
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Year"),
        ui::header_cell("Total"),
        ui::header_cell("Payments"),
        ui::header_cell("Average"),
    ]);
    for aggregate in shown {
        table.add_row(vec![
            Cell::new(aggregate.year),
            ui::decimal_cell(aggregate.total, 4),
            Cell::new(aggregate.count),
            ui::decimal_cell(aggregate.avg_amount, 4),
        ]);
    }
    output.push_str(&table.to_string());

    if shown.len() < aggregates.len() {
        output.push_str(&format!(
            "\n{}",
            ui::style_text(
                &format!(
                    "Showing the last {} of {} years.",
                    shown.len(),
                    aggregates.len()
                ),
                ui::StyleType::Subtle
            )
        ));
    }
    output
}
