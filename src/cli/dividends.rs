use super::ui;
use crate::core::history::{self, CorporateActionProvider, DividendHistoryProvider};
use crate::core::range::TimeRange;
use crate::core::report::{DividendReport, dividend_report};
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::Cell;
use tracing::info;

const AMOUNT_DP: u32 = 4;
const RATE_DP: u32 = 6;

pub struct DividendsOptions<'a> {
    pub symbol: &'a str,
    pub comparisons: &'a [String],
    pub range: TimeRange,
    pub payments_per_year: Option<u32>,
    pub years_back: u32,
    pub today: NaiveDate,
}

pub async fn run(
    history_provider: &(dyn DividendHistoryProvider + Send + Sync),
    action_provider: &(dyn CorporateActionProvider + Send + Sync),
    options: &DividendsOptions<'_>,
) -> Result<()> {
    info!(symbol = options.symbol, range = %options.range, "Building dividend report");

    let total = 1 + options.comparisons.len().min(history::MAX_COMPARISONS);
    let pb = ui::new_progress_bar(total as u64);
    let histories = history::fetch_histories(
        history_provider,
        Some(action_provider),
        options.symbol,
        options.comparisons,
        options.years_back,
        &|| pb.inc(1),
    )
    .await;
    pb.finish_and_clear();

    let count = histories.len();
    for (i, history) in histories.iter().enumerate() {
        let report = dividend_report(
            &history.records,
            options.range,
            options.today,
            options.payments_per_year,
        );
        println!("{}", render_report(&history.symbol, &report));
        if i < count - 1 {
            ui::print_separator();
        }
    }
    Ok(())
}

pub fn render_report(symbol: &str, report: &DividendReport) -> String {
    let mut output = format!(
        "Symbol: {} ({})\n",
        ui::style_text(symbol, ui::StyleType::Title),
        report.range
    );

    if report.points.is_empty() {
        output.push_str(&ui::style_text(
            "No dividend payments in range.",
            ui::StyleType::Subtle,
        ));
        return output;
    }

    let verdict = if report.frequency_changed {
        ui::style_text(
            "changed, showing normalized weekly rate",
            ui::StyleType::Highlight,
        )
    } else {
        ui::style_text("unchanged", ui::StyleType::Subtle)
    };
    output.push_str(&format!("Payment frequency: {verdict}\n\n"));

    let mut table = ui::new_styled_table();
    let mut header = vec![ui::header_cell("Ex-Date"), ui::header_cell("Amount")];
    if report.frequency_changed {
        header.push(ui::header_cell("Normalized (weekly)"));
    }
    table.set_header(header);

    for point in &report.points {
        let mut row = vec![
            Cell::new(point.ex_date.to_string()),
            ui::decimal_cell(point.amount, AMOUNT_DP),
        ];
        if report.frequency_changed {
            row.push(ui::format_optional_cell(point.normalized_rate, |r| {
                r.round_dp(RATE_DP).to_string()
            }));
        }
        table.add_row(row);
    }

    output.push_str(&table.to_string());
    output
}
