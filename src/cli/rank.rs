use super::ui;
use crate::core::ranking::{
    InstrumentMetrics, RankedInstrument, RankingWeights, ScoringPolicyKind, rank_instruments,
};
use anyhow::{Context, Result};
use comfy_table::{Attribute, Cell};
use tracing::info;

pub fn run(
    instruments: &[InstrumentMetrics],
    weights: &RankingWeights,
    policy: ScoringPolicyKind,
) -> Result<()> {
    info!(?weights, ?policy, "Ranking instruments");

    if instruments.is_empty() {
        println!("No instruments found to rank.");
        return Ok(());
    }

    let ranked = match rank_instruments(instruments, weights, policy.policy()) {
        Ok(ranked) => ranked,
        Err(e) => {
            println!(
                "{}",
                ui::style_text(&format!("Cannot apply weights: {e}"), ui::StyleType::Error)
            );
            return Err(e).context("Ranking weights rejected");
        }
    };
    println!("{}", render_ranking(&ranked, weights));
    Ok(())
}

pub fn render_ranking(ranked: &[RankedInstrument], weights: &RankingWeights) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Rank"),
        ui::header_cell("Symbol"),
        ui::header_cell("Composite"),
        ui::header_cell(&format!("Yield ({}%)", weights.yield_weight)),
        ui::header_cell(&format!("Volatility ({}%)", weights.volatility)),
        ui::header_cell(&format!(
            "Return {} ({}%)",
            weights.timeframe, weights.total_return
        )),
    ]);

    for instrument in ranked {
        table.add_row(vec![
            Cell::new(instrument.rank),
            Cell::new(&instrument.symbol).add_attribute(Attribute::Bold),
            ui::score_cell(instrument.composite),
            ui::score_cell(instrument.yield_score),
            ui::score_cell(instrument.volatility_score),
            ui::score_cell(instrument.total_return_score),
        ]);
    }

    let mut output = format!(
        "{}\n\n",
        ui::style_text("Instrument Ranking", ui::StyleType::Title)
    );
    output.push_str(&table.to_string());
    output
}
