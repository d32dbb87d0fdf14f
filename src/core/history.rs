//! Sources of dividend histories and the bounded comparison fan-out.

use super::record::{CorporateActionDates, DividendRecord, RawDividendRecord, enrich, ingest};
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use futures::future::join_all;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Hard cap on comparison series fetched alongside the primary symbol.
pub const MAX_COMPARISONS: usize = 5;

#[async_trait]
pub trait DividendHistoryProvider: Send + Sync {
    async fn fetch_dividend_history(
        &self,
        symbol: &str,
        years_back: u32,
    ) -> Result<Vec<RawDividendRecord>>;
}

#[async_trait]
pub trait CorporateActionProvider: Send + Sync {
    async fn fetch_corporate_action_dates(
        &self,
        symbol: &str,
    ) -> Result<HashMap<NaiveDate, CorporateActionDates>>;
}

/// A symbol with its validated history.
#[derive(Debug, Clone)]
pub struct SymbolHistory {
    pub symbol: String,
    pub records: Vec<DividendRecord>,
}

/// Fetches and validates one symbol's history, enriched with corporate action
/// dates when available. Fetch failures degrade to an empty series.
pub async fn load_history(
    history_provider: &(dyn DividendHistoryProvider + Send + Sync),
    action_provider: Option<&(dyn CorporateActionProvider + Send + Sync)>,
    symbol: &str,
    years_back: u32,
) -> SymbolHistory {
    let raws = match history_provider
        .fetch_dividend_history(symbol, years_back)
        .await
    {
        Ok(raws) => raws,
        Err(e) => {
            warn!(%symbol, error = %e, "Dividend history fetch failed");
            Vec::new()
        }
    };
    let mut records = ingest(raws);
    debug!(%symbol, records = records.len(), "Ingested dividend history");

    if let Some(provider) = action_provider {
        match provider.fetch_corporate_action_dates(symbol).await {
            Ok(actions) if !actions.is_empty() => records = enrich(&records, &actions),
            Ok(_) => {}
            Err(e) => debug!(%symbol, error = %e, "No corporate action dates"),
        }
    }

    SymbolHistory {
        symbol: symbol.to_string(),
        records,
    }
}

/// Fetches the primary symbol and up to [`MAX_COMPARISONS`] comparison
/// symbols concurrently. The primary history is always first.
pub async fn fetch_histories(
    history_provider: &(dyn DividendHistoryProvider + Send + Sync),
    action_provider: Option<&(dyn CorporateActionProvider + Send + Sync)>,
    primary: &str,
    comparisons: &[String],
    years_back: u32,
    update_callback: &(dyn Fn() + Send + Sync),
) -> Vec<SymbolHistory> {
    if comparisons.len() > MAX_COMPARISONS {
        warn!(
            requested = comparisons.len(),
            max = MAX_COMPARISONS,
            "Too many comparison symbols, extra ones are ignored"
        );
    }

    let symbols = std::iter::once(primary)
        .chain(comparisons.iter().take(MAX_COMPARISONS).map(String::as_str));
    let futures = symbols.map(|symbol| async move {
        let history = load_history(history_provider, action_provider, symbol, years_back).await;
        update_callback();
        history
    });

    join_all(futures).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::test_support::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockProvider {
        histories: HashMap<String, Vec<RawDividendRecord>>,
        actions: HashMap<NaiveDate, CorporateActionDates>,
    }

    #[async_trait]
    impl DividendHistoryProvider for MockProvider {
        async fn fetch_dividend_history(
            &self,
            symbol: &str,
            _years_back: u32,
        ) -> Result<Vec<RawDividendRecord>> {
            self.histories
                .get(symbol)
                .cloned()
                .ok_or_else(|| anyhow!("Unknown symbol {}", symbol))
        }
    }

    #[async_trait]
    impl CorporateActionProvider for MockProvider {
        async fn fetch_corporate_action_dates(
            &self,
            _symbol: &str,
        ) -> Result<HashMap<NaiveDate, CorporateActionDates>> {
            Ok(self.actions.clone())
        }
    }

    fn provider() -> MockProvider {
        let mut histories = HashMap::new();
        for symbol in ["MAIN", "C1", "C2", "C3", "C4", "C5", "C6"] {
            histories.insert(symbol.to_string(), vec![raw("2024-01-15", 0.1)]);
        }
        MockProvider {
            histories,
            actions: HashMap::from([(
                date("2024-01-15"),
                CorporateActionDates {
                    payment_date: Some(date("2024-01-31")),
                    record_date: None,
                },
            )]),
        }
    }

    #[tokio::test]
    async fn caps_comparisons_and_keeps_primary_first() {
        let provider = provider();
        let comparisons: Vec<String> = ["C1", "C2", "C3", "C4", "C5", "C6"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let calls = AtomicUsize::new(0);

        let histories = fetch_histories(&provider, None, "MAIN", &comparisons, 10, &|| {
            calls.fetch_add(1, Ordering::SeqCst);
        })
        .await;

        assert_eq!(histories.len(), 1 + MAX_COMPARISONS);
        assert_eq!(histories[0].symbol, "MAIN");
        assert!(histories.iter().all(|h| h.symbol != "C6"));
        assert_eq!(calls.load(Ordering::SeqCst), 1 + MAX_COMPARISONS);
    }

    #[tokio::test]
    async fn failed_fetch_yields_empty_series() {
        let provider = provider();
        let history = load_history(&provider, None, "MISSING", 10).await;
        assert!(history.records.is_empty());
    }

    #[tokio::test]
    async fn enriches_with_corporate_actions() {
        let provider = provider();
        let history = load_history(&provider, Some(&provider), "MAIN", 10).await;
        assert_eq!(history.records[0].pay_date, Some(date("2024-01-31")));
    }
}
