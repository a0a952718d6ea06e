use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};

use crate::batch;
use crate::export::table::{Table, CAS_COLUMN};
use crate::extract::ghs::extract_codes;
use crate::http::Transport;
use crate::model::HazardCodeSet;
use crate::pubchem::PubChemClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HazardRunSummary {
    pub rows: usize,
    pub batches: usize,
    pub pauses: usize,
}

/// GHS codes for one CSV row. Blank CAS → empty codes; unknown CAS → "No data found".
pub async fn process_row<T: Transport>(client: &PubChemClient<T>, cas: &str) -> HazardCodeSet {
    let cas = cas.trim();
    if cas.is_empty() {
        return HazardCodeSet::default();
    }
    let Some(cid) = client.resolve_cid(cas).await else {
        return HazardCodeSet::no_data();
    };
    match client.fetch_ghs_fragment(cid).await {
        Ok(body) => extract_codes(&body),
        Err(e) if e.is_not_found() => {
            info!("No GHS classification for CAS {} (CID {})", cas, cid);
            HazardCodeSet::default()
        }
        Err(e) => {
            warn!("Failed to fetch GHS data for CAS {}: {}", cas, e);
            HazardCodeSet::default()
        }
    }
}

/// Read `input`, look up every row's CAS in batches, and write `input` plus code columns to `output`.
pub async fn run<T: Transport + 'static>(
    client: Arc<PubChemClient<T>>,
    input: &Path,
    output: &Path,
    batch_size: usize,
    pause: Duration,
) -> Result<HazardRunSummary> {
    let table = Table::read(input)?;
    let cas_numbers = table.column(CAS_COLUMN)?;
    info!("Processing {} rows from {}", cas_numbers.len(), input.display());

    let report = batch::run_in_batches(cas_numbers, batch_size, pause, |cas| {
        let client = Arc::clone(&client);
        async move { process_row(&*client, &cas).await }
    })
    .await;

    let codes: Vec<HazardCodeSet> = report
        .results
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect();
    table.write_with_codes(output, &codes)?;

    Ok(HazardRunSummary {
        rows: codes.len(),
        batches: report.batches,
        pauses: report.pauses,
    })
}
