use std::sync::Arc;

use tracing::{debug, warn};

use crate::batch;
use crate::extract::names::extract_names;
use crate::extract::properties::{extract_properties, PropertySummary};
use crate::extract::references::extract_references;
use crate::extract::tox::extract_tox_data;
use crate::http::Transport;
use crate::model::{CompoundDetails, CompoundRecord};
use crate::pubchem::PubChemClient;

pub const CID_NOT_FOUND: &str = "Could not find PubChem CID";
pub const RECORD_MISSING: &str = "Could not find compound data";
const TASK_ABORTED: &str = "Processing error: task aborted";

/// Resolve, fetch and extract one CAS number. Never fails: problems land in `error`.
pub async fn process_cas_number<T: Transport>(
    client: &PubChemClient<T>,
    cas: &str,
) -> CompoundRecord {
    let Some(cid) = client.resolve_cid(cas).await else {
        return CompoundRecord::failed(cas, None, CID_NOT_FOUND);
    };

    let doc = match client.fetch_record(cid).await {
        Ok(doc) => doc,
        Err(e) => {
            warn!("Failed to fetch record for CID {}: {}", cid, e);
            return CompoundRecord::failed(cas, Some(cid), e.to_string());
        }
    };

    let props = match client.fetch_properties(cid).await {
        Ok(table) => extract_properties(&table),
        Err(e) => {
            warn!("Failed to fetch properties for CID {}: {}", cid, e);
            PropertySummary::default()
        }
    };

    let names = extract_names(&doc);
    let details = CompoundDetails {
        iupac: props.iupac,
        smiles: props.smiles,
        names: names.names,
        synonyms: names.synonyms,
        literature_references: extract_references(&doc),
    };

    if doc.get("Record").is_none() {
        return CompoundRecord {
            cas: cas.to_string(),
            cid: Some(cid),
            details: Some(details),
            tox_data: None,
            error: Some(RECORD_MISSING.to_string()),
        };
    }

    let tox_data = extract_tox_data(&doc);
    debug!("CAS {} → CID {}: {} tox sections", cas, cid, tox_data.len());

    CompoundRecord {
        cas: cas.to_string(),
        cid: Some(cid),
        details: Some(details),
        tox_data: Some(tox_data),
        error: None,
    }
}

/// All identifiers, at most `concurrency` in flight, results in input order.
pub async fn run<T: Transport + 'static>(
    client: Arc<PubChemClient<T>>,
    identifiers: Vec<String>,
    concurrency: usize,
) -> Vec<CompoundRecord> {
    let slots = batch::gather_ordered(identifiers.clone(), concurrency, |cas| {
        let client = Arc::clone(&client);
        async move { process_cas_number(&*client, &cas).await }
    })
    .await;

    slots
        .into_iter()
        .zip(identifiers)
        .map(|(slot, cas)| slot.unwrap_or_else(|| CompoundRecord::failed(&cas, None, TASK_ABORTED)))
        .collect()
}
