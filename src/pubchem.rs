use anyhow::{anyhow, Result};
use serde_json::Value;
use tracing::warn;
use url::Url;

use crate::http::{self, FetchError, HttpTransport, RetryPolicy, Transport};
use crate::settings::Settings;

const PROPERTY_LIST: &str = "IUPACName,CanonicalSMILES";
const GHS_QUERY: &str = "response_type=display&heading=GHS%20Classification";

/// PUG REST / PUG View endpoints used by both pipelines.
pub struct PubChemClient<T> {
    transport: T,
    policy: RetryPolicy,
    pug_base: Url,
    view_base: Url,
}

impl PubChemClient<HttpTransport> {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let transport = HttpTransport::new(settings.request_timeout())?;
        Self::new(
            transport,
            settings.retry_policy(),
            &settings.pug_base_url,
            &settings.view_base_url,
        )
    }
}

impl<T: Transport> PubChemClient<T> {
    pub fn new(transport: T, policy: RetryPolicy, pug_base: &str, view_base: &str) -> Result<Self> {
        Ok(Self {
            transport,
            policy,
            pug_base: parse_base(pug_base)?,
            view_base: parse_base(view_base)?,
        })
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Name (CAS number) → CID. `None` when PubChem has no match or the lookup failed.
    pub async fn resolve_cid(&self, identifier: &str) -> Option<u64> {
        let url = endpoint(
            &self.pug_base,
            &["compound", "name", identifier, "cids", "JSON"],
        );
        match http::fetch_json(&self.transport, &self.policy, url.as_str()).await {
            Ok(doc) => {
                let cid = first_cid(&doc);
                if cid.is_none() {
                    warn!("Failed to get CID for CAS {}. Response: {}", identifier, doc);
                }
                cid
            }
            Err(e) if e.is_not_found() => {
                warn!("No PubChem match for CAS {}", identifier);
                None
            }
            Err(e) => {
                warn!("Failed to get CID for CAS {}: {}", identifier, e);
                None
            }
        }
    }

    /// Full PUG View record.
    pub async fn fetch_record(&self, cid: u64) -> Result<Value, FetchError> {
        let cid = cid.to_string();
        let url = endpoint(&self.view_base, &["data", "compound", cid.as_str(), "JSON"]);
        http::fetch_json(&self.transport, &self.policy, url.as_str()).await
    }

    /// Property table restricted to IUPAC name and canonical SMILES.
    pub async fn fetch_properties(&self, cid: u64) -> Result<Value, FetchError> {
        let cid = cid.to_string();
        let url = endpoint(
            &self.pug_base,
            &["compound", "cid", cid.as_str(), "property", PROPERTY_LIST, "JSON"],
        );
        http::fetch_json(&self.transport, &self.policy, url.as_str()).await
    }

    /// GHS Classification heading only, as raw text for code scanning.
    pub async fn fetch_ghs_fragment(&self, cid: u64) -> Result<String, FetchError> {
        let cid = cid.to_string();
        let mut url = endpoint(&self.view_base, &["data", "compound", cid.as_str(), "JSON", ""]);
        url.set_query(Some(GHS_QUERY));
        http::fetch_text(&self.transport, &self.policy, url.as_str()).await
    }
}

/// First entry of `IdentifierList.CID`. PubChem reports "no match" as CID 0 on some lookups.
pub fn first_cid(doc: &Value) -> Option<u64> {
    doc.pointer("/IdentifierList/CID/0")
        .and_then(Value::as_u64)
        .filter(|&cid| cid > 0)
}

fn parse_base(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| anyhow!("Invalid base URL {}: {}", raw, e))?;
    if url.cannot_be_a_base() {
        return Err(anyhow!("Base URL {} cannot take path segments", raw));
    }
    Ok(url)
}

/// Append percent-encoded path segments to `base`.
fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::PubChemClient;
    use crate::http::fake::FakeTransport;
    use crate::http::RetryPolicy;

    pub const PUG: &str = "https://pubchem.test/rest/pug";
    pub const VIEW: &str = "https://pubchem.test/rest/pug_view";

    pub fn client(transport: FakeTransport) -> PubChemClient<FakeTransport> {
        PubChemClient::new(transport, RetryPolicy::default(), PUG, VIEW).unwrap()
    }
}
