//! One-shot identity overrides

use std::collections::HashMap;
use std::sync::Arc;

use dl_store::Store;

use crate::campaign::PrizeId;
use crate::error::{DrawError, DrawResult};
use crate::keys::KeySpace;

/// Deterministic identity→prize override backed by an append-only ledger.
///
/// The ledger is a JSON array of identities per campaign, stored in the
/// cheat hash. An identity is granted its mapped prize exactly once for the
/// campaign's lifetime; entries are never removed.
///
/// The ledger append happens here, before the caller checks stock. If the
/// mapped prize turns out to be depleted the draw collapses to a loss but
/// the identity's one-shot slot stays consumed — this ordering is kept
/// deliberately (see DESIGN.md).
#[derive(Clone)]
pub struct CheatOverride {
    store: Arc<dyn Store>,
    keys: KeySpace,
}

impl CheatOverride {
    pub fn new(store: Arc<dyn Store>, keys: KeySpace) -> Self {
        Self { store, keys }
    }

    /// Resolve an identity against the campaign's cheat map.
    ///
    /// Returns the mapped prize and appends the identity to the ledger, or
    /// `None` when the identity is unmapped or already in the ledger. The
    /// check-and-append runs as a compare-and-set loop so two concurrent
    /// draws for the same identity cannot both be granted.
    pub fn resolve(
        &self,
        campaign: &str,
        identity: &str,
        cheat_map: &HashMap<String, PrizeId>,
    ) -> DrawResult<Option<PrizeId>> {
        if identity.is_empty() || cheat_map.is_empty() {
            return Ok(None);
        }
        let Some(&prize) = cheat_map.get(identity) else {
            return Ok(None);
        };

        let map = self.keys.cheat_map();
        loop {
            let raw = self.store.hash_get(&map, campaign)?;
            let mut ledger = match &raw {
                Some(json) => decode_ledger(campaign, json)?,
                None => Vec::new(),
            };
            if ledger.iter().any(|granted| granted == identity) {
                return Ok(None);
            }

            ledger.push(identity.to_owned());
            let updated = encode_ledger(campaign, &ledger)?;
            if self
                .store
                .hash_compare_set(&map, campaign, raw.as_deref(), &updated)?
            {
                log::debug!("campaign '{campaign}': override grant of prize {prize} to '{identity}'");
                return Ok(Some(prize));
            }
            // Lost the race against a concurrent append; re-read and retry.
        }
    }

    /// Whether an identity has already consumed its override slot.
    pub fn granted(&self, campaign: &str, identity: &str) -> DrawResult<bool> {
        match self.store.hash_get(&self.keys.cheat_map(), campaign)? {
            Some(json) => Ok(decode_ledger(campaign, &json)?
                .iter()
                .any(|granted| granted == identity)),
            None => Ok(false),
        }
    }
}

fn decode_ledger(campaign: &str, json: &str) -> DrawResult<Vec<String>> {
    serde_json::from_str(json).map_err(|source| DrawError::Record {
        kind: "cheat ledger",
        campaign: campaign.to_owned(),
        source,
    })
}

fn encode_ledger(campaign: &str, ledger: &[String]) -> DrawResult<String> {
    serde_json::to_string(ledger).map_err(|source| DrawError::Record {
        kind: "cheat ledger",
        campaign: campaign.to_owned(),
        source,
    })
}
