//! Store key layout
//!
//! Four key families, namespaced by campaign name (and prize id for
//! stock):
//!
//! ```text
//! {prefix}:visit:{campaign}          counter   draw count
//! {prefix}:stock:{campaign}:{prize}  pool      stock tokens
//! {prefix}:pity   field={campaign}   hash      JSON checkpoint array
//! {prefix}:cheat  field={campaign}   hash      JSON identity array
//! ```

use crate::campaign::PrizeId;

/// Default key prefix.
pub const DEFAULT_PREFIX: &str = "drawlab";

/// Builds the store keys for one deployment's namespace.
#[derive(Debug, Clone)]
pub struct KeySpace {
    prefix: String,
}

impl KeySpace {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Visit counter key for a campaign.
    pub fn visit(&self, campaign: &str) -> String {
        format!("{}:visit:{}", self.prefix, campaign)
    }

    /// Stock token pool key for one prize of a campaign.
    pub fn stock(&self, campaign: &str, prize: PrizeId) -> String {
        format!("{}:stock:{}:{}", self.prefix, campaign, prize)
    }

    /// Hash holding one pity checkpoint record per campaign.
    pub fn pity_map(&self) -> String {
        format!("{}:pity", self.prefix)
    }

    /// Hash holding one cheat ledger record per campaign.
    pub fn cheat_map(&self) -> String {
        format!("{}:cheat", self.prefix)
    }
}

impl Default for KeySpace {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}
