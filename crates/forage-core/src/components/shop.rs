//! Shop Components
//!
//! True shop parameters, the noisy observations agents receive of them, and the
//! per-day ledger of which agent claimed which shop.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use forage_events::ShopId;

use crate::config::ShopConfig;

/// Authoritative parameters of one shop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopParameters {
    /// Price of one meal, never below 1
    pub cost: i64,
    pub energy_gain: f64,
    /// Probability that a purchase goes through
    pub success_rate: f64,
    /// Extra energy on success only
    pub success_bonus: f64,
}

impl From<&ShopConfig> for ShopParameters {
    fn from(config: &ShopConfig) -> Self {
        Self {
            cost: config.cost,
            energy_gain: config.energy_gain,
            success_rate: config.success_rate,
            success_bonus: config.success_bonus,
        }
    }
}

/// All shops of the world, iterated in identifier order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShopTable {
    shops: BTreeMap<ShopId, ShopParameters>,
}

impl ShopTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_configs(configs: &[ShopConfig]) -> Self {
        Self {
            shops: configs
                .iter()
                .map(|c| (c.id.clone(), ShopParameters::from(c)))
                .collect(),
        }
    }

    pub fn insert(&mut self, id: ShopId, params: ShopParameters) {
        self.shops.insert(id, params);
    }

    pub fn get(&self, id: &ShopId) -> Option<&ShopParameters> {
        self.shops.get(id)
    }

    pub fn get_mut(&mut self, id: &ShopId) -> Option<&mut ShopParameters> {
        self.shops.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ShopId, &ShopParameters)> {
        self.shops.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&ShopId, &mut ShopParameters)> {
        self.shops.iter_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = &ShopId> {
        self.shops.keys()
    }

    /// Lowest current cost, if there is any shop at all
    pub fn cheapest_cost(&self) -> Option<i64> {
        self.shops.values().map(|s| s.cost).min()
    }

    pub fn len(&self) -> usize {
        self.shops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shops.is_empty()
    }
}

/// A noisy sample of one shop's cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Always at least 1
    pub observed_cost: i64,
}

/// One day's observations, keyed by shop
pub type Observations = BTreeMap<ShopId, Observation>;

/// First-claim-wins ledger for a single day
#[derive(Debug, Clone, Default)]
pub struct DailyContention {
    claims: BTreeMap<ShopId, String>,
}

impl DailyContention {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a shop for an agent. Returns false if someone already holds it.
    pub fn try_claim(&mut self, shop: &ShopId, agent_name: &str) -> bool {
        if self.claims.contains_key(shop) {
            return false;
        }
        self.claims.insert(shop.clone(), agent_name.to_string());
        true
    }

    pub fn claimant(&self, shop: &ShopId) -> Option<&str> {
        self.claims.get(shop).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.claims.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_shops;

    #[test]
    fn test_first_claim_wins() {
        let mut ledger = DailyContention::new();
        let shop = ShopId::new("CheapShop");

        assert!(ledger.try_claim(&shop, "Greedy1"));
        assert!(!ledger.try_claim(&shop, "Greedy2"));
        assert_eq!(ledger.claimant(&shop), Some("Greedy1"));

        ledger.clear();
        assert!(ledger.is_empty());
        assert!(ledger.try_claim(&shop, "Greedy2"));
    }

    #[test]
    fn test_table_from_configs() {
        let table = ShopTable::from_configs(&default_shops());
        assert_eq!(table.len(), 2);
        assert_eq!(table.cheapest_cost(), Some(8));

        let premium = table.get(&ShopId::new("PremiumShop")).unwrap();
        assert_eq!(premium.cost, 15);
        assert_eq!(premium.success_bonus, 5.0);

        let ids: Vec<_> = table.ids().map(ShopId::as_str).collect();
        assert_eq!(ids, vec!["CheapShop", "PremiumShop"]);
    }
}
