//! Belief Components
//!
//! Each agent's private, noisy estimate of every shop: what it expects a meal
//! to cost and how far it trusts the shop to deliver.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use forage_events::{BeliefView, ShopId};

use super::shop::Observations;

/// Weight kept on the previous cost estimate when a new observation arrives
pub const COST_SMOOTHING: f64 = 0.8;

/// Starting belief about a shop, before jitter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeliefPrior {
    pub expected_cost: f64,
    /// Half-width of the uniform jitter added to `expected_cost`
    pub cost_jitter: f64,
    pub trust: f64,
    /// Half-width of the uniform jitter added to `trust`
    pub trust_jitter: f64,
}

impl BeliefPrior {
    /// Draw a jittered belief. Trust is clamped to [0, 1].
    fn draw<R: Rng>(&self, rng: &mut R) -> BeliefEntry {
        let expected_cost = self.expected_cost + uniform_jitter(rng, self.cost_jitter);
        let trust = self.trust + uniform_jitter(rng, self.trust_jitter);
        BeliefEntry {
            expected_cost,
            trust: trust.clamp(0.0, 1.0),
        }
    }
}

fn uniform_jitter<R: Rng>(rng: &mut R, half_width: f64) -> f64 {
    if half_width > 0.0 {
        rng.gen_range(-half_width..=half_width)
    } else {
        0.0
    }
}

/// One agent's belief about one shop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeliefEntry {
    pub expected_cost: f64,
    /// Always within [0, 1]
    pub trust: f64,
}

impl BeliefEntry {
    /// Trust per unit of expected cost, the quantity greedy agents maximise
    pub fn value_ratio(&self) -> f64 {
        self.trust / self.expected_cost
    }
}

impl From<BeliefEntry> for BeliefView {
    fn from(entry: BeliefEntry) -> Self {
        BeliefView {
            expected_cost: entry.expected_cost,
            trust: entry.trust,
        }
    }
}

/// Per-agent beliefs over all shops, iterated in identifier order
#[derive(Debug, Clone, PartialEq)]
pub struct BeliefStore {
    entries: BTreeMap<ShopId, BeliefEntry>,
    priors: BTreeMap<ShopId, BeliefPrior>,
}

impl BeliefStore {
    /// Seed beliefs from priors plus independent jitter per shop.
    pub fn initialize<R: Rng>(priors: BTreeMap<ShopId, BeliefPrior>, rng: &mut R) -> Self {
        let mut store = Self {
            entries: BTreeMap::new(),
            priors,
        };
        store.redraw(rng);
        store
    }

    fn redraw<R: Rng>(&mut self, rng: &mut R) {
        self.entries = self
            .priors
            .iter()
            .map(|(shop, prior)| (shop.clone(), prior.draw(rng)))
            .collect();
    }

    /// Blend each observed cost into the estimate for that shop.
    ///
    /// Shops missing from `observations` keep their estimate; observations of
    /// shops this store does not know are ignored.
    pub fn update(&mut self, observations: &Observations) {
        for (shop, observation) in observations {
            if let Some(entry) = self.entries.get_mut(shop) {
                entry.expected_cost = COST_SMOOTHING * entry.expected_cost
                    + (1.0 - COST_SMOOTHING) * observation.observed_cost as f64;
            }
        }
    }

    /// Shift a shop's trust, then clamp every shop's trust to [0, 1].
    pub fn adjust_trust(&mut self, shop: &ShopId, delta: f64) {
        if let Some(entry) = self.entries.get_mut(shop) {
            entry.trust += delta;
        }
        for entry in self.entries.values_mut() {
            entry.trust = entry.trust.clamp(0.0, 1.0);
        }
    }

    /// Re-draw every belief from its prior when `reset_beliefs` is set;
    /// otherwise leave the store untouched.
    pub fn reset<R: Rng>(&mut self, reset_beliefs: bool, rng: &mut R) {
        if reset_beliefs {
            self.redraw(rng);
        }
    }

    pub fn get(&self, shop: &ShopId) -> Option<&BeliefEntry> {
        self.entries.get(shop)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ShopId, &BeliefEntry)> {
        self.entries.iter()
    }

    pub fn shop_ids(&self) -> impl Iterator<Item = &ShopId> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn views(&self) -> BTreeMap<ShopId, BeliefView> {
        self.entries
            .iter()
            .map(|(shop, entry)| (shop.clone(), BeliefView::from(*entry)))
            .collect()
    }

    /// Overwrite a belief directly (fixtures and tests)
    pub fn set(&mut self, shop: ShopId, entry: BeliefEntry) {
        self.entries.insert(
            shop,
            BeliefEntry {
                trust: entry.trust.clamp(0.0, 1.0),
                ..entry
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::shop::Observation;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn priors() -> BTreeMap<ShopId, BeliefPrior> {
        let mut priors = BTreeMap::new();
        priors.insert(
            ShopId::new("CheapShop"),
            BeliefPrior {
                expected_cost: 10.0,
                cost_jitter: 2.0,
                trust: 0.8,
                trust_jitter: 0.3,
            },
        );
        priors.insert(
            ShopId::new("PremiumShop"),
            BeliefPrior {
                expected_cost: 20.0,
                cost_jitter: 1.0,
                trust: 0.9,
                trust_jitter: 0.1,
            },
        );
        priors
    }

    fn observations(cheap: i64, premium: i64) -> Observations {
        let mut obs = Observations::new();
        obs.insert(ShopId::new("CheapShop"), Observation { observed_cost: cheap });
        obs.insert(ShopId::new("PremiumShop"), Observation { observed_cost: premium });
        obs
    }

    #[test]
    fn test_initialize_within_jitter_bounds() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..200 {
            let store = BeliefStore::initialize(priors(), &mut rng);
            let cheap = store.get(&ShopId::new("CheapShop")).unwrap();
            let premium = store.get(&ShopId::new("PremiumShop")).unwrap();

            assert!((8.0..=12.0).contains(&cheap.expected_cost));
            assert!((19.0..=21.0).contains(&premium.expected_cost));
            assert!((0.5..=1.0).contains(&cheap.trust));
            assert!((0.8..=1.0).contains(&premium.trust));
        }
    }

    #[test]
    fn test_update_is_exponential_moving_average() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut store = BeliefStore::initialize(priors(), &mut rng);
        store.set(ShopId::new("CheapShop"), BeliefEntry { expected_cost: 10.0, trust: 0.8 });
        store.set(ShopId::new("PremiumShop"), BeliefEntry { expected_cost: 20.0, trust: 0.9 });

        store.update(&observations(5, 25));

        let cheap = store.get(&ShopId::new("CheapShop")).unwrap();
        let premium = store.get(&ShopId::new("PremiumShop")).unwrap();
        assert!((cheap.expected_cost - 9.0).abs() < 1e-9);
        assert!((premium.expected_cost - 21.0).abs() < 1e-9);
        assert_eq!(cheap.trust, 0.8);
    }

    #[test]
    fn test_update_leaves_unobserved_shops_alone() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut store = BeliefStore::initialize(priors(), &mut rng);
        let before = *store.get(&ShopId::new("PremiumShop")).unwrap();

        let mut obs = Observations::new();
        obs.insert(ShopId::new("CheapShop"), Observation { observed_cost: 1 });
        obs.insert(ShopId::new("Elsewhere"), Observation { observed_cost: 3 });
        store.update(&obs);

        assert_eq!(*store.get(&ShopId::new("PremiumShop")).unwrap(), before);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_adjust_trust_clamps_all_shops() {
        let mut rng = SmallRng::seed_from_u64(4);
        let mut store = BeliefStore::initialize(priors(), &mut rng);
        store.set(ShopId::new("CheapShop"), BeliefEntry { expected_cost: 10.0, trust: 0.98 });

        store.adjust_trust(&ShopId::new("CheapShop"), 0.05);
        assert_eq!(store.get(&ShopId::new("CheapShop")).unwrap().trust, 1.0);

        for _ in 0..20 {
            store.adjust_trust(&ShopId::new("PremiumShop"), -0.1);
        }
        assert_eq!(store.get(&ShopId::new("PremiumShop")).unwrap().trust, 0.0);

        for (_, entry) in store.iter() {
            assert!((0.0..=1.0).contains(&entry.trust));
        }
    }

    #[test]
    fn test_reset_without_flag_keeps_beliefs_exactly() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut store = BeliefStore::initialize(priors(), &mut rng);
        store.update(&observations(3, 40));
        let before = store.clone();

        store.reset(false, &mut rng);
        assert_eq!(store, before);

        store.reset(true, &mut rng);
        assert_ne!(store, before);
    }
}
