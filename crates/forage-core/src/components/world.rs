//! World Dynamics
//!
//! The single authoritative owner of shop parameters and of the per-day
//! contention ledger. Prices drift, shops close and discount at random, and
//! agents only ever see the result through noisy observations.

use bevy_ecs::prelude::*;
use rand::Rng;

use forage_events::{Action, ActionOutcome, WorldEventKind, WorldEventLog};

use crate::components::agent::{ActionCosts, Agent};
use crate::components::shop::{DailyContention, Observation, Observations, ShopTable};
use crate::config::{Config, WorldConfig};
use crate::error::SimError;

/// Resource: shop table, contention ledger and event log of one episode
#[derive(Resource, Debug, Clone)]
pub struct WorldDynamics {
    day: u32,
    shops: ShopTable,
    contention: DailyContention,
    events: WorldEventLog,
    actions: ActionCosts,
    settings: WorldConfig,
}

impl WorldDynamics {
    /// Build a world at day 0 with the configured starting shop parameters.
    pub fn new(config: &Config) -> Self {
        Self {
            day: 0,
            shops: ShopTable::from_configs(&config.shops),
            contention: DailyContention::new(),
            events: WorldEventLog::new(),
            actions: config.actions.clone(),
            settings: config.world.clone(),
        }
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn shops(&self) -> &ShopTable {
        &self.shops
    }

    pub fn shops_mut(&mut self) -> &mut ShopTable {
        &mut self.shops
    }

    pub fn contention(&self) -> &DailyContention {
        &self.contention
    }

    pub fn events(&self) -> &WorldEventLog {
        &self.events
    }

    pub fn action_costs(&self) -> &ActionCosts {
        &self.actions
    }

    /// Start a new day: clear claims, roll the closure and discount events,
    /// then drift every price. Returns the events that fired.
    pub fn advance_day<R: Rng>(&mut self, rng: &mut R) -> Vec<WorldEventKind> {
        self.day += 1;
        self.contention.clear();

        let mut fired = Vec::new();
        let probability = self.settings.event_probability;

        let closure = &self.settings.closure;
        let closed = rng.gen::<f64>() < probability;
        if let Some(shop) = self.shops.get_mut(&closure.shop) {
            if closed {
                shop.success_rate = 0.0;
                fired.push(WorldEventKind::ShopClosed {
                    shop: closure.shop.clone(),
                });
            } else {
                shop.success_rate = closure.baseline_success_rate;
            }
        }

        let discount = &self.settings.discount;
        let discounted = rng.gen::<f64>() < probability;
        if let Some(shop) = self.shops.get_mut(&discount.shop) {
            if discounted {
                shop.cost = shop.cost.saturating_sub(discount.amount).max(1);
                fired.push(WorldEventKind::ShopDiscounted {
                    shop: discount.shop.clone(),
                    amount: discount.amount,
                });
            } else {
                shop.cost = discount.baseline_cost;
            }
        }

        for event in &fired {
            tracing::info!(day = self.day, shop = %event.shop(), "World event: {}", event);
        }

        self.drift_prices(self.settings.price_variation, rng);
        self.events.record(self.day, fired.clone());
        fired
    }

    /// Shift every shop's cost by a uniform integer in [-variation, variation],
    /// never below 1.
    pub fn drift_prices<R: Rng>(&mut self, variation: i64, rng: &mut R) {
        for (id, shop) in self.shops.iter_mut() {
            let change = rng.gen_range(-variation..=variation);
            shop.cost = shop.cost.saturating_add(change).max(1);
            tracing::trace!(shop = %id, cost = shop.cost, change, "price drift");
        }
    }

    /// Draw a fresh noisy observation of every shop's cost. True costs are
    /// never touched.
    pub fn observe<R: Rng>(&self, rng: &mut R) -> Observations {
        let noise = self.settings.observation_noise;
        self.shops
            .iter()
            .map(|(id, shop)| {
                let observed_cost = shop.cost.saturating_add(rng.gen_range(-noise..=noise)).max(1);
                (id.clone(), Observation { observed_cost })
            })
            .collect()
    }

    /// Resolve an agent's action against today's ledger and the true shop
    /// parameters.
    pub fn resolve<R: Rng>(
        &mut self,
        agent: &mut Agent,
        action: &Action,
        rng: &mut R,
    ) -> Result<ActionOutcome, SimError> {
        agent.act(action, &mut self.contention, &self.shops, &self.actions, rng)
    }

    pub fn is_alive(&self, agent: &Agent) -> bool {
        agent.is_alive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::agent::StartState;
    use crate::components::belief::{BeliefPrior, BeliefStore};
    use crate::policy::Policy;
    use forage_events::ShopId;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::collections::BTreeMap;

    fn cheap() -> ShopId {
        ShopId::new("CheapShop")
    }

    fn premium() -> ShopId {
        ShopId::new("PremiumShop")
    }

    fn agent(name: &str, rng: &mut SmallRng) -> Agent {
        let config = Config::default();
        let priors: BTreeMap<ShopId, BeliefPrior> = config
            .shops
            .iter()
            .map(|s| (s.id.clone(), s.prior))
            .collect();
        Agent::new(
            name,
            Policy::Greedy,
            0.1,
            StartState {
                energy: 120.0,
                money: 100.0,
            },
            config.profiles.belief,
            BeliefStore::initialize(priors, rng),
        )
    }

    #[test]
    fn test_advance_day_without_events_resets_to_baseline_then_drifts() {
        let mut config = Config::default();
        config.world.event_probability = 0.0;
        let mut world = WorldDynamics::new(&config);
        let mut rng = SmallRng::seed_from_u64(1);

        world.shops_mut().get_mut(&cheap()).unwrap().success_rate = 0.0;
        world.shops_mut().get_mut(&premium()).unwrap().cost = 40;

        for day in 1..=50 {
            let fired = world.advance_day(&mut rng);
            assert!(fired.is_empty());
            assert_eq!(world.day(), day);

            let cheap_shop = world.shops().get(&cheap()).unwrap();
            let premium_shop = world.shops().get(&premium()).unwrap();
            assert_eq!(cheap_shop.success_rate, 0.7);
            assert!((13..=17).contains(&premium_shop.cost));
            assert!(cheap_shop.cost >= 1);
        }
        assert!(world.events().is_empty());
    }

    #[test]
    fn test_certain_events_close_and_discount() {
        let mut config = Config::default();
        config.world.event_probability = 1.0;
        config.world.price_variation = 0;
        let mut world = WorldDynamics::new(&config);
        let mut rng = SmallRng::seed_from_u64(2);

        let fired = world.advance_day(&mut rng);
        assert_eq!(
            fired,
            vec![
                WorldEventKind::ShopClosed { shop: cheap() },
                WorldEventKind::ShopDiscounted {
                    shop: premium(),
                    amount: 5
                },
            ]
        );
        assert_eq!(world.shops().get(&cheap()).unwrap().success_rate, 0.0);
        assert_eq!(world.shops().get(&premium()).unwrap().cost, 10);
        assert_eq!(
            world.events().event_names(1),
            vec!["CheapShop Closed".to_string(), "PremiumShop Discounted".to_string()]
        );

        // Discounts compound from the current cost and floor at 1
        world.advance_day(&mut rng);
        assert_eq!(world.shops().get(&premium()).unwrap().cost, 5);
        world.advance_day(&mut rng);
        world.advance_day(&mut rng);
        assert_eq!(world.shops().get(&premium()).unwrap().cost, 1);
    }

    #[test]
    fn test_drift_floors_at_one() {
        let config = Config::default();
        let mut world = WorldDynamics::new(&config);
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..500 {
            world.drift_prices(2, &mut rng);
            for (_, shop) in world.shops().iter() {
                assert!(shop.cost >= 1);
            }
        }
    }

    #[test]
    fn test_extreme_spreads_saturate_instead_of_overflowing() {
        let config = Config::default();
        let mut world = WorldDynamics::new(&config);
        let mut rng = SmallRng::seed_from_u64(7);
        world.shops_mut().get_mut(&premium()).unwrap().cost = i64::MAX - 1;
        for _ in 0..100 {
            world.drift_prices(i64::MAX, &mut rng);
            for (_, shop) in world.shops().iter() {
                assert!(shop.cost >= 1);
            }
        }

        let mut config = Config::default();
        config.world.observation_noise = i64::MAX;
        let world = WorldDynamics::new(&config);
        for _ in 0..100 {
            for observation in world.observe(&mut rng).values() {
                assert!(observation.observed_cost >= 1);
            }
        }
    }

    #[test]
    fn test_observe_is_noisy_but_does_not_mutate() {
        let config = Config::default();
        let world = WorldDynamics::new(&config);
        let before = world.shops().clone();
        let mut rng = SmallRng::seed_from_u64(4);

        let mut samples = Vec::new();
        for _ in 0..50 {
            let obs = world.observe(&mut rng);
            assert_eq!(obs.len(), 2);
            let cheap_obs = obs[&cheap()].observed_cost;
            assert!((5..=11).contains(&cheap_obs));
            samples.push(cheap_obs);
        }
        assert_eq!(*world.shops(), before);
        samples.dedup();
        assert!(samples.len() > 1);
    }

    #[test]
    fn test_resolve_uses_shared_ledger() {
        let mut config = Config::default();
        config.world.event_probability = 0.0;
        let mut world = WorldDynamics::new(&config);
        let mut rng = SmallRng::seed_from_u64(5);
        world.advance_day(&mut rng);
        world.shops_mut().get_mut(&cheap()).unwrap().success_rate = 1.0;

        let mut first = agent("Greedy1", &mut rng);
        let mut second = agent("Greedy2", &mut rng);
        let action = Action::BuyFood(cheap());

        assert_eq!(world.resolve(&mut first, &action, &mut rng).unwrap(), ActionOutcome::Success);
        assert_eq!(world.resolve(&mut second, &action, &mut rng).unwrap(), ActionOutcome::Fail);
        assert_eq!(second.state().energy, 120.0 - 3.0 - 2.0);
        assert_eq!(second.state().money, 100.0);
        assert_eq!(world.contention().claimant(&cheap()), Some("Greedy1"));

        // A new day frees the shop again
        world.advance_day(&mut rng);
        assert!(world.contention().is_empty());
        world.shops_mut().get_mut(&cheap()).unwrap().success_rate = 1.0;
        assert_eq!(world.resolve(&mut second, &action, &mut rng).unwrap(), ActionOutcome::Success);
    }

    #[test]
    fn test_world_and_agent_paths_agree() {
        let config = Config::default();
        let mut world = WorldDynamics::new(&config);
        let shops = world.shops().clone();
        let costs = world.action_costs().clone();

        let mut rng = SmallRng::seed_from_u64(6);
        let mut via_world = agent("A", &mut rng);
        let mut direct = via_world.clone();

        let mut ledger = DailyContention::new();
        let mut rng_a = SmallRng::seed_from_u64(99);
        let mut rng_b = SmallRng::seed_from_u64(99);
        for action in [Action::BuyFood(cheap()), Action::BuyFood(premium()), Action::Move, Action::Rest] {
            let a = world.resolve(&mut via_world, &action, &mut rng_a).unwrap();
            let b = direct.act(&action, &mut ledger, &shops, &costs, &mut rng_b).unwrap();
            assert_eq!(a, b);
        }
        assert_eq!(via_world.state(), direct.state());
        assert_eq!(via_world.beliefs(), direct.beliefs());
        assert!(world.is_alive(&via_world));
    }
}
