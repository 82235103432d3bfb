//! Scenario tests
//!
//! End-to-end checks of the daily contract through the public API.

use std::collections::BTreeMap;

use forage_core::components::{
    ActionCosts, BeliefEntry, DailyContention, ShopParameters, ShopTable, WorldDynamics,
};
use forage_core::config::{Config, PopulationConfig};
use forage_core::setup::build_agent;
use forage_core::Simulation;
use forage_events::{Action, ActionOutcome, PolicyKind, ShopId, SimDay};
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn cheap() -> ShopId {
    ShopId::new("CheapShop")
}

fn population(explorer: u32, greedy: u32, cautious: u32, cheap_only: u32, legacy: u32) -> PopulationConfig {
    PopulationConfig {
        explorer,
        greedy,
        cautious,
        cheap_only,
        legacy,
    }
}

fn costs() -> ActionCosts {
    ActionCosts {
        move_energy_cost: 15.0,
        rest_energy_gain: 10.0,
    }
}

#[test]
fn test_cheap_only_successful_purchase() {
    let config = Config::default();
    let mut rng = SmallRng::seed_from_u64(1);
    let mut agent = build_agent(PolicyKind::CheapOnly, "CheapOnly1", &config, &mut rng);
    agent
        .beliefs_mut()
        .set(cheap(), BeliefEntry { expected_cost: 10.0, trust: 0.6 });

    let mut shops = ShopTable::new();
    shops.insert(
        cheap(),
        ShopParameters {
            cost: 8,
            energy_gain: 25.0,
            success_rate: 1.0,
            success_bonus: 0.0,
        },
    );

    let action = agent.think(&shops, &mut rng);
    assert_eq!(action, Action::BuyFood(cheap()));
    let outcome = agent
        .act(&action, &mut DailyContention::new(), &shops, &costs(), &mut rng)
        .unwrap();

    assert_eq!(outcome, ActionOutcome::Success);
    assert_eq!(agent.state().energy, 142.0);
    assert_eq!(agent.state().money, 92.0);
    assert!((agent.beliefs().get(&cheap()).unwrap().trust - 0.65).abs() < 1e-12);
}

#[test]
fn test_rest_keeps_weak_agent_alive() {
    let mut config = Config::default();
    config.agents.belief_start.energy = 2.0;
    config.agents.belief_start.money = 50.0;
    let mut rng = SmallRng::seed_from_u64(2);
    let mut agent = build_agent(PolicyKind::Greedy, "Greedy1", &config, &mut rng);

    let shops = ShopTable::from_configs(&config.shops);
    let outcome = agent
        .act(&Action::Rest, &mut DailyContention::new(), &shops, &costs(), &mut rng)
        .unwrap();

    assert_eq!(outcome, ActionOutcome::Rest);
    assert_eq!(agent.state().energy, 9.0);
    assert!(agent.is_alive());
}

#[test]
fn test_broke_agents_never_act() {
    let mut config = Config::default();
    config.agents.belief_start.money = 0.0;
    config.population = population(0, 2, 0, 0, 0);

    let mut sim = Simulation::new(config).unwrap();
    sim.begin_episode().unwrap();
    assert_eq!(sim.roster_len(), 2);
    assert!(sim.agents().iter().all(|a| !a.alive));

    assert_eq!(sim.step_day().unwrap(), 0);
    assert_eq!(sim.roster_len(), 0);
    assert!(sim.report().unwrap().actions.is_empty());
}

#[test]
fn test_trust_stays_in_unit_interval() {
    let mut config = Config::default();
    config.simulation.episodes = 12;
    config.simulation.days_per_episode = 8;
    config.population = population(2, 3, 2, 2, 1);

    let report = Simulation::new(config).unwrap().run().unwrap();
    assert!(!report.beliefs.is_empty());
    for record in &report.beliefs {
        for view in record.beliefs.values() {
            assert!((0.0..=1.0).contains(&view.trust), "{} trust {}", record.agent_name, view.trust);
        }
    }
}

#[test]
fn test_only_first_claimant_can_succeed() {
    let mut config = Config::default();
    config.simulation.episodes = 10;
    config.population = population(1, 4, 2, 3, 2);

    let report = Simulation::new(config).unwrap().run().unwrap();
    let mut claims: BTreeMap<(SimDay, ShopId), Vec<ActionOutcome>> = BTreeMap::new();
    for record in &report.actions {
        if let Some(shop) = record.action.shop() {
            claims
                .entry((record.at, shop.clone()))
                .or_default()
                .push(record.outcome);
        }
    }

    let mut contested = 0;
    for outcomes in claims.values() {
        if outcomes.len() > 1 {
            contested += 1;
        }
        for outcome in &outcomes[1..] {
            assert_eq!(*outcome, ActionOutcome::Fail);
        }
    }
    assert!(contested > 0, "ten agents over two shops should collide");
}

#[test]
fn test_observe_never_mutates_true_costs() {
    let config = Config::default();
    let mut world = WorldDynamics::new(&config);
    let mut rng = SmallRng::seed_from_u64(3);
    world.advance_day(&mut rng);

    let before = world.shops().clone();
    let first = world.observe(&mut rng);
    let second = world.observe(&mut rng);
    assert_eq!(*world.shops(), before);
    assert_eq!(first.len(), second.len());
    for observation in first.values().chain(second.values()) {
        assert!(observation.observed_cost >= 1);
    }
}

#[test]
fn test_reset_without_belief_redraw_keeps_beliefs() {
    let mut config = Config::default();
    config.population = population(0, 1, 0, 0, 0);
    config.agents.belief_start.energy = 1000.0;
    config.agents.belief_start.money = 1000.0;

    let mut sim = Simulation::new(config).unwrap();
    sim.run_episode().unwrap();
    let before = sim.agent("Greedy1").unwrap().beliefs().clone();

    assert!(!sim.begin_episode().unwrap());
    let agent = sim.agent("Greedy1").unwrap();
    assert_eq!(*agent.beliefs(), before);
    assert_eq!(agent.state().energy, 1000.0);
    assert_eq!(agent.state().money, 1000.0);
    assert!(agent.history().is_empty());
}

#[test]
fn test_epsilon_anneals_to_cap() {
    let mut config = Config::default();
    config.population = population(1, 1, 0, 0, 0);
    config.agents.belief_start.energy = 10_000.0;
    config.agents.belief_start.money = 10_000.0;
    config.simulation.days_per_episode = 1;

    let mut sim = Simulation::new(config).unwrap();
    for n in 1..=12u32 {
        sim.run_episode().unwrap();
        let agents = sim.agents();
        let explorer = agents.iter().find(|a| a.policy == PolicyKind::Explorer).unwrap();
        let greedy = agents.iter().find(|a| a.policy == PolicyKind::Greedy).unwrap();
        assert!((explorer.epsilon - (0.5 + 0.05 * n as f64).min(0.6)).abs() < 1e-9);
        assert!((greedy.epsilon - (0.1 + 0.05 * n as f64).min(0.6)).abs() < 1e-9);
    }
}

#[test]
fn test_belief_reset_cadence() {
    let mut config = Config::default();
    config.simulation.episodes = 11;
    config.agents.belief_start.energy = 10_000.0;
    config.agents.belief_start.money = 10_000.0;

    let report = Simulation::new(config).unwrap().run().unwrap();
    let resets: Vec<u32> = report
        .episodes
        .iter()
        .filter(|e| e.beliefs_reset)
        .map(|e| e.episode)
        .collect();
    assert_eq!(resets, vec![0, 5, 10]);
}

#[test]
fn test_event_days_line_up_with_actions() {
    let mut config = Config::default();
    config.world.event_probability = 1.0;
    config.simulation.episodes = 1;

    let report = Simulation::new(config).unwrap().run().unwrap();
    let episode = report.final_episode().unwrap();
    let choices = forage_events::shop_choices_on_event_days(0, &report.actions, &episode.world_events);

    assert_eq!(choices.len() as u32, episode.days_run);
    let first = &choices[0];
    assert_eq!(first.day, 1);
    assert_eq!(first.events, vec!["CheapShop Closed", "PremiumShop Discounted"]);
    let total: u32 = first.shop_counts.values().sum();
    assert_eq!(total, 5);
}
