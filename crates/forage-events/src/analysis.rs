//! Behaviour analysis over recorded runs.

use std::collections::BTreeMap;

use crate::action::{ActionRecord, ShopId};
use crate::world_event::WorldEventLog;

/// Shop choices made on a day that had world events.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDayChoices {
    pub day: u32,
    pub events: Vec<String>,
    pub shop_counts: BTreeMap<ShopId, u32>,
}

/// For every event day of an episode, count the `buy_food` choices per shop
/// made on that same day.
///
/// `records` may span several episodes; only those of `episode` are counted.
pub fn shop_choices_on_event_days(
    episode: u32,
    records: &[ActionRecord],
    events: &WorldEventLog,
) -> Vec<EventDayChoices> {
    events
        .iter()
        .map(|(day, _)| {
            let mut shop_counts = BTreeMap::new();
            for record in records
                .iter()
                .filter(|r| r.at.episode == episode && r.at.day == day)
            {
                if let Some(shop) = record.action.shop() {
                    *shop_counts.entry(shop.clone()).or_insert(0) += 1;
                }
            }
            EventDayChoices {
                day,
                events: events.event_names(day),
                shop_counts,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Action, ActionOutcome, PolicyKind};
    use crate::timestamp::SimDay;
    use crate::world_event::WorldEventKind;

    fn record(episode: u32, day: u32, action: Action) -> ActionRecord {
        ActionRecord {
            at: SimDay::new(episode, day),
            agent_name: "Greedy1".to_string(),
            policy: PolicyKind::Greedy,
            action,
            outcome: ActionOutcome::Fail,
        }
    }

    #[test]
    fn test_counts_only_event_days_of_the_episode() {
        let mut log = WorldEventLog::new();
        log.record(2, vec![WorldEventKind::ShopClosed { shop: ShopId::new("CheapShop") }]);

        let records = vec![
            record(0, 1, Action::buy_food("CheapShop")),
            record(0, 2, Action::buy_food("PremiumShop")),
            record(0, 2, Action::buy_food("PremiumShop")),
            record(0, 2, Action::Rest),
            record(1, 2, Action::buy_food("CheapShop")),
        ];

        let choices = shop_choices_on_event_days(0, &records, &log);
        assert_eq!(choices.len(), 1);
        assert_eq!(choices[0].day, 2);
        assert_eq!(choices[0].events, vec!["CheapShop Closed".to_string()]);
        assert_eq!(choices[0].shop_counts.get(&ShopId::new("PremiumShop")), Some(&2));
        assert_eq!(choices[0].shop_counts.get(&ShopId::new("CheapShop")), None);
    }
}
