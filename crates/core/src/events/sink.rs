//! Where goal and budget events go once a mutation has succeeded.

use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;

use super::DomainEvent;

/// Receives events from the goal and budget services and open trackers.
///
/// `emit()` is called from synchronous tracker code right after a badge
/// edit, so it must return quickly and must not touch the goal store.
pub trait DomainEventSink: Send + Sync {
    fn emit(&self, event: DomainEvent);
}

/// Records every event so tests can ask what a goal went through.
#[derive(Clone, Default)]
pub struct MockDomainEventSink {
    events: Arc<Mutex<Vec<DomainEvent>>>,
}

impl MockDomainEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }

    /// Saved amounts reported for `goal_id`, oldest first.
    pub fn progress_updates(&self, goal_id: &str) -> Vec<Decimal> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                DomainEvent::GoalProgressChanged {
                    goal_id: id,
                    current_amount,
                } if id == goal_id => Some(*current_amount),
                _ => None,
            })
            .collect()
    }

    /// Ids named by `GoalsChanged` events, in emission order.
    pub fn changed_goal_ids(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                DomainEvent::GoalsChanged { goal_ids } => Some(goal_ids.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Number of `GoalCompleted` events.
    pub fn completed_count(&self) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, DomainEvent::GoalCompleted { .. }))
            .count()
    }

    /// Month keys carried by `BudgetChanged` events, `None` for unscoped ones.
    pub fn budget_changes(&self) -> Vec<Option<String>> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                DomainEvent::BudgetChanged { month_key } => Some(month_key.clone()),
                _ => None,
            })
            .collect()
    }
}

impl DomainEventSink for MockDomainEventSink {
    fn emit(&self, event: DomainEvent) {
        self.events.lock().unwrap().push(event);
    }
}
