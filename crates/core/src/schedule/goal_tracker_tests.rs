#[cfg(test)]
mod tests {
    use crate::errors::{DatabaseError, Error, Result, ScheduleError};
    use crate::events::MockDomainEventSink;
    use crate::goals::{Goal, GoalRepositoryTrait, GoalStatus, NewGoal, SaveFrequency};
    use crate::schedule::{BadgeStatus, GoalTracker};
    use crate::settings::Settings;
    use async_trait::async_trait;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use num_traits::ToPrimitive;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::{Arc, Mutex};

    // --- Store that records the background syncs ---
    #[derive(Default)]
    struct RecordingGoalStore {
        amounts: Mutex<Vec<Decimal>>,
        statuses: Mutex<Vec<GoalStatus>>,
        fail: bool,
        // Yields inside each amount write, scaled by the amount
        uneven_writes: bool,
    }

    impl RecordingGoalStore {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn uneven() -> Self {
            Self {
                uneven_writes: true,
                ..Default::default()
            }
        }

        fn amounts(&self) -> Vec<Decimal> {
            self.amounts.lock().unwrap().clone()
        }

        fn statuses(&self) -> Vec<GoalStatus> {
            self.statuses.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GoalRepositoryTrait for RecordingGoalStore {
        fn load_goals(&self) -> Result<Vec<Goal>> {
            unimplemented!()
        }

        fn get_goal(&self, _goal_id: &str) -> Result<Goal> {
            unimplemented!()
        }

        async fn insert_new_goal(&self, _new_goal: NewGoal) -> Result<Goal> {
            unimplemented!()
        }

        async fn update_goal(&self, _goal_update: Goal) -> Result<Goal> {
            unimplemented!()
        }

        async fn update_goal_status(&self, goal_id: String, status: GoalStatus) -> Result<Goal> {
            if self.fail {
                return Err(DatabaseError::ConnectionFailed("offline".to_string()).into());
            }
            self.statuses.lock().unwrap().push(status);
            let mut goal = yearly_goal();
            goal.id = goal_id;
            goal.status = status;
            Ok(goal)
        }

        async fn update_current_amount(&self, goal_id: String, amount: Decimal) -> Result<Goal> {
            if self.fail {
                return Err(DatabaseError::ConnectionFailed("offline".to_string()).into());
            }
            if self.uneven_writes {
                let hundreds = (amount / dec!(100)).trunc().to_usize().unwrap_or(0);
                for _ in 0..hundreds {
                    tokio::task::yield_now().await;
                }
            }
            self.amounts.lock().unwrap().push(amount);
            let mut goal = yearly_goal();
            goal.id = goal_id;
            goal.current_amount = amount;
            Ok(goal)
        }

        async fn delete_goal(&self, _goal_id_to_delete: String) -> Result<usize> {
            unimplemented!()
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn yearly_goal() -> Goal {
        Goal {
            id: "goal-1".to_string(),
            title: "New laptop".to_string(),
            description: None,
            category: Some("tech".to_string()),
            target_amount: dec!(1200),
            current_amount: Decimal::ZERO,
            save_frequency: SaveFrequency::Monthly,
            duration: Some(12),
            start_date: Some(date(2024, 1, 1)),
            end_date: Some(date(2024, 12, 1)),
            status: GoalStatus::InProgress,
            created_at: date(2023, 12, 20).and_hms_opt(8, 0, 0).unwrap(),
        }
    }

    fn tracker_for(
        goal: Goal,
        store: Arc<RecordingGoalStore>,
        sink: MockDomainEventSink,
    ) -> GoalTracker {
        GoalTracker::new(
            goal,
            Settings::default(),
            date(2024, 3, 15),
            store,
            Arc::new(sink),
        )
        .unwrap()
    }

    /// Lets the spawned sync tasks run on the current-thread test runtime.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_three_toggles_save_a_quarter() {
        let store = Arc::new(RecordingGoalStore::default());
        let sink = MockDomainEventSink::new();
        let mut tracker = tracker_for(yearly_goal(), store.clone(), sink.clone());

        assert_eq!(tracker.badges().len(), 12);
        for id in ["1", "2", "3"] {
            let badge = tracker.toggle_badge(id, now()).unwrap();
            assert!(badge.completed);
            assert_eq!(badge.progress_amount, dec!(100));
            assert_eq!(badge.last_updated_at, Some(now()));
        }

        assert_eq!(tracker.goal().current_amount, dec!(300.00));
        assert_eq!(tracker.goal().progress_percent(), 25);
        assert_eq!(tracker.summary().completed_periods, 3);

        settle().await;
        assert_eq!(store.amounts(), vec![dec!(100), dec!(200), dec!(300)]);
        assert_eq!(
            sink.progress_updates("goal-1"),
            vec![dec!(100), dec!(200), dec!(300)]
        );
    }

    #[tokio::test]
    async fn test_toggle_twice_clears_the_badge() {
        let store = Arc::new(RecordingGoalStore::default());
        let mut tracker = tracker_for(yearly_goal(), store.clone(), MockDomainEventSink::new());

        tracker.toggle_badge("2", now()).unwrap();
        let badge = tracker.toggle_badge("2", now()).unwrap();
        assert!(!badge.completed);
        assert_eq!(badge.progress_amount, Decimal::ZERO);
        assert_eq!(badge.status, BadgeStatus::Missed);
        assert_eq!(tracker.goal().current_amount, Decimal::ZERO);

        settle().await;
        assert_eq!(store.amounts(), vec![dec!(100), dec!(0)]);
    }

    #[tokio::test]
    async fn test_progress_is_clamped_and_never_auto_completes() {
        let store = Arc::new(RecordingGoalStore::default());
        let mut tracker = tracker_for(yearly_goal(), store, MockDomainEventSink::new());

        let badge = tracker.set_badge_progress("4", dec!(-20), now()).unwrap();
        assert_eq!(badge.progress_amount, Decimal::ZERO);

        let badge = tracker.set_badge_progress("4", dec!(250), now()).unwrap();
        assert_eq!(badge.progress_amount, dec!(100));
        assert!(!badge.completed);
        assert_eq!(badge.status, BadgeStatus::Early);
        assert_eq!(tracker.goal().current_amount, dec!(100));

        let badge = tracker.complete_badge("4", now()).unwrap();
        assert!(badge.completed);
        assert_eq!(tracker.goal().current_amount, dec!(100));
    }

    #[tokio::test]
    async fn test_complete_badge_requires_full_progress() {
        let store = Arc::new(RecordingGoalStore::default());
        let mut tracker = tracker_for(yearly_goal(), store, MockDomainEventSink::new());

        tracker.set_badge_progress("5", dec!(60), now()).unwrap();
        let err = tracker.complete_badge("5", now()).unwrap_err();
        assert!(matches!(
            err,
            Error::Schedule(ScheduleError::ProgressIncomplete { ref badge_id, .. }) if badge_id == "5"
        ));
        assert!(!tracker.badges()[4].completed);
        assert_eq!(tracker.goal().current_amount, dec!(60));
    }

    #[tokio::test]
    async fn test_lowering_progress_uncompletes_a_badge() {
        let store = Arc::new(RecordingGoalStore::default());
        let mut tracker = tracker_for(yearly_goal(), store, MockDomainEventSink::new());

        tracker.toggle_badge("1", now()).unwrap();
        let badge = tracker.set_badge_progress("1", dec!(30), now()).unwrap();
        assert!(!badge.completed);
        assert_eq!(badge.progress_amount, dec!(30));
        assert_eq!(tracker.goal().current_amount, dec!(30));
    }

    #[tokio::test]
    async fn test_unknown_badge_is_reported() {
        let store = Arc::new(RecordingGoalStore::default());
        let mut tracker = tracker_for(yearly_goal(), store, MockDomainEventSink::new());

        let err = tracker.toggle_badge("13", now()).unwrap_err();
        assert!(matches!(
            err,
            Error::Schedule(ScheduleError::BadgeNotFound(ref id)) if id == "13"
        ));
    }

    #[tokio::test]
    async fn test_completion_is_signaled_once() {
        let store = Arc::new(RecordingGoalStore::default());
        let sink = MockDomainEventSink::new();
        let mut tracker = tracker_for(yearly_goal(), store.clone(), sink.clone());

        for i in 1..=11 {
            tracker.toggle_badge(&i.to_string(), now()).unwrap();
        }
        assert!(!tracker.check_completion());

        tracker.toggle_badge("12", now()).unwrap();
        assert!(tracker.check_completion());
        assert!(!tracker.check_completion());

        assert_eq!(sink.completed_count(), 1);
        assert_eq!(tracker.goal().status, GoalStatus::Completed);
        assert!(tracker.completion_signaled());

        settle().await;
        assert_eq!(store.statuses(), vec![GoalStatus::Completed]);
    }

    #[tokio::test]
    async fn test_rounded_down_badges_still_complete_the_goal() {
        let store = Arc::new(RecordingGoalStore::default());
        let sink = MockDomainEventSink::new();
        let mut goal = yearly_goal();
        goal.target_amount = dec!(100);
        goal.end_date = Some(date(2024, 3, 1));
        let mut tracker = tracker_for(goal, store, sink.clone());

        for id in ["1", "2", "3"] {
            tracker.toggle_badge(id, now()).unwrap();
        }
        assert_eq!(tracker.goal().current_amount, dec!(99.99));
        assert!(tracker.check_completion());
        assert_eq!(sink.completed_count(), 1);
    }

    #[tokio::test]
    async fn test_completed_goal_does_not_signal_again() {
        let store = Arc::new(RecordingGoalStore::default());
        let sink = MockDomainEventSink::new();
        let mut goal = yearly_goal();
        goal.current_amount = dec!(1200);
        goal.status = GoalStatus::Completed;
        let mut tracker = tracker_for(goal, store, sink.clone());

        assert!(tracker.badges().iter().all(|b| b.completed));
        assert!(!tracker.check_completion());
        assert_eq!(sink.completed_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_sync_keeps_local_state() {
        let store = Arc::new(RecordingGoalStore::failing());
        let mut tracker = tracker_for(yearly_goal(), store.clone(), MockDomainEventSink::new());

        tracker.toggle_badge("1", now()).unwrap();
        settle().await;

        assert!(store.amounts().is_empty());
        assert!(tracker.badges()[0].completed);
        assert_eq!(tracker.goal().current_amount, dec!(100));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_saved_amount_writes_land_in_order() {
        let store = Arc::new(RecordingGoalStore::uneven());
        let mut tracker = tracker_for(yearly_goal(), store.clone(), MockDomainEventSink::new());

        let mut expected = Vec::new();
        for i in 1..=12 {
            tracker.toggle_badge(&i.to_string(), now()).unwrap();
            expected.push(tracker.goal().current_amount);
        }
        for i in (2..=12).rev() {
            tracker.toggle_badge(&i.to_string(), now()).unwrap();
            expected.push(tracker.goal().current_amount);
        }
        assert_eq!(tracker.goal().current_amount, dec!(100));

        for _ in 0..100_000 {
            if store.amounts().len() == expected.len() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(store.amounts(), expected);
        assert_eq!(store.amounts().last(), Some(&tracker.goal().current_amount));
    }

    #[tokio::test]
    async fn test_first_saving_starts_the_goal() {
        let store = Arc::new(RecordingGoalStore::default());
        let mut goal = yearly_goal();
        goal.status = GoalStatus::NotStarted;
        let mut tracker = tracker_for(goal, store.clone(), MockDomainEventSink::new());

        tracker.toggle_badge("1", now()).unwrap();
        assert_eq!(tracker.goal().status, GoalStatus::InProgress);
        tracker.toggle_badge("2", now()).unwrap();

        settle().await;
        assert_eq!(store.amounts(), vec![dec!(100), dec!(200)]);
        assert_eq!(store.statuses(), vec![GoalStatus::InProgress]);
    }

    #[tokio::test]
    async fn test_clearing_every_badge_keeps_a_started_goal_started() {
        let store = Arc::new(RecordingGoalStore::default());
        let mut goal = yearly_goal();
        goal.status = GoalStatus::NotStarted;
        let mut tracker = tracker_for(goal, store.clone(), MockDomainEventSink::new());

        tracker.toggle_badge("1", now()).unwrap();
        tracker.toggle_badge("1", now()).unwrap();
        assert_eq!(tracker.goal().current_amount, Decimal::ZERO);
        assert_eq!(tracker.goal().status, GoalStatus::InProgress);

        settle().await;
        assert_eq!(store.statuses(), vec![GoalStatus::InProgress]);
    }

    #[test]
    fn test_toggle_without_runtime_still_updates_state() {
        let store = Arc::new(RecordingGoalStore::default());
        let mut tracker = tracker_for(yearly_goal(), store.clone(), MockDomainEventSink::new());

        tracker.toggle_badge("1", now()).unwrap();
        assert_eq!(tracker.goal().current_amount, dec!(100));
        assert!(store.amounts().is_empty());
    }

    #[tokio::test]
    async fn test_goal_edit_reschedules_and_keeps_matching_progress() {
        let store = Arc::new(RecordingGoalStore::default());
        let mut tracker = tracker_for(yearly_goal(), store.clone(), MockDomainEventSink::new());

        tracker.toggle_badge("1", now()).unwrap();
        tracker.set_badge_progress("2", dec!(50), now()).unwrap();
        tracker.toggle_badge("12", now()).unwrap();
        assert_eq!(tracker.goal().current_amount, dec!(250));

        let mut shorter = yearly_goal();
        shorter.end_date = Some(date(2024, 6, 1));
        shorter.target_amount = dec!(600);
        tracker.apply_goal_edit(shorter, date(2024, 3, 15)).unwrap();

        assert_eq!(tracker.badges().len(), 6);
        assert!(tracker.badges()[0].completed);
        assert_eq!(tracker.badges()[1].progress_amount, dec!(50));
        // December's badge left the window
        assert_eq!(tracker.goal().current_amount, dec!(150));

        settle().await;
        assert_eq!(store.amounts().last(), Some(&dec!(150)));
    }

    #[tokio::test]
    async fn test_goal_edit_with_invalid_target_is_rejected() {
        let store = Arc::new(RecordingGoalStore::default());
        let mut tracker = tracker_for(yearly_goal(), store, MockDomainEventSink::new());
        tracker.toggle_badge("1", now()).unwrap();

        let mut broken = yearly_goal();
        broken.target_amount = Decimal::ZERO;
        assert!(tracker.apply_goal_edit(broken, date(2024, 3, 15)).is_err());
        assert_eq!(tracker.badges().len(), 12);
        assert!(tracker.badges()[0].completed);
    }

    #[tokio::test]
    async fn test_refresh_statuses_moves_badges_into_the_past() {
        let store = Arc::new(RecordingGoalStore::default());
        let mut tracker = tracker_for(yearly_goal(), store, MockDomainEventSink::new());

        assert_eq!(tracker.badges()[3].status, BadgeStatus::Early);
        tracker.refresh_statuses(date(2024, 4, 1));
        assert_eq!(tracker.badges()[3].status, BadgeStatus::OnTime);
        tracker.refresh_statuses(date(2024, 4, 3));
        assert_eq!(tracker.badges()[3].status, BadgeStatus::Late);
        tracker.refresh_statuses(date(2024, 4, 10));
        assert_eq!(tracker.badges()[3].status, BadgeStatus::Missed);
    }
}
