//! Tests for goal domain models.

#[cfg(test)]
mod tests {
    use crate::errors::{Error, ValidationError};
    use crate::goals::{Goal, GoalStatus, GoalUpdate, NewGoal, SaveFrequency};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_goal() -> Goal {
        Goal {
            id: "g-1".to_string(),
            title: "House deposit".to_string(),
            description: Some("20% down".to_string()),
            category: Some("housing".to_string()),
            target_amount: dec!(20000),
            current_amount: dec!(5000),
            save_frequency: SaveFrequency::Monthly,
            duration: Some(24),
            start_date: Some(date(2024, 1, 15)),
            end_date: None,
            status: GoalStatus::InProgress,
            created_at: date(2024, 1, 10).and_hms_opt(12, 0, 0).unwrap(),
        }
    }

    fn sample_new_goal() -> NewGoal {
        NewGoal {
            title: "Bike".to_string(),
            target_amount: Some(dec!(900)),
            save_frequency: Some(SaveFrequency::Weekly),
            duration: Some(3),
            ..Default::default()
        }
    }

    // ==================== SaveFrequency ====================

    #[test]
    fn test_save_frequency_parses_leniently() {
        assert_eq!(SaveFrequency::parse_lenient("daily"), SaveFrequency::Daily);
        assert_eq!(SaveFrequency::parse_lenient(" Weekly "), SaveFrequency::Weekly);
        assert_eq!(SaveFrequency::parse_lenient("monthly"), SaveFrequency::Monthly);
        assert_eq!(SaveFrequency::parse_lenient("yearly"), SaveFrequency::Monthly);
        assert_eq!(SaveFrequency::parse_lenient(""), SaveFrequency::Monthly);
    }

    #[test]
    fn test_save_frequency_serde() {
        assert_eq!(
            serde_json::to_string(&SaveFrequency::Weekly).unwrap(),
            "\"weekly\""
        );
        assert_eq!(
            serde_json::from_str::<SaveFrequency>("\"fortnightly\"").unwrap(),
            SaveFrequency::Monthly
        );
    }

    #[test]
    fn test_period_labels() {
        assert_eq!(SaveFrequency::Daily.period_label(3), "Day 3");
        assert_eq!(SaveFrequency::Weekly.period_label(1), "Week 1");
        assert_eq!(SaveFrequency::Monthly.period_label(12), "Month 12");
    }

    // ==================== GoalStatus ====================

    #[test]
    fn test_goal_status_accepts_legacy_spellings() {
        assert_eq!(
            serde_json::from_str::<GoalStatus>("\"active\"").unwrap(),
            GoalStatus::InProgress
        );
        assert_eq!(
            serde_json::from_str::<GoalStatus>("\"achieved\"").unwrap(),
            GoalStatus::Completed
        );
        assert_eq!(
            serde_json::to_string(&GoalStatus::NotStarted).unwrap(),
            "\"not_started\""
        );
        assert_eq!(GoalStatus::parse("ACHIEVED"), Some(GoalStatus::Completed));
        assert_eq!(GoalStatus::parse("paused"), None);
    }

    // ==================== Goal ====================

    #[test]
    fn test_goal_json_uses_camel_case_and_saved_amount_alias() {
        let json = serde_json::json!({
            "id": "g-2",
            "title": "Camera",
            "description": null,
            "category": null,
            "targetAmount": 1500.0,
            "savedAmount": 250.5,
            "saveFrequency": "weekly",
            "duration": 6,
            "startDate": "2024-02-01",
            "endDate": null,
            "status": "active",
            "createdAt": "2024-01-31T10:00:00"
        });
        let goal: Goal = serde_json::from_value(json).unwrap();
        assert_eq!(goal.current_amount, dec!(250.5));
        assert_eq!(goal.save_frequency, SaveFrequency::Weekly);
        assert_eq!(goal.status, GoalStatus::InProgress);

        let back = serde_json::to_value(&goal).unwrap();
        assert_eq!(back["currentAmount"], 250.5);
        assert_eq!(back["saveFrequency"], "weekly");
    }

    #[test]
    fn test_schedule_window_from_duration() {
        let goal = sample_goal();
        assert_eq!(
            goal.schedule_window(),
            Some((date(2024, 1, 15), date(2026, 1, 14)))
        );
    }

    #[test]
    fn test_schedule_window_prefers_end_date() {
        let mut goal = sample_goal();
        goal.end_date = Some(date(2024, 6, 30));
        assert_eq!(
            goal.schedule_window(),
            Some((date(2024, 1, 15), date(2024, 6, 30)))
        );
    }

    #[test]
    fn test_schedule_window_needs_start_and_bound() {
        let mut goal = sample_goal();
        goal.start_date = None;
        assert_eq!(goal.schedule_window(), None);

        let mut goal = sample_goal();
        goal.duration = None;
        assert_eq!(goal.schedule_window(), None);

        let mut goal = sample_goal();
        goal.duration = Some(0);
        assert_eq!(goal.schedule_window(), None);
    }

    #[test]
    fn test_progress_percent_rounds_half_up_and_caps() {
        let mut goal = sample_goal();
        assert_eq!(goal.progress_percent(), 25);

        goal.target_amount = dec!(200);
        goal.current_amount = dec!(25);
        assert_eq!(goal.progress_percent(), 13);

        goal.current_amount = dec!(500);
        assert_eq!(goal.progress_percent(), 100);

        goal.target_amount = Decimal::ZERO;
        assert_eq!(goal.progress_percent(), 0);
    }

    #[test]
    fn test_set_current_amount_clamps() {
        let mut goal = sample_goal();
        goal.set_current_amount(dec!(-10));
        assert_eq!(goal.current_amount, Decimal::ZERO);
        goal.set_current_amount(dec!(25000));
        assert_eq!(goal.current_amount, dec!(20000));
        assert_eq!(goal.remaining_amount(), Decimal::ZERO);
    }

    #[test]
    fn test_goal_validate() {
        assert!(sample_goal().validate().is_ok());

        let mut goal = sample_goal();
        goal.title = "   ".to_string();
        assert!(goal.validate().is_err());

        let mut goal = sample_goal();
        goal.target_amount = dec!(-1);
        assert!(goal.validate().is_err());

        let mut goal = sample_goal();
        goal.end_date = Some(date(2023, 12, 31));
        assert!(goal.validate().is_err());
    }

    // ==================== NewGoal ====================

    #[test]
    fn test_new_goal_validate_ok() {
        assert!(sample_new_goal().validate().is_ok());

        let mut with_end = sample_new_goal();
        with_end.duration = None;
        with_end.start_date = Some(date(2024, 1, 1));
        with_end.end_date = Some(date(2024, 3, 31));
        assert!(with_end.validate().is_ok());
    }

    #[test]
    fn test_new_goal_reports_missing_fields() {
        let cases: Vec<(NewGoal, &str)> = vec![
            (
                NewGoal {
                    title: String::new(),
                    ..sample_new_goal()
                },
                "title",
            ),
            (
                NewGoal {
                    target_amount: None,
                    ..sample_new_goal()
                },
                "targetAmount",
            ),
            (
                NewGoal {
                    save_frequency: None,
                    ..sample_new_goal()
                },
                "saveFrequency",
            ),
            (
                NewGoal {
                    duration: None,
                    ..sample_new_goal()
                },
                "duration",
            ),
        ];
        for (new_goal, field) in cases {
            match new_goal.validate() {
                Err(Error::Validation(ValidationError::MissingField(name))) => {
                    assert_eq!(name, field)
                }
                other => panic!("expected missing {}, got {:?}", field, other),
            }
        }
    }

    #[test]
    fn test_new_goal_rejects_bad_values() {
        let mut zero_target = sample_new_goal();
        zero_target.target_amount = Some(Decimal::ZERO);
        assert!(zero_target.validate().is_err());

        let mut zero_duration = sample_new_goal();
        zero_duration.duration = Some(0);
        assert!(zero_duration.validate().is_err());

        let mut inverted = sample_new_goal();
        inverted.start_date = Some(date(2024, 5, 1));
        inverted.end_date = Some(date(2024, 4, 1));
        assert!(inverted.validate().is_err());
    }

    // ==================== GoalUpdate ====================

    #[test]
    fn test_goal_update_applies_only_given_fields() {
        let goal = sample_goal();
        let update = GoalUpdate {
            title: Some("Bigger house".to_string()),
            target_amount: Some(dec!(4000)),
            ..Default::default()
        };
        assert!(update.affects_schedule());

        let updated = update.apply_to(&goal);
        assert_eq!(updated.title, "Bigger house");
        assert_eq!(updated.category, goal.category);
        assert_eq!(updated.start_date, goal.start_date);
        // saved amount follows the lowered target
        assert_eq!(updated.current_amount, dec!(4000));
    }

    #[test]
    fn test_title_only_update_does_not_affect_schedule() {
        let update = GoalUpdate {
            title: Some("Renamed".to_string()),
            description: Some("notes".to_string()),
            ..Default::default()
        };
        assert!(!update.affects_schedule());
    }

    #[test]
    fn test_duration_update_moves_the_end_date() {
        let mut goal = sample_goal();
        goal.start_date = Some(date(2024, 1, 1));
        goal.end_date = Some(date(2024, 3, 1));
        goal.duration = Some(3);

        let updated = GoalUpdate {
            duration: Some(6),
            ..Default::default()
        }
        .apply_to(&goal);
        assert_eq!(updated.duration, Some(6));
        assert_eq!(updated.end_date, Some(date(2024, 6, 30)));
        assert_eq!(
            updated.schedule_window(),
            Some((date(2024, 1, 1), date(2024, 6, 30)))
        );

        // an explicit end date in the same patch wins
        let updated = GoalUpdate {
            duration: Some(6),
            end_date: Some(date(2024, 5, 15)),
            ..Default::default()
        }
        .apply_to(&goal);
        assert_eq!(updated.end_date, Some(date(2024, 5, 15)));
    }

    #[test]
    fn test_duration_update_without_end_date_keeps_it_open() {
        let goal = sample_goal();
        let updated = GoalUpdate {
            duration: Some(12),
            ..Default::default()
        }
        .apply_to(&goal);
        assert_eq!(updated.end_date, None);
        assert_eq!(
            updated.schedule_window(),
            Some((date(2024, 1, 15), date(2025, 1, 14)))
        );
    }

    #[test]
    fn test_zero_duration_update_is_invalid() {
        let mut goal = sample_goal();
        goal.end_date = Some(date(2024, 12, 31));
        let updated = GoalUpdate {
            duration: Some(0),
            ..Default::default()
        }
        .apply_to(&goal);
        assert_eq!(updated.end_date, None);
        assert!(updated.validate().is_err());
    }
}
