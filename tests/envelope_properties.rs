//! Property tests for month-to-month carry-forward

use chrono::NaiveDate;
use proptest::prelude::*;

use envelope_ledger::models::{AccountType, Money, Month};
use envelope_ledger::services::{NewBudget, NewTransaction};
use envelope_ledger::{Engine, MemoryStore, Settings};

#[derive(Debug, Clone)]
enum Op {
    Assign { month: u32, cents: i64 },
    Spend { month: u32, day: u32, cents: i64 },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u32..6, -50_000i64..50_000).prop_map(|(month, cents)| Op::Assign { month, cents }),
        (0u32..6, 1u32..29, -20_000i64..20_000)
            .prop_filter("non-zero", |(_, _, cents)| *cents != 0)
            .prop_map(|(month, day, cents)| Op::Spend { month, day, cents }),
    ]
}

fn month_at(offset: u32) -> Month {
    Month::new(2024, 1 + offset).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn available_rolls_forward(ops in prop::collection::vec(op(), 1..25)) {
        let engine = Engine::new(MemoryStore::new(), Settings::default());
        let budget = engine
            .create_budget(NewBudget {
                name: "Props".into(),
                currency: None,
                start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                with_defaults: true,
            })
            .unwrap()
            .id;
        let checking = engine
            .create_account(&budget, "Checking", AccountType::Checking, true)
            .unwrap();
        let groceries = engine.find_category(&budget, "Groceries").unwrap().id;

        let mut expected_assigned = [0i64; 6];
        let mut expected_activity = [0i64; 6];

        for op in &ops {
            match *op {
                Op::Assign { month, cents } => {
                    engine
                        .assign(&budget, &groceries, month_at(month), Money::from_cents(cents))
                        .unwrap();
                    expected_assigned[month as usize] += cents;
                }
                Op::Spend { month, day, cents } => {
                    let date = NaiveDate::from_ymd_opt(2024, 1 + month, day).unwrap();
                    let mut txn = NewTransaction::new(checking.id, date, Money::from_cents(cents));
                    txn.category_id = Some(groceries);
                    engine.create_transaction(&budget, txn).unwrap();
                    expected_activity[month as usize] += cents;
                }
            }
        }

        let mut prior = Money::zero();
        for offset in 0..6u32 {
            let view = engine.month_view(&budget, month_at(offset)).unwrap();
            let record = view.record_for(&groceries).unwrap();

            prop_assert_eq!(record.assigned.cents(), expected_assigned[offset as usize]);
            prop_assert_eq!(record.activity.cents(), expected_activity[offset as usize]);
            prop_assert_eq!(record.available, prior + record.assigned + record.activity);
            prior = record.available;
        }
    }

    #[test]
    fn splits_always_sum_to_amount(parts in prop::collection::vec(-10_000i64..10_000, 1..5)) {
        use envelope_ledger::models::Subtransaction;

        let engine = Engine::new(MemoryStore::new(), Settings::default());
        let budget = engine
            .create_budget(NewBudget {
                name: "Props".into(),
                currency: None,
                start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                with_defaults: true,
            })
            .unwrap()
            .id;
        let checking = engine
            .create_account(&budget, "Checking", AccountType::Checking, true)
            .unwrap();
        let rent = engine.find_category(&budget, "Rent").unwrap().id;
        let total: i64 = parts.iter().sum();
        prop_assume!(total != 0);

        let date = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
        let mut good = NewTransaction::new(checking.id, date, Money::from_cents(total));
        good.splits = parts
            .iter()
            .map(|c| Subtransaction::new(Some(rent), Money::from_cents(*c)))
            .collect();
        let created = engine.create_transaction(&budget, good.clone()).unwrap();
        prop_assert_eq!(created.subtransactions_total(), created.amount);

        let mut bad = good;
        bad.amount = Money::from_cents(total + 1);
        let err = engine.create_transaction(&budget, bad).unwrap_err();
        prop_assert!(err.is_invariant_violation());
    }
}
