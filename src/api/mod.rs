//! Typed command boundary
//!
//! Callers that speak JSON (or build requests programmatically) send a
//! [`Command`] and get back a [`CommandOutput`]. Dates that name a month are
//! checked here, and the reconcile statement balance is parsed exactly.

mod command;
mod output;

pub use command::Command;
pub use output::CommandOutput;

use chrono::NaiveDate;

use crate::engine::Engine;
use crate::error::EnvelopeResult;
use crate::models::{Money, Month};
use crate::storage::LedgerStore;

fn month(date: NaiveDate) -> EnvelopeResult<Month> {
    Month::from_first_day(date)
}

impl<S: LedgerStore> Engine<S> {
    pub fn execute(&self, command: Command) -> EnvelopeResult<CommandOutput> {
        use CommandOutput as Out;

        let output = match command {
            Command::CreateBudget { budget } => Out::Budget(self.create_budget(budget)?),
            Command::ListBudgets => Out::Budgets(self.list_budgets()?),
            Command::GetBudget { budget_id } => Out::Budget(self.get_budget(&budget_id)?),

            Command::CreateAccount {
                budget_id,
                name,
                account_type,
                on_budget,
            } => Out::Account(self.create_account(&budget_id, &name, account_type, on_budget)?),
            Command::UpdateAccount {
                budget_id,
                account_id,
                patch,
            } => Out::Account(self.update_account(&budget_id, &account_id, patch)?),
            Command::ListAccounts { budget_id } => Out::Accounts(self.list_accounts(&budget_id)?),
            Command::ListAccountsWithBalances { budget_id } => {
                Out::AccountSummaries(self.list_accounts_with_balances(&budget_id)?)
            }
            Command::AccountBalance {
                budget_id,
                account_id,
            } => Out::AccountSummary(self.account_balance(&budget_id, &account_id)?),

            Command::CreateTransaction {
                budget_id,
                transaction,
            } => Out::Transaction(self.create_transaction(&budget_id, transaction)?),
            Command::UpdateTransaction {
                budget_id,
                transaction_id,
                patch,
            } => Out::Transaction(self.update_transaction(&budget_id, &transaction_id, patch)?),
            Command::DeleteTransaction {
                budget_id,
                transaction_id,
            } => Out::DeletedTransactions(self.delete_transaction(&budget_id, &transaction_id)?),
            Command::ListTransactions { budget_id, filter } => {
                Out::Transactions(self.list_transactions(&budget_id, &filter)?)
            }
            Command::CreateTransfer {
                budget_id,
                from_account_id,
                to_account_id,
                date,
                amount,
                memo,
            } => Out::Transfer(self.create_transfer(
                &budget_id,
                from_account_id,
                to_account_id,
                date,
                amount,
                memo,
            )?),

            Command::MonthView {
                budget_id,
                month: m,
            } => Out::MonthView(self.month_view(&budget_id, month(m)?)?),
            Command::Assign {
                budget_id,
                category_id,
                month: m,
                amount,
            } => Out::MonthView(self.assign(&budget_id, &category_id, month(m)?, amount)?),
            Command::MoveBetweenCategories {
                budget_id,
                from_category_id,
                to_category_id,
                month: m,
                amount,
            } => Out::MonthView(self.move_between_categories(
                &budget_id,
                &from_category_id,
                &to_category_id,
                month(m)?,
                amount,
            )?),
            Command::MoveBetweenMonths {
                budget_id,
                category_id,
                from_month,
                to_month,
                amount,
            } => Out::MonthView(self.move_between_months(
                &budget_id,
                &category_id,
                month(from_month)?,
                month(to_month)?,
                amount,
            )?),

            Command::CreateGroup { budget_id, name } => {
                Out::Group(self.create_group(&budget_id, &name)?)
            }
            Command::UpdateGroup {
                budget_id,
                group_id,
                patch,
            } => Out::Group(self.update_group(&budget_id, &group_id, patch)?),
            Command::DeleteGroup {
                budget_id,
                group_id,
            } => Out::DeletedGroup(self.delete_group(&budget_id, &group_id)?),
            Command::CreateCategory {
                budget_id,
                group_id,
                name,
            } => Out::Category(self.create_category(&budget_id, &group_id, &name)?),
            Command::UpdateCategory {
                budget_id,
                category_id,
                patch,
            } => Out::Category(self.update_category(&budget_id, &category_id, patch)?),
            Command::DeleteCategory {
                budget_id,
                category_id,
            } => Out::DeletedCategory(self.delete_category(&budget_id, &category_id)?),

            Command::EnsureDebtCategories { budget_id } => {
                Out::DebtSync(self.ensure_debt_categories(&budget_id)?)
            }
            Command::DebtBalance {
                budget_id,
                account_id,
                month: m,
            } => Out::DebtBalance(self.debt_balance(&budget_id, &account_id, month(m)?)?),
            Command::DebtOverview {
                budget_id,
                month: m,
            } => Out::DebtBalances(self.debt_overview(&budget_id, month(m)?)?),

            Command::Reconcile {
                budget_id,
                account_id,
                statement_date,
                statement_balance,
                notes,
            } => {
                let statement_balance = Money::parse_minor(&statement_balance)?;
                Out::Reconciliation(self.reconcile(
                    &budget_id,
                    &account_id,
                    statement_date,
                    statement_balance,
                    notes,
                )?)
            }

            Command::ListPayees { budget_id, query } => {
                Out::Payees(self.list_payees(&budget_id, query.as_deref())?)
            }
        };
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::models::{AccountType, BudgetId};
    use crate::services::NewBudget;
    use crate::storage::MemoryStore;

    fn setup() -> (Engine<MemoryStore>, BudgetId) {
        let engine = Engine::new(MemoryStore::new(), Settings::default());
        let output = engine
            .execute(Command::CreateBudget {
                budget: NewBudget {
                    name: "Home".into(),
                    currency: None,
                    start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    with_defaults: true,
                },
            })
            .unwrap();
        match output {
            CommandOutput::Budget(budget) => (engine, budget.id),
            other => panic!("unexpected output {:?}", other),
        }
    }

    #[test]
    fn test_month_must_be_first_of_month() {
        let (engine, budget_id) = setup();
        let err = engine
            .execute(Command::MonthView {
                budget_id,
                month: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            })
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_reconcile_rejects_inexact_balance() {
        let (engine, budget_id) = setup();
        let account = engine
            .create_account(&budget_id, "Checking", AccountType::Checking, true)
            .unwrap();

        for bad in ["100.5", "abc", ""] {
            let err = engine
                .execute(Command::Reconcile {
                    budget_id,
                    account_id: account.id,
                    statement_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
                    statement_balance: bad.into(),
                    notes: None,
                })
                .unwrap_err();
            assert!(err.is_invalid_argument(), "{:?} should be rejected", bad);
        }

        let ok = engine
            .execute(Command::Reconcile {
                budget_id,
                account_id: account.id,
                statement_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
                statement_balance: "-250".into(),
                notes: Some("opening".into()),
            })
            .unwrap();
        match ok {
            CommandOutput::Reconciliation(outcome) => assert_eq!(outcome.diff.cents(), -250),
            other => panic!("unexpected output {:?}", other),
        }
    }

    #[test]
    fn test_reconcile_rejects_balance_beyond_range() {
        let (engine, budget_id) = setup();
        let account = engine
            .create_account(&budget_id, "Checking", AccountType::Checking, true)
            .unwrap();
        engine
            .execute(Command::Reconcile {
                budget_id,
                account_id: account.id,
                statement_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
                statement_balance: "-250".into(),
                notes: None,
            })
            .unwrap();

        for extreme in [i64::MAX.to_string(), i64::MIN.to_string()] {
            let err = engine
                .execute(Command::Reconcile {
                    budget_id,
                    account_id: account.id,
                    statement_date: NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(),
                    statement_balance: extreme.clone(),
                    notes: None,
                })
                .unwrap_err();
            assert!(err.is_invalid_argument(), "{} should be rejected", extreme);
        }
    }

    #[test]
    fn test_output_serializes_with_kind() {
        let (engine, budget_id) = setup();
        let output = engine.execute(Command::ListPayees {
            budget_id,
            query: None,
        });
        let json = serde_json::to_value(output.unwrap()).unwrap();
        assert_eq!(json["kind"], "payees");
        assert!(json["data"].as_array().unwrap().is_empty());
    }
}
