//! Reconciliation engine
//!
//! Compares the ledger balance of an account with a statement balance, posts
//! a correcting transaction when they differ and moves cleared transactions
//! on or before the statement date to reconciled. Uncleared transactions are
//! never touched.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::audit::EntityType;
use crate::config::Settings;
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::{
    AccountId, Money, ReconciliationEvent, ReconciliationId, Transaction, TransactionId,
    TransactionState,
};
use crate::storage::LedgerData;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileOutcome {
    pub reconciliation_id: ReconciliationId,
    pub account_id: AccountId,
    pub statement_date: NaiveDate,
    pub statement_balance: Money,
    /// Ledger balance before the adjustment
    pub previous_balance: Money,
    /// `statement_balance - previous_balance`
    pub diff: Money,
    pub adjustment_transaction_id: Option<TransactionId>,
    /// Cleared transactions moved to reconciled
    pub reconciled_count: usize,
}

pub struct ReconciliationService<'a> {
    ledger: &'a mut LedgerData,
    settings: &'a Settings,
}

impl<'a> ReconciliationService<'a> {
    pub fn new(ledger: &'a mut LedgerData, settings: &'a Settings) -> Self {
        Self { ledger, settings }
    }

    pub fn reconcile(
        &mut self,
        account_id: &AccountId,
        statement_date: NaiveDate,
        statement_balance: Money,
        notes: Option<String>,
    ) -> EnvelopeResult<ReconcileOutcome> {
        let account_name = self.ledger.account(account_id)?.name.clone();
        if !statement_balance.is_in_range() {
            return Err(EnvelopeError::InvalidArgument(format!(
                "statement balance {} is outside the supported range",
                statement_balance
            )));
        }
        self.ledger.check_date(statement_date)?;
        let notes = notes.filter(|n| !n.trim().is_empty());

        let previous_balance = self.ledger.account_balance(account_id);
        let mut event = ReconciliationEvent::new(
            *account_id,
            statement_date,
            statement_balance,
            previous_balance,
        );
        event.notes = notes.clone();

        if !event.diff.is_zero() {
            let mut adjustment = Transaction::new(*account_id, statement_date, event.diff);
            adjustment.memo = notes.unwrap_or_else(|| self.settings.reconciliation_memo.clone());
            adjustment.state = TransactionState::Reconciled;
            self.ledger.check_transaction(&adjustment)?;

            self.ledger.log_create(
                EntityType::Transaction,
                adjustment.id,
                Some(adjustment.memo.clone()),
                &adjustment,
            );
            event.adjustment_transaction_id = Some(adjustment.id);
            self.ledger.insert_transaction(adjustment);
        }

        let to_reconcile: Vec<TransactionId> = self
            .ledger
            .transactions_for_account(account_id)
            .filter(|t| t.state == TransactionState::Cleared && t.date <= statement_date)
            .map(|t| t.id)
            .collect();
        for id in &to_reconcile {
            let txn = self.ledger.transaction_mut(id)?;
            let before = txn.clone();
            txn.set_state(TransactionState::Reconciled);
            let after = txn.clone();
            self.ledger
                .log_update(EntityType::Transaction, id, None, &before, &after);
        }
        event.reconciled_count = to_reconcile.len();

        let account = self.ledger.account_mut(account_id)?;
        let account_before = account.clone();
        account.mark_reconciled(statement_date, statement_balance);
        let account_after = account.clone();
        self.ledger.log_update(
            EntityType::Account,
            account_id,
            Some(account_name.clone()),
            &account_before,
            &account_after,
        );

        info!(
            account = %account_name,
            diff = event.diff.cents(),
            reconciled = event.reconciled_count,
            "reconciled account"
        );

        let outcome = ReconcileOutcome {
            reconciliation_id: event.id,
            account_id: *account_id,
            statement_date,
            statement_balance,
            previous_balance,
            diff: event.diff,
            adjustment_transaction_id: event.adjustment_transaction_id,
            reconciled_count: event.reconciled_count,
        };
        self.ledger.log_create(
            EntityType::Reconciliation,
            event.id,
            Some(account_name),
            &event,
        );
        self.ledger.reconciliations.push(event);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Account, AccountType, Budget, Month};

    fn setup() -> (LedgerData, AccountId) {
        let mut ledger = LedgerData::new(Budget::new("Test", "USD", Month::new(2024, 1).unwrap()));
        let account = Account::new(ledger.budget_id(), "Checking", AccountType::Checking);
        let id = account.id;
        ledger.accounts.push(account);
        (ledger, id)
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn add(ledger: &mut LedgerData, account: AccountId, d: u32, cents: i64, state: TransactionState) -> TransactionId {
        let mut txn = Transaction::new(account, date(d), Money::from_cents(cents));
        txn.state = state;
        let id = txn.id;
        ledger.insert_transaction(txn);
        id
    }

    #[test]
    fn test_reconcile_with_adjustment() {
        let (mut ledger, account) = setup();
        add(&mut ledger, account, 1, 10050, TransactionState::Cleared);
        let settings = Settings::default();

        let outcome = ReconciliationService::new(&mut ledger, &settings)
            .reconcile(&account, date(31), Money::from_cents(10000), None)
            .unwrap();

        assert_eq!(outcome.diff.cents(), -50);
        let adjustment_id = outcome.adjustment_transaction_id.unwrap();
        let adjustment = ledger.transaction(&adjustment_id).unwrap();
        assert_eq!(adjustment.amount.cents(), -50);
        assert_eq!(adjustment.state, TransactionState::Reconciled);
        assert_eq!(adjustment.date, date(31));
        assert_eq!(adjustment.memo, "Reconciliation Adjustment");
        assert_eq!(ledger.account_balance(&account).cents(), 10000);
        assert_eq!(ledger.reconciliations.len(), 1);

        let stamped = ledger.account(&account).unwrap();
        assert_eq!(stamped.last_reconciled_date, Some(date(31)));
        assert_eq!(stamped.last_reconciled_balance, Some(Money::from_cents(10000)));
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let (mut ledger, account) = setup();
        add(&mut ledger, account, 1, 10050, TransactionState::Cleared);
        let settings = Settings::default();
        let mut service = ReconciliationService::new(&mut ledger, &settings);

        service
            .reconcile(&account, date(31), Money::from_cents(10000), Some("March statement".into()))
            .unwrap();
        let second = service
            .reconcile(&account, date(31), Money::from_cents(10000), None)
            .unwrap();

        assert!(second.diff.is_zero());
        assert!(second.adjustment_transaction_id.is_none());
        assert_eq!(second.reconciled_count, 0);
        assert_eq!(ledger.transactions.len(), 2);
        assert!(ledger.transactions.iter().any(|t| t.memo == "March statement"));
    }

    #[test]
    fn test_only_cleared_on_or_before_statement_date() {
        let (mut ledger, account) = setup();
        let cleared = add(&mut ledger, account, 5, -100, TransactionState::Cleared);
        let uncleared = add(&mut ledger, account, 6, -200, TransactionState::Uncleared);
        let late = add(&mut ledger, account, 25, -300, TransactionState::Cleared);
        let settings = Settings::default();

        let outcome = ReconciliationService::new(&mut ledger, &settings)
            .reconcile(&account, date(20), Money::from_cents(-600), None)
            .unwrap();

        assert!(outcome.diff.is_zero());
        assert_eq!(outcome.reconciled_count, 1);
        assert_eq!(
            ledger.transaction(&cleared).unwrap().state,
            TransactionState::Reconciled
        );
        assert_eq!(
            ledger.transaction(&uncleared).unwrap().state,
            TransactionState::Uncleared
        );
        assert_eq!(
            ledger.transaction(&late).unwrap().state,
            TransactionState::Cleared
        );
    }

    #[test]
    fn test_statement_balance_out_of_range() {
        let (mut ledger, account) = setup();
        add(&mut ledger, account, 1, -100, TransactionState::Cleared);
        let settings = Settings::default();
        let mut service = ReconciliationService::new(&mut ledger, &settings);

        for cents in [i64::MAX, i64::MIN] {
            let err = service
                .reconcile(&account, date(31), Money::from_cents(cents), None)
                .unwrap_err();
            assert!(err.is_invalid_argument());
        }
        let far = NaiveDate::from_ymd_opt(2500, 1, 1).unwrap();
        assert!(service
            .reconcile(&account, far, Money::zero(), None)
            .unwrap_err()
            .is_invalid_argument());

        assert_eq!(ledger.transactions.len(), 1);
        assert!(ledger.reconciliations.is_empty());
    }

    #[test]
    fn test_unknown_account() {
        let (mut ledger, _) = setup();
        let settings = Settings::default();
        let err = ReconciliationService::new(&mut ledger, &settings)
            .reconcile(&AccountId::new(), date(1), Money::zero(), None)
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(ledger.reconciliations.is_empty());
    }
}
