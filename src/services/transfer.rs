//! Transfer coordinator
//!
//! A transfer is two transactions, one per account, with equal magnitude and
//! opposite sign. Each leg names the other account and the other leg. Legs are
//! created, re-dated, re-amounted and deleted together.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::audit::EntityType;
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::{AccountId, Money, Transaction, TransactionId};
use crate::storage::LedgerData;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferResult {
    /// Outflow leg on the source account
    pub from_transaction: Transaction,
    /// Inflow leg on the destination account
    pub to_transaction: Transaction,
}

pub struct TransferService<'a> {
    ledger: &'a mut LedgerData,
}

impl<'a> TransferService<'a> {
    pub fn new(ledger: &'a mut LedgerData) -> Self {
        Self { ledger }
    }

    pub fn create_transfer(
        &mut self,
        from_account_id: AccountId,
        to_account_id: AccountId,
        date: NaiveDate,
        amount: Money,
        memo: Option<String>,
    ) -> EnvelopeResult<TransferResult> {
        if !amount.is_positive() {
            return Err(EnvelopeError::InvalidArgument(
                "Transfer amount must be positive".into(),
            ));
        }
        if from_account_id == to_account_id {
            return Err(EnvelopeError::InvalidArgument(
                "Cannot transfer to the same account".into(),
            ));
        }

        let from_name = self.ledger.account(&from_account_id)?.name.clone();
        let to_name = self.ledger.account(&to_account_id)?.name.clone();

        let mut from_txn = Transaction::new(from_account_id, date, -amount);
        from_txn.payee_name = format!("Transfer to {}", to_name);
        from_txn.transfer_account_id = Some(to_account_id);

        let mut to_txn = Transaction::new(to_account_id, date, amount);
        to_txn.payee_name = format!("Transfer from {}", from_name);
        to_txn.transfer_account_id = Some(from_account_id);

        if let Some(memo) = memo {
            from_txn.memo.clone_from(&memo);
            to_txn.memo = memo;
        }

        from_txn.transfer_transaction_id = Some(to_txn.id);
        to_txn.transfer_transaction_id = Some(from_txn.id);

        self.ledger.check_transaction(&from_txn)?;
        self.ledger.check_transaction(&to_txn)?;

        for txn in [&from_txn, &to_txn] {
            self.ledger.log_create(
                EntityType::Transaction,
                txn.id,
                Some(txn.payee_name.clone()),
                txn,
            );
        }
        self.ledger.insert_transaction(from_txn.clone());
        self.ledger.insert_transaction(to_txn.clone());

        Ok(TransferResult {
            from_transaction: from_txn,
            to_transaction: to_txn,
        })
    }

    /// The mirrored leg of a transfer, if it still exists
    pub fn linked_transaction(&self, transaction_id: &TransactionId) -> EnvelopeResult<Option<&Transaction>> {
        let txn = self.ledger.transaction(transaction_id)?;
        Ok(txn
            .transfer_transaction_id
            .and_then(|id| self.ledger.get_transaction(&id)))
    }

    /// Change the date and/or amount of both legs.
    ///
    /// `amount` is the new magnitude; each leg keeps its direction.
    pub fn update_transfer(
        &mut self,
        transaction_id: &TransactionId,
        date: Option<NaiveDate>,
        amount: Option<Money>,
    ) -> EnvelopeResult<()> {
        let txn = self.ledger.transaction(transaction_id)?;
        if !txn.is_transfer() {
            return Err(EnvelopeError::InvalidArgument(format!(
                "Transaction {} is not a transfer",
                transaction_id.short()
            )));
        }
        if amount.is_some_and(|a| a.is_zero()) {
            return Err(EnvelopeError::InvalidArgument(
                "Transfer amount must be non-zero".into(),
            ));
        }
        let magnitude = match amount {
            Some(a) => Some(a.checked_abs().filter(Money::is_in_range).ok_or_else(|| {
                EnvelopeError::InvalidArgument(format!(
                    "Transfer amount {} is outside the supported range",
                    a
                ))
            })?),
            None => None,
        };

        let mut legs = vec![*transaction_id];
        legs.extend(self.linked_transaction(transaction_id)?.map(|t| t.id));

        for id in legs {
            let before = self.ledger.transaction(&id)?.clone();
            let mut after = before.clone();
            if let Some(date) = date {
                after.date = date;
            }
            if let Some(magnitude) = magnitude {
                after.amount = if before.amount.is_negative() {
                    -magnitude
                } else {
                    magnitude
                };
            }
            after.updated_at = Utc::now();
            self.ledger.check_transaction(&after)?;

            *self.ledger.transaction_mut(&id)? = after.clone();
            self.ledger.log_update(
                EntityType::Transaction,
                id,
                Some(after.payee_name.clone()),
                &before,
                &after,
            );
        }
        Ok(())
    }

    /// Delete both legs of a transfer in the same unit of work
    pub fn delete_transfer(&mut self, transaction_id: &TransactionId) -> EnvelopeResult<Vec<Transaction>> {
        let txn = self.ledger.transaction(transaction_id)?;
        if !txn.is_transfer() {
            return Err(EnvelopeError::InvalidArgument(format!(
                "Transaction {} is not a transfer",
                transaction_id.short()
            )));
        }
        let mirror_id = txn.transfer_transaction_id;

        let mut removed = Vec::with_capacity(2);
        if let Some(leg) = self.ledger.remove_transaction(transaction_id) {
            removed.push(leg);
        }
        match mirror_id.and_then(|id| self.ledger.remove_transaction(&id)) {
            Some(mirror) => removed.push(mirror),
            None => warn!(
                transaction = %transaction_id,
                "transfer leg had no mirror; deleting the surviving leg"
            ),
        }

        for leg in &removed {
            self.ledger.log_delete(
                EntityType::Transaction,
                leg.id,
                Some(leg.payee_name.clone()),
                leg,
            );
        }
        Ok(removed)
    }
}
