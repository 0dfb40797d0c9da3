//! Category service
//!
//! Provides business logic for category and category group management.
//! Credit payment categories and the reserved group that holds them are
//! owned by the credit debt synchronizer, so the usual edit paths refuse to
//! rename, move or delete them.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::audit::EntityType;
use crate::config::Settings;
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::{Category, CategoryGroup, CategoryGroupId, CategoryId};
use crate::storage::LedgerData;

/// Changes to a category group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

/// Changes to a category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub group_id: Option<CategoryGroupId>,
    #[serde(default)]
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub hidden: Option<bool>,
}

pub struct CategoryService<'a> {
    ledger: &'a mut LedgerData,
    settings: &'a Settings,
}

impl<'a> CategoryService<'a> {
    pub fn new(ledger: &'a mut LedgerData, settings: &'a Settings) -> Self {
        Self { ledger, settings }
    }

    fn is_reserved_name(&self, name: &str) -> bool {
        name.trim().eq_ignore_ascii_case(&self.settings.debt_group_name)
    }

    fn is_reserved_group(&self, id: &CategoryGroupId) -> EnvelopeResult<bool> {
        Ok(self.is_reserved_name(&self.ledger.group(id)?.name))
    }

    // === Group Operations ===

    pub fn create_group(&mut self, name: &str) -> EnvelopeResult<CategoryGroup> {
        let name = name.trim();
        if self.is_reserved_name(name) {
            return Err(EnvelopeError::InvariantViolation(format!(
                "'{}' is reserved for credit card payments",
                name
            )));
        }
        if self.ledger.get_group_by_name(name).is_some() {
            return Err(EnvelopeError::InvalidArgument(format!(
                "A category group named '{}' already exists",
                name
            )));
        }

        let group = CategoryGroup::with_sort_order(name, self.ledger.next_group_sort_order());
        group.validate()?;

        self.ledger
            .log_create(EntityType::CategoryGroup, group.id, Some(group.name.clone()), &group);
        self.ledger.groups.push(group.clone());
        Ok(group)
    }

    pub fn update_group(&mut self, id: &CategoryGroupId, patch: GroupPatch) -> EnvelopeResult<CategoryGroup> {
        let reserved = self.is_reserved_group(id)?;
        let new_name = patch.name.as_deref().map(str::trim);

        if let Some(name) = new_name {
            let renaming = !self.ledger.group(id)?.name.eq(name);
            if renaming && reserved {
                let holds_payments = self
                    .ledger
                    .categories_in_group(id)
                    .any(|c| c.is_credit_payment);
                if holds_payments {
                    return Err(EnvelopeError::InvariantViolation(
                        "The credit card payments group cannot be renamed".into(),
                    ));
                }
            }
            if renaming && self.is_reserved_name(name) && !reserved {
                return Err(EnvelopeError::InvariantViolation(format!(
                    "'{}' is reserved for credit card payments",
                    name
                )));
            }
            if self
                .ledger
                .get_group_by_name(name)
                .is_some_and(|g| g.id != *id)
            {
                return Err(EnvelopeError::InvalidArgument(format!(
                    "A category group named '{}' already exists",
                    name
                )));
            }
        }

        let group = self.ledger.group_mut(id)?;
        let before = group.clone();
        if let Some(name) = new_name {
            group.name = name.to_string();
        }
        if let Some(sort_order) = patch.sort_order {
            group.sort_order = sort_order;
        }
        group.updated_at = Utc::now();
        group.validate()?;
        let after = group.clone();

        self.ledger
            .log_update(EntityType::CategoryGroup, id, Some(after.name.clone()), &before, &after);
        Ok(after)
    }

    /// Delete an empty group
    pub fn delete_group(&mut self, id: &CategoryGroupId) -> EnvelopeResult<CategoryGroup> {
        let group = self.ledger.group(id)?;
        let count = self.ledger.categories_in_group(id).count();
        if count > 0 {
            return Err(EnvelopeError::InvariantViolation(format!(
                "Cannot delete group '{}' - it contains {} categories",
                group.name, count
            )));
        }

        let index = self
            .ledger
            .groups
            .iter()
            .position(|g| g.id == *id)
            .ok_or_else(|| EnvelopeError::group_not_found(id.to_string()))?;
        let removed = self.ledger.groups.remove(index);
        self.ledger
            .log_delete(EntityType::CategoryGroup, removed.id, Some(removed.name.clone()), &removed);
        Ok(removed)
    }

    // === Category Operations ===

    pub fn create_category(&mut self, name: &str, group_id: &CategoryGroupId) -> EnvelopeResult<Category> {
        let name = name.trim();
        if self.is_reserved_group(group_id)? {
            return Err(EnvelopeError::InvariantViolation(
                "Categories in the credit card payments group are managed automatically".into(),
            ));
        }
        if self.name_taken(name, group_id, None) {
            return Err(EnvelopeError::InvalidArgument(format!(
                "A category named '{}' already exists in this group",
                name
            )));
        }

        let sort_order = self.ledger.next_category_sort_order(group_id);
        let category = Category::with_sort_order(name, *group_id, sort_order);
        category.validate()?;

        self.ledger
            .log_create(EntityType::Category, category.id, Some(category.name.clone()), &category);
        self.ledger.categories.push(category.clone());
        Ok(category)
    }

    pub fn update_category(&mut self, id: &CategoryId, patch: CategoryPatch) -> EnvelopeResult<Category> {
        let current = self.ledger.category(id)?.clone();
        let new_name = patch.name.as_deref().map(str::trim);
        let renaming = new_name.is_some_and(|n| n != current.name);
        let moving = patch.group_id.is_some_and(|g| g != current.group_id);

        if current.is_credit_payment && (renaming || moving) {
            return Err(EnvelopeError::InvariantViolation(format!(
                "'{}' is a credit card payment category and cannot be renamed or moved",
                current.name
            )));
        }

        let target_group = patch.group_id.unwrap_or(current.group_id);
        if moving && self.is_reserved_group(&target_group)? {
            return Err(EnvelopeError::InvariantViolation(
                "Categories cannot be moved into the credit card payments group".into(),
            ));
        }
        let final_name = new_name.unwrap_or(&current.name);
        if (renaming || moving) && self.name_taken(final_name, &target_group, Some(*id)) {
            return Err(EnvelopeError::InvalidArgument(format!(
                "A category named '{}' already exists in this group",
                final_name
            )));
        }
        let sort_order = match patch.sort_order {
            Some(order) => order,
            None if moving => self.ledger.next_category_sort_order(&target_group),
            None => current.sort_order,
        };

        let category = self.ledger.category_mut(id)?;
        if let Some(name) = new_name {
            category.name = name.to_string();
        }
        category.group_id = target_group;
        category.sort_order = sort_order;
        if let Some(hidden) = patch.hidden {
            category.hidden = hidden;
        }
        category.updated_at = Utc::now();
        category.validate()?;
        let after = category.clone();

        self.ledger
            .log_update(EntityType::Category, id, Some(after.name.clone()), &current, &after);
        Ok(after)
    }

    /// Delete a category that nothing depends on.
    ///
    /// Its monthly records go with it; a category that still has money
    /// assigned in any month, or is referenced by a split, stays.
    pub fn delete_category(&mut self, id: &CategoryId) -> EnvelopeResult<Category> {
        let category = self.ledger.category(id)?;
        if category.is_credit_payment {
            return Err(EnvelopeError::InvariantViolation(format!(
                "'{}' is a credit card payment category and cannot be deleted",
                category.name
            )));
        }
        if self.ledger.category_has_transactions(id) {
            return Err(EnvelopeError::InvariantViolation(format!(
                "Cannot delete '{}' - transactions are still assigned to it",
                category.name
            )));
        }
        let has_money = self
            .ledger
            .monthly_records
            .for_category(id)
            .any(|r| !r.assigned.is_zero());
        if has_money {
            return Err(EnvelopeError::InvariantViolation(format!(
                "Cannot delete '{}' - it has money assigned",
                category.name
            )));
        }

        let index = self
            .ledger
            .categories
            .iter()
            .position(|c| c.id == *id)
            .ok_or_else(|| EnvelopeError::category_not_found(id.to_string()))?;
        let removed = self.ledger.categories.remove(index);
        self.ledger.remove_records_for_category(id);
        self.ledger
            .log_delete(EntityType::Category, removed.id, Some(removed.name.clone()), &removed);
        Ok(removed)
    }

    fn name_taken(&self, name: &str, group_id: &CategoryGroupId, exclude: Option<CategoryId>) -> bool {
        self.ledger
            .categories_in_group(group_id)
            .any(|c| Some(c.id) != exclude && c.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Account, AccountId, AccountType, Budget, Money, Month, Transaction};
    use crate::services::credit::CreditService;
    use crate::services::envelope::EnvelopeService;
    use chrono::NaiveDate;

    fn ledger_with_card() -> LedgerData {
        let settings = Settings::default();
        let mut ledger = LedgerData::new(Budget::new("Test", "USD", Month::new(2024, 1).unwrap()));
        let card = Account::new(ledger.budget_id(), "Visa", AccountType::Credit);
        ledger.accounts.push(card);
        CreditService::new(&mut ledger, &settings)
            .ensure_debt_categories()
            .unwrap();
        ledger
    }

    #[test]
    fn test_group_and_category_crud() {
        let settings = Settings::default();
        let mut ledger = ledger_with_card();
        let mut service = CategoryService::new(&mut ledger, &settings);

        let group = service.create_group("Needs").unwrap();
        let category = service.create_category("Groceries", &group.id).unwrap();
        assert_eq!(category.sort_order, 0);

        assert!(service
            .create_category("groceries", &group.id)
            .unwrap_err()
            .is_invalid_argument());

        let renamed = service
            .update_category(
                &category.id,
                CategoryPatch {
                    name: Some("Food".into()),
                    ..CategoryPatch::default()
                },
            )
            .unwrap();
        assert_eq!(renamed.name, "Food");

        assert!(service
            .delete_group(&group.id)
            .unwrap_err()
            .is_invariant_violation());
        service.delete_category(&category.id).unwrap();
        service.delete_group(&group.id).unwrap();
        assert_eq!(ledger.groups.len(), 1);
    }

    #[test]
    fn test_payment_category_is_protected() {
        let settings = Settings::default();
        let mut ledger = ledger_with_card();
        let payment = ledger.categories[0].id;
        let reserved = ledger.groups[0].id;
        let mut service = CategoryService::new(&mut ledger, &settings);
        let other = service.create_group("Needs").unwrap();

        let rename = CategoryPatch {
            name: Some("Something else".into()),
            ..CategoryPatch::default()
        };
        assert!(service
            .update_category(&payment, rename)
            .unwrap_err()
            .is_invariant_violation());

        let relocate = CategoryPatch {
            group_id: Some(other.id),
            ..CategoryPatch::default()
        };
        assert!(service
            .update_category(&payment, relocate)
            .unwrap_err()
            .is_invariant_violation());
        assert!(service
            .delete_category(&payment)
            .unwrap_err()
            .is_invariant_violation());

        let hide = CategoryPatch {
            hidden: Some(true),
            ..CategoryPatch::default()
        };
        assert!(service.update_category(&payment, hide).unwrap().hidden);

        assert!(service
            .create_category("Extra", &reserved)
            .unwrap_err()
            .is_invariant_violation());
        let rename_group = GroupPatch {
            name: Some("Cards".into()),
            ..GroupPatch::default()
        };
        assert!(service
            .update_group(&reserved, rename_group)
            .unwrap_err()
            .is_invariant_violation());
        assert!(service
            .create_group("credit card payments")
            .unwrap_err()
            .is_invariant_violation());
    }

    #[test]
    fn test_delete_category_in_use() {
        let settings = Settings::default();
        let mut ledger = ledger_with_card();
        let account = AccountId::new();
        let mut service = CategoryService::new(&mut ledger, &settings);
        let group = service.create_group("Wants").unwrap();
        let used = service.create_category("Dining Out", &group.id).unwrap();
        let funded = service.create_category("Movies", &group.id).unwrap();

        let mut txn = Transaction::new(
            account,
            NaiveDate::from_ymd_opt(2024, 2, 3).unwrap(),
            Money::from_cents(-1500),
        );
        txn.set_category(Some(used.id));
        ledger.insert_transaction(txn);
        EnvelopeService::new(&mut ledger)
            .assign(&funded.id, Month::new(2024, 2).unwrap(), Money::from_cents(1000))
            .unwrap();

        let mut service = CategoryService::new(&mut ledger, &settings);
        assert!(service
            .delete_category(&used.id)
            .unwrap_err()
            .is_invariant_violation());
        assert!(service
            .delete_category(&funded.id)
            .unwrap_err()
            .is_invariant_violation());
    }

    #[test]
    fn test_delete_category_drops_empty_records() {
        let settings = Settings::default();
        let mut ledger = ledger_with_card();
        let mut service = CategoryService::new(&mut ledger, &settings);
        let group = service.create_group("Wants").unwrap();
        let category = service.create_category("Hobbies", &group.id).unwrap();
        EnvelopeService::new(&mut ledger)
            .materialize_month(Month::new(2024, 2).unwrap())
            .unwrap();
        assert!(ledger.has_records(&category.id));

        CategoryService::new(&mut ledger, &settings)
            .delete_category(&category.id)
            .unwrap();
        assert!(!ledger.has_records(&category.id));
    }
}
