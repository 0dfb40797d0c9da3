//! Category and CategoryGroup models
//!
//! Categories are the envelopes money is assigned into. They are organized
//! into groups for display; one group name is reserved for credit card
//! payment categories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{CategoryGroupId, CategoryId};

const MAX_NAME_LEN: usize = 200;

/// A group of related categories (e.g., "Bills", "Needs", "Wants")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub id: CategoryGroupId,

    pub name: String,

    pub sort_order: i32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl CategoryGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_sort_order(name, 0)
    }

    pub fn with_sort_order(name: impl Into<String>, sort_order: i32) -> Self {
        let now = Utc::now();
        Self {
            id: CategoryGroupId::new(),
            name: name.into(),
            sort_order,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        validate_name(&self.name)
    }
}

impl fmt::Display for CategoryGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A budget category within a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,

    pub group_id: CategoryGroupId,

    pub name: String,

    /// Sort order within the group
    pub sort_order: i32,

    #[serde(default)]
    pub hidden: bool,

    /// Synthetic payment category for a credit account. Only the debt
    /// synchronizer sets this.
    #[serde(default)]
    pub is_credit_payment: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: impl Into<String>, group_id: CategoryGroupId) -> Self {
        let now = Utc::now();
        Self {
            id: CategoryId::new(),
            group_id,
            name: name.into(),
            sort_order: 0,
            hidden: false,
            is_credit_payment: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_sort_order(
        name: impl Into<String>,
        group_id: CategoryGroupId,
        sort_order: i32,
    ) -> Self {
        let mut category = Self::new(name, group_id);
        category.sort_order = sort_order;
        category
    }

    /// Payment category for the credit account named `account_name`
    pub fn credit_payment(account_name: impl Into<String>, group_id: CategoryGroupId, sort_order: i32) -> Self {
        let mut category = Self::with_sort_order(account_name, group_id, sort_order);
        category.is_credit_payment = true;
        category
    }

    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        validate_name(&self.name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

fn validate_name(name: &str) -> Result<(), CategoryValidationError> {
    if name.trim().is_empty() {
        return Err(CategoryValidationError::EmptyName);
    }
    if name.len() > MAX_NAME_LEN {
        return Err(CategoryValidationError::NameTooLong(name.len()));
    }
    Ok(())
}

/// Groups and categories seeded into a new budget, in display order
pub const DEFAULT_GROUPS: &[(&str, &[&str])] = &[
    ("Bills", &["Rent", "Utilities", "Phone"]),
    ("Needs", &["Groceries", "Transportation", "Medical"]),
    ("Wants", &["Dining Out", "Entertainment"]),
    ("Savings", &["Emergency Fund", "Vacation"]),
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CategoryValidationError {
    #[error("Name cannot be empty")]
    EmptyName,
    #[error("Name too long ({0} chars, max 200)")]
    NameTooLong(usize),
}

impl From<CategoryValidationError> for crate::error::EnvelopeError {
    fn from(err: CategoryValidationError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_category() {
        let group = CategoryGroup::new("Bills");
        let category = Category::new("Rent", group.id);

        assert_eq!(category.name, "Rent");
        assert_eq!(category.group_id, group.id);
        assert!(!category.hidden);
        assert!(!category.is_credit_payment);
    }

    #[test]
    fn test_credit_payment_category() {
        let group = CategoryGroup::new("Credit Card Payments");
        let category = Category::credit_payment("Visa", group.id, 2);
        assert!(category.is_credit_payment);
        assert_eq!(category.sort_order, 2);
    }

    #[test]
    fn test_validation() {
        let mut group = CategoryGroup::new("Valid");
        assert!(group.validate().is_ok());

        group.name = String::new();
        assert_eq!(group.validate(), Err(CategoryValidationError::EmptyName));

        let mut category = Category::new("a".repeat(201), group.id);
        assert!(matches!(
            category.validate(),
            Err(CategoryValidationError::NameTooLong(201))
        ));
        category.name = "Groceries".into();
        assert!(category.validate().is_ok());
    }

    #[test]
    fn test_default_group_names_are_valid() {
        for (group, categories) in DEFAULT_GROUPS {
            assert!(validate_name(group).is_ok());
            assert!(!categories.is_empty());
        }
        assert!(DEFAULT_GROUPS[1].1.contains(&"Groceries"));
    }

    #[test]
    fn test_serialization() {
        let group = CategoryGroup::new("Test Group");
        let category = Category::new("Test Category", group.id);
        let json = serde_json::to_string(&category).unwrap();
        let back: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(back, category);
    }
}
