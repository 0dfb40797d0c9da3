//! Category display formatting

use crate::models::{Category, CategoryGroup};

pub fn format_group(group: &CategoryGroup) -> String {
    format!(
        "Category group: {}\n  ID:         {}\n  Sort Order: {}\n",
        group.name, group.id, group.sort_order
    )
}

pub fn format_category(category: &Category) -> String {
    let mut output = String::new();
    output.push_str(&format!("Category: {}\n", category.name));
    output.push_str(&format!("  ID:         {}\n", category.id));
    output.push_str(&format!("  Group ID:   {}\n", category.group_id));
    output.push_str(&format!("  Sort Order: {}\n", category.sort_order));
    if category.hidden {
        output.push_str("  Hidden:     Yes\n");
    }
    if category.is_credit_payment {
        output.push_str("  Credit card payment category\n");
    }
    output
}
