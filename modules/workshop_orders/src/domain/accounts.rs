//! Primary/secondary account linkage by shared phone number

use crate::contract::{AccountSuggestion, AccountType, Customer, CustomerInput, FieldError};

/// Suggest an account type for a phone number given the customers already using it.
///
/// An empty phone yields `None` (unset, primary by default). A phone already used by
/// a `Primary` customer makes the new customer `Secondary` of that account.
pub fn suggest_account_type(phone: &str, same_phone: &[Customer]) -> Option<AccountSuggestion> {
    let phone = phone.trim();
    if phone.is_empty() {
        return None;
    }
    let has_primary = same_phone
        .iter()
        .any(|c| c.account_type == Some(AccountType::Primary) && c.phone.trim() == phone);

    Some(if has_primary {
        AccountSuggestion {
            account_type: AccountType::Secondary,
            relation: Some(phone.to_string()),
        }
    } else {
        AccountSuggestion {
            account_type: AccountType::Primary,
            relation: None,
        }
    })
}

/// Fill in or check the account type of a customer about to be written.
///
/// `editing` is the id of the customer being updated; it never counts as its own primary.
pub fn resolve_account_type(
    mut input: CustomerInput,
    same_phone: &[Customer],
    editing: Option<i32>,
) -> Result<CustomerInput, FieldError> {
    let others: Vec<Customer> = same_phone
        .iter()
        .filter(|c| Some(c.id) != editing)
        .cloned()
        .collect();
    let suggestion = suggest_account_type(&input.phone, &others);

    match (input.account_type, suggestion) {
        (None, Some(suggestion)) => {
            input.account_type = Some(suggestion.account_type);
            input.relation = suggestion.relation;
        }
        (None, None) => {
            input.relation = None;
        }
        (Some(AccountType::Secondary), Some(suggestion))
            if suggestion.account_type == AccountType::Secondary =>
        {
            input.relation = suggestion.relation;
        }
        (Some(AccountType::Secondary), _) => {
            return Err(FieldError::new(
                "account_type",
                "a secondary account needs an existing primary account with the same phone",
            ));
        }
        (Some(AccountType::Primary), _) => {
            input.relation = None;
        }
    }

    Ok(input)
}
