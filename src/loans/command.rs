pub mod checkout_title_cmd;
pub mod query_loans_cmd;
pub mod return_title_cmd;
pub mod sync_loan_cmd;
