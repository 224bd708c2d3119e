pub mod place_hold_cmd;
pub mod query_holds_cmd;
pub mod release_hold_cmd;
