pub mod list;
pub mod once;
pub mod run;
pub mod search;
