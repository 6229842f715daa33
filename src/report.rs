pub mod action;
pub mod associate;
pub mod document;
pub mod header;
pub mod parser;
pub mod record;
pub mod roster;
pub mod schemas;
pub mod team_name;
pub mod traits;
