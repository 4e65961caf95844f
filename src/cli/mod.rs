pub mod args;
pub mod command;
pub mod validation;
