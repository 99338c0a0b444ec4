pub mod demo;
pub mod history;
pub mod projects;
pub mod quote;
pub mod tip;
