pub mod calculate;
pub mod history;
pub mod reset;
