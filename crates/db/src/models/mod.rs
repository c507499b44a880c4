pub mod combination;
pub mod option;
pub mod override_entry;
pub mod rule;
pub mod segment;
