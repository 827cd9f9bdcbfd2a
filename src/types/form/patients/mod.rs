pub mod dispense;
pub mod register;
