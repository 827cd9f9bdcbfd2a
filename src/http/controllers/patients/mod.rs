mod dispense;
mod history;
mod list;
mod register;

pub use dispense::dispense;
pub use history::history;
pub use list::list;
pub use register::register;
