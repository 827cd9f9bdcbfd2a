/// Restricts outside crates from implementing marker-like traits
/// defined in this crate.
pub trait Sealed {}
