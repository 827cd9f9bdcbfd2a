pub mod cpf;
pub mod error;
pub mod form;
pub mod id;
pub mod validation;

pub use cpf::Cpf;
pub use error::Error;
