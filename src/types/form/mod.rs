pub mod patients;
pub mod users;
