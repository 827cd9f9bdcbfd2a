mod dispensing;
mod patient;
mod user;

pub use dispensing::{Dispensing, HistoryEntry, InsertDispensing};
pub use patient::{InsertPatient, Patient, PatientFilters, PatientSummary};
pub use user::{UpsertUser, User};
