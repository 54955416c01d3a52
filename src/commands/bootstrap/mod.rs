mod diagnosis;
mod mappings;
mod patient_records;
mod run;

pub use run::run;
