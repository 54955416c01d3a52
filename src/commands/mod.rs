pub mod acquire;
pub mod bootstrap;
pub mod register;
pub mod status;
