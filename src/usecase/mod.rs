pub mod contracts;
pub mod error;
pub mod random;
pub mod recommendations;
