pub mod dates;
pub mod display_names;
pub mod error;
pub mod reshape;
