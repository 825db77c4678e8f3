pub mod app_error;
pub mod ports;
pub mod read_model;
pub mod use_cases;
