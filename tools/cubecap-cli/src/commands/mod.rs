pub mod capture;
pub mod consent;
pub mod info;
