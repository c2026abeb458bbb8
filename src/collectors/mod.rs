pub mod attributes;
pub mod info;
pub mod scan;
pub mod smartctl;
