pub mod device;
pub mod smart;
