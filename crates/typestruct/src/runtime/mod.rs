pub mod value;
pub mod matcher;
