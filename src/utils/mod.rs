pub mod identifier;
pub mod jwt;
pub mod password;
pub mod validate;
