pub mod decrypt;
pub mod encrypt;
pub mod identity;
pub mod key;
pub mod seal_helpers;
pub mod send;
