pub mod cipher;
pub mod http;
