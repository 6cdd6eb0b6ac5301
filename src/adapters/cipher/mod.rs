pub mod age_backend;
pub mod pgp_backend;
