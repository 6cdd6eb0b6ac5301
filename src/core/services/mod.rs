pub mod archive_pipeline;
pub mod key_resolver;
