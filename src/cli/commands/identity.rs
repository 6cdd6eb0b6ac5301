use std::path::Path;

use crate::cli::context;
use crate::cli::output;
use crate::config::app_config::AppConfig;
use crate::core::errors::Result;
use crate::core::models::identity::Identity;

/// Execute `sendto identity <name>`: store the default sender.
pub fn execute(config_dir: Option<&Path>, name: &str) -> Result<()> {
    let identity = Identity::new(name)?;
    let root = context::config_root(config_dir)?;

    let mut config = AppConfig::load(&root)?;
    config.sender = identity.to_string();
    config.save(&root)?;

    output::success(&format!("Sender identity set to {identity}"));
    Ok(())
}
