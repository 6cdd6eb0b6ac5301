use clap::{CommandFactory, Parser};

use sendto::cli::{self, Cli, Commands};
use sendto::core::errors::SendtoError;

fn main() {
    let args = Cli::parse();
    cli::logging::init(args.verbose, args.quiet);
    cli::output::set_quiet(args.quiet);

    let config_dir = args.config_dir.as_deref();
    let cipher = args.cipher.as_deref();

    let result = match &args.command {
        Commands::Send { recipient, paths } => {
            cli::commands::send::execute(config_dir, cipher, recipient, paths)
        }
        Commands::Encrypt { recipient, paths } => {
            cli::commands::encrypt::execute(config_dir, cipher, recipient, paths)
        }
        Commands::Key { recipient } => cli::commands::key::execute(config_dir, cipher, recipient),
        Commands::Identity { name } => cli::commands::identity::execute(config_dir, name),
        Commands::Decrypt { file } => cli::commands::decrypt::execute(file),
        Commands::Version => {
            println!("sendto {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Help => Cli::command().print_help().map_err(SendtoError::from),
        Commands::External(words) => match words.split_first() {
            Some((recipient, files)) if !files.is_empty() => {
                let paths: Vec<_> = files.iter().map(std::path::PathBuf::from).collect();
                cli::commands::send::execute(config_dir, cipher, recipient, &paths)
            }
            _ => Err(SendtoError::InvalidInput {
                detail: "Usage: sendto <recipient> <files...>\n  \
                         Run 'sendto --help' for all commands."
                    .into(),
            }),
        },
    };

    if let Err(e) = result {
        cli::output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}
