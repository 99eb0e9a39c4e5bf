//! Validate command implementation

use console::Style;

use crate::cli::ValidateArgs;
use crate::error::Result;
use crate::validate;

/// Run validate command
pub fn run(args: ValidateArgs) -> Result<()> {
    let version =
        validate::validate_plugin_version(&args.directory, &args.plugin_yaml, &args.changelog)?;
    eprintln!(
        "{} plugin version {} is declared consistently and is the newest changelog entry",
        Style::new().bold().green().for_stderr().apply_to("OK"),
        version
    );
    println!("{version}");
    Ok(())
}
