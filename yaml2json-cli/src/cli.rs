use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser};
use yaml2json::{ConvertConfig, convert_file, write_output};

use crate::logging;

/// Print the JSON form of every YAML document in a file.
#[derive(Debug, Parser)]
#[command(name = "yaml2json", version, about)]
pub struct Cli {
    /// YAML file to convert
    #[arg(value_name = "YAML_FILE")]
    pub file: PathBuf,

    /// Log progress to stderr (-v for info, -vv for debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Parse arguments, convert the named file and print the JSON.
///
/// # Errors
///
/// Returns an error if the logger cannot be installed, if the file cannot
/// be read or parsed, or if stdout cannot be written.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    // Rendered in full before anything reaches stdout.
    let json = convert_file(&cli.file, &ConvertConfig::default())?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_output(&json, &mut handle)?;
    Ok(())
}
