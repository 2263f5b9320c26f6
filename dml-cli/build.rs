use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the transforms from src/transforms.rs
// We need to duplicate this here since build scripts can't access src/ modules
const AVAILABLE_TRANSFORMS: &[&str] = &[
    "segments-json",
    "segments-text",
    "tree",
    "latex",
    "latex-document",
];

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("dml")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render markdown with LaTeX math in the terminal")
        .arg(
            Arg::new("colour")
                .long("colour")
                .visible_alias("color")
                .short('c')
                .value_name("COLOUR")
                .help("Math colour: a name or #RGB/#RRGGBB hex"),
        )
        .arg(
            Arg::new("size")
                .long("size")
                .short('s')
                .value_name("ROWS")
                .help("Image height in terminal rows (0 = automatic)"),
        )
        .arg(
            Arg::new("dpi")
                .long("dpi")
                .short('d')
                .value_name("DPI")
                .help("Rasterization density (default 300)"),
        )
        .arg(
            Arg::new("render-all-latex")
                .long("render-all-latex")
                .short('l')
                .help("Render the whole input as one LaTeX document")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .short('D')
                .help("Log debugging information to stderr")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a dml.toml configuration file")
                .value_hint(ValueHint::FilePath),
        )
        .subcommand(
            Command::new("inspect")
                .about("Show intermediate representations without rendering")
                .arg(
                    Arg::new("path")
                        .help("Input file, or '-' for stdin")
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("transform")
                        .help("Transform to apply")
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            AVAILABLE_TRANSFORMS,
                        ))
                        .index(2)
                        .value_hint(ValueHint::Other),
                ),
        );

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "dml", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "dml", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "dml", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
