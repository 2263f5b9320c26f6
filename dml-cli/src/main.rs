// Command-line interface for dml
//
// dml reads markdown with embedded LaTeX math on stdin and writes it to stdout with emphasis
// turned into terminal styling and math rendered as kitty graphics images.
//
// Rendering needs pdflatex and ImageMagick. When a formula fails to render its source text is
// printed instead and processing continues; the exit status is only non-zero for fatal errors
// (unreadable input, bad configuration, whole-document rendering failure).
//
// Usage:
//  dml [--colour <C>] [--size <ROWS>] [--dpi <DPI>] [--render-all-latex] [--debug] < input.md
//  dml inspect [<path>] [<transform>]   - Show segments, tree or generated LaTeX (no rendering)
//
// Configuration:
//
// Settings come from the built-in defaults, then ./dml.toml, then --config <PATH>, then flags.
// See dml-config/defaults/dml.default.toml for every key.

mod transforms;

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use dml_config::{DmlConfig, Loader, LOCAL_CONFIG_FILE};
use dml_core::{KittyEncoder, LatexRenderer, Pipeline};
use std::fs;
use std::io::{self, Read};

fn build_cli() -> Command {
    Command::new("dml")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render markdown with LaTeX math in the terminal")
        .long_about(
            "dml reads text with markdown emphasis and LaTeX math from stdin and writes it to\n\
            stdout, styling **bold** and *italic* text and rendering math as inline images\n\
            using the kitty graphics protocol.\n\n\
            Math delimiters:\n  \
            $...$  \\(...\\)     inline math\n  \
            $$...$$  \\[...\\]   display math (may span lines)\n\n\
            Examples:\n  \
            echo 'Euler: $e^{i\\pi} + 1 = 0$' | dml\n  \
            dml -c '#ff8800' -s 2 < notes.md\n  \
            dml --render-all-latex < paper.md      # one image for the whole input\n  \
            dml inspect notes.md latex             # show the generated LaTeX",
        )
        .arg(
            Arg::new("colour")
                .long("colour")
                .visible_alias("color")
                .short('c')
                .value_name("COLOUR")
                .help("Math colour: a name (white, red, navy, ...) or #RGB/#RRGGBB hex"),
        )
        .arg(
            Arg::new("size")
                .long("size")
                .short('s')
                .value_name("ROWS")
                .help("Image height in terminal rows (0 = automatic)")
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("dpi")
                .long("dpi")
                .short('d')
                .value_name("DPI")
                .help("Rasterization density (default 300)")
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(i64)),
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
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a dml.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(
            Command::new("inspect")
                .about("Show intermediate representations without rendering")
                .long_about(
                    "Run the segmenter or the LaTeX transducer and print the result.\n\
                    No TeX installation is needed.\n\n\
                    Transforms:\n  \
                    - segments-json:   segment stream as JSON (default)\n  \
                    - segments-text:   one line per segment\n  \
                    - tree:            markdown document tree\n  \
                    - latex:           LaTeX body generated from the tree\n  \
                    - latex-document:  body wrapped in the full document template\n\n\
                    Examples:\n  \
                    dml inspect notes.md                  # segments as JSON\n  \
                    dml inspect notes.md latex            # LaTeX body\n  \
                    cat notes.md | dml inspect - tree     # read stdin",
                )
                .arg(
                    Arg::new("path")
                        .help("Input file, or '-' for stdin (the default)")
                        .required(false)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("transform")
                        .help("Transform to apply. Defaults to 'segments-json'")
                        .required(false)
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            transforms::AVAILABLE_TRANSFORMS,
                        ))
                        .index(2)
                        .value_hint(ValueHint::Other),
                ),
        )
}

fn main() {
    let matches = build_cli().get_matches();

    let config = load_cli_config(&matches);
    init_logger(config.debug);

    match matches.subcommand() {
        Some(("inspect", sub_matches)) => {
            let path = sub_matches
                .get_one::<String>("path")
                .map(|s| s.as_str())
                .unwrap_or("-");
            let transform = sub_matches
                .get_one::<String>("transform")
                .map(|s| s.as_str())
                .unwrap_or(transforms::DEFAULT_TRANSFORM);
            handle_inspect_command(path, transform, &config);
        }
        Some((name, _)) => {
            eprintln!("Unknown subcommand '{name}'. Use --help for usage information.");
            std::process::exit(1);
        }
        None => handle_render_command(&config),
    }
}

/// Stream stdin to stdout through the rendering pipeline
fn handle_render_command(config: &DmlConfig) {
    let mut renderer = LatexRenderer::new().with_fuzz(config.fuzz_policy());
    if let Some(path) = &config.tools.pdflatex {
        renderer = renderer.with_pdflatex(path);
    }
    if let Some(path) = &config.tools.convert {
        renderer = renderer.with_convert(path);
    }

    let pipeline = Pipeline::new(renderer, KittyEncoder::new(), config.options());
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match pipeline.run(stdin.lock(), &mut out) {
        Ok(report) => {
            if !report.diagnostics.is_empty() || report.fallbacks > 0 {
                log::info!(
                    "{} formula(s) printed as source, {} warning(s)",
                    report.fallbacks,
                    report.diagnostics.len()
                );
            }
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}

/// Handle the inspect command
fn handle_inspect_command(path: &str, transform: &str, config: &DmlConfig) {
    let source = read_source(path).unwrap_or_else(|e| {
        eprintln!("Error reading '{path}': {e}");
        std::process::exit(1);
    });

    let output = transforms::execute_transform(&source, transform, &config.render.scheme())
        .unwrap_or_else(|e| {
            eprintln!("Execution error: {e}");
            std::process::exit(1);
        });

    print!("{output}");
}

fn read_source(path: &str) -> io::Result<String> {
    if path == "-" {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        Ok(source)
    } else {
        fs::read_to_string(path)
    }
}

fn load_cli_config(matches: &ArgMatches) -> DmlConfig {
    let loader = Loader::new().with_optional_file(LOCAL_CONFIG_FILE);
    let loader = match matches.get_one::<String>("config") {
        Some(path) => loader.with_file(path),
        None => loader,
    };

    apply_cli_overrides(loader, matches)
        .and_then(Loader::build)
        .unwrap_or_else(|err| {
            eprintln!("Failed to load configuration: {err}");
            std::process::exit(1);
        })
}

fn apply_cli_overrides(
    mut loader: Loader,
    matches: &ArgMatches,
) -> Result<Loader, dml_config::Error> {
    if let Some(colour) = matches.get_one::<String>("colour") {
        loader = loader.set_override("render.colour", colour.as_str())?;
    }
    if let Some(size) = matches.get_one::<i64>("size") {
        loader = loader.set_override("render.size", *size)?;
    }
    if let Some(dpi) = matches.get_one::<i64>("dpi") {
        loader = loader.set_override("render.dpi", *dpi)?;
    }
    if matches.get_flag("render-all-latex") {
        loader = loader.set_override("render.render_all_latex", true)?;
    }
    if matches.get_flag("debug") {
        loader = loader.set_override("debug", true)?;
    }
    Ok(loader)
}

fn init_logger(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}
