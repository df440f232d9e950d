use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use log::LevelFilter;
use quran_typeset::{read_corpus, select_chapters};
use quran_typeset_render::{
    write_document, FontShaper, HeuristicShaper, OutputFormat, PageRecorder, Shaper,
    TypesetConfig, Typesetter,
};

#[derive(Clone, Debug)]
struct Args {
    datadir: PathBuf,
    out_path: PathBuf,
    chapters: Vec<usize>,
    decorations: bool,
    config_path: Option<PathBuf>,
    font_path: Option<PathBuf>,
    format: Option<OutputFormat>,
    log_level: LevelFilter,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    if args.len() >= 2 && (args[1] == "--help" || args[1] == "-h") {
        println!("{}", help_text());
        return ExitCode::SUCCESS;
    }
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {}", msg);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    let cli = parse_args(args)?;
    let env_filters = env::var("RUST_LOG").ok();
    logger(env_filters.as_deref(), cli.log_level).init();

    let mut config = match &cli.config_path {
        Some(path) => TypesetConfig::from_json_file(path).map_err(|e| e.to_string())?,
        None => TypesetConfig::default(),
    };
    if !cli.decorations {
        config.decorations = false;
    }

    let selection = select_chapters(&cli.chapters).map_err(|e| e.to_string())?;
    log::info!("Initializing the document from {}", cli.datadir.display());
    let chapters = read_corpus(&cli.datadir, &selection).map_err(|e| e.to_string())?;

    let shaper = load_shaper(cli.font_path.as_deref(), config.font_size)?;
    let mut typesetter = Typesetter::new(config, shaper);
    let mut recorder = PageRecorder::new(
        typesetter.config().page_width,
        typesetter.config().page_height,
    );
    let summary = typesetter
        .typeset(&chapters, &mut recorder)
        .map_err(|e| e.to_string())?;

    if let Some(parent) = cli.out_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
    }
    let format = cli
        .format
        .unwrap_or_else(|| OutputFormat::from_path(&cli.out_path));
    write_document(&recorder.into_document(), &cli.out_path, format).map_err(|e| e.to_string())?;

    log::info!(
        "Typeset {} chapters: {} pages, {} lines, {} quarter marks, {} prostration marks",
        summary.chapters,
        summary.pages,
        summary.lines,
        summary.quarter_marks,
        summary.prostration_marks
    );
    Ok(())
}

/// `RUST_LOG` may add per-module filters; the `-q`/`-v` level is applied last
/// and sets the global level.
fn logger(env_filters: Option<&str>, level: LevelFilter) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    if let Some(filters) = env_filters {
        builder.parse_filters(filters);
    }
    builder
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false);
    builder
}

fn load_shaper(font: Option<&Path>, font_size: f64) -> Result<Arc<dyn Shaper>, String> {
    match font {
        Some(path) => {
            let shaper = FontShaper::from_file(path, font_size).map_err(|e| e.to_string())?;
            Ok(Arc::new(shaper))
        }
        None => Ok(Arc::new(HeuristicShaper::new(font_size))),
    }
}

fn parse_args(args: Vec<String>) -> Result<Args, String> {
    let mut positional = Vec::with_capacity(2);
    let mut cfg = Args {
        datadir: PathBuf::new(),
        out_path: PathBuf::new(),
        chapters: Vec::new(),
        decorations: true,
        config_path: None,
        font_path: None,
        format: None,
        log_level: LevelFilter::Info,
    };

    let mut i = 1usize;
    while i < args.len() {
        match args[i].as_str() {
            "--chapters" | "-c" => {
                let start = i + 1;
                i = start;
                while let Some(v) = args.get(i).filter(|v| !v.starts_with('-')) {
                    cfg.chapters.push(
                        v.parse::<usize>()
                            .map_err(|_| format!("invalid chapter number '{}'", v))?,
                    );
                    i += 1;
                }
                if i == start {
                    return Err("--chapters requires at least one value".to_string());
                }
            }
            "--no-decorations" | "-d" => {
                cfg.decorations = false;
                i += 1;
            }
            "--config" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--config requires a value".to_string())?;
                cfg.config_path = Some(PathBuf::from(v));
                i += 2;
            }
            "--font" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--font requires a value".to_string())?;
                cfg.font_path = Some(PathBuf::from(v));
                i += 2;
            }
            "--format" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--format requires a value".to_string())?;
                cfg.format = Some(v.parse::<OutputFormat>()?);
                i += 2;
            }
            "--quiet" | "-q" => {
                cfg.log_level = LevelFilter::Error;
                i += 1;
            }
            "--verbose" | "-v" => {
                cfg.log_level = LevelFilter::Debug;
                i += 1;
            }
            other if other.starts_with('-') => {
                return Err(format!("unknown option '{}'\n\n{}", other, help_text()));
            }
            other => {
                positional.push(other.to_string());
                i += 1;
            }
        }
    }

    let mut positional = positional.into_iter();
    match (positional.next(), positional.next(), positional.next()) {
        (Some(datadir), Some(out_path), None) => {
            cfg.datadir = PathBuf::from(datadir);
            cfg.out_path = PathBuf::from(out_path);
        }
        _ => return Err(format!("expected DATADIR and OUTFILE\n\n{}", help_text())),
    }
    Ok(cfg)
}

fn help_text() -> &'static str {
    r#"quran-typeset - typeset chapter text into justified fixed-size pages

USAGE:
  quran-typeset DATADIR OUTFILE [options]

ARGS:
  DATADIR                     directory holding meta.txt and 001.txt .. 114.txt
  OUTFILE                     page-description output (.json, or .postcard/.bin)

OPTIONS:
  -c, --chapters <n>...       chapters to typeset, 1..114 (default: all)
  -d, --no-decorations        do not draw the frame around the text block
      --config <file>         JSON file overriding page geometry
      --font <file>           TrueType/OpenType font used to measure words
      --format <fmt>          json|postcard (default: from OUTFILE extension)
  -q, --quiet                 only log errors
  -v, --verbose               log debug detail
  -h, --help                  show this help"#
}
