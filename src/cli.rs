// ============================================================================
// Pixelsmith CLI: headless batch editing via command-line arguments
// ============================================================================
//
// Usage examples:
//   pixelsmith -i photo.png --filter blur:3 -o result.png
//   pixelsmith -i *.jpg --filter emboss --filter quantize:4 --output-dir out/
//   pixelsmith -i page.png --tool highlighter --click 40,40 60,40 -o marked.png
//   pixelsmith -i page.png --stroke "10,10;90,10;90,90" --color 1,0,0
//   pixelsmith -i page.png --stamp logo.png --at 120,80 -o stamped.pxs
//
// Every edit goes through a `Document`, so the order is: tool clicks, strokes,
// stamp, then filters in the order given.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Instant;

use clap::Parser;

use crate::color::ColorData;
use crate::components::tools::ToolId;
use crate::io::{DOCUMENT_EXTENSION, load_stamp_image};
use crate::logger;
use crate::ops::filters::Filter;
use crate::project::Document;
use crate::settings::Settings;
use crate::{log_err, log_info};

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// Pixelsmith headless raster editor.
#[derive(Parser, Debug)]
#[command(
    name = "pixelsmith",
    about = "Pixelsmith headless raster editor",
    long_about = "Paint, stamp and filter image files without a GUI. Reads any\n\
                  format the image crate decodes plus .pxs documents.\n\n\
                  Filters: blur:R, motion-blur:R[,ns|ew|ne-sw|nw-se], sharpen:R,\n\
                  edge, emboss, threshold:L, saturate:A, channels:R,G,B, quantize:N\n\n\
                  Example:\n  \
                  pixelsmith --input photo.png --filter blur:2 --output result.png\n  \
                  pixelsmith -i *.png --filter threshold:0.5 --output-dir out/"
)]
pub struct CliArgs {
    /// Input file(s). Glob patterns accepted (e.g. "*.png", "shots/*.jpg").
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<String>,

    /// Output file path. Only valid for single-file input.
    /// For batch input use --output-dir instead.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing.
    /// Files are written here with the original stem and the target format's extension.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format for derived paths: png, jpeg, bmp, tga, tiff, pxs.
    /// When omitted, the format is inferred from --output's extension, defaulting to png.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Filter to apply, repeatable; applied in the order given.
    #[arg(long = "filter", value_name = "SPEC")]
    pub filters: Vec<Filter>,

    /// Tool used by --click and --stroke.
    #[arg(short, long, default_value = "pen", value_name = "TOOL")]
    pub tool: ToolId,

    /// Points to click with the tool, e.g. `--click 10,10 20,15`.
    #[arg(long = "click", num_args = 1.., value_name = "X,Y")]
    pub clicks: Vec<Point>,

    /// Dragged stroke through `;`-separated points, repeatable.
    #[arg(long = "stroke", value_name = "X,Y;X,Y...")]
    pub strokes: Vec<Stroke>,

    /// Active color as normalised R,G,B.
    #[arg(short, long, default_value = "0,0,0", value_name = "R,G,B")]
    pub color: ColorArg,

    /// Image to stamp onto every input.
    #[arg(long, value_name = "FILE")]
    pub stamp: Option<PathBuf>,

    /// Where to place --stamp (defaults to the canvas center).
    #[arg(long, value_name = "X,Y", requires = "stamp")]
    pub at: Option<Point>,

    /// Settings file; defaults to the per-user settings.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print per-file timing and echo warnings to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl FromStr for Point {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected X,Y but got '{}'", s))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<i32>()
                .map_err(|_| format!("invalid coordinate '{}' in '{}'", v, s))
        };
        Ok(Point { x: parse(x)?, y: parse(y)? })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stroke(pub Vec<Point>);

impl FromStr for Stroke {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let points = s
            .split(';')
            .filter(|p| !p.trim().is_empty())
            .map(Point::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        if points.is_empty() {
            return Err("a stroke needs at least one point".to_string());
        }
        Ok(Stroke(points))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorArg(pub ColorData);

impl FromStr for ColorArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let channels = s
            .split(',')
            .map(|v| {
                v.trim()
                    .parse::<f32>()
                    .map_err(|_| format!("invalid color channel '{}'", v))
            })
            .collect::<Result<Vec<f32>, _>>()?;
        match channels.as_slice() {
            [r, g, b] => Ok(ColorArg(ColorData::rgb(*r, *g, *b))),
            [r, g, b, a] => Ok(ColorArg(ColorData::new(*r, *g, *b, *a))),
            _ => Err(format!("expected R,G,B[,A] but got '{}'", s)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
    Bmp,
    Tga,
    Tiff,
    Pxs,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Bmp => "bmp",
            OutputFormat::Tga => "tga",
            OutputFormat::Tiff => "tiff",
            OutputFormat::Pxs => DOCUMENT_EXTENSION,
        }
    }

    fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "jpeg" | "jpg" => OutputFormat::Jpeg,
            "bmp" => OutputFormat::Bmp,
            "tga" => OutputFormat::Tga,
            "tiff" | "tif" => OutputFormat::Tiff,
            "pxs" => OutputFormat::Pxs,
            _ => OutputFormat::Png,
        }
    }
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all CLI processing and return an OS exit code.
/// `0` = all files succeeded, `1` = one or more files failed.
pub fn run(args: CliArgs) -> ExitCode {
    logger::set_echo(args.verbose);

    let settings = match &args.config {
        Some(path) => match Settings::load(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: could not load settings '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => Settings::load_or_default(),
    };

    // Resolve glob patterns / literal paths → concrete PathBufs
    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        eprintln!("error: no input files matched the given pattern(s).");
        return ExitCode::FAILURE;
    }

    // Multiple inputs require --output-dir, not --output
    if inputs.len() > 1 && args.output.is_some() && args.output_dir.is_none() {
        eprintln!(
            "error: {} input files given but --output only accepts a single file path.\n\
             Use --output-dir to specify a destination directory for batch processing.",
            inputs.len()
        );
        return ExitCode::FAILURE;
    }

    let format = parse_format(args.format.as_deref(), args.output.as_deref());

    // Decode the stamp once for every input
    let stamp = match &args.stamp {
        Some(path) => match load_stamp_image(path) {
            Ok(canvas) => Some(canvas),
            Err(e) => {
                eprintln!("error: could not read stamp '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    if let Some(dir) = &args.output_dir
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        eprintln!(
            "error: could not create output directory '{}': {}",
            dir.display(),
            e
        );
        return ExitCode::FAILURE;
    }

    let total = inputs.len();
    let multi = total > 1;
    let mut any_failure = false;

    for (idx, input_path) in inputs.iter().enumerate() {
        if multi || args.verbose {
            println!("[{}/{}] {}", idx + 1, total, input_path.display());
        }

        let file_start = Instant::now();

        let Some(output_path) = build_output_path(
            input_path,
            args.output.as_deref(),
            args.output_dir.as_deref(),
            format,
        ) else {
            eprintln!(
                "  error: cannot determine output path for '{}'.",
                input_path.display()
            );
            any_failure = true;
            continue;
        };

        match run_one(input_path, &output_path, &args, &settings, stamp.as_ref()) {
            Ok(()) => {
                log_info!("{} -> {}", input_path.display(), output_path.display());
                if args.verbose || multi {
                    println!(
                        "  → {} ({:.0}ms)",
                        output_path.display(),
                        file_start.elapsed().as_secs_f64() * 1000.0
                    );
                }
            }
            Err(e) => {
                log_err!("{}: {}", input_path.display(), e);
                eprintln!("  error: {}", e);
                any_failure = true;
            }
        }
    }

    if any_failure { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

// ============================================================================
// Per-file processing pipeline
// ============================================================================

fn run_one(
    input: &Path,
    output: &Path,
    args: &CliArgs,
    settings: &Settings,
    stamp: Option<&crate::canvas::Canvas>,
) -> Result<(), String> {
    // -- Step 1: Load ----------------------------------------------------
    let mut doc = Document::open(input, settings).map_err(|e| format!("load failed: {}", e))?;
    doc.tools.set_active_color(args.color.0);
    doc.tools.set_active_tool(args.tool);

    // -- Step 2: Tool gestures -------------------------------------------
    for p in &args.clicks {
        doc.click(p.x, p.y);
    }
    for Stroke(points) in &args.strokes {
        let mut points = points.iter();
        if let Some(first) = points.next() {
            doc.begin_stroke(first.x, first.y);
            for p in points {
                doc.stroke_to(p.x, p.y);
            }
            doc.end_stroke();
        }
    }

    // -- Step 3: Stamp ---------------------------------------------------
    if let Some(image) = stamp {
        let at = args.at.unwrap_or(Point {
            x: doc.canvas.width() as i32 / 2,
            y: doc.canvas.height() as i32 / 2,
        });
        doc.tools.load_stamp_from_canvas(image);
        doc.tools.set_active_tool(ToolId::Stamp);
        doc.click(at.x, at.y);
        doc.tools.set_active_tool(args.tool);
    }

    // -- Step 4: Filters -------------------------------------------------
    for filter in &args.filters {
        doc.apply_filter(filter);
    }

    if args.verbose {
        let edits = doc.history.undo_history();
        if !edits.is_empty() {
            println!("  edits (newest first): {}", edits.join(", "));
        }
    }

    // -- Step 5: Save ----------------------------------------------------
    doc.save_as(output).map_err(|e| format!("save failed: {}", e))?;
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Expand glob patterns and literal paths into a deduplicated, ordered list.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let as_path = Path::new(pattern);

        if as_path.exists() {
            // Literal path: use directly
            if !result.iter().any(|p| p.as_path() == as_path) {
                result.push(as_path.to_path_buf());
            }
            continue;
        }

        // Treat as glob pattern
        match glob::glob(pattern) {
            Ok(entries) => {
                let mut matched = false;
                for entry in entries.flatten() {
                    if !result.contains(&entry) {
                        result.push(entry);
                    }
                    matched = true;
                }
                if !matched {
                    eprintln!("warning: pattern '{}' matched no files.", pattern);
                }
            }
            Err(e) => {
                eprintln!("warning: invalid glob '{}': {}", pattern, e);
            }
        }
    }

    result
}

/// Choose the [`OutputFormat`] from the `--format` string or infer it from the
/// output file extension. Defaults to PNG when neither is known.
fn parse_format(format_arg: Option<&str>, output: Option<&Path>) -> OutputFormat {
    if let Some(f) = format_arg {
        return OutputFormat::from_name(f);
    }
    output
        .and_then(|out| out.extension())
        .and_then(|e| e.to_str())
        .map(OutputFormat::from_name)
        .unwrap_or(OutputFormat::Png)
}

/// Compute the output path for a single input file.
///
/// Priority:
/// 1. `--output` (explicit path, used for single-file input)
/// 2. `--output-dir` (batch directory, derives filename from input stem)
/// 3. Fallback: same directory as input, same stem, new extension
///    (appends `_out` to stem if it would collide with the input path)
fn build_output_path(
    input: &Path,
    output: Option<&Path>,
    output_dir: Option<&Path>,
    format: OutputFormat,
) -> Option<PathBuf> {
    // Explicit output path
    if let Some(out) = output {
        return Some(out.to_path_buf());
    }

    let ext = format.extension();
    let stem = input.file_stem()?.to_string_lossy().into_owned();

    if let Some(dir) = output_dir {
        return Some(dir.join(format!("{}.{}", stem, ext)));
    }

    // Write next to the input file
    let parent = input.parent().unwrap_or(Path::new("."));
    let candidate = parent.join(format!("{}.{}", stem, ext));

    // Avoid silent overwrite of the input
    if candidate == input {
        Some(parent.join(format!("{}_out.{}", stem, ext)))
    } else {
        Some(candidate)
    }
}
