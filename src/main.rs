use clap::Parser;
use photo_report::config::LayoutConfig;
use photo_report::{output, pipeline};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

#[derive(Parser)]
#[command(name = "photo-report")]
#[command(about = "Build a PDF report of thumbnails and metadata for a folder of images")]
#[command(long_about = "\
Build a PDF report of thumbnails and metadata for a folder of images

Every decodable image directly inside INPUT_FOLDER gets a thumbnail (longest
edge at most 5 in / 360 px) written to a `thumbnails` directory next to the
report, and an entry in the PDF:

  ┌──────────────┐
  │  thumbnail   │
  └──────────────┘
  File name:      IMG_0001.jpg
  Document Type:  JPEG
  File size:      2.41 MB
  Creation Date:  05 March 2019 at 14:30
  Image size:     4000 x 3000
  Image DPI:      300 x 300 dpi

Files that are not images are skipped. Entries are in filename order.

Metadata resolution (first available wins):
  Creation Date: EXIF DateTimeOriginal → EXIF DateTime → file creation time
  Image DPI:     embedded density (JFIF / pHYs / TIFF / BMP) → EXIF XResolution → Unknown")]
#[command(version)]
struct Cli {
    /// Folder containing the images
    input_folder: PathBuf,

    /// Path of the PDF to write
    output_pdf: PathBuf,

    /// Log more detail to stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Usage errors exit 1; --help and --version exit 0
            let code = if e.use_stderr() { 1 } else { 0 };
            e.print()?;
            return Ok(ExitCode::from(code));
        }
    };

    init_logging(cli.verbose);

    println!("==> Building report from {}", cli.input_folder.display());
    let result = pipeline::run(&cli.input_folder, &cli.output_pdf, &LayoutConfig::default())?;
    output::print_run_output(&result);

    Ok(ExitCode::SUCCESS)
}

/// Install the stderr log subscriber. Warnings only unless asked for more.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
