use clap::Parser;
use simple_ico::{batch, config, container, output};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "simple-ico")]
#[command(about = "Convert an image into a multi-resolution Windows icon")]
#[command(long_about = "\
Convert an image into a multi-resolution Windows icon

The image is cropped to a centered square, resampled to every configured size
(16, 24, 32, 48, 64, 128 and 256 px by default), and each size is embedded as
a PNG in one .ico file written next to the input.

Modes:

  simple-ico                 Convert every image in the executable's directory
  simple-ico <FILE>          Convert one file (FILE.png -> FILE.ico)
  simple-ico --dir <DIR>     Convert every image in DIR

Exit codes: 0 all converted, 2 some failed, 1 nothing converted or bad usage.

Settings are read from simple-ico.toml next to the executable when present.
Run 'simple-ico --gen-config' to print a documented one.")]
#[command(version)]
struct Cli {
    /// Image to convert; omit to batch-convert a directory
    input: Option<PathBuf>,

    /// Batch-convert this directory instead of the executable's own
    #[arg(long, conflicts_with = "input")]
    dir: Option<PathBuf>,

    /// Config file (default: simple-ico.toml next to the executable)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Print the directory of an existing .ico file and exit
    #[arg(long, value_name = "ICO", conflicts_with_all = ["input", "dir"])]
    inspect: Option<PathBuf>,

    /// Print a stock simple-ico.toml with all options documented
    #[arg(long)]
    gen_config: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too and are not failures
            let code = if e.use_stderr() { 1 } else { 0 };
            e.print().ok();
            return ExitCode::from(code);
        }
    };

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<u8, Box<dyn std::error::Error>> {
    if cli.gen_config {
        print!("{}", config::stock_config_toml());
        return Ok(0);
    }

    if let Some(path) = &cli.inspect {
        let bytes = std::fs::read(path)?;
        let info = container::parse_container(&bytes)?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&info)?);
        } else {
            output::print_container_info(path, &info);
        }
        return Ok(0);
    }

    let exe_dir = exe_dir()?;
    let ico_config = match &cli.config {
        Some(path) => config::load_config_file(path)?,
        None => config::load_config(&exe_dir)?,
    };
    init_thread_pool(&ico_config.processing);

    match cli.input {
        Some(input) => Ok(convert_single(&ico_config, &input, cli.json)?),
        None => {
            let dir = cli.dir.unwrap_or(exe_dir);
            Ok(convert_directory(&ico_config, &dir, cli.json)?)
        }
    }
}

fn convert_single(
    ico_config: &config::IcoConfig,
    input: &Path,
    json: bool,
) -> Result<u8, serde_json::Error> {
    let report = batch::convert_one(ico_config, input);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output::print_file_report(&report);
    }
    Ok(if report.is_success() { 0 } else { 1 })
}

fn convert_directory(
    ico_config: &config::IcoConfig,
    dir: &Path,
    json: bool,
) -> Result<u8, Box<dyn std::error::Error>> {
    if json {
        let report = batch::run_batch(dir, ico_config, None)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(report.summary.exit_code());
    }

    println!("{}", output::format_batch_header(dir));
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for report in rx {
            output::print_file_report(&report);
        }
    });
    let report = batch::run_batch(dir, ico_config, Some(tx));
    if printer.join().is_err() {
        log::warn!("progress printer panicked");
    }
    let report = report?;

    if report.summary.total == 0 {
        println!(
            "No images with extension {} found.",
            ico_config.input.extensions.join("/")
        );
        println!("Usage: simple-ico <FILE>");
    }
    println!("{}", output::format_summary(&report.summary));
    Ok(report.summary.exit_code())
}

/// Directory holding the running executable.
fn exe_dir() -> std::io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| std::io::Error::other("executable has no parent directory"))
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
