//! Conversion command implementation.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use csv2influx::{
    parse_timestamp, ConversionConfig, ConvertStats, Converter, HttpSink, LineSink, MultiSink,
    OutputPath, Precision, Validation, WriterSink,
};

use super::{Cli, PrecisionArg};

/// Errors that can occur during conversion
#[derive(Debug)]
pub enum ConvertError {
    /// Invalid tag or field column list
    InvalidColumns(String),
    /// Unparseable --timestamp value
    InvalidTimestamp(String),
    /// Delimiter is not a single ASCII character
    InvalidDelimiter(String),
    /// Invalid glob pattern
    InvalidGlobPattern(String, String),
    /// Patterns were given but matched no file
    NoInputFiles,
    /// Failed to open input file
    InputFileOpen(PathBuf, io::Error),
    /// Failed to create output file
    OutputFileCreate(PathBuf, io::Error),
    /// Failed to create output directory
    OutputDirCreate(PathBuf, io::Error),
    /// Invalid write endpoint
    InvalidLoadUrl(String),
    /// Conversion or delivery of one input failed
    Processing(String, csv2influx::Error),
}

impl std::fmt::Display for ConvertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConvertError::InvalidColumns(msg) => write!(f, "{}", msg),
            ConvertError::InvalidTimestamp(msg) => write!(f, "{}", msg),
            ConvertError::InvalidDelimiter(d) => {
                write!(
                    f,
                    "Invalid delimiter '{}'. Use a single ASCII character or 'tab'.",
                    d
                )
            }
            ConvertError::InvalidGlobPattern(pattern, e) => {
                write!(f, "Invalid glob pattern '{}': {}", pattern, e)
            }
            ConvertError::NoInputFiles => write!(f, "No input files found"),
            ConvertError::InputFileOpen(path, e) => {
                write!(f, "Cannot open input file '{}': {}", path.display(), e)
            }
            ConvertError::OutputFileCreate(path, e) => {
                write!(f, "Cannot create output file '{}': {}", path.display(), e)
            }
            ConvertError::OutputDirCreate(path, e) => {
                write!(
                    f,
                    "Cannot create output directory '{}': {}",
                    path.display(),
                    e
                )
            }
            ConvertError::InvalidLoadUrl(msg) => write!(f, "{}", msg),
            ConvertError::Processing(input, e) => write!(f, "{}: {}", input, e),
        }
    }
}

impl std::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConvertError::InputFileOpen(_, e)
            | ConvertError::OutputFileCreate(_, e)
            | ConvertError::OutputDirCreate(_, e) => Some(e),
            ConvertError::Processing(_, e) => Some(e),
            _ => None,
        }
    }
}

/// Validated CLI arguments for conversion
#[derive(Debug, Clone)]
pub struct ValidatedArgs {
    /// Column configuration, measurement and timestamp
    pub config: ConversionConfig,
    /// CSV field delimiter
    pub delimiter: u8,
    /// Input files (empty means stdin)
    pub input_files: Vec<PathBuf>,
    /// File output destination
    pub output: OutputPath,
    /// Write endpoint
    pub load_url: Option<String>,
    /// Write endpoint token
    pub token: Option<String>,
    /// Write endpoint request timeout
    pub timeout: Duration,
    /// Number of threads for parallel encoding
    pub threads: Option<usize>,
    /// Quiet mode
    pub quiet: bool,
}

/// Output from a conversion run
#[derive(Debug, Default)]
pub struct ConvertOutput {
    /// Totals over every input
    pub stats: ConvertStats,
    /// Number of inputs converted (stdin counts as one)
    pub inputs_processed: usize,
}

impl From<PrecisionArg> for Precision {
    fn from(arg: PrecisionArg) -> Self {
        match arg {
            PrecisionArg::N => Precision::Nanoseconds,
            PrecisionArg::U => Precision::Microseconds,
            PrecisionArg::Ms => Precision::Milliseconds,
            PrecisionArg::S => Precision::Seconds,
            PrecisionArg::M => Precision::Minutes,
            PrecisionArg::H => Precision::Hours,
        }
    }
}

/// Validate CLI arguments and return validated args
pub fn validate_cli_args(cli: &Cli) -> Result<ValidatedArgs, ConvertError> {
    let mut config = ConversionConfig::from_specs(
        &cli.measurement,
        cli.tag_columns.as_deref(),
        &cli.field_columns,
    )
    .map_err(|e| ConvertError::InvalidColumns(e.to_string()))?;

    config.timestamp = cli
        .timestamp
        .as_deref()
        .map(parse_timestamp)
        .transpose()
        .map_err(|e| ConvertError::InvalidTimestamp(e.to_string()))?;
    config.precision = cli.precision.into();
    config.validation = if cli.strict {
        Validation::Strict
    } else {
        Validation::Lenient
    };

    let delimiter = parse_delimiter(&cli.delimiter)?;
    let input_files = collect_input_files_impl(cli)?;

    // Fail on a bad URL before any input is read
    if let Some(url) = &cli.load_url {
        HttpSink::new(url, config.precision, Duration::from_secs(cli.timeout))
            .map_err(|e| ConvertError::InvalidLoadUrl(e.to_string()))?;
    }

    Ok(ValidatedArgs {
        config,
        delimiter,
        input_files,
        output: OutputPath::parse(cli.output_path.as_deref()),
        load_url: cli.load_url.clone(),
        token: cli.token.clone(),
        timeout: Duration::from_secs(cli.timeout),
        threads: cli.threads,
        quiet: cli.quiet,
    })
}

/// Run the conversion command
pub fn run(cli: &Cli) -> Result<(), ConvertError> {
    let args = validate_cli_args(cli)?;
    convert_inputs(&args)?;
    Ok(())
}

/// Parse the --delimiter value
fn parse_delimiter(value: &str) -> Result<u8, ConvertError> {
    match value {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        v if v.len() == 1 && v.is_ascii() => Ok(v.as_bytes()[0]),
        v => Err(ConvertError::InvalidDelimiter(v.to_string())),
    }
}

/// Collect input files from positional arguments, expanding globs
fn collect_input_files_impl(cli: &Cli) -> Result<Vec<PathBuf>, ConvertError> {
    let mut files = Vec::new();

    for pattern in &cli.files {
        let paths = glob::glob(pattern)
            .map_err(|e| ConvertError::InvalidGlobPattern(pattern.clone(), e.to_string()))?;

        let mut found = false;
        for entry in paths {
            match entry {
                Ok(path) => {
                    if path.is_file() {
                        files.push(path);
                        found = true;
                    }
                }
                Err(e) => {
                    log::warn!("Error reading glob entry: {}", e);
                }
            }
        }
        if !found {
            let path = PathBuf::from(pattern);
            if path.is_file() {
                files.push(path);
            } else {
                log::warn!("No files matched pattern '{}'", pattern);
            }
        }
    }

    if !cli.files.is_empty() && files.is_empty() {
        return Err(ConvertError::NoInputFiles);
    }

    log::info!("Found {} input file(s)", files.len());
    Ok(files)
}

/// Convert every input (or stdin) into the configured destinations
pub fn convert_inputs(args: &ValidatedArgs) -> Result<ConvertOutput, ConvertError> {
    let num_threads = args.threads.unwrap_or_else(num_cpus::get);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .ok(); // Ignore error if already initialized

    let converter = Converter::new(args.config.clone())
        .with_delimiter(args.delimiter)
        .with_parallel(num_threads > 1);

    // Single-file and stdout destinations are shared by every input
    let mut shared: Option<WriterSink<Box<dyn Write>>> = match &args.output {
        OutputPath::File(path) => Some(WriterSink::new(create_output_file(path)?)),
        OutputPath::Directory(dir) => {
            std::fs::create_dir_all(dir)
                .map_err(|e| ConvertError::OutputDirCreate(dir.clone(), e))?;
            None
        }
        OutputPath::None if args.load_url.is_none() => {
            let stdout: Box<dyn Write> = Box::new(BufWriter::new(io::stdout()));
            Some(WriterSink::new(stdout))
        }
        OutputPath::None => None,
    };

    let inputs: Vec<Option<&Path>> = if args.input_files.is_empty() {
        vec![None]
    } else {
        args.input_files.iter().map(|p| Some(p.as_path())).collect()
    };

    let progress = if !args.quiet && inputs.len() > 1 {
        let pb = ProgressBar::new(inputs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} files | {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█░░"),
        );
        Some(pb)
    } else {
        None
    };

    let mut output = ConvertOutput::default();
    let mut written: HashSet<PathBuf> = HashSet::new();

    for (idx, input) in inputs.iter().enumerate() {
        let name = input_name(*input);
        match &progress {
            Some(pb) => pb.set_message(name.clone()),
            None => log::info!("-- Processing file {}/{}: {} --", idx + 1, inputs.len(), name),
        }

        let reader: Box<dyn Read> = match input {
            Some(path) => Box::new(
                File::open(path).map_err(|e| ConvertError::InputFileOpen(path.to_path_buf(), e))?,
            ),
            None => Box::new(io::stdin()),
        };

        let mut sink = MultiSink::new();
        if let Some(shared) = shared.as_mut() {
            sink.push(shared);
        }
        if let OutputPath::Directory(dir) = &args.output {
            let path = OutputPath::directory_file(dir, *input);
            // Inputs sharing a file name share the output; later ones append
            let writer = if written.contains(&path) {
                log::warn!("{} is also the output of an earlier input, appending", path.display());
                append_output_file(&path)?
            } else {
                log::debug!("Writing {} to {}", name, path.display());
                create_output_file(&path)?
            };
            written.insert(path);
            sink.push(WriterSink::new(writer));
        }
        if let Some(url) = &args.load_url {
            let http = HttpSink::new(url, args.config.precision, args.timeout)
                .map_err(|e| ConvertError::InvalidLoadUrl(e.to_string()))?
                .with_token(args.token.clone());
            sink.push(http);
        }

        let stats = converter
            .convert(reader, &mut sink)
            .and_then(|stats| sink.finish().map(|_| stats))
            .map_err(|e| ConvertError::Processing(name.clone(), e))?;

        log::info!("Converted {} lines from {}", stats.lines, name);
        output.stats += stats;
        output.inputs_processed += 1;

        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_with_message("Done");
    }

    if output.inputs_processed > 1 {
        log::info!(
            "Converted {} lines from {} files using {} threads",
            output.stats.lines,
            output.inputs_processed,
            num_threads
        );
    }

    Ok(output)
}

fn create_output_file(path: &Path) -> Result<Box<dyn Write>, ConvertError> {
    let file =
        File::create(path).map_err(|e| ConvertError::OutputFileCreate(path.to_path_buf(), e))?;
    Ok(Box::new(BufWriter::new(file)))
}

fn append_output_file(path: &Path) -> Result<Box<dyn Write>, ConvertError> {
    let file = OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|e| ConvertError::OutputFileCreate(path.to_path_buf(), e))?;
    Ok(Box::new(BufWriter::new(file)))
}

fn input_name(input: Option<&Path>) -> String {
    match input {
        Some(path) => path.display().to_string(),
        None => "<stdin>".to_string(),
    }
}
