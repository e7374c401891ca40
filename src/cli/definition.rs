// Command-line definition.
//
// This file is included by both `src/cli/mod.rs` and `build.rs`, so it may
// only depend on `clap` and `std`.

/// Convert CSV data into InfluxDB line protocol
#[derive(clap::Parser, Debug)]
#[command(
    name = "csv2influx",
    about = "Convert CSV data into InfluxDB line protocol",
    long_about = "Convert CSV data into InfluxDB line protocol and optionally post it to a write endpoint.\n\n\
                  CSV files must have a header row; columns are matched by header label, ignoring case.\n\
                  Tags are written in the given order and are not sorted.",
    version,
    author
)]
pub struct Cli {
    /// Input files (supports glob patterns). Reads from stdin if not provided.
    #[arg(value_name = "FILE")]
    pub files: Vec<String>,

    /// Comma-separated field columns as name:type (types: float, int, str, bool)
    #[arg(long, alias = "field_columns", value_name = "FIELDS", required = true)]
    pub field_columns: String,

    /// Comma-separated tag columns; '*' selects every column not used as a field
    #[arg(long, alias = "tag_columns", value_name = "TAGS")]
    pub tag_columns: Option<String>,

    /// Name of the measurement
    #[arg(long, value_name = "NAME", default_value = "sample_measurement")]
    pub measurement: String,

    /// Fixed timestamp for every line (RFC 3339, YYYY-MM-DD[ HH:MM:SS] or Unix seconds)
    #[arg(long, value_name = "TIME")]
    pub timestamp: Option<String>,

    /// Precision of the written timestamp
    #[arg(long, value_enum, default_value = "n")]
    pub precision: PrecisionArg,

    /// File, or directory (path ending with a separator), receiving the result
    #[arg(long, alias = "output_path", value_name = "PATH")]
    pub output_path: Option<String>,

    /// URL of the InfluxDB write endpoint (e.g. http://localhost:8086/write?db=mydb)
    #[arg(long, alias = "load_url", value_name = "URL")]
    pub load_url: Option<String>,

    /// API token sent as 'Authorization: Token <TOKEN>' to the write endpoint
    #[arg(long, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Write endpoint request timeout in seconds
    #[arg(long, value_name = "SECS", default_value = "30")]
    pub timeout: u64,

    /// CSV field delimiter (a single character, or 'tab')
    #[arg(long, default_value = ",")]
    pub delimiter: String,

    /// Reject field values that are not literals of their declared type
    #[arg(long)]
    pub strict: bool,

    /// Number of threads for parallel encoding (default: auto-detect CPUs)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Only print warnings and errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,
}

/// Timestamp precision codes accepted on the command line
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrecisionArg {
    /// Nanoseconds
    #[value(name = "n", alias = "ns")]
    N,
    /// Microseconds
    #[value(name = "u", alias = "us")]
    U,
    /// Milliseconds
    #[value(name = "ms")]
    Ms,
    /// Seconds
    #[value(name = "s")]
    S,
    /// Minutes
    #[value(name = "m")]
    M,
    /// Hours
    #[value(name = "h")]
    H,
}
