use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use glob::glob;
use mpac_core::interchange::{read_formats_from_path, write_formats_to_path};
use mpac_core::{
    CatalogKind, CsvFileProvider, FormatProvider, FormatSelector, MessageFormat, Monitor,
    Registry, ReplaySource, Sink, SinkEvent,
};

mod config;
mod output;

use config::{MonitorConfig, Settings};
use output::{ConsoleSink, OutputOptions};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("MPAC_BUILD_COMMIT"),
    ", ",
    env!("MPAC_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "mpac")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Serial message monitor: reframes raw link bytes and decodes them with a format catalog.",
    long_about = None,
    after_help = "Examples:\n  mpac decode capture.bin --formats local.csv\n  mpac send 01 02 05 00 --formats local.csv\n  mpac formats list --config mpac.toml"
)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone, Default)]
struct CatalogArgs {
    /// Local catalog (CSV)
    #[arg(long, value_name = "CSV")]
    formats: Option<PathBuf>,

    /// Company catalog source (CSV); repeat for several sources
    #[arg(long = "company", value_name = "CSV")]
    company: Vec<PathBuf>,

    /// Configuration file (TOML)
    #[arg(long, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Run with administrator privilege
    #[arg(long)]
    admin: bool,
}

#[derive(Args, Debug, Clone, Copy, Default)]
struct OutputArgs {
    /// Print events as JSON lines
    #[arg(long)]
    json: bool,

    /// Prefix each event with an RFC 3339 UTC timestamp
    #[arg(long)]
    timestamps: bool,

    /// Suppress status notes and the summary
    #[arg(long)]
    quiet: bool,
}

impl From<OutputArgs> for OutputOptions {
    fn from(args: OutputArgs) -> Self {
        OutputOptions {
            json: args.json,
            timestamps: args.timestamps,
            quiet: args.quiet,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a raw byte capture through the decoder.
    #[command(
        after_help = "Examples:\n  mpac decode capture.bin --formats local.csv\n  mpac decode 'captures/*.bin' --config mpac.toml --chunk-size 16 --json"
    )]
    Decode {
        /// Raw capture file (glob patterns must match exactly one file)
        input: PathBuf,

        #[command(flatten)]
        catalogs: CatalogArgs,

        /// Bytes delivered per poll tick
        #[arg(long)]
        chunk_size: Option<usize>,

        #[command(flatten)]
        output: OutputArgs,

        /// Exit with a non-zero code if unrecognized bytes or length mismatches occur
        #[arg(long)]
        strict: bool,
    },
    /// Decode hex bytes typed on the command line as one message.
    #[command(after_help = "Examples:\n  mpac send 01 02 05 00 --formats local.csv")]
    Send {
        /// Hex byte tokens, header first
        #[arg(required = true, num_args = 1..)]
        bytes: Vec<String>,

        #[command(flatten)]
        catalogs: CatalogArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Inspect and edit catalog files.
    Formats {
        #[command(subcommand)]
        command: FormatsCommands,
    },
}

#[derive(Subcommand, Debug)]
enum FormatsCommands {
    /// List the local and company catalogs in lookup order.
    List {
        #[command(flatten)]
        catalogs: CatalogArgs,

        /// Print the catalogs as JSON
        #[arg(long)]
        json: bool,
    },
    /// Append a format to a catalog file.
    Add {
        #[command(flatten)]
        target: CatalogFileArgs,

        /// First header byte (decimal or 0x-prefixed hex)
        #[arg(long, value_parser = parse_byte)]
        id_high: u8,

        /// Second header byte (decimal or 0x-prefixed hex)
        #[arg(long, value_parser = parse_byte)]
        id_low: u8,

        /// Display name
        #[arg(long)]
        name: String,

        /// Payload length in bytes (0 = header only)
        #[arg(long, default_value_t = 0)]
        length: usize,

        /// Decode spec
        #[arg(long, default_value = "")]
        format: String,
    },
    /// Remove the format at an index from a catalog file.
    Remove {
        #[command(flatten)]
        target: CatalogFileArgs,

        /// Position in the catalog (as shown by `formats list`)
        #[arg(long)]
        index: usize,
    },
    /// Replace a local catalog file with a validated copy of another CSV.
    Import {
        /// CSV file to import
        source: PathBuf,

        /// Local catalog file to replace
        #[arg(long, value_name = "CSV")]
        catalog_file: PathBuf,
    },
    /// Write a local catalog file to another CSV.
    Export {
        /// Destination CSV file
        target: PathBuf,

        /// Local catalog file to export
        #[arg(long, value_name = "CSV")]
        catalog_file: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
struct CatalogFileArgs {
    /// Catalog file to edit (created if missing)
    #[arg(long, value_name = "CSV")]
    catalog_file: PathBuf,

    /// Which catalog the file holds
    #[arg(long, value_enum, default_value_t = CatalogChoice::Local)]
    catalog: CatalogChoice,

    /// Run with administrator privilege
    #[arg(long)]
    admin: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum CatalogChoice {
    Local,
    Company,
}

impl From<CatalogChoice> for CatalogKind {
    fn from(choice: CatalogChoice) -> Self {
        match choice {
            CatalogChoice::Local => CatalogKind::Local,
            CatalogChoice::Company => CatalogKind::Company,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let result = match cli.command {
        Commands::Decode {
            input,
            catalogs,
            chunk_size,
            output,
            strict,
        } => cmd_decode(input, catalogs, chunk_size, output, strict),
        Commands::Send {
            bytes,
            catalogs,
            output,
        } => cmd_send(bytes, catalogs, output),
        Commands::Formats { command } => match command {
            FormatsCommands::List { catalogs, json } => cmd_formats_list(catalogs, json),
            FormatsCommands::Add {
                target,
                id_high,
                id_low,
                name,
                length,
                format,
            } => cmd_formats_add(
                target,
                MessageFormat::new(id_high, id_low, name, length, format),
            ),
            FormatsCommands::Remove { target, index } => cmd_formats_remove(target, index),
            FormatsCommands::Import {
                source,
                catalog_file,
            } => cmd_formats_import(source, catalog_file),
            FormatsCommands::Export {
                target,
                catalog_file,
            } => cmd_formats_export(target, catalog_file),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

fn cmd_decode(
    input: PathBuf,
    catalogs: CatalogArgs,
    chunk_size: Option<usize>,
    output: OutputArgs,
    strict: bool,
) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&input)?;
    validate_input_file(&resolved_input)?;
    let settings = resolve_settings(catalogs, chunk_size)?;
    if settings.chunk_size == 0 {
        return Err(CliError::new(
            "chunk size must be at least 1",
            Some("pass --chunk-size with a positive value".to_string()),
        ));
    }

    let mut sink = ConsoleSink::new(output.into());
    let mut monitor = build_monitor(&settings, &mut sink)?;
    let mut source = ReplaySource::from_path(&resolved_input, settings.chunk_size)
        .with_context(|| format!("Failed to read capture: {}", resolved_input.display()))?;

    while !source.is_exhausted() {
        monitor
            .poll(&mut source, &mut sink)
            .with_context(|| format!("Failed to read capture: {}", resolved_input.display()))?;
    }
    source.close();
    monitor.close(&mut sink);

    let stats = monitor.stats();
    if !output.quiet {
        eprintln!(
            "OK: {} messages, {} unrecognized bytes, {} length mismatches ({} bytes read)",
            stats.messages,
            stats.unrecognized_bytes,
            stats.length_mismatches,
            source.len()
        );
    }
    if strict && (stats.unrecognized_bytes > 0 || stats.length_mismatches > 0) {
        return Err(CliError::new(
            "unrecognized input detected",
            Some("check the catalog files or run without --strict".to_string()),
        ));
    }
    Ok(())
}

fn cmd_send(bytes: Vec<String>, catalogs: CatalogArgs, output: OutputArgs) -> Result<(), CliError> {
    let settings = resolve_settings(catalogs, None)?;
    let mut sink = ConsoleSink::new(output.into());
    let mut monitor = build_monitor(&settings, &mut sink)?;

    monitor
        .submit_manual(&bytes.join(" "), &mut sink)
        .map_err(|err| {
            CliError::new(
                format!("invalid manual input: {err}"),
                Some("enter space-separated hex bytes, e.g. 01 02 05 00".to_string()),
            )
        })
}

fn cmd_formats_list(catalogs: CatalogArgs, json: bool) -> Result<(), CliError> {
    let settings = resolve_settings(catalogs, None)?;
    let mut notes: Vec<SinkEvent> = Vec::new();
    let monitor = build_monitor(&settings, &mut notes)?;
    let registry = monitor.registry();

    if json {
        let value = serde_json::json!({
            "local": registry.list(CatalogKind::Local),
            "company": registry.list(CatalogKind::Company),
        });
        let text = serde_json::to_string_pretty(&value).context("JSON serialization failed")?;
        println!("{text}");
        return Ok(());
    }

    for catalog in [CatalogKind::Local, CatalogKind::Company] {
        println!("{} ({}):", catalog, registry.count(catalog));
        for (index, format) in registry.list(catalog).iter().enumerate() {
            println!("  [{index}] {format}");
        }
    }
    Ok(())
}

fn cmd_formats_add(target: CatalogFileArgs, format: MessageFormat) -> Result<(), CliError> {
    let catalog = CatalogKind::from(target.catalog);
    let mut registry = load_catalog_file(&target)?;
    let name = format.name.clone();
    registry
        .add(format, catalog)
        .map_err(|err| CliError::new(err.to_string(), Some(admin_hint())))?;
    write_catalog_file(&target.catalog_file, registry.list(catalog))?;
    eprintln!(
        "OK: added '{}' -> {} ({} formats)",
        name,
        target.catalog_file.display(),
        registry.count(catalog)
    );
    Ok(())
}

fn cmd_formats_remove(target: CatalogFileArgs, index: usize) -> Result<(), CliError> {
    let catalog = CatalogKind::from(target.catalog);
    let mut registry = load_catalog_file(&target)?;
    if !registry.remove(FormatSelector::Index(index), catalog) {
        if catalog == CatalogKind::Company && !registry.is_administrator() {
            return Err(CliError::new(
                "company catalog requires administrator privilege",
                Some(admin_hint()),
            ));
        }
        return Err(CliError::new(
            format!("no format at index {index} in {}", target.catalog_file.display()),
            Some("use `mpac formats list` to see indices".to_string()),
        ));
    }
    write_catalog_file(&target.catalog_file, registry.list(catalog))?;
    eprintln!(
        "OK: removed index {} -> {} ({} formats)",
        index,
        target.catalog_file.display(),
        registry.count(catalog)
    );
    Ok(())
}

fn cmd_formats_import(source: PathBuf, catalog_file: PathBuf) -> Result<(), CliError> {
    validate_input_file(&source)?;
    if same_file(&source, &catalog_file) {
        return Err(CliError::new(
            format!("import source must differ from the catalog: {}", source.display()),
            Some("choose a different catalog file".to_string()),
        ));
    }
    let formats = read_formats_from_path(&source)
        .with_context(|| format!("Failed to import catalog: {}", source.display()))?;

    let mut registry = Registry::new();
    registry.replace_local(formats);
    write_catalog_file(&catalog_file, registry.list(CatalogKind::Local))?;
    eprintln!(
        "OK: imported {} formats -> {}",
        registry.count(CatalogKind::Local),
        catalog_file.display()
    );
    Ok(())
}

fn cmd_formats_export(target: PathBuf, catalog_file: PathBuf) -> Result<(), CliError> {
    validate_input_file(&catalog_file)?;
    if same_file(&catalog_file, &target) {
        return Err(CliError::new(
            format!("export path must differ from the catalog: {}", target.display()),
            Some("choose a different output path".to_string()),
        ));
    }
    let formats = read_formats_from_path(&catalog_file)
        .with_context(|| format!("Failed to read catalog: {}", catalog_file.display()))?;

    let mut registry = Registry::new();
    registry.replace_local(formats);
    write_catalog_file(&target, registry.list(CatalogKind::Local))?;
    eprintln!(
        "OK: exported {} formats -> {}",
        registry.count(CatalogKind::Local),
        target.display()
    );
    Ok(())
}

fn resolve_settings(catalogs: CatalogArgs, chunk_size: Option<usize>) -> Result<Settings, CliError> {
    let config = match catalogs.config.as_ref() {
        Some(path) => {
            validate_input_file(path)?;
            MonitorConfig::from_path(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?
        }
        None => MonitorConfig::default(),
    };
    Ok(Settings::merge(
        config,
        catalogs.admin,
        catalogs.formats,
        catalogs.company,
        chunk_size,
    ))
}

fn build_monitor<S: Sink + ?Sized>(settings: &Settings, sink: &mut S) -> Result<Monitor, CliError> {
    let mut registry = Registry::with_administrator(settings.administrator);

    if let Some(path) = settings.local_catalog.as_ref() {
        validate_input_file(path)?;
        let formats = read_formats_from_path(path)
            .with_context(|| format!("Failed to load local catalog: {}", path.display()))?;
        sink.emit(SinkEvent::StatusNote(format!(
            "local catalog: {} formats from {}",
            formats.len(),
            path.display()
        )));
        registry.replace_local(formats);
    }

    if !settings.company_sources.is_empty() {
        let providers: Vec<CsvFileProvider> = settings
            .company_sources
            .iter()
            .map(CsvFileProvider::new)
            .collect();
        let providers: Vec<&dyn FormatProvider> = providers
            .iter()
            .map(|provider| provider as &dyn FormatProvider)
            .collect();
        registry
            .refresh_company(&providers, sink)
            .context("Company catalog refresh failed")?;
    }

    Ok(Monitor::new(registry))
}

fn load_catalog_file(target: &CatalogFileArgs) -> Result<Registry, CliError> {
    let mut registry = Registry::with_administrator(target.admin);
    if !target.catalog_file.exists() {
        return Ok(registry);
    }
    let formats = read_formats_from_path(&target.catalog_file).with_context(|| {
        format!("Failed to read catalog: {}", target.catalog_file.display())
    })?;
    match CatalogKind::from(target.catalog) {
        CatalogKind::Local => registry.replace_local(formats),
        CatalogKind::Company => registry.replace_company(formats),
    }
    Ok(registry)
}

fn write_catalog_file(path: &Path, formats: &[MessageFormat]) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    write_formats_to_path(path, formats)
        .with_context(|| format!("Failed to write catalog: {}", path.display()))?;
    Ok(())
}

fn admin_hint() -> String {
    "pass --admin or set `administrator = true` in the config file".to_string()
}

fn parse_byte(value: &str) -> Result<u8, String> {
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => value.parse::<u8>(),
    };
    parsed.map_err(|_| format!("'{value}' is not a byte (0-255 or 0x00-0xFF)"))
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("check the path".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("pass a regular file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    let mut matches = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let listed = matches
                .iter()
                .take(3)
                .map(|path| path.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let more = if count > 3 { ", ..." } else { "" };
            Err(CliError::new(
                format!(
                    "multiple files match pattern '{}' ({} matches); matches: {}{}",
                    pattern, count, listed, more
                ),
                Some("pass a single capture file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}

#[cfg(test)]
mod tests {
    use super::{is_glob_pattern, parse_byte};

    #[test]
    fn parse_byte_accepts_hex_and_decimal() {
        assert_eq!(parse_byte("0x1F"), Ok(0x1F));
        assert_eq!(parse_byte("255"), Ok(255));
        assert!(parse_byte("0x100").is_err());
        assert!(parse_byte("-1").is_err());
    }

    #[test]
    fn glob_detection() {
        assert!(is_glob_pattern("captures/*.bin"));
        assert!(!is_glob_pattern("capture.bin"));
    }
}
