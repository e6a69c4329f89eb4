// Command-line front end for gedcom-codec.
//
// Subcommands convert between GEDCOM byte streams and plain UTF-8 text,
// one GEDCOM line per text line, or report what a file is encoded in.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::codec::encoding::{DETECT_CHUNK_SIZE, Encoding, LineTerminator};
use crate::codec::progress::DEFAULT_NOTIFY_EVERY;
use crate::codec::reader::{LineReader, ReadOptions, ReadStats};
use crate::codec::writer::{LineWriter, WriteOptions, WriteStats};
use crate::io::{self as file_io, hex_digest};

const BUF_SIZE: usize = 64 * 1024;

fn parse_terminator(s: &str) -> Result<LineTerminator, String> {
    s.parse().map_err(|e| format!("{e}"))
}

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// GEDCOM character set codec.
#[derive(Parser, Debug)]
#[command(
    name = "gedcom-codec",
    version,
    about = "Convert GEDCOM files between ANSEL, ASCII, UTF-8 and UTF-16",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Decode a GEDCOM file to UTF-8 text lines.
    Decode(DecodeArgs),
    /// Encode UTF-8 text lines as a GEDCOM file.
    Encode(EncodeArgs),
    /// Print the encoding detected for a GEDCOM file.
    Detect(DetectArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EncodingArg {
    Ascii,
    Ansel,
    #[value(name = "utf-8", alias = "utf8")]
    Utf8,
    #[value(name = "utf-16be", alias = "unicode-be")]
    Utf16Be,
    #[value(name = "utf-16le", alias = "unicode-le")]
    Utf16Le,
}

impl From<EncodingArg> for Encoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Ascii => Encoding::Ascii,
            EncodingArg::Ansel => Encoding::Ansel,
            EncodingArg::Utf8 => Encoding::Utf8,
            EncodingArg::Utf16Be => Encoding::UnicodeBigEndian,
            EncodingArg::Utf16Le => Encoding::UnicodeLittleEndian,
        }
    }
}

#[derive(Args, Debug)]
struct IoArgs {
    /// Input file (default: stdin).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "input_pos")]
    input: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "output_pos")]
    output: Option<PathBuf>,

    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Input file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    input_pos: Option<PathBuf>,

    /// Output file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    output_pos: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Read with this encoding instead of detecting it.
    #[arg(long, short = 'e', value_enum)]
    encoding: Option<EncodingArg>,

    /// Keep leading whitespace on each line.
    #[arg(long = "keep-indent")]
    keep_indent: bool,

    #[command(flatten)]
    io: IoArgs,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Write with this encoding instead of the one named by the CHAR line.
    #[arg(long, short = 'e', value_enum)]
    encoding: Option<EncodingArg>,

    /// Line terminator: cr, lf, crlf or lfcr (default: host convention).
    #[arg(long, short = 't', value_parser = parse_terminator)]
    terminator: Option<LineTerminator>,

    /// Write big-endian when the CHAR line selects UNICODE.
    #[arg(long = "big-endian")]
    big_endian: bool,

    #[command(flatten)]
    io: IoArgs,
}

#[derive(Args, Debug)]
struct DetectArgs {
    /// Input file (default: stdin).
    #[arg(value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Decode,
    Encode,
    Detect,
    Config,
}

#[derive(Debug)]
struct Options {
    command: Command,
    use_stdout: bool,
    force: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
    encoding: Option<Encoding>,
    terminator: LineTerminator,
    little_endian: bool,
    keep_indent: bool,
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
}

fn resolve_options(cli: Cli) -> Options {
    let mut opts = Options {
        command: Command::Config,
        use_stdout: false,
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        json_output: cli.json_output,
        encoding: None,
        terminator: LineTerminator::host_default(),
        little_endian: true,
        keep_indent: false,
        input_file: None,
        output_file: None,
    };

    match cli.command {
        Cmd::Decode(args) => {
            opts.command = Command::Decode;
            opts.encoding = args.encoding.map(Encoding::from);
            opts.keep_indent = args.keep_indent;
            apply_io(&mut opts, args.io);
        }
        Cmd::Encode(args) => {
            opts.command = Command::Encode;
            opts.encoding = args.encoding.map(Encoding::from);
            if let Some(terminator) = args.terminator {
                opts.terminator = terminator;
            }
            opts.little_endian = !args.big_endian;
            apply_io(&mut opts, args.io);
        }
        Cmd::Detect(args) => {
            opts.command = Command::Detect;
            opts.input_file = args.input;
        }
        Cmd::Config => {}
    }
    opts
}

fn apply_io(opts: &mut Options, io: IoArgs) {
    opts.use_stdout = io.stdout;
    opts.input_file = io.input.or(io.input_pos);
    opts.output_file = io.output.or(io.output_pos);
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("gedcom-codec".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = resolve_options(cli);
    }
}

// ---------------------------------------------------------------------------
// Shared I/O plumbing
// ---------------------------------------------------------------------------

fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>, String> {
    match path {
        Some(path) => File::open(path)
            .map(|f| Box::new(f) as Box<dyn Read>)
            .map_err(|e| format!("input file: {}: {e}", path.display())),
        None => Ok(Box::new(io::stdin().lock())),
    }
}

fn open_output(opts: &Options) -> Result<Box<dyn Write>, String> {
    match (opts.use_stdout, &opts.output_file) {
        (true, _) | (_, None) => Ok(Box::new(BufWriter::with_capacity(
            BUF_SIZE,
            io::stdout().lock(),
        ))),
        (false, Some(path)) => {
            check_overwrite(opts, path)?;
            File::create(path)
                .map(|f| Box::new(BufWriter::with_capacity(BUF_SIZE, f)) as Box<dyn Write>)
                .map_err(|e| format!("output file: {}: {e}", path.display()))
        }
    }
}

fn check_overwrite(opts: &Options, path: &Path) -> Result<(), String> {
    if path.exists() && !opts.force {
        return Err(format!(
            "output file exists, use -f to overwrite: {}",
            path.display()
        ));
    }
    Ok(())
}

fn to_file(opts: &Options) -> Option<&Path> {
    if opts.use_stdout {
        None
    } else {
        opts.output_file.as_deref()
    }
}

fn print_json(json: serde_json::Value) {
    match serde_json::to_string_pretty(&json) {
        Ok(text) => eprintln!("{text}"),
        Err(e) => eprintln!("gedcom-codec: json error: {e}"),
    }
}

fn report(code: Result<(), String>) -> i32 {
    match code {
        Ok(()) => 0,
        Err(msg) => {
            eprintln!("gedcom-codec: {msg}");
            1
        }
    }
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("gedcom-codec version {version} (Rust)");

    let file_io = cfg!(feature = "file-io") as u8;
    let host = match LineTerminator::host_default() {
        LineTerminator::CrLf => "CRLF",
        _ => "LF",
    };

    eprintln!("FILE_IO={file_io}");
    eprintln!("CHARSETS={}", Encoding::supported_charset_names().join(","));
    eprintln!("DEFAULT_TERMINATOR={host}");
    eprintln!("DETECT_CHUNK_SIZE={DETECT_CHUNK_SIZE}");
    eprintln!("NOTIFY_EVERY={DEFAULT_NOTIFY_EVERY}");

    0
}

// ---------------------------------------------------------------------------
// Decode command
// ---------------------------------------------------------------------------

fn read_gedcom(opts: &Options) -> Result<(Vec<String>, ReadStats), String> {
    let read_opts = ReadOptions {
        trim_leading_whitespace: !opts.keep_indent,
        ..ReadOptions::default()
    };
    let shown = opts
        .input_file
        .as_deref()
        .map_or_else(|| "<stdin>".to_string(), |p| p.display().to_string());

    // Files go through the file helpers for the checksum.
    if let Some(path) = opts.input_file.as_deref() {
        let result = match opts.encoding {
            Some(encoding) => file_io::read_file_as(path, encoding, read_opts),
            None => file_io::read_file(path, read_opts),
        };
        return result.map_err(|e| format!("{shown}: {e}"));
    }

    let input = open_input(None)?;
    let reader = match opts.encoding {
        Some(encoding) => LineReader::with_encoding(input, encoding, read_opts),
        None => LineReader::new(input, read_opts),
    }
    .map_err(|e| format!("{shown}: {e}"))?;
    reader.read_all().map_err(|e| format!("{shown}: {e}"))
}

fn cmd_decode(opts: &Options) -> i32 {
    report(decode(opts))
}

fn decode(opts: &Options) -> Result<(), String> {
    if let Some(path) = to_file(opts) {
        check_overwrite(opts, path)?;
    }
    let (lines, stats) = read_gedcom(opts)?;

    let mut out = open_output(opts)?;
    for line in &lines {
        writeln!(out, "{line}").map_err(|e| format!("write error: {e}"))?;
    }
    out.flush().map_err(|e| format!("write flush error: {e}"))?;

    let encoding = stats.encoding.map(|e| e.to_string()).unwrap_or_default();
    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "gedcom-codec: decoder: encoding: {encoding}, lines: {}, input size: {}",
            stats.lines, stats.bytes
        );
    }
    if opts.json_output {
        print_json(serde_json::json!({
            "command": "decode",
            "encoding": encoding,
            "lines": stats.lines,
            "input_size": stats.bytes,
            "sha256": stats.sha256.as_ref().map(hex_digest),
        }));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Encode command
// ---------------------------------------------------------------------------

fn read_text_lines(opts: &Options) -> Result<Vec<String>, String> {
    let mut input = open_input(opts.input_file.as_deref())?;
    let mut bytes = Vec::new();
    input
        .read_to_end(&mut bytes)
        .map_err(|e| format!("read error: {e}"))?;
    let (text, _) = encoding_rs::UTF_8.decode_with_bom_removal(&bytes);
    Ok(text.lines().map(str::to_string).collect())
}

fn cmd_encode(opts: &Options) -> i32 {
    report(encode(opts))
}

fn encode(opts: &Options) -> Result<(), String> {
    let lines = read_text_lines(opts)?;
    let write_opts = WriteOptions {
        terminator: opts.terminator,
        little_endian_unicode: opts.little_endian,
        ..WriteOptions::default()
    };
    let encoding = opts
        .encoding
        .unwrap_or_else(|| Encoding::from_content(&lines, opts.little_endian));

    let stats: WriteStats = match to_file(opts) {
        Some(path) => {
            check_overwrite(opts, path)?;
            file_io::write_file_as(path, &lines, encoding, write_opts)
                .map_err(|e| format!("{}: {e}", path.display()))?
        }
        None => {
            let out = open_output(opts)?;
            let mut writer = LineWriter::with_encoding(out, encoding, write_opts);
            writer
                .write_lines(&lines)
                .map_err(|e| format!("encode error: {e}"))?
        }
    };

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "gedcom-codec: encoder: encoding: {}, lines: {}, output size: {}",
            stats.encoding, stats.lines, stats.bytes
        );
    }
    if opts.json_output {
        print_json(serde_json::json!({
            "command": "encode",
            "encoding": stats.encoding.to_string(),
            "lines": stats.lines,
            "output_size": stats.bytes,
            "sha256": stats.sha256.as_ref().map(hex_digest),
        }));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Detect command
// ---------------------------------------------------------------------------

fn cmd_detect(opts: &Options) -> i32 {
    report(detect(opts))
}

fn detect(opts: &Options) -> Result<(), String> {
    let mut input = open_input(opts.input_file.as_deref())?;
    let mut head = Vec::with_capacity(DETECT_CHUNK_SIZE);
    input
        .by_ref()
        .take(DETECT_CHUNK_SIZE as u64)
        .read_to_end(&mut head)
        .map_err(|e| format!("read error: {e}"))?;

    let encoding = Encoding::detect(&head).map_err(|e| e.to_string())?;
    if !opts.quiet {
        println!("{encoding}");
    }
    if opts.json_output {
        print_json(serde_json::json!({
            "command": "detect",
            "encoding": encoding.to_string(),
            "charset": encoding.charset_name(),
        }));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let mut opts = resolve_options(cli);

    let default_level = match (opts.quiet, opts.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(false)
        .init();

    // Warn if -c overrides output filename.
    if opts.use_stdout && !opts.quiet {
        if let Some(path) = opts.output_file.take() {
            eprintln!(
                "gedcom-codec: warning: -c option overrides output filename: {}",
                path.display()
            );
        }
    }

    let exit_code = match opts.command {
        Command::Decode => cmd_decode(&opts),
        Command::Encode => cmd_encode(&opts),
        Command::Detect => cmd_detect(&opts),
        Command::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_opts(args: &[&str]) -> Options {
        let argv: Vec<String> = std::iter::once("gedcom-codec".to_string())
            .chain(args.iter().map(|s| s.to_string()))
            .collect();
        let cli = Cli::try_parse_from(argv).expect("cli parse failed");
        resolve_options(cli)
    }

    #[test]
    fn parse_terminator_names() {
        assert_eq!(parse_terminator("crlf").unwrap(), LineTerminator::CrLf);
        assert_eq!(parse_terminator("LF").unwrap(), LineTerminator::LfOnly);
        assert!(parse_terminator("nel").is_err());
    }

    #[test]
    fn decode_subcommand_maps_correctly() {
        let opts = parse_opts(&["decode", "--encoding", "ansel", "--keep-indent", "in.ged", "out.txt"]);
        assert_eq!(opts.command, Command::Decode);
        assert_eq!(opts.encoding, Some(Encoding::Ansel));
        assert!(opts.keep_indent);
        assert_eq!(opts.input_file, Some(PathBuf::from("in.ged")));
        assert_eq!(opts.output_file, Some(PathBuf::from("out.txt")));
    }

    #[test]
    fn decode_detects_by_default() {
        let opts = parse_opts(&["decode", "in.ged"]);
        assert_eq!(opts.encoding, None);
        assert!(!opts.keep_indent);
        assert_eq!(opts.output_file, None);
    }

    #[test]
    fn encode_subcommand_maps_correctly() {
        let opts = parse_opts(&[
            "encode",
            "--terminator",
            "crlf",
            "--big-endian",
            "--input",
            "in.txt",
            "--output",
            "out.ged",
        ]);
        assert_eq!(opts.command, Command::Encode);
        assert_eq!(opts.terminator, LineTerminator::CrLf);
        assert!(!opts.little_endian);
        assert_eq!(opts.encoding, None);
        assert_eq!(opts.input_file, Some(PathBuf::from("in.txt")));
        assert_eq!(opts.output_file, Some(PathBuf::from("out.ged")));
    }

    #[test]
    fn encoding_names_and_aliases() {
        let cases = [
            ("ascii", Encoding::Ascii),
            ("utf-8", Encoding::Utf8),
            ("utf8", Encoding::Utf8),
            ("utf-16be", Encoding::UnicodeBigEndian),
            ("unicode-le", Encoding::UnicodeLittleEndian),
        ];
        for (name, expected) in cases {
            let opts = parse_opts(&["encode", "-e", name, "in", "out"]);
            assert_eq!(opts.encoding, Some(expected), "{name}");
        }
    }

    #[test]
    fn bad_terminator_is_rejected() {
        let argv = ["gedcom-codec", "encode", "--terminator", "nel", "in", "out"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn global_flags() {
        let opts = parse_opts(&["--force", "--json", "decode", "--stdout", "in", "out"]);
        assert!(opts.force);
        assert!(opts.json_output);
        assert!(opts.use_stdout);
        assert_eq!(to_file(&opts), None);
    }

    #[test]
    fn verbose_is_capped() {
        let opts = parse_opts(&["-vvv", "detect", "in.ged"]);
        assert_eq!(opts.verbose, 2);
        assert_eq!(opts.command, Command::Detect);
        assert_eq!(opts.input_file, Some(PathBuf::from("in.ged")));
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let argv = ["gedcom-codec", "-q", "-v", "config"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn config_command_maps() {
        assert_eq!(parse_opts(&["config"]).command, Command::Config);
    }

    #[test]
    fn fuzz_parser_tolerates_garbage() {
        fuzz_try_parse_args(&["--nope".to_string(), "\u{0}".to_string()]);
        fuzz_try_parse_args(&["encode".to_string(), "-t".to_string()]);
    }
}
