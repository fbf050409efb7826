#![forbid(unsafe_code)]
use std::path::PathBuf;
use std::io::Read;
use std::{env, ffi, fs, io, process};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{info, LevelFilter};
use lzstring::{decode::Decoder, encode::Encoder};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

fn main() -> CodingResult {
    CodingResult::catch_panic(|| {
        let flags = Flags::from_args(env::args_os()).unwrap_or_else(|ParamError| explain());
        init_logging(flags.verbosity);
        run_coding(flags)
    })
}

fn init_logging(verbosity: u64) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // Only fails if a logger is already installed.
    let _ = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
}

fn run_coding(flags: Flags) -> Result<(), io::Error> {
    let Flags {
        input,
        operation,
        format,
        ..
    } = flags;

    let out = io::stdout();
    let out = out.lock();

    let mut data: Box<dyn Read> = match input {
        Input::File(file) => {
            info!("reading {}", file.display());
            Box::new(io::BufReader::new(fs::File::open(file)?))
        }
        Input::Stdin => Box::new(io::stdin()),
    };

    let result = match (operation, format) {
        (Operation::Encode, Format::Raw) => Encoder::new().into_stream(out).encode_all(data),
        (Operation::Decode, Format::Raw) => Decoder::new().into_stream(out).decode_all(data),
        (Operation::Encode, Format::Base64) => {
            let mut packed = vec![];
            let result = Encoder::new().into_stream(&mut packed).encode_all(data);
            result.status?;
            write_line(out, &STANDARD.encode(packed))?;
            return Ok(());
        }
        (Operation::Decode, Format::Base64) => {
            let mut text = String::new();
            data.read_to_string(&mut text)?;
            let text = lzstring::decompress_from_base64(text.trim())?;
            write_line(out, &text)?;
            return Ok(());
        }
    };

    info!(
        "read {} bytes, wrote {} bytes",
        result.bytes_read, result.bytes_written
    );
    result.status
}

fn write_line(mut out: impl io::Write, line: &str) -> io::Result<()> {
    writeln!(out, "{}", line)?;
    out.flush()
}

struct Flags {
    input: Input,
    operation: Operation,
    format: Format,
    verbosity: u64,
}

struct ParamError;

#[derive(Debug)]
enum Input {
    File(PathBuf),
    Stdin,
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Encode,
    Decode,
}

#[derive(Debug, Clone, Copy)]
enum Format {
    Base64,
    Raw,
}

fn explain<T>() -> T {
    println!(
        "Usage: lzstring [-e|-d] [-f base64|raw] <file>\n\
        Arguments:\n\
        -e\t operation encode\n\
        -d\t operation decode\n\
        -f\t transport format, base64 (default) or raw bytes\n\
        <file>\tfilepath or '-' for stdin"
    );
    process::exit(1);
}

fn command() -> clap::Command<'static> {
    clap::Command::new("lzstring")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compress text into the lz-string format and back")
        .arg(
            clap::Arg::new("decode")
                .short('d')
                .long("decode")
                .takes_value(false),
        )
        .arg(
            clap::Arg::new("encode")
                .short('e')
                .long("encode")
                .takes_value(false),
        )
        .group(
            clap::ArgGroup::new("operation")
                .args(&["decode", "encode"])
                .multiple(false)
                .required(true),
        )
        .arg(
            clap::Arg::new("format")
                .short('f')
                .long("format")
                .default_value("base64")
                .value_parser(["base64", "raw"]),
        )
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(clap::ArgAction::Count),
        )
        .arg(
            clap::Arg::new("file")
                .default_value("-")
                .value_parser(clap::builder::ValueParser::path_buf()),
        )
}

impl Flags {
    fn from_args(mut args: impl Iterator<Item = ffi::OsString>) -> Result<Self, ParamError> {
        let matches = command().get_matches_from(args.by_ref());

        let operation = if matches.contains_id("decode") {
            Operation::Decode
        } else if matches.contains_id("encode") {
            Operation::Encode
        } else {
            return Err(ParamError);
        };

        let format = match matches.get_one::<String>("format").map(String::as_str) {
            Some("raw") => Format::Raw,
            Some("base64") | None => Format::Base64,
            Some(_) => unreachable!("unparsed format"),
        };

        let input = match matches.get_one::<PathBuf>("file") {
            None => Input::Stdin,
            Some(p) if *p == PathBuf::from("-") => Input::Stdin,
            Some(p) => Input::File(p.clone()),
        };

        Ok(Flags {
            input,
            operation,
            format,
            verbosity: matches.get_count("verbose").into(),
        })
    }
}

enum CodingResult {
    Ok,
    Err(io::Error),
    Panic,
}

impl CodingResult {
    fn catch_panic(op: fn() -> Result<(), io::Error>) -> Self {
        std::panic::catch_unwind(|| match op() {
            Ok(()) => CodingResult::Ok,
            Err(err) => CodingResult::Err(err),
        })
        .unwrap_or(CodingResult::Panic)
    }
}

impl std::process::Termination for CodingResult {
    fn report(self) -> std::process::ExitCode {
        match self {
            CodingResult::Ok => std::process::ExitCode::SUCCESS,
            CodingResult::Err(err) => {
                eprintln!("{}", err);
                std::process::ExitCode::FAILURE
            }
            CodingResult::Panic => {
                eprintln!(
                    "The process failed irrecoverably! This should never happen and is a bug."
                );
                std::process::ExitCode::from(128)
            }
        }
    }
}
