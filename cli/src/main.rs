use std::error::Error;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use asm65::{AsmConfig, Assembler, NumberParser, SymbolTable};
use clap::Parser;
use color_print::{cformat, cprintln};
use tracing::Level;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Assembly source file
    source: PathBuf,

    /// Output file (default: source with a `.bin` extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Start address when the source has no leading `.ORG`
    #[arg(long, value_name = "ADDR", value_parser = parse_number, default_value = "0")]
    org: i32,

    /// Pre-defined constants (repeatable)
    #[arg(short = 'D', long, value_name = "NAME=VALUE", value_parser = parse_define)]
    define: Vec<(String, i32)>,

    /// Print the symbol table after assembling
    #[arg(short, long)]
    symbols: bool,

    /// One of `TRACE`, `DEBUG`, `INFO`, `WARN`, or `ERROR`
    #[arg(short, long, default_value_t = Level::WARN)]
    log_level: Level,
}

fn parse_number(s: &str) -> Result<i32, String> {
    NumberParser::parse_value(s).ok_or_else(|| format!("invalid number: `{s}`"))
}

fn parse_define(s: &str) -> Result<(String, i32), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{s}`"))?;
    Ok((name.trim().to_string(), parse_number(value.trim())?))
}

fn main() -> ExitCode {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_writer(io::stderr)
        .init();

    if let Err(e) = main_real(args) {
        cprintln!("<r,s>error</>: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn main_real(args: Args) -> Result<(), Box<dyn Error>> {
    let src = fs::read_to_string(&args.source)
        .map_err(|e| cformat!("cant open <u>{}</>: {}", args.source.display(), e))?;

    let assembler = Assembler::with_config(AsmConfig {
        origin: args.org,
        defines: args.define,
    });
    let assembly = assembler.assemble(&src)?;

    let output = args
        .output
        .unwrap_or_else(|| args.source.with_extension("bin"));
    fs::write(&output, &assembly.bytes)
        .map_err(|e| cformat!("cant write <u>{}</>: {}", output.display(), e))?;
    tracing::info!(
        "wrote {} bytes at ${:04X} to {}",
        assembly.bytes.len(),
        assembly.start_address,
        output.display()
    );

    if args.symbols {
        print_symbols(&assembly.symbols);
    }
    Ok(())
}

fn print_symbols(symbols: &SymbolTable) {
    for (name, symbol) in symbols.iter() {
        cprintln!("<c>{:>5}</> ${:04X}  {}", symbol.kind, symbol.value, name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("$0600"), Ok(0x0600));
        assert_eq!(parse_number("%101"), Ok(5));
        assert_eq!(parse_number("010"), Ok(8));
        assert_eq!(parse_number("42"), Ok(42));
        assert!(parse_number("$XYZ").is_err());
    }

    #[test]
    fn test_parse_define() {
        assert_eq!(parse_define("SCREEN=$0400"), Ok(("SCREEN".to_string(), 0x0400)));
        assert_eq!(parse_define("n = 3"), Ok(("n".to_string(), 3)));
        assert!(parse_define("SCREEN").is_err());
        assert!(parse_define("SCREEN=").is_err());
    }

    #[test]
    fn test_args() {
        let args = Args::try_parse_from([
            "asm65", "game.s", "--org", "$0800", "-D", "A=1", "-D", "B=$10", "-s",
        ])
        .unwrap();
        assert_eq!(args.source, PathBuf::from("game.s"));
        assert_eq!(args.org, 0x0800);
        assert_eq!(args.define, vec![("A".to_string(), 1), ("B".to_string(), 0x10)]);
        assert!(args.symbols);
        assert_eq!(args.log_level, Level::WARN);
    }
}
