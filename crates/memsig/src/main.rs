use std::error::Error;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use memsig_core::process::loader_layout_segments;
use memsig_core::scanner::{ScanOptions, Scanner, DEFAULT_CHUNK_SIZE};
use memsig_core::{AccessMode, Address, MemoryChannel, OffsetChain, ProcessBackend, ProcessContext, SearchMode, Signature};
use memsig_utils::{debug, info, init_logging, init_logging_with_level, LogFormat, LogLevel};

type CliResult<T> = Result<T, Box<dyn Error>>;

/// Find byte signatures in a running process and apply single-byte patches.
#[derive(Parser, Debug)]
#[command(name = "memsig")]
#[command(version)]
#[command(about = "Find byte signatures in a running process and apply single-byte patches", long_about = None)]
struct Cli
{
    /// Log level (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Log format: pretty or json (overrides MEMSIG_LOG_FORMAT)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// procfs mount point
    #[arg(long, global = true, default_value = "/proc")]
    proc_root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// List a process's memory regions and its classified image segments
    Regions
    {
        /// Process name (exact, or a prefix of it)
        process: String,
    },
    /// Print every address where a signature matches
    Scan
    {
        /// Process name (exact, or a prefix of it)
        process: String,
        /// Signature, e.g. "F6 47 3B 02 ?? 3E"
        signature: String,
        /// Regions to scan: any, any:<rwx>, all:<rwx>, code, rodata, data
        #[arg(short, long, default_value = "any")]
        mode: SearchMode,
        /// Streaming buffer size in bytes
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
    },
    /// Replace one byte at a fixed offset from every signature match
    Patch
    {
        /// Process name (exact, or a prefix of it)
        process: String,
        /// Signature, e.g. "F6 47 3B 02 ?? 3E"
        signature: String,
        /// Offset of the patched byte from the match (decimal or 0x hex)
        #[arg(long, allow_hyphen_values = true, value_parser = parse_offset)]
        offset: i64,
        /// Byte expected before patching (hex)
        #[arg(long, value_parser = parse_byte)]
        expect: u8,
        /// Byte to write (hex)
        #[arg(long, value_parser = parse_byte)]
        replace: u8,
        /// Regions to scan
        #[arg(short, long, default_value = "code")]
        mode: SearchMode,
    },
    /// Resolve an offset chain from a base address
    Resolve
    {
        /// Process name (exact, or a prefix of it)
        process: String,
        /// Base address (hex)
        #[arg(value_parser = parse_address)]
        base: Address,
        /// Comma-separated hex offsets, e.g. "10,-4,0x20"
        #[arg(allow_hyphen_values = true)]
        chain: OffsetChain,
    },
}

fn main()
{
    let cli = Cli::parse();

    let logging = match (cli.log_level, cli.log_format) {
        (None, None) => init_logging(),
        (level, format) => init_logging_with_level(level.unwrap_or(LogLevel::Info), format.unwrap_or_default()),
    };
    let _guard = match logging {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

#[cfg(target_os = "linux")]
fn run(cli: Cli) -> CliResult<()>
{
    let backend = memsig_core::LinuxBackend::with_proc_root(cli.proc_root);
    run_command(backend, cli.command)
}

#[cfg(not(target_os = "linux"))]
fn run(cli: Cli) -> CliResult<()>
{
    Err(format!(
        "no process backend for this platform (only Linux procfs is supported, --proc-root {} unused)",
        cli.proc_root.display()
    )
    .into())
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn run_command<B: ProcessBackend>(backend: B, command: Commands) -> CliResult<()>
{
    match command {
        Commands::Regions { process } => list_regions(&backend, &process),
        Commands::Scan {
            process,
            signature,
            mode,
            chunk_size,
        } => {
            let signature = Signature::parse(&signature)?;
            let process = ProcessContext::attach(backend, &process)?;
            let mut peek = process.open_channel(AccessMode::Peek)?;

            let scanner = Scanner::with_options(ScanOptions { chunk_size });
            let matches = scanner.scan(&process, &mut peek, &signature, mode)?;
            info!(count = matches.len(), "scan complete");
            for address in matches {
                println!("{address}");
            }
            Ok(())
        }
        Commands::Patch {
            process,
            signature,
            offset,
            expect,
            replace,
            mode,
        } => {
            let signature = Signature::parse(&signature)?;
            let process = ProcessContext::attach(backend, &process)?;
            let patched = apply_patch(&process, &signature, mode, offset, expect, replace)?;
            println!("Patched {patched} site(s) in {} (pid {})", process.name(), process.pid());
            Ok(())
        }
        Commands::Resolve { process, base, chain } => {
            let pid = backend.find_process(&process)?;
            let mut peek = backend.open_channel(pid, AccessMode::Peek)?;
            let resolved = chain.resolve(&mut peek, base)?;
            println!("{resolved}");
            Ok(())
        }
    }
}

fn list_regions<B: ProcessBackend>(backend: &B, name: &str) -> CliResult<()>
{
    let pid = backend.find_process(name)?;
    let regions = backend.regions(pid)?;
    println!("Process {name} (pid {pid}): {} regions", regions.len());
    for region in &regions {
        println!("  {region}");
    }

    let segments = loader_layout_segments(name, &regions);
    println!("\nSegments:");
    for (label, segment) in [("code", &segments.code), ("rodata", &segments.rodata), ("data", &segments.data)] {
        match segment {
            Some(region) => println!("  {label:<7}{}-{} ({} bytes)", region.start, region.end, region.size()),
            None => println!("  {label:<7}not found"),
        }
    }
    Ok(())
}

/// Write `replace` at `offset` from each match whose byte there equals `expect`.
fn apply_patch<B: ProcessBackend>(
    process: &ProcessContext<B>,
    signature: &Signature,
    mode: SearchMode,
    offset: i64,
    expect: u8,
    replace: u8,
) -> CliResult<usize>
{
    let mut peek = process.open_channel(AccessMode::Peek)?;
    let mut poke = process.open_channel(AccessMode::Poke)?;

    let matches = Scanner::new().scan(process, &mut peek, signature, mode)?;
    if matches.is_empty() {
        return Err("Failed to find memory signature".into());
    }

    let mut patched = 0;
    for found in matches {
        let target = found.offset(offset);
        let current = peek.read_u8(target)?;
        if current == replace {
            return Err(format!("Patch is already applied at {target}").into());
        }
        if current != expect {
            debug!(%target, current, expect, "byte differs from expected value, skipping");
            continue;
        }
        poke.write(target, &[replace])?;
        info!(%target, from = expect, to = replace, "patched");
        patched += 1;
    }
    Ok(patched)
}

fn parse_byte(s: &str) -> Result<u8, String>
{
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    u8::from_str_radix(digits, 16).map_err(|e| format!("invalid hex byte '{s}': {e}"))
}

fn parse_address(s: &str) -> Result<Address, String>
{
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    u64::from_str_radix(digits, 16)
        .map(Address::new)
        .map_err(|e| format!("invalid hex address '{s}': {e}"))
}

fn parse_offset(s: &str) -> Result<i64, String>
{
    let (negative, magnitude) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    if magnitude.starts_with(['-', '+']) {
        return Err(format!("invalid offset '{s}': unexpected sign"));
    }
    let value = match magnitude.strip_prefix("0x").or_else(|| magnitude.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => magnitude.parse::<i64>(),
    }
    .map_err(|e| format!("invalid offset '{s}': {e}"))?;
    Ok(if negative { -value } else { value })
}
