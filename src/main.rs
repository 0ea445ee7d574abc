use std::process::ExitCode;

use isosplice::cli::{self, Command, Invocation, Verbosity, USAGE};
use isosplice::{Error, PatchReport, patch_iso_file};
use tracing::{Level, debug, error};

fn init_logging(verbosity: Verbosity) {
    let level = match verbosity {
        Verbosity::Quiet => Level::WARN,
        Verbosity::Normal => Level::INFO,
        Verbosity::Verbose => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn print_summary(report: &PatchReport) {
    match report.byte_delta {
        0 => println!("- the new image has the same amount of bytes as the original image."),
        delta if delta > 0 => {
            println!("- the new image has {} more bytes than the original image.", delta)
        }
        delta => println!(
            "- the new image has {} less bytes than the original image.",
            delta.unsigned_abs()
        ),
    }
    if report.needs_cuesheet_update {
        println!("- maybe you need to hand update the cuesheet file (if exist and needed)");
    }
    println!("\nDone");
}

fn run(invocation: &Invocation) -> Result<PatchReport, Error> {
    let report = patch_iso_file(
        &invocation.image,
        &invocation.replacements,
        &invocation.options,
    )?;
    for file in &report.files {
        debug!(
            "{}: lba {} size {} -> {} ({:+} sectors, crc32 {:08x})",
            file.path, file.lba, file.old_size, file.new_size, file.sector_delta, file.payload_crc32
        );
    }
    Ok(report)
}

fn main() -> ExitCode {
    let command = match cli::parse_args(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}", e);
            if matches!(e, Error::BadArguments(_)) {
                eprintln!("{}", USAGE);
            }
            return ExitCode::from(e.exit_code() as u8);
        }
    };

    let invocation = match command {
        Command::Help => {
            println!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        Command::Patch(invocation) => invocation,
    };

    init_logging(invocation.verbosity);
    println!("isosplice {}: replace files inside an ISO9660 image\n", env!("CARGO_PKG_VERSION"));

    match run(&invocation) {
        Ok(report) => {
            print_summary(&report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
