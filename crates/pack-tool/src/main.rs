use std::io::{Read, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use env_logger::Builder;
use log::LevelFilter;

mod menu;
use menu::{Command, TopLevel};

const fn level_filter(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Off,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn main() -> ExitCode {
    let args: TopLevel = argp::parse_args_or_exit(argp::DEFAULT);

    if args.verbose != 0 {
        Builder::new().filter(None, level_filter(args.verbose)).init();
    }

    let (infile, outfile, packing) = match &args.nested {
        Command::Pack(p) => (p.infile.as_deref(), p.outfile.as_deref(), true),
        Command::Unpack(p) => (p.infile.as_deref(), p.outfile.as_deref(), false),
    };

    let input = match read_input(infile.unwrap_or("-")) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Error: cannot open input: {e}");
            return ExitCode::from(66);
        }
    };

    let output = if packing {
        lisa_pack::pack(&input, None).map_err(|e| e.to_string())
    } else {
        // The true unpacked length isn't known from a bare stream; follow the original driver's
        // approach of allocating a generously oversized buffer and trimming to what decoding
        // actually produced.
        let capacity = (input.len() * 2).max(2);
        lisa_pack::unpack_into_capacity(&input, capacity, None).map_err(|e| e.to_string())
    };

    let output = match output {
        Ok(output) => output,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(64);
        }
    };

    if let Err(e) = write_output(outfile.unwrap_or("-"), &output) {
        eprintln!("Error: cannot create output: {e}");
        return ExitCode::from(73);
    }

    ExitCode::SUCCESS
}

fn read_input(path: &str) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    if path == "-" {
        std::io::stdin().lock().read_to_end(&mut buf).context("reading stdin")?;
    } else {
        std::fs::File::open(path)
            .with_context(|| format!("opening {path}"))?
            .read_to_end(&mut buf)
            .with_context(|| format!("reading {path}"))?;
    }
    Ok(buf)
}

fn write_output(path: &str, data: &[u8]) -> Result<()> {
    if path == "-" {
        std::io::stdout().lock().write_all(data).context("writing stdout")
    } else {
        std::fs::File::create(path)
            .with_context(|| format!("creating {path}"))?
            .write_all(data)
            .with_context(|| format!("writing {path}"))
    }
}
