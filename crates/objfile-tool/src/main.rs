use std::io::prelude::*;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use env_logger::Builder;
use lisa_obj::prelude::*;
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

    let file = match ObjectFile::open(&args.path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(66);
        }
    };

    let result = match args.nested {
        Command::Dump(_) => dump(&file),
        Command::Extract(_) => extract(&file, &args.path),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(64)
        }
    }
}

fn dump(file: &ObjectFile) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for block in file.blocks() {
        write!(out, "{}", render_block(file, block))?;
    }
    Ok(())
}

/// Buffers one module's code as its blocks stream by, and writes it out on `EndBlock`.
struct PendingModule {
    module: String,
    segment: String,
    addr: Option<i32>,
    code: Vec<u8>,
}

fn extract(file: &ObjectFile, path: &str) -> Result<()> {
    let mut pending: Option<PendingModule> = None;

    for block in file.blocks() {
        match file.decode(block) {
            Payload::ModuleName(v) => {
                pending = Some(PendingModule {
                    module: v.module_name().trimmed().to_string(),
                    segment: v.segment_name().trimmed().to_string(),
                    addr: None,
                    code: Vec::new(),
                });
            }
            Payload::CodeBlock(v) => {
                if let Some(module) = pending.as_mut() {
                    module.addr.get_or_insert(v.addr());
                    module.code.extend_from_slice(v.code());
                }
            }
            Payload::PackedCode(v) => {
                if let Some(module) = pending.as_mut() {
                    module.addr.get_or_insert(v.addr());
                    let unpacked_len = v.csize().max(0) as usize;
                    let unpacked = lisa_pack::unpack(v.packed_code(), unpacked_len, None)
                        .context("unpacking PackedCode block")?;
                    module.code.extend_from_slice(&unpacked);
                }
            }
            Payload::EndBlock(_) => {
                if let Some(module) = pending.take() {
                    write_extracted(path, &module)?;
                }
            }
            _ => {}
        }
    }

    Ok(())
}

fn write_extracted(path: &str, module: &PendingModule) -> Result<()> {
    let mut name = format!("{path}-{}", module.module);
    if !module.segment.is_empty() {
        name.push('-');
        name.push_str(&module.segment);
    }
    if let Some(addr) = module.addr {
        if addr != 0 {
            name.push_str(&format!("-${addr:08X}"));
        }
    }
    name.push_str(".bin");

    log::info!("writing {name} ({} bytes)", module.code.len());
    std::fs::write(Path::new(&name), &module.code)
        .with_context(|| format!("writing extracted module to {name}"))?;
    Ok(())
}
