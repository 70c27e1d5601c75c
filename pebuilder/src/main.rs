// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 SUSE LLC
//
// Author: Roy Hopkins <roy.hopkins@suse.com>
#![forbid(unsafe_code)]

use std::error::Error;
use std::fs;
use std::fs::File;
use std::io::Write;

use clap::Parser;
use elf::Elf64File;

use crate::cmd_options::CmdOptions;
use crate::error::ConvertError;
use crate::pe_builder::PeBuilder;
use crate::report::Reporter;

mod cmd_options;
mod error;
mod fixup;
mod pe;
mod pe_builder;
mod reloc;
mod report;
#[cfg(test)]
mod test_image;

fn main() -> Result<(), Box<dyn Error>> {
    let options = CmdOptions::parse();

    let elf_buffer = fs::read(&options.input).inspect_err(|_| {
        eprintln!("Failed to read input file {}", options.input);
    })?;
    let elf_file = Elf64File::read(&elf_buffer).map_err(ConvertError::from)?;

    let mut reporter = Reporter::new(options.verbose);
    let image = PeBuilder::new(&elf_file, &options.input, options.kind, &mut reporter).build()?;

    let mut output = File::create(&options.output).inspect_err(|_| {
        eprintln!("Failed to create output file {}", options.output);
    })?;
    output.write_all(&image).inspect_err(|_| {
        eprintln!("Failed to write output file {}", options.output);
    })?;
    reporter.verbose(&format!(
        "Wrote {} ({} bytes, {} warnings)",
        options.output,
        image.len(),
        reporter.warnings().len()
    ));
    Ok(())
}
