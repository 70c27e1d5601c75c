// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 SUSE LLC
//
// Author: Roy Hopkins <roy.hopkins@suse.com>

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
pub struct CmdOptions {
    /// Input ELF64 executable
    #[arg(short, long)]
    pub input: String,

    /// Output filename for the generated PE32+ image
    #[arg(short, long)]
    pub output: String,

    /// Kind of image to generate
    #[arg(value_enum)]
    pub kind: OutputKind,

    /// Print verbose output
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum OutputKind {
    /// Build a plain firmware executable image
    Efi,

    /// Build a firmware image with an embedded HII resource section
    Hii,
}
