// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 SUSE LLC
//
// Author: Roy Hopkins <roy.hopkins@suse.com>

use elf::{Elf64Addr, Elf64Word, ElfError, ElfMachine};
use std::error::Error;
use std::fmt;

/// Fatal conditions aborting a conversion. Anything recoverable is routed
/// through [`crate::report::Reporter`] as a warning instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConvertError {
    /// The input ELF image is malformed or unsupported.
    Elf(ElfError),
    /// No section qualified as code; a PE image must have a code section.
    NoCodeSection,
    /// A relocation references an undefined, absolute or out-of-range
    /// symbol, i.e. the input was not fully link-resolved.
    BadSymbolDefinition { symbol: Elf64Word },
    /// A relocation of a kind outside the supported set was encountered.
    /// Skipping it would produce a corrupt loadable image.
    UnsupportedRelocation {
        machine: ElfMachine,
        rtype: Elf64Word,
    },
    /// A relocation target lies outside the planned image layout.
    RelocationOutOfRange { offset: Elf64Addr },
    /// The converted image does not fit the 32-bit PE file offset space.
    ImageTooLarge,
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Elf(e) => {
                write!(f, "{e}")
            }
            Self::NoCodeSection => {
                write!(f, "did not find any code section")
            }
            Self::BadSymbolDefinition { symbol } => {
                write!(f, "bad definition for relocation symbol {symbol}")
            }
            Self::UnsupportedRelocation { machine, rtype } => {
                write!(f, "unsupported {machine} relocation kind {rtype:#x}")
            }
            Self::RelocationOutOfRange { offset } => {
                write!(f, "relocation target {offset:#x} outside the image")
            }
            Self::ImageTooLarge => {
                write!(f, "converted image exceeds the PE32+ file offset range")
            }
        }
    }
}

impl Error for ConvertError {}

impl From<ElfError> for ConvertError {
    fn from(e: ElfError) -> Self {
        Self::Elf(e)
    }
}
