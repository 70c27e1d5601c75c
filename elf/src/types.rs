// SPDX-License-Identifier: (GPL-2.0-or-later OR MIT)
//
// Copyright (c) 2023 SUSE LLC
//
// Author: Nicolai Stange <nstange@suse.de>
//
// vim: ts=4 sw=4 et

use super::ElfError;
use core::fmt;

pub type Elf64Addr = u64;
pub type Elf64Off = u64;
pub type Elf64Half = u16;
pub type Elf64Word = u32;
pub type Elf64Sword = i32;
pub type Elf64Xword = u64;
pub type Elf64Sxword = i64;
pub type Elf64char = u8;

/// Machine architecture of an ELF64 file, restricted to the two
/// architectures the conversion to PE32+/COFF is defined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElfMachine {
    /// AMD x86-64 (`EM_X86_64`)
    X64,
    /// ARM 64-bit (`EM_AARCH64`)
    Aarch64,
}

impl ElfMachine {
    /// `e_machine` value for x86-64
    pub const EM_X86_64: Elf64Half = 62;
    /// `e_machine` value for AArch64
    pub const EM_AARCH64: Elf64Half = 183;
}

impl TryFrom<Elf64Half> for ElfMachine {
    type Error = ElfError;

    fn try_from(e_machine: Elf64Half) -> Result<Self, Self::Error> {
        match e_machine {
            Self::EM_X86_64 => Ok(Self::X64),
            Self::EM_AARCH64 => Ok(Self::Aarch64),
            _ => Err(ElfError::UnsupportedMachine),
        }
    }
}

impl fmt::Display for ElfMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X64 => write!(f, "EM_X86_64"),
            Self::Aarch64 => write!(f, "EM_AARCH64"),
        }
    }
}
