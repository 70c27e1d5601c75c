// SPDX-License-Identifier: (GPL-2.0-or-later OR MIT)
//
// Copyright (c) 2023-2024 SUSE LLC
//
// Author: Nicolai Stange <nstange@suse.de>
//
// vim: ts=4 sw=4 et

use super::types::*;
use super::ElfError;

/// Represents a relocation entry in an ELF64 file ([`Elf64Rela`]).
///
/// Entries from `SHT_REL` sections are represented with an implicit
/// addend of zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Elf64Rela {
    /// Offset within the section where the relocation should be applied
    pub r_offset: Elf64Addr,
    /// A combination of symbol index and relocation type information
    pub r_info: Elf64Xword,
    /// The value to add to the target symbol's value during relocation
    pub r_addend: Elf64Sxword,
}

impl Elf64Rela {
    /// Extracts the symbol index from the `r_info` field
    pub fn get_sym(&self) -> Elf64Word {
        (self.r_info >> 32) as Elf64Word
    }

    /// Extracts the relocation type from the `r_info` field
    pub fn get_type(&self) -> Elf64Word {
        (self.r_info & 0xffffffffu64) as Elf64Word
    }

    /// Reads an [`Elf64Rela`] relocation entry from the provided buffer.
    ///
    /// # Arguments
    ///
    /// - `rela_buf`: A slice of bytes containing the relocation entry data.
    /// - `has_addend`: Whether the entry carries an explicit addend
    ///   (`SHT_RELA`) or not (`SHT_REL`).
    ///
    /// # Returns
    ///
    /// - [`Elf64Rela`]: An [`Elf64Rela`] instance parsed from the buffer.
    fn read(rela_buf: &[u8], has_addend: bool) -> Self {
        let r_offset = Elf64Addr::from_le_bytes(rela_buf[0..8].try_into().unwrap());
        let r_info = Elf64Xword::from_le_bytes(rela_buf[8..16].try_into().unwrap());
        let r_addend = if has_addend {
            Elf64Sxword::from_le_bytes(rela_buf[16..24].try_into().unwrap())
        } else {
            0
        };
        Self {
            r_offset,
            r_info,
            r_addend,
        }
    }
}

/// Represents a collection of relocation entries in an ELF64 file
/// ([`Elf64Relas`]), backed by the payload of a `SHT_RELA` or `SHT_REL`
/// section.
#[derive(Debug)]
pub struct Elf64Relas<'a> {
    /// The underlying buffer containing the relocation entries
    relas_buf: &'a [u8],
    /// Size of each relocation entry in bytes
    entsize: usize,
    /// Number of relocation entries in the collection
    relas_num: usize,
    /// Whether entries carry an explicit addend (`SHT_RELA`)
    has_addend: bool,
}

impl<'a> Elf64Relas<'a> {
    /// Creates a new [`Elf64Relas`] instance from the provided buffer and entry size.
    ///
    /// # Arguments
    ///
    /// - `relas_buf`: The buffer containing the relocation entries.
    /// - `entsize`: The size of each relocation entry in bytes.
    /// - `has_addend`: Whether the section is of type `SHT_RELA`.
    ///
    /// # Returns
    ///
    /// - [`Result<Self, ElfError>`]: A [`Result`] containing the [`Elf64Relas`] instance if valid,
    ///   or an [`ElfError`] if the provided parameters are invalid.
    pub fn new(relas_buf: &'a [u8], entsize: Elf64Xword, has_addend: bool) -> Result<Self, ElfError> {
        let entsize = usize::try_from(entsize).map_err(|_| ElfError::InvalidRelocationEntrySize)?;
        let min_entsize = if has_addend { 24 } else { 16 };
        if entsize < min_entsize {
            return Err(ElfError::InvalidRelocationEntrySize);
        }
        let relas_num = relas_buf.len() / entsize;
        Ok(Self {
            relas_buf,
            entsize,
            relas_num,
            has_addend,
        })
    }

    /// Returns the number of relocation entries in the collection.
    pub fn len(&self) -> usize {
        self.relas_num
    }

    /// Checks whether the collection holds no relocation entries.
    pub fn is_empty(&self) -> bool {
        self.relas_num == 0
    }

    /// Reads a relocation entry from the collection by its index.
    ///
    /// # Arguments
    ///
    /// - `i`: The index of the relocation entry to retrieve.
    ///
    /// # Returns
    ///
    /// - [`Result<Elf64Rela, ElfError>`]: A [`Result`] containing the [`Elf64Rela`] entry if found,
    ///   or an [`ElfError`] if the index is out of bounds.
    pub fn read_rela(&self, i: usize) -> Result<Elf64Rela, ElfError> {
        if i >= self.relas_num {
            return Err(ElfError::InvalidRelocationIndex);
        }
        let rela_off = i * self.entsize;
        let rela_buf = &self.relas_buf[rela_off..(rela_off + self.entsize)];
        Ok(Elf64Rela::read(rela_buf, self.has_addend))
    }
}
