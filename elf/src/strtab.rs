// SPDX-License-Identifier: (GPL-2.0-or-later OR MIT)
//
// Copyright (c) 2023-2024 SUSE LLC
//
// Author: Nicolai Stange <nstange@suse.de>
//
// vim: ts=4 sw=4 et

use super::types::*;
use super::ElfError;
use core::ffi;

/// Represents an ELF64 string table ([`Elf64Strtab`]) containing strings
/// used within the ELF file
#[derive(Debug, Default, PartialEq)]
pub struct Elf64Strtab<'a> {
    strtab_buf: &'a [u8],
}

impl<'a> Elf64Strtab<'a> {
    /// Creates a new [`Elf64Strtab`] instance from the provided string table buffer
    pub fn new(strtab_buf: &'a [u8]) -> Self {
        Self { strtab_buf }
    }

    /// Retrieves a string from the string table by its index.
    ///
    /// # Arguments
    ///
    /// - `index`: The index of the string to retrieve.
    ///
    /// # Returns
    ///
    /// - [`Result<&'a ffi::CStr, ElfError>`]: A [`Result`] containing the string as a CStr reference
    ///   if found, or an [`ElfError`] if the index is out of bounds or the string is invalid.
    pub fn get_str(&self, index: Elf64Word) -> Result<&'a ffi::CStr, ElfError> {
        let index = usize::try_from(index).unwrap();
        if index >= self.strtab_buf.len() {
            return Err(ElfError::InvalidStrtabString);
        }

        ffi::CStr::from_bytes_until_nul(&self.strtab_buf[index..])
            .map_err(|_| ElfError::InvalidStrtabString)
    }
}
