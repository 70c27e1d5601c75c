// SPDX-License-Identifier: (GPL-2.0-or-later OR MIT)
//
// Copyright (c) 2023-2024 SUSE LLC
//
// Author: Nicolai Stange <nstange@suse.de>
//
// vim: ts=4 sw=4 et

use super::types::*;
use super::ElfError;

/// Represents a 64-bit ELF virtual address range.
///
/// In mathematical notation, the range is [vaddr_begin, vaddr_end)
#[derive(PartialEq, Eq, Debug, Default, Clone, Copy)]
pub struct Elf64AddrRange {
    pub vaddr_begin: Elf64Addr,
    pub vaddr_end: Elf64Addr,
}

impl Elf64AddrRange {
    /// Returns the length of the virtual address range, calculated as the
    /// difference between `vaddr_end` and `vaddr_begin`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use elf::{Elf64Addr, Elf64AddrRange};
    ///
    /// let range = Elf64AddrRange {
    ///     vaddr_begin: 0x1000,
    ///     vaddr_end: 0x1100,
    /// };
    ///
    /// assert_eq!(range.len(), 0x100);
    /// ```
    pub fn len(&self) -> Elf64Xword {
        self.vaddr_end - self.vaddr_begin
    }

    /// Checks if the virtual address range is empty, i.e.
    /// if its length is zero.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use elf::{Elf64Addr, Elf64AddrRange};
    ///
    /// let range1 = Elf64AddrRange {
    ///     vaddr_begin: 0x1000,
    ///     vaddr_end: 0x1000,
    /// };
    ///
    /// assert!(range1.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks whether a virtual address falls within the range.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use elf::{Elf64Addr, Elf64AddrRange};
    ///
    /// let range = Elf64AddrRange {
    ///     vaddr_begin: 0x1000,
    ///     vaddr_end: 0x1100,
    /// };
    ///
    /// assert!(range.contains(0x10ff));
    /// assert!(!range.contains(0x1100));
    /// ```
    pub fn contains(&self, vaddr: Elf64Addr) -> bool {
        self.vaddr_begin <= vaddr && vaddr < self.vaddr_end
    }
}

impl TryFrom<(Elf64Addr, Elf64Xword)> for Elf64AddrRange {
    type Error = ElfError;

    /// Tries to create an [`Elf64AddrRange`] from a tuple of [`(Elf64Addr, Elf64Xword)`].
    ///
    /// This implementation calculates the `vaddr_end` based on the `vaddr_begin`
    /// and the provided [`Elf64Xword`] size, ensuring that the range is valid.
    ///
    /// # Errors
    ///
    /// Returns an [`ElfError::InvalidAddressRange`] if the calculation of `vaddr_end`
    /// results in an invalid address range.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use elf::{Elf64Addr, Elf64AddrRange, Elf64Xword};
    ///
    /// let vaddr_begin = 0x1000;
    /// let size = 0x100;
    /// let range = Elf64AddrRange::try_from((vaddr_begin, size)).unwrap();
    ///
    /// assert_eq!(range.vaddr_begin, 0x1000);
    /// assert_eq!(range.vaddr_end, 0x1100);
    /// ```
    fn try_from(value: (Elf64Addr, Elf64Xword)) -> Result<Self, Self::Error> {
        let vaddr_begin = value.0;
        let size = value.1;
        let vaddr_end = vaddr_begin
            .checked_add(size)
            .ok_or(ElfError::InvalidAddressRange)?;
        Ok(Self {
            vaddr_begin,
            vaddr_end,
        })
    }
}
