// SPDX-License-Identifier: (GPL-2.0-or-later OR MIT)
//
// Copyright (c) 2023 SUSE LLC
//
// Author: Nicolai Stange <nstange@suse.de>
//
// vim: ts=4 sw=4 et

#![no_std]

mod addr_range;
mod error;
mod file_range;
mod header;
mod program_header;
mod rela;
mod section_header;
mod strtab;
mod symtab;
mod types;

pub use addr_range::Elf64AddrRange;
pub use error::ElfError;
pub use file_range::Elf64FileRange;
pub use header::Elf64Hdr;
pub use program_header::{Elf64Phdr, Elf64PhdrFlags};
pub use rela::{Elf64Rela, Elf64Relas};
pub use section_header::{Elf64Shdr, Elf64ShdrFlags};
pub use strtab::Elf64Strtab;
pub use symtab::{Elf64Sym, Elf64Symtab};
pub use types::*;

/// This struct represents a parsed 64-bit ELF file. It provides validated,
/// read-only access to the ELF file's header, section header table,
/// program header table and the section-header string table.
///
/// All headers are verified once at [`Elf64File::read`] time, so that no
/// error checking is needed at each and every subsequent access.
#[derive(Debug, PartialEq)]
pub struct Elf64File<'a> {
    /// Buffer containing the ELF file data
    elf_file_buf: &'a [u8],
    /// The ELF file header
    elf_hdr: Elf64Hdr,
    /// The machine architecture, validated at read time
    machine: ElfMachine,
    /// The section header string table may not be present
    sh_strtab: Option<Elf64Strtab<'a>>,
}

impl<'a> Elf64File<'a> {
    /// This method takes a byte buffer containing the ELF file data and parses
    /// it into an [`Elf64File`] struct, providing access to the ELF file's information.
    ///
    /// # Errors
    ///
    /// Returns an [`ElfError`] if there are issues parsing the ELF file.
    pub fn read(elf_file_buf: &'a [u8]) -> Result<Self, ElfError> {
        let mut elf_hdr = Elf64Hdr::read(elf_file_buf)?;
        let machine = ElfMachine::try_from(elf_hdr.e_machine)?;

        // Verify that the program header table is within the file bounds.
        let phdrs_off = usize::try_from(elf_hdr.e_phoff).map_err(|_| ElfError::FileTooShort)?;
        let phdr_size = usize::from(elf_hdr.e_phentsize);
        let phdrs_num = usize::from(elf_hdr.e_phnum);
        if phdrs_num != 0 {
            if phdr_size < 56 {
                return Err(ElfError::InvalidPhdrSize);
            }
            let phdrs_size = phdrs_num
                .checked_mul(phdr_size)
                .ok_or(ElfError::FileTooShort)?;
            let phdrs_end = phdrs_off
                .checked_add(phdrs_size)
                .ok_or(ElfError::FileTooShort)?;
            if phdrs_end > elf_file_buf.len() {
                return Err(ElfError::FileTooShort);
            }
        }

        // Verify that the section header table is within the file bounds.
        let shdr_size = usize::from(elf_hdr.e_shentsize);
        if (elf_hdr.e_shnum != 0 || elf_hdr.e_shoff != 0) && shdr_size < 64 {
            return Err(ElfError::InvalidShdrSize);
        }
        if elf_hdr.e_shnum == 0 && elf_hdr.e_shoff != 0 {
            // The number of section headers is stored in the first section header's
            // ->sh_size member.
            elf_hdr.e_shnum = 1;
            Self::check_section_header_table_bounds(&elf_hdr, elf_file_buf.len())?;
            let shdr0 = Self::read_shdr_from_file(elf_file_buf, &elf_hdr, 0);
            elf_hdr.e_shnum = match Elf64Word::try_from(shdr0.sh_size) {
                Ok(shnum) => shnum,
                Err(_) => return Err(ElfError::InvalidSectionIndex),
            };
        }
        Self::check_section_header_table_bounds(&elf_hdr, elf_file_buf.len())?;

        // Verify all program headers once, so that later consumers may rely
        // on the file ranges being addressable.
        for i in 0..elf_hdr.e_phnum {
            let phdr = Self::read_phdr_from_file(elf_file_buf, &elf_hdr, i);
            Self::verify_phdr(&phdr, elf_file_buf.len())?;
        }

        // If ->e_shstrndx == SHN_XINDEX, the actual strndx is stored in first
        // section header table's ->sh_link member.
        if elf_hdr.e_shstrndx == Elf64Shdr::SHN_XINDEX {
            if elf_hdr.e_shnum == 0 {
                return Err(ElfError::InvalidSectionIndex);
            }
            let shdr0 = Self::read_shdr_from_file(elf_file_buf, &elf_hdr, 0);
            elf_hdr.e_shstrndx = shdr0.sh_link;
        }
        if elf_hdr.e_shstrndx != Elf64Shdr::SHN_UNDEF && elf_hdr.e_shstrndx > elf_hdr.e_shnum {
            return Err(ElfError::InvalidSectionIndex);
        }

        let mut sh_strtab = None;
        for i in 0..elf_hdr.e_shnum {
            let shdr = Self::read_shdr_from_file(elf_file_buf, &elf_hdr, i);
            Self::verify_shdr(&shdr, elf_file_buf.len(), elf_hdr.e_shnum)?;

            if elf_hdr.e_shstrndx != Elf64Shdr::SHN_UNDEF && i == elf_hdr.e_shstrndx {
                if shdr.sh_type != Elf64Shdr::SHT_STRTAB {
                    return Err(ElfError::IncompatibleSectionType);
                }

                let sh_strtab_buf_range = shdr.file_range();
                let sh_strtab_buf =
                    &elf_file_buf[sh_strtab_buf_range.offset_begin..sh_strtab_buf_range.offset_end];
                sh_strtab = Some(Elf64Strtab::new(sh_strtab_buf));
            }
        }

        Ok(Self {
            elf_file_buf,
            elf_hdr,
            machine,
            sh_strtab,
        })
    }

    /// Reads an ELF Program Header (Phdr) from the ELF file buffer at the
    /// given index. The index must have been validated against
    /// `elf_hdr.e_phnum` beforehand.
    fn read_phdr_from_file(elf_file_buf: &'a [u8], elf_hdr: &Elf64Hdr, i: Elf64Half) -> Elf64Phdr {
        let phdrs_off = usize::try_from(elf_hdr.e_phoff).unwrap();
        let phdr_size = usize::from(elf_hdr.e_phentsize);
        let i = usize::from(i);
        let phdr_off = phdrs_off + i * phdr_size;
        let phdr_buf = &elf_file_buf[phdr_off..(phdr_off + phdr_size)];
        Elf64Phdr::read(phdr_buf)
    }

    /// Verifies the integrity of an ELF Program Header (Phdr).
    ///
    /// # Errors
    ///
    /// Returns an [`Err<ElfError>`] if the Phdr is invalid.
    fn verify_phdr(phdr: &Elf64Phdr, elf_file_buf_len: usize) -> Result<(), ElfError> {
        if phdr.p_type == Elf64Phdr::PT_NULL {
            return Ok(());
        }

        phdr.verify()?;

        if phdr.p_filesz != 0 {
            let file_range = phdr.file_range();
            if file_range.offset_end > elf_file_buf_len {
                return Err(ElfError::FileTooShort);
            }
        }

        Ok(())
    }

    /// Checks that the section header table, as described by the ELF file
    /// header, is located within the ELF file bounds.
    ///
    /// # Errors
    ///
    /// Returns an [`Err<ElfError>`] if the section header table is out of bounds.
    fn check_section_header_table_bounds(
        elf_hdr: &Elf64Hdr,
        elf_file_buf_len: usize,
    ) -> Result<(), ElfError> {
        // Verify that the section header table is within the file bounds.
        let shdrs_off = usize::try_from(elf_hdr.e_shoff).map_err(|_| ElfError::FileTooShort)?;
        let shdr_size = usize::from(elf_hdr.e_shentsize);
        let shdrs_num = usize::try_from(elf_hdr.e_shnum).unwrap();
        let shdrs_size = shdrs_num
            .checked_mul(shdr_size)
            .ok_or(ElfError::FileTooShort)?;
        let shdrs_end = shdrs_off
            .checked_add(shdrs_size)
            .ok_or(ElfError::FileTooShort)?;
        if shdrs_end > elf_file_buf_len {
            return Err(ElfError::FileTooShort);
        }
        Ok(())
    }

    /// Reads an ELF Section Header (Shdr) from the ELF file buffer at the
    /// given index. The index must have been validated against
    /// `elf_hdr.e_shnum` beforehand.
    fn read_shdr_from_file(elf_file_buf: &'a [u8], elf_hdr: &Elf64Hdr, i: Elf64Word) -> Elf64Shdr {
        let shdrs_off = usize::try_from(elf_hdr.e_shoff).unwrap();
        let shdr_size = usize::from(elf_hdr.e_shentsize);
        let i = usize::try_from(i).unwrap();
        let shdr_off = shdrs_off + i * shdr_size;
        let shdr_buf = &elf_file_buf[shdr_off..(shdr_off + shdr_size)];
        Elf64Shdr::read(shdr_buf)
    }

    /// Verifies the integrity of an ELF Section Header (Shdr).
    ///
    /// # Errors
    ///
    /// Returns an [`Err<ElfError>`] if the Shdr is invalid.
    fn verify_shdr(
        shdr: &Elf64Shdr,
        elf_file_buf_len: usize,
        shnum: Elf64Word,
    ) -> Result<(), ElfError> {
        if shdr.sh_type == Elf64Shdr::SHT_NULL {
            return Ok(());
        }

        shdr.verify()?;

        if shdr.sh_link > shnum
            || shdr.sh_flags.contains(Elf64ShdrFlags::INFO_LINK) && shdr.sh_info > shnum
        {
            return Err(ElfError::InvalidSectionIndex);
        }

        if shdr.sh_type != Elf64Shdr::SHT_NOBITS {
            let file_range = shdr.file_range();
            if file_range.offset_end > elf_file_buf_len {
                return Err(ElfError::FileTooShort);
            }
        }

        Ok(())
    }

    /// The machine architecture the ELF file was produced for.
    pub fn machine(&self) -> ElfMachine {
        self.machine
    }

    /// The virtual address of the program entry point.
    pub fn entry(&self) -> Elf64Addr {
        self.elf_hdr.e_entry
    }

    /// The number of entries in the section header table.
    pub fn shnum(&self) -> Elf64Word {
        self.elf_hdr.e_shnum
    }

    /// The number of entries in the program header table.
    pub fn phnum(&self) -> Elf64Half {
        self.elf_hdr.e_phnum
    }

    /// Reads an ELF Section Header (Shdr) from the ELF file by its index.
    ///
    /// # Returns
    ///
    /// The [`Elf64Shdr`] at the given index, or [`None`] if the index is
    /// out of range.
    pub fn read_shdr(&self, i: Elf64Word) -> Option<Elf64Shdr> {
        if i >= self.elf_hdr.e_shnum {
            return None;
        }
        Some(Self::read_shdr_from_file(
            self.elf_file_buf,
            &self.elf_hdr,
            i,
        ))
    }

    /// Reads an ELF Program Header (Phdr) from the ELF file by its index.
    ///
    /// # Returns
    ///
    /// The [`Elf64Phdr`] at the given index, or [`None`] if the index is
    /// out of range.
    pub fn read_phdr(&self, i: Elf64Half) -> Option<Elf64Phdr> {
        if i >= self.elf_hdr.e_phnum {
            return None;
        }
        Some(Self::read_phdr_from_file(
            self.elf_file_buf,
            &self.elf_hdr,
            i,
        ))
    }

    /// Creates an iterator over ELF Section Headers (Shdrs) in the ELF file.
    ///
    /// # Returns
    ///
    /// An [`Elf64ShdrIterator`] over the ELF Section Headers.
    pub fn shdrs_iter(&self) -> Elf64ShdrIterator<'_> {
        Elf64ShdrIterator::new(self)
    }

    /// Looks up a section's name in the section header string table.
    ///
    /// # Errors
    ///
    /// Returns an [`Err<ElfError>`] if no section header string table is
    /// present, the name index is out of bounds or the name is not valid
    /// UTF-8.
    pub fn shdr_name(&self, shdr: &Elf64Shdr) -> Result<&'a str, ElfError> {
        let sh_strtab = self
            .sh_strtab
            .as_ref()
            .ok_or(ElfError::InvalidStrtabString)?;
        sh_strtab
            .get_str(shdr.sh_name)?
            .to_str()
            .map_err(|_| ElfError::InvalidStrtabString)
    }

    /// Returns the file-backed payload bytes of a section.
    ///
    /// `SHT_NOBITS` and `SHT_NULL` sections have no file-backed payload,
    /// for those an empty slice is returned.
    pub fn section_data(&self, shdr: &Elf64Shdr) -> &'a [u8] {
        if shdr.sh_type == Elf64Shdr::SHT_NULL {
            return &[];
        }
        let file_range = shdr.file_range();
        &self.elf_file_buf[file_range.offset_begin..file_range.offset_end]
    }

    /// Creates an [`Elf64Symtab`] view over a `SHT_SYMTAB` section.
    ///
    /// # Errors
    ///
    /// Returns an [`Err<ElfError>`] if the section is not a symbol table or
    /// its entry size is invalid.
    pub fn symtab(&self, shdr: &Elf64Shdr) -> Result<Elf64Symtab<'a>, ElfError> {
        if shdr.sh_type != Elf64Shdr::SHT_SYMTAB {
            return Err(ElfError::IncompatibleSectionType);
        }
        Elf64Symtab::new(self.section_data(shdr), shdr.sh_entsize)
    }

    /// Creates an [`Elf64Relas`] view over a `SHT_RELA` or `SHT_REL`
    /// section.
    ///
    /// # Errors
    ///
    /// Returns an [`Err<ElfError>`] if the section is not a relocation
    /// section or its entry size is invalid.
    pub fn relas(&self, shdr: &Elf64Shdr) -> Result<Elf64Relas<'a>, ElfError> {
        let has_addend = match shdr.sh_type {
            Elf64Shdr::SHT_RELA => true,
            Elf64Shdr::SHT_REL => false,
            _ => return Err(ElfError::IncompatibleSectionType),
        };
        Elf64Relas::new(self.section_data(shdr), shdr.sh_entsize, has_addend)
    }
}

/// Represents an iterator over section headers in an ELF64 file
#[derive(Debug)]
pub struct Elf64ShdrIterator<'a> {
    /// The ELF64 file from which section headers are being iterated
    elf_file: &'a Elf64File<'a>,
    /// Next index to be retrieved
    next: Elf64Word,
}

impl<'a> Elf64ShdrIterator<'a> {
    /// Creates a new [`Elf64ShdrIterator`] instance for iterating section
    /// headers in an ELF64 file.
    fn new(elf_file: &'a Elf64File<'a>) -> Self {
        Self { elf_file, next: 0 }
    }
}

impl Iterator for Elf64ShdrIterator<'_> {
    type Item = Elf64Shdr;

    /// Retrieves the next section header from the ELF64 file.
    ///
    /// # Returns
    ///
    /// - [`Option<Self::Item>`]: An option containing the next [`Elf64Shdr`] if available, or [`None`]
    ///   if all section headers have been iterated.
    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.next;
        if cur == self.elf_file.elf_hdr.e_shnum {
            return None;
        }
        self.next += 1;
        self.elf_file.read_shdr(cur)
    }
}

#[cfg(test)]
mod tests;
