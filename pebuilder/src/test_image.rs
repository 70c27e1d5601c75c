// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 SUSE LLC
//
// Author: Roy Hopkins <roy.hopkins@suse.com>

//! Builder for small synthetic ELF64 images used by the converter tests.
//!
//! The resulting section table is: index 0 the null section, user sections
//! at index 1.., and `.shstrtab` as the last section.

use elf::{Elf64Addr, Elf64Half, Elf64Word, Elf64Xword};

pub const ET_EXEC: Elf64Half = 2;

pub const SHT_PROGBITS: Elf64Word = 1;
pub const SHT_SYMTAB: Elf64Word = 2;
pub const SHT_RELA: Elf64Word = 4;
pub const SHT_NOBITS: Elf64Word = 8;

pub const SHF_WRITE: Elf64Xword = 1;
pub const SHF_ALLOC: Elf64Xword = 2;

#[derive(Debug)]
pub struct TestSection {
    pub name: &'static str,
    pub sh_type: Elf64Word,
    pub sh_flags: Elf64Xword,
    pub sh_addr: Elf64Addr,
    pub sh_addralign: Elf64Xword,
    pub sh_link: Elf64Word,
    pub sh_info: Elf64Word,
    pub sh_entsize: Elf64Xword,
    pub data: Vec<u8>,
    /// Declared size for `SHT_NOBITS` sections, which carry no data.
    pub nobits_size: Elf64Xword,
}

impl TestSection {
    pub fn progbits(
        name: &'static str,
        sh_flags: Elf64Xword,
        sh_addr: Elf64Addr,
        sh_addralign: Elf64Xword,
        data: Vec<u8>,
    ) -> Self {
        Self {
            name,
            sh_type: SHT_PROGBITS,
            sh_flags,
            sh_addr,
            sh_addralign,
            sh_link: 0,
            sh_info: 0,
            sh_entsize: 0,
            data,
            nobits_size: 0,
        }
    }

    pub fn nobits(
        name: &'static str,
        sh_flags: Elf64Xword,
        sh_addr: Elf64Addr,
        sh_addralign: Elf64Xword,
        size: Elf64Xword,
    ) -> Self {
        Self {
            name,
            sh_type: SHT_NOBITS,
            sh_flags,
            sh_addr,
            sh_addralign,
            sh_link: 0,
            sh_info: 0,
            sh_entsize: 0,
            data: Vec::new(),
            nobits_size: size,
        }
    }

    pub fn symtab(name: &'static str, syms: &[[u8; 24]]) -> Self {
        Self {
            name,
            sh_type: SHT_SYMTAB,
            sh_flags: 0,
            sh_addr: 0,
            sh_addralign: 8,
            sh_link: 0,
            sh_info: 0,
            sh_entsize: 24,
            data: syms.concat(),
            nobits_size: 0,
        }
    }

    /// A `SHT_RELA` section applying to section `target`, resolving
    /// symbols through section `symtab`.
    pub fn rela(
        name: &'static str,
        target: Elf64Word,
        symtab: Elf64Word,
        relas: &[[u8; 24]],
    ) -> Self {
        Self {
            name,
            sh_type: SHT_RELA,
            sh_flags: 0,
            sh_addr: 0,
            sh_addralign: 8,
            sh_link: symtab,
            sh_info: target,
            sh_entsize: 24,
            data: relas.concat(),
            nobits_size: 0,
        }
    }
}

/// Encodes one ELF64 symbol table entry.
pub fn sym_entry(st_shndx: Elf64Half, st_value: Elf64Addr) -> [u8; 24] {
    let mut buf = [0u8; 24];
    buf[6..8].copy_from_slice(&st_shndx.to_le_bytes());
    buf[8..16].copy_from_slice(&st_value.to_le_bytes());
    buf
}

/// Encodes one ELF64 RELA entry.
pub fn rela_entry(r_offset: Elf64Addr, sym: Elf64Word, rtype: Elf64Word, addend: i64) -> [u8; 24] {
    let mut buf = [0u8; 24];
    buf[0..8].copy_from_slice(&r_offset.to_le_bytes());
    let r_info = (u64::from(sym) << 32) | u64::from(rtype);
    buf[8..16].copy_from_slice(&r_info.to_le_bytes());
    buf[16..24].copy_from_slice(&addend.to_le_bytes());
    buf
}

#[derive(Debug)]
pub struct TestElf {
    pub e_type: Elf64Half,
    pub e_machine: Elf64Half,
    pub e_entry: Elf64Addr,
    pub sections: Vec<TestSection>,
}

impl TestElf {
    pub fn new(e_machine: Elf64Half) -> Self {
        Self {
            e_type: ET_EXEC,
            e_machine,
            e_entry: 0,
            sections: Vec::new(),
        }
    }

    /// Serializes the image: ELF header, section payloads, `.shstrtab` and
    /// the section header table.
    pub fn build(&self) -> Vec<u8> {
        let shnum = self.sections.len() + 2;

        // Assemble .shstrtab and record each section's name offset.
        let mut shstrtab = vec![0u8];
        let mut name_offs = Vec::new();
        for section in &self.sections {
            name_offs.push(shstrtab.len() as Elf64Word);
            shstrtab.extend_from_slice(section.name.as_bytes());
            shstrtab.push(0);
        }
        let shstrtab_name_off = shstrtab.len() as Elf64Word;
        shstrtab.extend_from_slice(b".shstrtab\0");

        // Section payloads follow the ELF header.
        let mut buf = vec![0u8; 64];
        let mut data_offs = Vec::new();
        for section in &self.sections {
            while buf.len() % 8 != 0 {
                buf.push(0);
            }
            data_offs.push(buf.len() as u64);
            buf.extend_from_slice(&section.data);
        }
        while buf.len() % 8 != 0 {
            buf.push(0);
        }
        let shstrtab_off = buf.len() as u64;
        buf.extend_from_slice(&shstrtab);
        while buf.len() % 8 != 0 {
            buf.push(0);
        }
        let e_shoff = buf.len() as u64;

        // Section header table: null section first.
        buf.extend_from_slice(&[0u8; 64]);
        for (i, section) in self.sections.iter().enumerate() {
            let size = if section.sh_type == SHT_NOBITS {
                section.nobits_size
            } else {
                section.data.len() as u64
            };
            buf.extend_from_slice(&shdr_entry(
                name_offs[i],
                section.sh_type,
                section.sh_flags,
                section.sh_addr,
                data_offs[i],
                size,
                section.sh_link,
                section.sh_info,
                section.sh_addralign,
                section.sh_entsize,
            ));
        }
        buf.extend_from_slice(&shdr_entry(
            shstrtab_name_off,
            3, // SHT_STRTAB
            0,
            0,
            shstrtab_off,
            shstrtab.len() as u64,
            0,
            0,
            1,
            0,
        ));

        // ELF header.
        buf[0..4].copy_from_slice(&[0x7f, b'E', b'L', b'F']);
        buf[4] = 2; // ELFCLASS64
        buf[5] = 1; // ELFDATA2LSB
        buf[6] = 1; // EV_CURRENT
        buf[16..18].copy_from_slice(&self.e_type.to_le_bytes());
        buf[18..20].copy_from_slice(&self.e_machine.to_le_bytes());
        buf[20..24].copy_from_slice(&1u32.to_le_bytes());
        buf[24..32].copy_from_slice(&self.e_entry.to_le_bytes());
        buf[40..48].copy_from_slice(&e_shoff.to_le_bytes());
        buf[52..54].copy_from_slice(&64u16.to_le_bytes()); // e_ehsize
        buf[58..60].copy_from_slice(&64u16.to_le_bytes()); // e_shentsize
        buf[60..62].copy_from_slice(&(shnum as u16).to_le_bytes());
        buf[62..64].copy_from_slice(&((shnum - 1) as u16).to_le_bytes()); // e_shstrndx

        buf
    }
}

#[allow(clippy::too_many_arguments)]
fn shdr_entry(
    sh_name: Elf64Word,
    sh_type: Elf64Word,
    sh_flags: Elf64Xword,
    sh_addr: Elf64Addr,
    sh_offset: u64,
    sh_size: Elf64Xword,
    sh_link: Elf64Word,
    sh_info: Elf64Word,
    sh_addralign: Elf64Xword,
    sh_entsize: Elf64Xword,
) -> [u8; 64] {
    let mut buf = [0u8; 64];
    buf[0..4].copy_from_slice(&sh_name.to_le_bytes());
    buf[4..8].copy_from_slice(&sh_type.to_le_bytes());
    buf[8..16].copy_from_slice(&sh_flags.to_le_bytes());
    buf[16..24].copy_from_slice(&sh_addr.to_le_bytes());
    buf[24..32].copy_from_slice(&sh_offset.to_le_bytes());
    buf[32..40].copy_from_slice(&sh_size.to_le_bytes());
    buf[40..44].copy_from_slice(&sh_link.to_le_bytes());
    buf[44..48].copy_from_slice(&sh_info.to_le_bytes());
    buf[48..56].copy_from_slice(&sh_addralign.to_le_bytes());
    buf[56..64].copy_from_slice(&sh_entsize.to_le_bytes());
    buf
}
