// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 SUSE LLC
//
// Author: Roy Hopkins <roy.hopkins@suse.com>

//! The conversion pipeline from a parsed ELF64 executable to a PE32+/COFF
//! firmware image.
//!
//! The pipeline runs strictly one way: section layout is planned first and
//! committed, then payload bytes are copied and relocations rewritten
//! against the committed plan, then the base relocation table and the debug
//! directory are appended. No pass disturbs the layout a previous pass
//! produced.

use elf::{Elf64File, Elf64Shdr, Elf64ShdrFlags, Elf64Word, Elf64Xword, ElfError, ElfMachine};

use crate::cmd_options::OutputKind;
use crate::error::ConvertError;
use crate::fixup::FixupList;
use crate::pe;
use crate::reloc::{self, RelocFields, RelocProcessor};
use crate::report::Reporter;

/// Name of the ELF section packaged as the COFF HII resource section.
pub const ELF_HII_SECTION_NAME: &str = ".hii";

/// The disjoint section categories making up the output image, in layout
/// order.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SectionFilter {
    Text,
    Data,
    Hii,
}

/// Owns the output buffer and all layout bookkeeping for one conversion.
#[derive(Debug)]
pub struct PeBuilder<'a> {
    elf: &'a Elf64File<'a>,
    /// Display name embedded in the debug directory.
    image_name: &'a str,
    kind: OutputKind,
    reporter: &'a mut Reporter,
    reloc_proc: &'static dyn RelocProcessor,
    /// The output image. Sized by the layout pass, extended append-only by
    /// the relocation table and debug directory passes.
    coff: Vec<u8>,
    /// Committed output offset per ELF section index; zero for sections
    /// not retained in the image.
    section_offsets: Vec<u32>,
    /// Current output cursor.
    coff_offset: u32,
    nt_hdr_offset: u32,
    /// Next free slot in the section header table.
    table_offset: u32,
    text_offset: u32,
    data_offset: u32,
    hii_rsrc_offset: u32,
    reloc_offset: u32,
    /// Output-relative entry point.
    coff_entry: u32,
    fixups: FixupList,
}

impl<'a> PeBuilder<'a> {
    pub fn new(
        elf: &'a Elf64File<'a>,
        image_name: &'a str,
        kind: OutputKind,
        reporter: &'a mut Reporter,
    ) -> Self {
        let section_offsets = vec![0u32; usize::try_from(elf.shnum()).unwrap()];
        Self {
            elf,
            image_name,
            kind,
            reporter,
            reloc_proc: reloc::for_machine(elf.machine()),
            coff: Vec::new(),
            section_offsets,
            coff_offset: 0,
            nt_hdr_offset: 0,
            table_offset: 0,
            text_offset: 0,
            data_offset: 0,
            hii_rsrc_offset: 0,
            reloc_offset: 0,
            coff_entry: 0,
            fixups: FixupList::new(),
        }
    }

    /// Runs the conversion and returns the finished image.
    pub fn build(mut self) -> Result<Vec<u8>, ConvertError> {
        self.scan_sections()?;
        self.write_sections(SectionFilter::Text)?;
        self.write_sections(SectionFilter::Data)?;
        self.write_sections(SectionFilter::Hii)?;
        self.write_relocations()?;
        self.write_debug()?;
        self.set_image_size();
        Ok(self.coff)
    }

    /// Code: allocated, not writable and not claimed as HII resource.
    fn is_text_shdr(&self, shdr: &Elf64Shdr) -> bool {
        shdr.sh_flags.contains(Elf64ShdrFlags::ALLOC)
            && !shdr.sh_flags.contains(Elf64ShdrFlags::WRITE)
            && !self.is_hii_rsrc_shdr(shdr)
    }

    /// HII resource: selected by the reserved section name alone.
    fn is_hii_rsrc_shdr(&self, shdr: &Elf64Shdr) -> bool {
        self.elf
            .shdr_name(shdr)
            .map(|name| name == ELF_HII_SECTION_NAME)
            .unwrap_or(false)
    }

    /// Initialized data: allocated and writable, unless claimed as HII
    /// resource.
    fn is_data_shdr(&self, shdr: &Elf64Shdr) -> bool {
        shdr.sh_flags.contains(Elf64ShdrFlags::ALLOC)
            && shdr.sh_flags.contains(Elf64ShdrFlags::WRITE)
            && !self.is_hii_rsrc_shdr(shdr)
    }

    fn filter_matches(&self, filter: SectionFilter, shdr: &Elf64Shdr) -> bool {
        match filter {
            SectionFilter::Text => self.is_text_shdr(shdr),
            SectionFilter::Data => self.is_data_shdr(shdr),
            SectionFilter::Hii => self.is_hii_rsrc_shdr(shdr),
        }
    }

    /// Rounds the output cursor up to `align`.
    fn align_to(&mut self, align: Elf64Xword) -> Result<(), ConvertError> {
        let align = u32::try_from(align).map_err(|_| ConvertError::ImageTooLarge)?;
        self.coff_offset = self
            .coff_offset
            .checked_add(align - 1)
            .ok_or(ConvertError::ImageTooLarge)?
            & !(align - 1);
        Ok(())
    }

    /// Advances the output cursor by `size` bytes.
    fn advance(&mut self, size: Elf64Xword) -> Result<(), ConvertError> {
        let size = u32::try_from(size).map_err(|_| ConvertError::ImageTooLarge)?;
        self.coff_offset = self
            .coff_offset
            .checked_add(size)
            .ok_or(ConvertError::ImageTooLarge)?;
        Ok(())
    }

    /// Honors a section's declared alignment when assigning its output
    /// offset.
    fn check_section_alignment(&mut self, shdr: &Elf64Shdr) -> Result<(), ConvertError> {
        let align = shdr.sh_addralign;
        if align == 0 || align == 1 {
            return Ok(());
        }
        if shdr.sh_addr & (align - 1) == 0 {
            // The section address honors the alignment, so must the output
            // offset.
            self.align_to(align)?;
        } else if shdr.sh_addr % align != u64::from(self.coff_offset) % align {
            // Some ARM toolchains emit sections that only preserve
            // sh_addr modulo sh_addralign. Keep going, the image is
            // still usable.
            self.reporter.warn(format!(
                "{}: unsupported alignment for section at address {:#x}",
                self.image_name, shdr.sh_addr
            ));
        }
        Ok(())
    }

    /// Plans the output layout: header region, then code, data and HII
    /// resource sections in category order, and commits the per-section
    /// output offsets. Allocates the output buffer and synthesizes all
    /// headers.
    fn scan_sections(&mut self) -> Result<(), ConvertError> {
        self.reporter.verbose("Scanning sections");

        // The image leads with the MS-DOS stub, the PE32+ headers and the
        // section header table.
        self.coff_offset = pe::DOS_REGION_SIZE;
        self.nt_hdr_offset = self.coff_offset;
        self.coff_offset += pe::NT_HEADERS64_SIZE;
        self.table_offset = self.coff_offset;
        self.coff_offset += u32::from(pe::MAX_NUMBER_OF_SECTIONS) * pe::SECTION_HEADER_SIZE;

        // Code sections first.
        self.coff_offset = pe::coff_align(self.coff_offset);
        let mut found_text = false;
        let mut section_count = 0;
        for i in 0..self.elf.shnum() {
            let Some(shdr) = self.elf.read_shdr(i) else {
                continue;
            };
            if !self.is_text_shdr(&shdr) {
                continue;
            }
            self.check_section_alignment(&shdr)?;

            // Relocate the entry point.
            let entry = self.elf.entry();
            if shdr.sh_size != 0 && shdr.addr_range().contains(entry) {
                let entry_off = u32::try_from(entry - shdr.sh_addr)
                    .map_err(|_| ConvertError::ImageTooLarge)?;
                self.coff_entry = self
                    .coff_offset
                    .checked_add(entry_off)
                    .ok_or(ConvertError::ImageTooLarge)?;
            }

            if !found_text {
                self.text_offset = self.coff_offset;
                found_text = true;
            }
            self.section_offsets[usize::try_from(i).unwrap()] = self.coff_offset;
            self.advance(shdr.sh_size)?;
            section_count += 1;
        }
        if !found_text {
            return Err(ConvertError::NoCodeSection);
        }
        self.coff_offset = pe::coff_align(self.coff_offset);
        if section_count > 1 {
            self.reporter.warn(format!(
                "{}: multiple code sections are merged into one .text section, \
                 source level debug might not work correctly",
                self.image_name
            ));
        }

        // Then data sections.
        self.data_offset = self.coff_offset;
        let mut section_count = 0;
        for i in 0..self.elf.shnum() {
            let Some(shdr) = self.elf.read_shdr(i) else {
                continue;
            };
            if !self.is_data_shdr(&shdr) {
                continue;
            }
            self.check_section_alignment(&shdr)?;
            self.section_offsets[usize::try_from(i).unwrap()] = self.coff_offset;
            self.advance(shdr.sh_size)?;
            section_count += 1;
        }
        self.coff_offset = pe::coff_align(self.coff_offset);
        if section_count > 1 {
            self.reporter.warn(format!(
                "{}: multiple data sections are merged into one .data section, \
                 source level debug might not work correctly",
                self.image_name
            ));
        }

        // The HII resource section; at most one is packaged.
        self.hii_rsrc_offset = self.coff_offset;
        let mut found_hii = false;
        for i in 0..self.elf.shnum() {
            let Some(shdr) = self.elf.read_shdr(i) else {
                continue;
            };
            if !self.is_hii_rsrc_shdr(&shdr) {
                continue;
            }
            self.check_section_alignment(&shdr)?;
            if shdr.sh_size != 0 {
                self.section_offsets[usize::try_from(i).unwrap()] = self.coff_offset;
                self.advance(shdr.sh_size)?;
                self.coff_offset = pe::coff_align(self.coff_offset);
                found_hii = true;
            }
            break;
        }
        if self.kind == OutputKind::Hii && !found_hii {
            self.reporter.warn(format!(
                "{}: no {ELF_HII_SECTION_NAME} section found for the requested HII image",
                self.image_name
            ));
        }

        self.reloc_offset = self.coff_offset;

        // The base image; expanded later for the relocation table and the
        // debug directory.
        self.coff = vec![0u8; usize::try_from(self.coff_offset).unwrap()];
        self.fill_headers();
        Ok(())
    }

    /// Synthesizes the MS-DOS header, the PE32+ headers and the section
    /// header records for the planned regions.
    fn fill_headers(&mut self) {
        pe::put_u16(&mut self.coff, 0, pe::DOS_SIGNATURE);
        pe::put_u32(&mut self.coff, pe::DOS_LFANEW, self.nt_hdr_offset);

        let nt = usize::try_from(self.nt_hdr_offset).unwrap();
        let machine = match self.elf.machine() {
            ElfMachine::X64 => pe::MACHINE_X64,
            ElfMachine::Aarch64 => pe::MACHINE_AARCH64,
        };
        pe::put_u32(&mut self.coff, nt, pe::NT_SIGNATURE);
        pe::put_u16(&mut self.coff, nt + pe::FILE_HDR_MACHINE, machine);
        pe::put_u16(
            &mut self.coff,
            nt + pe::FILE_HDR_NUMBER_OF_SECTIONS,
            pe::MAX_NUMBER_OF_SECTIONS,
        );
        // A zero timestamp keeps converted images bit-for-bit reproducible.
        pe::put_u32(&mut self.coff, nt + pe::FILE_HDR_TIME_DATE_STAMP, 0);
        pe::put_u16(
            &mut self.coff,
            nt + pe::FILE_HDR_SIZE_OF_OPTIONAL_HEADER,
            pe::OPTIONAL_HEADER64_SIZE as u16,
        );
        pe::put_u16(
            &mut self.coff,
            nt + pe::FILE_HDR_CHARACTERISTICS,
            pe::FILE_EXECUTABLE_IMAGE
                | pe::FILE_LINE_NUMS_STRIPPED
                | pe::FILE_LOCAL_SYMS_STRIPPED
                | pe::FILE_LARGE_ADDRESS_AWARE,
        );

        pe::put_u16(&mut self.coff, nt + pe::OPT_HDR_MAGIC, pe::OPTIONAL_HDR64_MAGIC);
        pe::put_u32(
            &mut self.coff,
            nt + pe::OPT_HDR_SIZE_OF_CODE,
            self.data_offset - self.text_offset,
        );
        pe::put_u32(
            &mut self.coff,
            nt + pe::OPT_HDR_SIZE_OF_INITIALIZED_DATA,
            self.reloc_offset - self.data_offset,
        );
        pe::put_u32(
            &mut self.coff,
            nt + pe::OPT_HDR_ADDRESS_OF_ENTRY_POINT,
            self.coff_entry,
        );
        pe::put_u32(&mut self.coff, nt + pe::OPT_HDR_BASE_OF_CODE, self.text_offset);
        pe::put_u64(&mut self.coff, nt + pe::OPT_HDR_IMAGE_BASE, 0);
        pe::put_u32(
            &mut self.coff,
            nt + pe::OPT_HDR_SECTION_ALIGNMENT,
            pe::COFF_ALIGNMENT,
        );
        pe::put_u32(
            &mut self.coff,
            nt + pe::OPT_HDR_FILE_ALIGNMENT,
            pe::COFF_ALIGNMENT,
        );
        pe::put_u32(
            &mut self.coff,
            nt + pe::OPT_HDR_SIZE_OF_HEADERS,
            self.text_offset,
        );
        pe::put_u32(
            &mut self.coff,
            nt + pe::OPT_HDR_NUMBER_OF_RVA_AND_SIZES,
            pe::NUMBER_OF_DIRECTORY_ENTRIES,
        );

        // Section header records; empty regions are omitted.
        if self.data_offset > self.text_offset {
            self.append_section_header(
                ".text",
                self.text_offset,
                self.data_offset - self.text_offset,
                pe::SCN_CNT_CODE | pe::SCN_MEM_EXECUTE | pe::SCN_MEM_READ,
            );
        } else {
            self.drop_section();
        }

        if self.hii_rsrc_offset > self.data_offset {
            self.append_section_header(
                ".data",
                self.data_offset,
                self.hii_rsrc_offset - self.data_offset,
                pe::SCN_CNT_INITIALIZED_DATA | pe::SCN_MEM_WRITE | pe::SCN_MEM_READ,
            );
        } else {
            self.drop_section();
        }

        if self.reloc_offset > self.hii_rsrc_offset {
            self.append_section_header(
                ".rsrc",
                self.hii_rsrc_offset,
                self.reloc_offset - self.hii_rsrc_offset,
                pe::SCN_CNT_INITIALIZED_DATA | pe::SCN_MEM_READ,
            );
            self.set_data_directory(
                pe::DIRECTORY_ENTRY_RESOURCE,
                self.hii_rsrc_offset,
                self.reloc_offset - self.hii_rsrc_offset,
            );
        } else {
            self.drop_section();
        }
    }

    /// Appends one COFF section header record to the table.
    fn append_section_header(&mut self, name: &str, offset: u32, size: u32, characteristics: u32) {
        pe::write_section_header(
            &mut self.coff,
            self.table_offset,
            name,
            offset,
            size,
            characteristics,
        );
        self.table_offset += pe::SECTION_HEADER_SIZE;
    }

    /// Removes one section from the file header count when its region
    /// turned out empty.
    fn drop_section(&mut self) {
        let off = usize::try_from(self.nt_hdr_offset).unwrap() + pe::FILE_HDR_NUMBER_OF_SECTIONS;
        let count = pe::get_u16(&self.coff, off);
        pe::put_u16(&mut self.coff, off, count - 1);
    }

    fn set_data_directory(&mut self, index: usize, address: u32, size: u32) {
        let off =
            usize::try_from(self.nt_hdr_offset).unwrap() + pe::OPT_HDR_DATA_DIRECTORY + index * 8;
        pe::put_u32(&mut self.coff, off, address);
        pe::put_u32(&mut self.coff, off + 4, size);
    }

    /// Copies the payload of every section in the given category to its
    /// committed output offset, then rewrites the relocation targets
    /// within those sections.
    fn write_sections(&mut self, filter: SectionFilter) -> Result<(), ConvertError> {
        // First: copy sections.
        for i in 0..self.elf.shnum() {
            let Some(shdr) = self.elf.read_shdr(i) else {
                continue;
            };
            if !self.filter_matches(filter, &shdr) {
                continue;
            }
            let offset = usize::try_from(self.section_offsets[usize::try_from(i).unwrap()]).unwrap();
            if offset == 0 {
                // Matched the category but was never placed, e.g. a second
                // HII resource section.
                continue;
            }
            let size = usize::try_from(shdr.sh_size).map_err(|_| ConvertError::ImageTooLarge)?;
            match shdr.sh_type {
                Elf64Shdr::SHT_PROGBITS => {
                    self.coff[offset..offset + size].copy_from_slice(self.elf.section_data(&shdr));
                }
                Elf64Shdr::SHT_NOBITS => {
                    self.coff[offset..offset + size].fill(0);
                }
                sh_type => {
                    self.reporter.warn(format!(
                        "{}: section of unknown type {sh_type:#x} copied verbatim",
                        self.image_name
                    ));
                    self.coff[offset..offset + size].copy_from_slice(self.elf.section_data(&shdr));
                }
            }
        }

        // Second: apply relocations.
        self.reporter.verbose("Applying relocations");
        for i in 0..self.elf.shnum() {
            let Some(rel_shdr) = self.elf.read_shdr(i) else {
                continue;
            };
            // GCC emits RELA for both supported machines; REL sections are
            // only consulted for the loader fixup table.
            if rel_shdr.sh_type != Elf64Shdr::SHT_RELA {
                continue;
            }
            let Some(sec_shdr) = self.elf.read_shdr(rel_shdr.sh_info) else {
                continue;
            };
            if !self.filter_matches(filter, &sec_shdr) {
                continue;
            }
            let sec_offset = self.section_offsets[usize::try_from(rel_shdr.sh_info).unwrap()];
            if sec_offset == 0 {
                continue;
            }

            let symtab_shdr = self
                .elf
                .read_shdr(rel_shdr.sh_link)
                .ok_or(ConvertError::Elf(ElfError::InvalidSectionIndex))?;
            let symtab = self.elf.symtab(&symtab_shdr)?;
            let relas = self.elf.relas(&rel_shdr)?;

            for j in 0..relas.len() {
                let rela = relas.read_rela(j)?;
                let rtype = rela.get_type();
                if rtype == 0 {
                    continue;
                }

                // The symbol must resolve to a section of this image; an
                // undefined or absolute symbol means the input was not
                // fully link-resolved.
                let sym = symtab.read_sym(rela.get_sym())?;
                let sym_shndx = Elf64Word::from(sym.st_shndx);
                if sym_shndx == Elf64Shdr::SHN_UNDEF
                    || sym_shndx == Elf64Shdr::SHN_ABS
                    || sym_shndx >= self.elf.shnum()
                {
                    return Err(ConvertError::BadSymbolDefinition {
                        symbol: rela.get_sym(),
                    });
                }
                let sym_shdr = self
                    .elf
                    .read_shdr(sym_shndx)
                    .ok_or(ConvertError::Elf(ElfError::InvalidSectionIndex))?;

                // Output position of the storage unit to patch.
                let targ_off = rela
                    .r_offset
                    .checked_sub(sec_shdr.sh_addr)
                    .ok_or(ConvertError::RelocationOutOfRange {
                        offset: rela.r_offset,
                    })?;
                let targ = u64::from(sec_offset)
                    .checked_add(targ_off)
                    .and_then(|t| usize::try_from(t).ok())
                    .ok_or(ConvertError::RelocationOutOfRange {
                        offset: rela.r_offset,
                    })?;
                if targ >= self.coff.len() {
                    return Err(ConvertError::RelocationOutOfRange {
                        offset: rela.r_offset,
                    });
                }

                let mut old = [0u8; 8];
                let avail = (self.coff.len() - targ).min(8);
                old[..avail].copy_from_slice(&self.coff[targ..targ + avail]);

                let fields = RelocFields {
                    rtype,
                    r_offset: rela.r_offset,
                    addend: rela.r_addend,
                    sym_value: sym.st_value,
                    sym_sec_vaddr: sym_shdr.sh_addr,
                    sym_sec_coff: self.section_offsets[usize::try_from(sym_shndx).unwrap()],
                    targ_sec_vaddr: sec_shdr.sh_addr,
                    targ_sec_coff: sec_offset,
                };
                if let Some(patch) = self.reloc_proc.apply_relocation(&fields, old)? {
                    if targ + patch.len > self.coff.len() {
                        return Err(ConvertError::RelocationOutOfRange {
                            offset: rela.r_offset,
                        });
                    }
                    self.coff[targ..targ + patch.len].copy_from_slice(&patch.value[..patch.len]);
                    self.reporter.verbose(&format!(
                        "Relocation kind {rtype:#x} applied at offset {targ:#x}"
                    ));
                }
            }
        }

        Ok(())
    }

    /// Collects the loader fixups for all absolute relocations into code
    /// and data sections and appends the serialized base relocation table.
    fn write_relocations(&mut self) -> Result<(), ConvertError> {
        for i in 0..self.elf.shnum() {
            let Some(rel_shdr) = self.elf.read_shdr(i) else {
                continue;
            };
            if rel_shdr.sh_type != Elf64Shdr::SHT_RELA && rel_shdr.sh_type != Elf64Shdr::SHT_REL {
                continue;
            }
            let Some(sec_shdr) = self.elf.read_shdr(rel_shdr.sh_info) else {
                continue;
            };
            if !self.is_text_shdr(&sec_shdr) && !self.is_data_shdr(&sec_shdr) {
                continue;
            }
            let sec_offset = self.section_offsets[usize::try_from(rel_shdr.sh_info).unwrap()];
            if sec_offset == 0 {
                continue;
            }

            let relas = self.elf.relas(&rel_shdr)?;
            for j in 0..relas.len() {
                let rela = relas.read_rela(j)?;
                let rtype = rela.get_type();
                if rtype == 0 {
                    continue;
                }
                if let Some(fixup_kind) = self.reloc_proc.fixup_type(rtype)? {
                    let targ_off = rela.r_offset.checked_sub(sec_shdr.sh_addr).ok_or(
                        ConvertError::RelocationOutOfRange {
                            offset: rela.r_offset,
                        },
                    )?;
                    let offset = u64::from(sec_offset)
                        .checked_add(targ_off)
                        .and_then(|o| u32::try_from(o).ok())
                        .ok_or(ConvertError::ImageTooLarge)?;
                    self.fixups.add(offset, fixup_kind);
                }
            }
        }

        self.reporter
            .verbose(&format!("Collected {} loader fixups", self.fixups.len()));
        let region = self.fixups.serialize();
        let size = u32::try_from(region.len()).map_err(|_| ConvertError::ImageTooLarge)?;
        self.coff.extend_from_slice(&region);
        self.coff_offset = self
            .coff_offset
            .checked_add(size)
            .ok_or(ConvertError::ImageTooLarge)?;

        if self.fixups.is_empty() {
            // No fixups: leave the directory entry empty and don't add the
            // .reloc section.
            self.drop_section();
        } else {
            self.set_data_directory(pe::DIRECTORY_ENTRY_BASERELOC, self.reloc_offset, size);
            self.append_section_header(
                ".reloc",
                self.reloc_offset,
                size,
                pe::SCN_CNT_INITIALIZED_DATA | pe::SCN_MEM_DISCARDABLE | pe::SCN_MEM_READ,
            );
        }
        Ok(())
    }

    /// Appends a CodeView NB10 debug directory entry carrying the input
    /// image's name, for post-mortem symbolication.
    fn write_debug(&mut self) -> Result<(), ConvertError> {
        let name = self.image_name.as_bytes();
        let name_len =
            u32::try_from(name.len() + 1).map_err(|_| ConvertError::ImageTooLarge)?;
        let debug_offset = self.coff_offset;
        let end = debug_offset
            .checked_add(pe::DEBUG_DIRECTORY_ENTRY_SIZE + pe::CODEVIEW_NB10_ENTRY_SIZE)
            .and_then(|end| end.checked_add(name_len))
            .ok_or(ConvertError::ImageTooLarge)?;
        let end = pe::coff_align(end);

        self.coff.resize(usize::try_from(end).unwrap(), 0);
        self.coff_offset = end;

        let base = usize::try_from(debug_offset).unwrap();
        pe::put_u32(&mut self.coff, base + pe::DEBUG_DIR_TYPE, pe::DEBUG_TYPE_CODEVIEW);
        pe::put_u32(
            &mut self.coff,
            base + pe::DEBUG_DIR_SIZE_OF_DATA,
            pe::CODEVIEW_NB10_ENTRY_SIZE + name_len,
        );
        pe::put_u32(
            &mut self.coff,
            base + pe::DEBUG_DIR_RVA,
            debug_offset + pe::DEBUG_DIRECTORY_ENTRY_SIZE,
        );
        pe::put_u32(
            &mut self.coff,
            base + pe::DEBUG_DIR_FILE_OFFSET,
            debug_offset + pe::DEBUG_DIRECTORY_ENTRY_SIZE,
        );

        let nb10 = base + usize::try_from(pe::DEBUG_DIRECTORY_ENTRY_SIZE).unwrap();
        pe::put_u32(&mut self.coff, nb10, pe::CODEVIEW_SIGNATURE_NB10);
        let name_off = nb10 + usize::try_from(pe::CODEVIEW_NB10_ENTRY_SIZE).unwrap();
        self.coff[name_off..name_off + name.len()].copy_from_slice(name);

        self.set_data_directory(pe::DIRECTORY_ENTRY_DEBUG, debug_offset, end - debug_offset);
        self.append_section_header(
            ".debug",
            debug_offset,
            end - debug_offset,
            pe::SCN_CNT_INITIALIZED_DATA | pe::SCN_MEM_DISCARDABLE | pe::SCN_MEM_READ,
        );
        Ok(())
    }

    /// Finalizes the image size now that all regions are in place.
    fn set_image_size(&mut self) {
        let nt = usize::try_from(self.nt_hdr_offset).unwrap();
        pe::put_u32(&mut self.coff, nt + pe::OPT_HDR_SIZE_OF_IMAGE, self.coff_offset);
    }
}
