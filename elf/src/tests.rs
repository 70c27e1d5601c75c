// SPDX-License-Identifier: (GPL-2.0-or-later OR MIT)
//
// Copyright (c) 2023-2024 SUSE LLC
//
// Author: Nicolai Stange <nstange@suse.de>
//
// vim: ts=4 sw=4 et

use super::*;

/// Builds a minimal, valid ELF64 header for the given type/machine with no
/// program or section header tables.
fn test_elf_hdr_buf(e_type: Elf64Half, e_machine: Elf64Half) -> [u8; 64] {
    let mut buf = [0u8; 64];
    buf[0..4].copy_from_slice(&[0x7f, b'E', b'L', b'F']);
    buf[4] = 2; // EI_CLASS = ELFCLASS64
    buf[5] = 1; // EI_DATA = ELFDATA2LSB
    buf[6] = 1; // EI_VERSION = EV_CURRENT
    buf[16..18].copy_from_slice(&e_type.to_le_bytes());
    buf[18..20].copy_from_slice(&e_machine.to_le_bytes());
    buf[20..24].copy_from_slice(&1u32.to_le_bytes()); // e_version
    buf[52..54].copy_from_slice(&64u16.to_le_bytes()); // e_ehsize
    buf
}

#[test]
fn test_elf64_hdr_read_valid() {
    let buf = test_elf_hdr_buf(2, ElfMachine::EM_X86_64);
    let hdr = Elf64Hdr::read(&buf).unwrap();
    assert_eq!(hdr.e_type, 2);
    assert_eq!(hdr.e_machine, ElfMachine::EM_X86_64);
    assert_eq!(hdr.e_shnum, 0);

    // ET_DYN images are accepted as well.
    let buf = test_elf_hdr_buf(3, ElfMachine::EM_AARCH64);
    assert!(Elf64Hdr::read(&buf).is_ok());
}

#[test]
fn test_elf64_hdr_read_rejects_bad_ident() {
    let mut buf = test_elf_hdr_buf(2, ElfMachine::EM_X86_64);
    buf[0] = 0x7e;
    assert_eq!(Elf64Hdr::read(&buf), Err(ElfError::UnrecognizedMagic));

    let mut buf = test_elf_hdr_buf(2, ElfMachine::EM_X86_64);
    buf[4] = 1; // ELFCLASS32
    assert_eq!(Elf64Hdr::read(&buf), Err(ElfError::UnsupportedClass));

    let mut buf = test_elf_hdr_buf(2, ElfMachine::EM_X86_64);
    buf[5] = 2; // ELFDATA2MSB
    assert_eq!(Elf64Hdr::read(&buf), Err(ElfError::UnsupportedEndianess));

    let mut buf = test_elf_hdr_buf(2, ElfMachine::EM_X86_64);
    buf[6] = 2;
    assert_eq!(Elf64Hdr::read(&buf), Err(ElfError::UnsupportedVersion));
}

#[test]
fn test_elf64_hdr_read_rejects_bad_type_or_machine() {
    // ET_REL is not a fully link-resolved image.
    let buf = test_elf_hdr_buf(1, ElfMachine::EM_X86_64);
    assert_eq!(Elf64Hdr::read(&buf), Err(ElfError::UnsupportedType));

    // EM_ARM (32-bit) is not supported.
    let buf = test_elf_hdr_buf(2, 40);
    assert_eq!(Elf64Hdr::read(&buf), Err(ElfError::UnsupportedMachine));
}

#[test]
fn test_elf64_hdr_read_too_short() {
    let buf = test_elf_hdr_buf(2, ElfMachine::EM_X86_64);
    assert_eq!(Elf64Hdr::read(&buf[..48]), Err(ElfError::FileTooShort));
}

#[test]
fn test_elf_machine_try_from() {
    assert_eq!(
        ElfMachine::try_from(ElfMachine::EM_X86_64),
        Ok(ElfMachine::X64)
    );
    assert_eq!(
        ElfMachine::try_from(ElfMachine::EM_AARCH64),
        Ok(ElfMachine::Aarch64)
    );
    assert_eq!(ElfMachine::try_from(3), Err(ElfError::UnsupportedMachine));
}

#[test]
fn test_elf64_file_read_minimal() {
    let buf = test_elf_hdr_buf(2, ElfMachine::EM_AARCH64);
    let elf_file = Elf64File::read(&buf).unwrap();
    assert_eq!(elf_file.machine(), ElfMachine::Aarch64);
    assert_eq!(elf_file.entry(), 0);
    assert_eq!(elf_file.shnum(), 0);
    assert!(elf_file.read_shdr(0).is_none());
    assert!(elf_file.shdrs_iter().next().is_none());
}

#[test]
fn test_elf64_shdr_verify_methods() {
    // Create a valid Elf64Shdr instance for testing.
    let valid_shdr = Elf64Shdr {
        sh_name: 1,
        sh_type: 2,
        sh_flags: Elf64ShdrFlags::WRITE | Elf64ShdrFlags::ALLOC,
        sh_addr: 0x1000,
        sh_offset: 0x2000,
        sh_size: 0x3000,
        sh_link: 3,
        sh_info: 4,
        sh_addralign: 8,
        sh_entsize: 0,
    };

    // Verify that the valid Elf64Shdr instance passes verification.
    assert!(valid_shdr.verify().is_ok());

    // Create an invalid Elf64Shdr instance for testing.
    let invalid_shdr = Elf64Shdr {
        sh_name: 0,
        sh_type: 2,
        sh_flags: Elf64ShdrFlags::from_bits(0).unwrap(),
        sh_addr: 0x1000,
        sh_offset: 0x2000,
        sh_size: 0x3000,
        sh_link: 3,
        sh_info: 4,
        sh_addralign: 7, // Invalid alignment
        sh_entsize: 0,
    };

    // Verify that the invalid Elf64Shdr instance fails verification.
    assert!(invalid_shdr.verify().is_err());
}

#[test]
fn test_elf64_shdr_verify_tolerates_unaligned_addr() {
    // Some ARM toolchains emit sections whose address is not aligned to
    // the declared sh_addralign. Those must pass header verification, the
    // conversion layer deals with them.
    let shdr = Elf64Shdr {
        sh_name: 0,
        sh_type: 1,
        sh_flags: Elf64ShdrFlags::ALLOC,
        sh_addr: 0x1004,
        sh_offset: 0x2000,
        sh_size: 0x100,
        sh_link: 0,
        sh_info: 0,
        sh_addralign: 16,
        sh_entsize: 0,
    };
    assert!(shdr.verify().is_ok());
}

#[test]
fn test_elf64_addr_range_methods() {
    // Test Elf64AddrRange::len() and Elf64AddrRange::is_empty().

    // Create an Elf64AddrRange instance for testing.
    let addr_range = Elf64AddrRange {
        vaddr_begin: 0x1000,
        vaddr_end: 0x2000,
    };

    // Check that the length calculation is correct.
    assert_eq!(addr_range.len(), 0x1000);

    // Check if the address range is empty.
    assert!(!addr_range.is_empty());

    // Check containment at the range boundaries.
    assert!(addr_range.contains(0x1000));
    assert!(addr_range.contains(0x1fff));
    assert!(!addr_range.contains(0x2000));

    // Test Elf64AddrRange::try_from().

    // Create a valid input tuple for try_from.
    let valid_input: (Elf64Addr, Elf64Xword) = (0x1000, 0x2000);

    // Attempt to create an Elf64AddrRange from the valid input.
    let result = Elf64AddrRange::try_from(valid_input);

    // Verify that the result is Ok and contains the expected Elf64AddrRange.
    assert!(result.is_ok());
    let valid_addr_range = result.unwrap();
    assert_eq!(valid_addr_range.vaddr_begin, 0x1000);
    assert_eq!(valid_addr_range.vaddr_end, 0x3000);

    // An overflowing range must be rejected.
    let invalid_input: (Elf64Addr, Elf64Xword) = (Elf64Addr::MAX, 1);
    assert_eq!(
        Elf64AddrRange::try_from(invalid_input),
        Err(ElfError::InvalidAddressRange)
    );
}

#[test]
fn test_elf64_file_range_try_from() {
    // Valid range
    let valid_range: (Elf64Off, Elf64Xword) = (0, 100);
    let result: Result<Elf64FileRange, ElfError> = valid_range.try_into();
    assert!(result.is_ok());
    let file_range = result.unwrap();
    assert_eq!(file_range.offset_begin, 0);
    assert_eq!(file_range.offset_end, 100);

    // Overflowing range
    let invalid_range: (Elf64Off, Elf64Xword) = (Elf64Off::MAX, 1);
    let result: Result<Elf64FileRange, ElfError> = invalid_range.try_into();
    assert!(result.is_err());
}

#[test]
fn test_elf64_strtab_get_str() {
    let strtab_buf = b"\0.text\0.hii\0";
    let strtab = Elf64Strtab::new(strtab_buf);

    assert_eq!(strtab.get_str(1).unwrap().to_str(), Ok(".text"));
    assert_eq!(strtab.get_str(7).unwrap().to_str(), Ok(".hii"));

    // Out-of-bounds index.
    assert!(strtab.get_str(strtab_buf.len() as Elf64Word).is_err());
}

#[test]
fn test_elf64_symtab_read_sym() {
    // Two 24-byte symbol entries.
    let mut syms_buf = [0u8; 48];
    // Second symbol: st_shndx = 1, st_value = 0x1010.
    syms_buf[24 + 6..24 + 8].copy_from_slice(&1u16.to_le_bytes());
    syms_buf[24 + 8..24 + 16].copy_from_slice(&0x1010u64.to_le_bytes());

    let symtab = Elf64Symtab::new(&syms_buf, 24).unwrap();
    let sym = symtab.read_sym(1).unwrap();
    assert_eq!(sym.st_shndx, 1);
    assert_eq!(sym.st_value, 0x1010);

    // Out-of-bounds symbol index.
    assert_eq!(symtab.read_sym(2), Err(ElfError::InvalidSymbolIndex));

    // Entry size below the ELF64 symbol size is invalid.
    assert!(Elf64Symtab::new(&syms_buf, 16).is_err());
}

#[test]
fn test_elf64_relas_read_rela() {
    // One RELA entry: r_offset = 0x1008, sym 1, type 257, addend 8.
    let mut relas_buf = [0u8; 24];
    relas_buf[0..8].copy_from_slice(&0x1008u64.to_le_bytes());
    let r_info = (1u64 << 32) | 257;
    relas_buf[8..16].copy_from_slice(&r_info.to_le_bytes());
    relas_buf[16..24].copy_from_slice(&8i64.to_le_bytes());

    let relas = Elf64Relas::new(&relas_buf, 24, true).unwrap();
    assert_eq!(relas.len(), 1);
    let rela = relas.read_rela(0).unwrap();
    assert_eq!(rela.r_offset, 0x1008);
    assert_eq!(rela.get_sym(), 1);
    assert_eq!(rela.get_type(), 257);
    assert_eq!(rela.r_addend, 8);

    assert_eq!(relas.read_rela(1), Err(ElfError::InvalidRelocationIndex));

    // The same bytes interpreted as SHT_REL entries: 16 bytes each, no
    // addend.
    let relas = Elf64Relas::new(&relas_buf[..16], 16, false).unwrap();
    let rel = relas.read_rela(0).unwrap();
    assert_eq!(rel.r_offset, 0x1008);
    assert_eq!(rel.r_addend, 0);
}
