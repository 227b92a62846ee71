//! In-memory [Platform] used by the unit tests.

use crate::{
    env::Environment,
    error::{CommandError, FetchError},
    platform::{BootCommand, ImageFormat, Platform},
};
use alloc::{
    collections::btree_map::BTreeMap,
    string::{String, ToString},
    vec,
    vec::Vec,
};
use utils::sysmem::SparseMemory;

pub const FDT_MAGIC: [u8; 4] = [0xd0, 0x0d, 0xfe, 0xed];
pub const LEGACY_MAGIC: [u8; 4] = [0x27, 0x05, 0x19, 0x56];

pub struct MockPlatform {
    pub env: Environment,
    pub files: BTreeMap<String, Vec<u8>>,
    pub mem: SparseMemory,
    pub supported: Vec<BootCommand>,
    /// Result every boot command returns.
    pub boot_result: Result<(), CommandError>,
    pub loads: Vec<(String, usize)>,
    pub boots: Vec<(BootCommand, Vec<String>)>,
    pub commands: Vec<String>,
    pub overlays: Vec<(usize, usize)>,
    pub kaslr_seeds: Vec<usize>,
    pub backgrounds: Vec<usize>,
}

impl MockPlatform {
    pub fn new() -> MockPlatform {
        MockPlatform {
            env: Environment::new(),
            files: BTreeMap::new(),
            mem: SparseMemory::new(usize::MAX),
            supported: vec![BootCommand::Bootm, BootCommand::Booti],
            boot_result: Ok(()),
            loads: vec![],
            boots: vec![],
            commands: vec![],
            overlays: vec![],
            kaslr_seeds: vec![],
            backgrounds: vec![],
        }
    }

    /// A platform with the usual load addresses set.
    pub fn with_addresses() -> MockPlatform {
        let mut platform = MockPlatform::new();
        platform.env.set("kernel_addr_r", "0x40000000");
        platform.env.set("ramdisk_addr_r", "0x48000000");
        platform.env.set("fdt_addr_r", "0x44000000");
        platform.env.set("fdtoverlay_addr_r", "0x45000000");
        platform.env.set("pxefile_addr_r", "0x50000000");
        platform
    }

    pub fn add_file(&mut self, path: &str, data: &[u8]) {
        self.files.insert(path.to_string(), data.to_vec());
    }

    pub fn poke(&mut self, addr: usize, data: &[u8]) {
        self.mem.write(addr, data);
    }

    pub fn loads(&self) -> Vec<(String, usize)> {
        self.loads.clone()
    }

    fn magic_at(&self, addr: usize) -> Option<[u8; 4]> {
        let mem = self.mem.read(addr)?;
        if mem.len() < 4 {
            return None;
        }
        Some([mem[0], mem[1], mem[2], mem[3]])
    }
}

impl Platform for MockPlatform {
    fn env(&self) -> &Environment {
        &self.env
    }

    fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    fn get_file(&mut self, path: &str, addr: usize) -> Result<usize, FetchError> {
        let data = self.files.get(path).ok_or(FetchError::NotFound)?.clone();
        if !self.mem.write(addr, &data) {
            return Err(FetchError::OutOfMemory);
        }
        self.loads.push((path.to_string(), addr));
        Ok(data.len())
    }

    fn map_sysmem(&self, addr: usize) -> Option<&[u8]> {
        self.mem.read(addr)
    }

    fn write_sysmem(&mut self, addr: usize, data: &[u8]) -> Result<(), FetchError> {
        if self.mem.write(addr, data) {
            Ok(())
        } else {
            Err(FetchError::OutOfMemory)
        }
    }

    fn image_format(&self, addr: usize) -> ImageFormat {
        match self.magic_at(addr) {
            Some(LEGACY_MAGIC) => ImageFormat::Legacy,
            Some(FDT_MAGIC) => ImageFormat::Fit,
            _ => ImageFormat::Invalid,
        }
    }

    fn supports(&self, cmd: BootCommand) -> bool {
        cmd == BootCommand::Bootm || self.supported.contains(&cmd)
    }

    fn boot(&mut self, cmd: BootCommand, argv: &[&str]) -> Result<(), CommandError> {
        self.boots
            .push((cmd, argv.iter().map(|x| x.to_string()).collect()));
        self.boot_result.clone()
    }

    fn run_command_list(&mut self, cmds: &str) -> Result<(), CommandError> {
        self.commands.push(cmds.to_string());
        Ok(())
    }

    fn fdt_check_header(&self, addr: usize) -> bool {
        self.magic_at(addr) == Some(FDT_MAGIC)
    }

    fn fdt_apply_overlay(
        &mut self,
        fdt_addr: usize,
        overlay_addr: usize,
    ) -> Result<(), CommandError> {
        self.overlays.push((fdt_addr, overlay_addr));
        Ok(())
    }

    fn fdt_set_kaslr_seed(&mut self, fdt_addr: usize) -> Result<(), CommandError> {
        self.kaslr_seeds.push(fdt_addr);
        Ok(())
    }

    fn image_load_addr(&self) -> usize {
        0x4100_0000
    }

    fn show_background(&mut self, addr: usize) -> Result<(), CommandError> {
        self.backgrounds.push(addr);
        Ok(())
    }
}
