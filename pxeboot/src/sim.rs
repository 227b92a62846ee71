//! A boot monitor simulated on the host.
//!
//! Files come from a directory standing in for the TFTP server, the load
//! area is a [SparseMemory], and the boot commands check the kernel image
//! the way the real ones do before printing the command they would run.

use fdt::Fdt;
use log::{debug, info, warn};
use pxe::{
    Environment, Platform,
    boot::kernel_load_addr,
    error::{CommandError, FetchError},
    platform::{BootCommand, ImageFormat},
};
use std::{
    fs,
    io::ErrorKind,
    path::{Component, Path, PathBuf},
};
use utils::{strtol::hextoul, sysmem::SparseMemory};

/// Load addresses set unless the environment already has them.
pub const DEFAULT_ADDRESSES: [(&str, &str); 6] = [
    ("loadaddr", "0x42000000"),
    ("kernel_addr_r", "0x40400000"),
    ("fdt_addr_r", "0x4fa00000"),
    ("fdtoverlay_addr_r", "0x4fb00000"),
    ("ramdisk_addr_r", "0x4fc00000"),
    ("pxefile_addr_r", "0x4ff00000"),
];

const LEGACY_MAGIC: u32 = 0x2705_1956;
const FDT_MAGIC: u32 = 0xd00d_feed;
/// `ARM\x64` at offset 56 of an arm64 `Image`.
const ARM64_MAGIC: u32 = 0x644d_5241;
/// At offset 0x24 of an ARM `zImage`.
const ZIMAGE_MAGIC: u32 = 0x016f_2818;
/// `HdrS` at offset 0x202 of an x86 `bzImage`.
const BZIMAGE_MAGIC: u32 = 0x5372_6448;

fn read_u32_be(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset + 4)?;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn read_u32_le(data: &[u8], offset: usize) -> Option<u32> {
    read_u32_be(data, offset).map(u32::swap_bytes)
}

pub struct SimPlatform {
    root: PathBuf,
    env: Environment,
    mem: SparseMemory,
    supported: Vec<BootCommand>,
    /// The command line that took over, once one did.
    booted: Option<Vec<String>>,
}

impl SimPlatform {
    pub fn new(root: &Path, env: Environment, ram_top: usize) -> SimPlatform {
        let mut env = env;
        for (name, value) in DEFAULT_ADDRESSES {
            if env.get(name).is_none() {
                env.set(name, value);
            }
        }
        SimPlatform {
            root: root.to_path_buf(),
            env,
            mem: SparseMemory::new(ram_top),
            supported: vec![
                BootCommand::Bootm,
                BootCommand::Booti,
                BootCommand::Bootz,
                BootCommand::Zboot,
            ],
            booted: None,
        }
    }

    /// Restrict the boot commands this monitor was "built" with.
    pub fn set_supported(&mut self, supported: Vec<BootCommand>) {
        self.supported = supported;
    }

    pub fn booted(&self) -> Option<&[String]> {
        self.booted.as_deref()
    }

    /// Host path for a path on the server. `..` may not leave the root.
    fn host_path(&self, path: &str) -> Option<PathBuf> {
        let mut host = self.root.clone();
        for component in Path::new(path).components() {
            match component {
                Component::Normal(part) => host.push(part),
                Component::CurDir | Component::RootDir => {}
                Component::ParentDir | Component::Prefix(_) => return None,
            }
        }
        Some(host)
    }

    fn parse_fdt(&self, addr: usize) -> Option<Fdt<'_>> {
        let data = self.mem.read(addr)?;
        Fdt::new(data).ok()
    }

    /// Check that the image at `addr` is something `cmd` can start.
    fn check_image(&self, cmd: BootCommand, addr: usize) -> Result<(), CommandError> {
        let data = self.mem.read(addr).unwrap_or(&[]);
        let (ok, what) = match cmd {
            BootCommand::Bootm => (self.image_format(addr) != ImageFormat::Invalid, "image"),
            BootCommand::Booti => (read_u32_le(data, 56) == Some(ARM64_MAGIC), "Linux ARM64 Image"),
            BootCommand::Bootz => (
                read_u32_le(data, 0x24) == Some(ZIMAGE_MAGIC),
                "Linux kernel zImage",
            ),
            BootCommand::Zboot => (read_u32_le(data, 0x202) == Some(BZIMAGE_MAGIC), "bzImage"),
        };
        if ok {
            Ok(())
        } else {
            Err(CommandError::Customized {
                info: format!("Bad {} magic at {:#x}", what, addr),
            })
        }
    }
}

impl Platform for SimPlatform {
    fn env(&self) -> &Environment {
        &self.env
    }

    fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    fn get_file(&mut self, path: &str, addr: usize) -> Result<usize, FetchError> {
        let host = self.host_path(path).ok_or(FetchError::NotFound)?;
        let data = fs::read(&host).map_err(|err| match err.kind() {
            ErrorKind::NotFound => FetchError::NotFound,
            _ => {
                warn!("{}: {}", host.display(), err);
                FetchError::Io
            }
        })?;
        if !self.mem.write(addr, &data) {
            return Err(FetchError::OutOfMemory);
        }
        debug!("{} bytes at {:#x}", data.len(), addr);
        self.env.set("filesize", &format!("{:x}", data.len()));
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
        let Some(data) = self.mem.read(addr) else {
            return ImageFormat::Invalid;
        };
        match read_u32_be(data, 0) {
            Some(LEGACY_MAGIC) => ImageFormat::Legacy,
            Some(FDT_MAGIC) => ImageFormat::Fit,
            _ => ImageFormat::Invalid,
        }
    }

    fn supports(&self, cmd: BootCommand) -> bool {
        self.supported.contains(&cmd)
    }

    fn boot(&mut self, cmd: BootCommand, argv: &[&str]) -> Result<(), CommandError> {
        if !self.supports(cmd) {
            return Err(CommandError::Unsupported);
        }
        let kernel = argv.get(1).copied().unwrap_or("");
        let addr = kernel_load_addr(kernel, self.image_load_addr());
        self.check_image(cmd, addr)?;
        if cmd != BootCommand::Zboot
            && let Some(fdt) = argv.get(3)
        {
            let fdt_addr = hextoul(fdt) as usize;
            if self.parse_fdt(fdt_addr).is_none() {
                return Err(CommandError::Customized {
                    info: format!("ERROR: Did not find a cmdline Flattened Device Tree at {}", fdt),
                });
            }
        }
        info!("## Starting kernel with {}", cmd.name());
        self.booted = Some(argv.iter().map(|x| x.to_string()).collect());
        Ok(())
    }

    fn run_command_list(&mut self, cmds: &str) -> Result<(), CommandError> {
        console_println!("=> {}", cmds);
        self.booted = Some(vec![cmds.to_string()]);
        Ok(())
    }

    fn fdt_check_header(&self, addr: usize) -> bool {
        self.parse_fdt(addr).is_some()
    }

    fn fdt_apply_overlay(
        &mut self,
        fdt_addr: usize,
        overlay_addr: usize,
    ) -> Result<(), CommandError> {
        let Some(overlay) = self.parse_fdt(overlay_addr) else {
            return Err(CommandError::Failed { code: -1 });
        };
        let fragments = overlay
            .find_node("/")
            .map(|x| x.children().count())
            .unwrap_or(0);
        info!(
            "overlay at {:#x}: {} fragment(s) onto {:#x}",
            overlay_addr, fragments, fdt_addr
        );
        Ok(())
    }

    fn fdt_set_kaslr_seed(&mut self, fdt_addr: usize) -> Result<(), CommandError> {
        let Some(tree) = self.parse_fdt(fdt_addr) else {
            return Err(CommandError::Failed { code: -1 });
        };
        if tree.find_node("/chosen").is_none() {
            return Err(CommandError::Customized {
                info: String::from("no /chosen node"),
            });
        }
        info!("kaslr-seed set in {:#x}", fdt_addr);
        Ok(())
    }

    fn image_load_addr(&self) -> usize {
        self.env
            .get("loadaddr")
            .map(|x| hextoul(x) as usize)
            .unwrap_or(0x4200_0000)
    }

    fn show_background(&mut self, addr: usize) -> Result<(), CommandError> {
        match self.mem.read(addr) {
            Some([b'B', b'M', ..]) => {
                info!("background bitmap at {:#x}", addr);
                Ok(())
            }
            _ => Err(CommandError::Customized {
                info: String::from("There is no valid bmp file at the given address"),
            }),
        }
    }
}
