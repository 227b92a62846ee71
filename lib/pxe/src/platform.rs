//! Services the surrounding boot monitor provides to the interpreter.
//!
//! Everything that touches hardware or the network goes through [Platform]:
//! fetching files into the load area, reading that area back, the
//! environment, device-tree fixups and the boot commands themselves.
//! Implementations must behave like the boot monitor's own commands; in
//! particular a successful boot command hands control to the kernel, which
//! the interpreter treats as the end of all processing.

use crate::{
    env::Environment,
    error::{CommandError, FetchError},
};

/// Image formats the `bootm` path understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Nothing `bootm` can handle; other boot commands are tried.
    Invalid,
    /// Legacy image with a 64-byte header.
    Legacy,
    /// Flattened Image Tree.
    Fit,
}

/// Boot commands, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootCommand {
    /// Legacy and FIT images.
    Bootm,
    /// AArch64 / RISC-V `Image`.
    Booti,
    /// ARM `zImage`.
    Bootz,
    /// x86 `bzImage`.
    Zboot,
}

impl BootCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BootCommand::Bootm => "bootm",
            BootCommand::Booti => "booti",
            BootCommand::Bootz => "bootz",
            BootCommand::Zboot => "zboot",
        }
    }
}

pub trait Platform {
    fn env(&self) -> &Environment;
    fn env_mut(&mut self) -> &mut Environment;

    /// Load `path` to `addr` and return its size in bytes.
    fn get_file(&mut self, path: &str, addr: usize) -> Result<usize, FetchError>;

    /// Memory from `addr` to the end of the region that contains it.
    fn map_sysmem(&self, addr: usize) -> Option<&[u8]>;

    /// Store `data` at `addr`.
    fn write_sysmem(&mut self, addr: usize, data: &[u8]) -> Result<(), FetchError>;

    /// Identify the image at `addr`.
    fn image_format(&self, addr: usize) -> ImageFormat;

    /// Whether `cmd` was built into this boot monitor.
    fn supports(&self, cmd: BootCommand) -> bool;

    /// Run a boot command. `Ok` means control went to the kernel.
    fn boot(&mut self, cmd: BootCommand, argv: &[&str]) -> Result<(), CommandError>;

    /// Run a `;`-separated list of monitor commands.
    fn run_command_list(&mut self, cmds: &str) -> Result<(), CommandError>;

    /// Whether a valid device-tree header sits at `addr`.
    fn fdt_check_header(&self, addr: usize) -> bool;

    /// Apply the overlay at `overlay_addr` to the tree at `fdt_addr`.
    fn fdt_apply_overlay(
        &mut self,
        fdt_addr: usize,
        overlay_addr: usize,
    ) -> Result<(), CommandError>;

    /// Store fresh entropy as `/chosen/kaslr-seed` in the tree at `fdt_addr`.
    fn fdt_set_kaslr_seed(&mut self, fdt_addr: usize) -> Result<(), CommandError>;

    /// Address used for scratch loads such as the menu background.
    fn image_load_addr(&self) -> usize;

    /// Show the bitmap at `addr` behind the menu.
    fn show_background(&mut self, _addr: usize) -> Result<(), CommandError> {
        Err(CommandError::Unsupported)
    }
}
