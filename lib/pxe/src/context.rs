//! Per-invocation state and file access relative to the boot file.
//!
//! As in pxelinux, paths named inside a config file are relative to the
//! directory of the boot file. [PxeContext] remembers that directory and joins
//! it to every path before asking the [Platform] to load the file.

use crate::{env::Environment, error::PxeError, platform::Platform};
use alloc::{
    format,
    string::{String, ToString},
    vec::Vec,
};
use config::MAX_TFTP_PATH_LEN;
use log::{info, warn};
use utils::strtol::strict_strtoul;

/// Directory holding the per-client config files.
pub const PXELINUX_DIR: &str = "pxelinux.cfg/";

pub struct PxeContext<P: Platform> {
    pub platform: P,
    /// Directory part of the boot file, with its trailing `/`, or empty.
    bootdir: String,
    /// Whether absolute paths bypass [Self::bootdir].
    allow_abs_path: bool,
}

impl<P: Platform> PxeContext<P> {
    /// Set up a context for `bootfile`.
    ///
    /// Fails with [PxeError::NoSpace] when the boot file path alone would not
    /// fit the loader's path limit.
    pub fn new(
        platform: P,
        allow_abs_path: bool,
        bootfile: Option<&str>,
    ) -> Result<PxeContext<P>, PxeError> {
        let bootfile = bootfile.unwrap_or("");
        if bootfile.len() >= MAX_TFTP_PATH_LEN {
            return Err(PxeError::NoSpace);
        }
        let dir_len = bootfile.rfind('/').map(|x| x + 1).unwrap_or(0);
        Ok(PxeContext {
            platform,
            bootdir: bootfile[..dir_len].to_string(),
            allow_abs_path,
        })
    }

    pub fn bootdir(&self) -> &str {
        &self.bootdir
    }

    pub fn env(&self) -> &Environment {
        self.platform.env()
    }

    pub fn into_platform(self) -> P {
        self.platform
    }

    /// Resolve `file_path` against the boot directory.
    pub fn resolve(&self, file_path: &str) -> Result<String, PxeError> {
        let prefix = if file_path.starts_with('/') && self.allow_abs_path {
            ""
        } else {
            self.bootdir.as_str()
        };
        let path = format!("{}{}", prefix, file_path);
        if path.len() > MAX_TFTP_PATH_LEN {
            warn!("Base path too long ({})", path);
            return Err(PxeError::NameTooLong { path });
        }
        Ok(path)
    }

    /// Load a file named relative to the boot file to `addr`.
    pub fn get_relfile(&mut self, file_path: &str, addr: usize) -> Result<usize, PxeError> {
        let path = self.resolve(file_path)?;
        info!("Retrieving file: {}", path);
        self.platform
            .get_file(&path, addr)
            .map_err(|err| PxeError::Fetch { path, err })
    }

    /// Load a text file to `addr` and NUL-terminate it.
    pub fn get_pxe_file(&mut self, file_path: &str, addr: usize) -> Result<usize, PxeError> {
        let size = self.get_relfile(file_path, addr)?;
        self.platform
            .write_sysmem(addr + size, &[0])
            .map_err(|err| PxeError::Fetch {
                path: file_path.to_string(),
                err,
            })?;
        Ok(size)
    }

    /// Load `pxelinux.cfg/<file>` to `addr`.
    pub fn get_pxelinux_path(&mut self, file: &str, addr: usize) -> Result<usize, PxeError> {
        if PXELINUX_DIR.len() + file.len() > MAX_TFTP_PATH_LEN {
            warn!("path ({}{}) too long, skipping", PXELINUX_DIR, file);
            return Err(PxeError::NameTooLong {
                path: format!("{}{}", PXELINUX_DIR, file),
            });
        }
        self.get_pxe_file(&format!("{}{}", PXELINUX_DIR, file), addr)
    }

    /// Load a file to the address held (as hex) by the variable `envaddr_name`.
    pub fn get_relfile_envaddr(
        &mut self,
        file_path: &str,
        envaddr_name: &str,
    ) -> Result<usize, PxeError> {
        let addr = self.platform.env().require_hex(envaddr_name)?;
        self.get_relfile(file_path, addr)
    }

    /// Copy the NUL-terminated text at `addr` out of the load area.
    pub fn read_text(&self, addr: usize) -> Result<Vec<u8>, PxeError> {
        let mem = self.platform.map_sysmem(addr).ok_or_else(|| PxeError::Fetch {
            path: format!("{:#x}", addr),
            err: crate::error::FetchError::OutOfMemory,
        })?;
        let len = mem.iter().position(|x| *x == 0).unwrap_or(mem.len());
        Ok(mem[..len].to_vec())
    }
}

/// Size of the last loaded file, from the `filesize` variable.
pub fn pxe_get_file_size(env: &Environment) -> Result<usize, PxeError> {
    let value = env.get("filesize").ok_or_else(|| PxeError::MissingVariable {
        name: "filesize".to_string(),
    })?;
    strict_strtoul(value, 16)
        .map(|x| x as usize)
        .ok_or_else(|| PxeError::InvalidNumber {
            name: "filesize".to_string(),
            value: value.to_string(),
        })
}

/// Parse a `aa:bb:cc:dd:ee:ff` MAC address.
pub fn parse_enetaddr(text: &str) -> Option<[u8; 6]> {
    let mut mac = [0u8; 6];
    let mut parts = text.trim().split([':', '-']);
    for byte in mac.iter_mut() {
        let part = parts.next()?;
        if part.is_empty() || part.len() > 2 {
            return None;
        }
        *byte = u8::from_str_radix(part, 16).ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(mac)
}

/// The current interface's MAC in PXE form: `01-aa-bb-cc-dd-ee-ff`.
pub fn format_mac_pxe(env: &Environment) -> Result<String, PxeError> {
    let ethaddr = env.get("ethaddr").ok_or_else(|| PxeError::MissingVariable {
        name: "ethaddr".to_string(),
    })?;
    let mac = parse_enetaddr(ethaddr).ok_or_else(|| PxeError::InvalidNumber {
        name: "ethaddr".to_string(),
        value: ethaddr.to_string(),
    })?;
    Ok(format!(
        "01-{:02x}-{:02x}-{:02x}-{:02x}-{:02x}-{:02x}",
        mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
    ))
}
