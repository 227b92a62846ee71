//! Finding the config file for this client.
//!
//! Candidates under `pxelinux.cfg/` are tried from the most to the least
//! specific: the client UUID, its MAC, its IP address in hex with one digit
//! dropped per step, then the architecture defaults.

use crate::{
    context::{PxeContext, format_mac_pxe},
    error::PxeError,
    platform::Platform,
};
use alloc::{
    format,
    string::{String, ToString},
    vec,
    vec::Vec,
};
use log::{debug, info};

/// A config file found by [pxe_get].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    /// Name as given to the loader, relative to the boot directory.
    pub path: String,
    pub addr: usize,
    pub size: usize,
}

/// Parse a dotted-quad IPv4 address.
fn parse_ip(text: &str) -> Option<u32> {
    let mut ip = 0u32;
    let mut parts = text.trim().split('.');
    for _ in 0..4 {
        let part = parts.next()?;
        ip = (ip << 8) | part.parse::<u8>().ok()? as u32;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(ip)
}

/// Names tried below `pxelinux.cfg/` for the client's IP address:
/// `C0A80105`, `C0A8010`, ... `C`.
pub fn ip_candidates(ipaddr: &str) -> Vec<String> {
    let Some(ip) = parse_ip(ipaddr) else {
        return vec![];
    };
    let hex = format!("{:08X}", ip);
    (1..=hex.len()).rev().map(|x| hex[..x].to_string()).collect()
}

/// Every `pxelinux.cfg/` name worth trying, in order.
pub fn config_candidates<P: Platform>(ctx: &PxeContext<P>) -> Vec<String> {
    let env = ctx.env();
    let mut names = vec![];
    if let Some(uuid) = env.get("pxeuuid") {
        names.push(uuid.to_string());
    }
    match format_mac_pxe(env) {
        Ok(mac) => names.push(mac),
        Err(err) => debug!("no MAC candidate: {}", err),
    }
    if let Some(ipaddr) = env.get("ipaddr") {
        names.extend(ip_candidates(ipaddr));
    }
    match (env.get("arch"), env.get("soc")) {
        (Some(arch), Some(soc)) => {
            names.push(format!("default-{}-{}", arch, soc));
            names.push(format!("default-{}", arch));
        }
        (Some(arch), None) => names.push(format!("default-{}", arch)),
        _ => {}
    }
    names.push("default".to_string());
    names
}

/// Load this client's config file to `pxefile_addr_r`.
///
/// `pxelinux_configfile`, when set, is used as is; otherwise the first of
/// [config_candidates] that can be loaded wins.
pub fn pxe_get<P: Platform>(ctx: &mut PxeContext<P>) -> Result<ConfigFile, PxeError> {
    let addr = ctx.env().require_hex("pxefile_addr_r")?;

    if let Some(path) = ctx.env().get("pxelinux_configfile").map(String::from) {
        let size = ctx.get_pxe_file(&path, addr)?;
        return Ok(ConfigFile { path, addr, size });
    }

    for name in config_candidates(ctx) {
        match ctx.get_pxelinux_path(&name, addr) {
            Ok(size) => {
                info!("Config file '{}' found", name);
                return Ok(ConfigFile {
                    path: format!("{}{}", crate::context::PXELINUX_DIR, name),
                    addr,
                    size,
                });
            }
            Err(err) => debug!("{}: {}", name, err),
        }
    }
    Err(PxeError::NoConfig)
}
