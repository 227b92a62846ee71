//! Booting a single label.
//!
//! [label_boot] loads everything a label names into the load area, builds
//! the kernel command line and hands over to the first boot command that
//! accepts the kernel image. Any problem only costs this label its attempt;
//! the caller goes on with the next one.

use crate::{
    context::{PxeContext, format_mac_pxe},
    env::{Environment, process_macros},
    error::PxeError,
    label::{IpAppend, Label},
    platform::{BootCommand, ImageFormat, Platform},
};
use alloc::{
    boxed::Box,
    format,
    string::{String, ToString},
    vec,
    vec::Vec,
};
use config::SYS_CBSIZE;
use log::{debug, info, warn};
use utils::strtol::hextoul;

/// How an attempt to boot ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootOutcome {
    /// A boot command took over. Nothing else may run.
    Booted,
    /// A `localboot` label was selected.
    Localboot,
    /// This label could not be booted.
    Failed,
    /// The user gave up at the menu prompt.
    Interrupted,
}

/// Load addresses handed to the boot command, as environment strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootArgs {
    /// Kernel address, with the FIT configuration suffix if any.
    pub kernel: String,
    /// Initrd address and size (hex).
    pub initrd: Option<(String, String)>,
    pub fdt: Option<String>,
}

impl BootArgs {
    /// `bootm <kernel> [<initrd addr>:<size> | -] [<fdt>]`
    ///
    /// Also used for `booti` and `bootz`.
    pub fn bootm_argv(&self) -> Vec<String> {
        let mut argv = vec![String::from("bootm"), self.kernel.clone()];
        let initrd = self
            .initrd
            .as_ref()
            .map(|(addr, size)| format!("{}:{}", addr, size));
        match (initrd, &self.fdt) {
            (Some(initrd), Some(fdt)) => argv.extend([initrd, fdt.clone()]),
            (Some(initrd), None) => argv.push(initrd),
            (None, Some(fdt)) => argv.extend([String::from("-"), fdt.clone()]),
            (None, None) => {}
        }
        argv
    }

    /// `zboot <kernel> 0 [<initrd addr> <initrd size>]`
    pub fn zboot_argv(&self) -> Vec<String> {
        let mut argv = vec![String::from("zboot"), self.kernel.clone(), String::from("0")];
        if let Some((addr, size)) = &self.initrd {
            argv.extend([addr.clone(), size.clone()]);
        }
        argv
    }
}

/// Address of the kernel image named by `image`.
///
/// `image` is `<addr>`, `<addr>#<config>` or `<addr>:<image>`; an empty
/// address part means `default_addr`.
pub fn kernel_load_addr(image: &str, default_addr: usize) -> usize {
    let addr = match image.find(['#', ':']) {
        Some(0) => return default_addr,
        Some(idx) => &image[..idx],
        None => image,
    };
    hextoul(addr) as usize
}

/// Run `localcmd`, first pointing `bootargs` at the expanded append string.
fn label_localboot<P: Platform>(ctx: &mut PxeContext<P>, label: &Label) -> Result<(), PxeError> {
    let localcmd = ctx.env().require("localcmd")?.to_string();
    if let Some(append) = &label.append {
        let bootargs = process_macros(append, ctx.env(), SYS_CBSIZE);
        ctx.platform.env_mut().set("bootargs", &bootargs);
    }
    debug!("running: {}", localcmd);
    ctx.platform.run_command_list(&localcmd)?;
    Ok(())
}

/// The ` ip=...` fragment. Unset variables print as `<NULL>`.
fn ip_fragment(env: &Environment) -> String {
    let var = |name| env.get(name).unwrap_or("<NULL>");
    format!(
        " ip={}:{}:{}:{}",
        var("ipaddr"),
        var("serverip"),
        var("gatewayip"),
        var("netmask")
    )
}

/// Build, expand and store `bootargs` for `label`.
///
/// Returns the final command line, or `None` when the label neither appends
/// anything nor asks for network arguments.
pub fn label_bootargs(env: &mut Environment, label: &Label) -> Result<Option<String>, PxeError> {
    let ip = if label.ipappend.contains(IpAppend::IP) {
        ip_fragment(env)
    } else {
        String::new()
    };
    let mut mac = String::new();
    if label.ipappend.contains(IpAppend::BOOTIF) {
        match format_mac_pxe(env) {
            Ok(text) => mac = format!(" BOOTIF={}", text),
            Err(err) => debug!("no BOOTIF: {}", err),
        }
    }

    if !label.ipappend.intersects(IpAppend::IP | IpAppend::BOOTIF) && label.append.is_none() {
        return Ok(None);
    }
    let append = label.append.as_deref().unwrap_or("");
    let len = append.len() + ip.len() + mac.len() + 1;
    if len > SYS_CBSIZE {
        warn!(
            "bootarg overflow {}+{}+{}+1 > {}",
            append.len(),
            ip.len(),
            mac.len(),
            SYS_CBSIZE
        );
        return Err(PxeError::BootargsOverflow {
            len,
            limit: SYS_CBSIZE,
        });
    }

    let bootargs = format!("{}{}{}", append, ip, mac);
    let bootargs = process_macros(&bootargs, env, SYS_CBSIZE);
    env.set("bootargs", &bootargs);
    info!("append: {}", bootargs);
    Ok(Some(bootargs))
}

/// Device tree file to load for `label`, if any.
///
/// An explicit `fdt` wins. Otherwise `fdtdir` is combined with `fdtfile`, or
/// with `<soc>-<board>.dtb` built from whichever of the two are set.
pub fn fdt_path(env: &Environment, label: &Label) -> Option<String> {
    if let Some(fdt) = &label.fdt {
        return Some(fdt.clone());
    }
    let fdtdir = label.fdtdir.as_deref()?;
    let file = match env.get("fdtfile") {
        Some(fdtfile) => fdtfile.to_string(),
        None => {
            let soc = env.get("soc");
            let board = env.get("board");
            let sep = if soc.is_some() && board.is_some() { "-" } else { "" };
            format!("{}{}{}.dtb", soc.unwrap_or(""), sep, board.unwrap_or(""))
        }
    };
    let slash = if fdtdir.is_empty() {
        "./"
    } else if fdtdir.ends_with('/') {
        ""
    } else {
        "/"
    };
    Some(format!("{}{}{}", fdtdir, slash, file))
}

/// Put a KASLR seed into the tree at `fdt_addr`.
fn label_boot_kaslrseed<P: Platform>(ctx: &mut PxeContext<P>, fdt_addr: usize) {
    if !ctx.platform.fdt_check_header(fdt_addr) {
        return;
    }
    if let Err(err) = ctx.platform.fdt_set_kaslr_seed(fdt_addr) {
        warn!("Unable to set kaslr-seed on chosen node: {}", err);
    }
}

/// Apply the space separated `overlays` to the tree at `fdt_addr`, in order.
fn label_boot_fdtoverlay<P: Platform>(ctx: &mut PxeContext<P>, fdt_addr: usize, overlays: &str) {
    if !ctx.platform.fdt_check_header(fdt_addr) {
        return;
    }
    let Ok(overlay_addr) = ctx.env().require_hex("fdtoverlay_addr_r") else {
        warn!("Invalid fdtoverlay_addr_r for loading overlays");
        return;
    };

    for file in overlays.split(' ').filter(|x| !x.is_empty()) {
        if ctx.get_relfile(file, overlay_addr).is_err() {
            warn!("Failed loading overlay {}", file);
            continue;
        }
        if !ctx.platform.fdt_check_header(overlay_addr) {
            warn!("Invalid overlay {}, skipping", file);
            continue;
        }
        if ctx.platform.fdt_apply_overlay(fdt_addr, overlay_addr).is_err() {
            warn!("Failed to apply overlay {}, skipping", file);
        }
    }
}

/// Load the label's device tree and fix it up.
///
/// Returns the `fdt_addr_r` string when a tree was loaded. Only a failing
/// explicit `fdt` is an error; a guessed `fdtdir` file may be missing.
fn label_fdt<P: Platform>(
    ctx: &mut PxeContext<P>,
    label: &Label,
) -> Result<Option<String>, PxeError> {
    let Some(fdt_addr_r) = ctx.env().get("fdt_addr_r").map(String::from) else {
        return Ok(None);
    };
    let Some(path) = fdt_path(ctx.env(), label) else {
        return Ok(None);
    };
    if let Err(err) = ctx.get_relfile_envaddr(&path, "fdt_addr_r") {
        if label.fdt.is_some() {
            return Err(PxeError::Retrieve {
                label: label.name.clone(),
                what: "FDT",
                source: Box::new(err),
            });
        }
        debug!("no fdt from fdtdir: {}", err);
        return Ok(None);
    }

    let fdt_addr = hextoul(&fdt_addr_r) as usize;
    if label.kaslrseed {
        label_boot_kaslrseed(ctx, fdt_addr);
    }
    if let Some(overlays) = &label.fdtoverlays {
        label_boot_fdtoverlay(ctx, fdt_addr, overlays);
    }
    Ok(Some(fdt_addr_r))
}

/// Run the first boot command that fits the kernel image.
fn boot_kernel<P: Platform>(ctx: &mut PxeContext<P>, args: &BootArgs) -> Result<(), PxeError> {
    let addr = kernel_load_addr(&args.kernel, ctx.platform.image_load_addr());
    let cmd = if ctx.platform.image_format(addr) != ImageFormat::Invalid {
        BootCommand::Bootm
    } else {
        [BootCommand::Booti, BootCommand::Bootz, BootCommand::Zboot]
            .into_iter()
            .find(|x| ctx.platform.supports(*x))
            .ok_or(PxeError::NoBootHandler)?
    };

    let mut argv = match cmd {
        BootCommand::Zboot => args.zboot_argv(),
        _ => args.bootm_argv(),
    };
    argv[0] = cmd.name().to_string();
    debug!("{}", argv.join(" "));
    let argv: Vec<&str> = argv.iter().map(|x| x.as_str()).collect();
    ctx.platform.boot(cmd, &argv)?;
    Ok(())
}

/// Load and boot the kernel of `label`. `Ok` means the kernel took over.
fn label_boot_kernel<P: Platform>(ctx: &mut PxeContext<P>, label: &Label) -> Result<(), PxeError> {
    let retrieve_err = |what, err| PxeError::Retrieve {
        label: label.name.clone(),
        what,
        source: Box::new(err),
    };
    let Some(kernel) = &label.kernel else {
        return Err(PxeError::NoKernel {
            label: label.name.clone(),
        });
    };

    let mut initrd = None;
    if let Some(path) = &label.initrd {
        let size = ctx
            .get_relfile_envaddr(path, "ramdisk_addr_r")
            .map_err(|err| retrieve_err("initrd", err))?;
        let addr = ctx.env().require("ramdisk_addr_r")?.to_string();
        initrd = Some((addr, format!("{:x}", size)));
    }

    ctx.get_relfile_envaddr(kernel, "kernel_addr_r")
        .map_err(|err| retrieve_err("kernel", err))?;

    label_bootargs(ctx.platform.env_mut(), label)?;

    let mut kernel_addr = ctx.env().require("kernel_addr_r")?.to_string();
    if let Some(config) = &label.config {
        kernel_addr.push_str(config);
    }

    let mut fdt = label_fdt(ctx, label)?;
    if fdt.is_none() {
        fdt = ["fdt_addr", "fdtcontroladdr"]
            .into_iter()
            .find_map(|x| ctx.env().get(x))
            .map(String::from);
    }

    let args = BootArgs {
        kernel: kernel_addr,
        initrd,
        fdt,
    };
    boot_kernel(ctx, &args)
}

/// Boot `label`.
///
/// The label is marked attempted whatever happens. A `localboot` label runs
/// `localcmd` (unless its value is negative) and reports
/// [BootOutcome::Localboot].
pub fn label_boot<P: Platform>(ctx: &mut PxeContext<P>, label: &mut Label) -> BootOutcome {
    info!("{}", label.menu_line());
    label.attempted = true;

    if label.localboot {
        if label.localboot_val >= 0
            && let Err(err) = label_localboot(ctx, label)
        {
            warn!("localboot {}: {}", label.name, err);
        }
        return BootOutcome::Localboot;
    }

    match label_boot_kernel(ctx, label) {
        Ok(()) => BootOutcome::Booted,
        Err(err) => {
            warn!("{}", err);
            BootOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::CommandError,
        testing::{FDT_MAGIC, LEGACY_MAGIC, MockPlatform},
    };

    fn context(platform: MockPlatform) -> PxeContext<MockPlatform> {
        PxeContext::new(platform, false, None).unwrap()
    }

    fn kernel_label(name: &str) -> Label {
        let mut label = Label::new(name.into());
        label.kernel = Some("Image".into());
        label
    }

    fn booted(ctx: &PxeContext<MockPlatform>) -> Vec<(BootCommand, Vec<String>)> {
        ctx.platform.boots.clone()
    }

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn kernel_only_uses_booti() {
        let mut platform = MockPlatform::with_addresses();
        platform.add_file("Image", b"ARM64 kernel");
        let mut ctx = context(platform);
        let mut label = kernel_label("linux");
        assert_eq!(label_boot(&mut ctx, &mut label), BootOutcome::Booted);
        assert!(label.attempted);
        assert_eq!(
            booted(&ctx),
            vec![(BootCommand::Booti, argv(&["booti", "0x40000000"]))]
        );
        assert_eq!(ctx.env().get("bootargs"), None);
    }

    #[test]
    fn legacy_image_with_initrd_and_fdt_uses_bootm() {
        let mut platform = MockPlatform::with_addresses();
        platform.add_file("Image", &LEGACY_MAGIC);
        platform.add_file("initrd", &[0u8; 0x1234]);
        platform.add_file("board.dtb", &FDT_MAGIC);
        let mut ctx = context(platform);
        let mut label = kernel_label("linux");
        label.initrd = Some("initrd".into());
        label.fdt = Some("board.dtb".into());
        label.append = Some("console=ttyS0".into());

        assert_eq!(label_boot(&mut ctx, &mut label), BootOutcome::Booted);
        assert_eq!(
            booted(&ctx),
            vec![(
                BootCommand::Bootm,
                argv(&["bootm", "0x40000000", "0x48000000:1234", "0x44000000"])
            )]
        );
        assert_eq!(ctx.env().get("bootargs"), Some("console=ttyS0"));
    }

    #[test]
    fn fit_config_suffix_goes_on_the_kernel_address() {
        let mut platform = MockPlatform::with_addresses();
        platform.add_file("image.fit", &FDT_MAGIC);
        let mut ctx = context(platform);
        let mut label = Label::new("fit".into());
        label.set_kernel("image.fit#conf-2".into());
        assert_eq!(label_boot(&mut ctx, &mut label), BootOutcome::Booted);
        assert_eq!(
            booted(&ctx),
            vec![(BootCommand::Bootm, argv(&["bootm", "0x40000000#conf-2"]))]
        );
    }

    #[test]
    fn zboot_takes_address_and_size_separately() {
        let mut platform = MockPlatform::with_addresses();
        platform.supported = vec![BootCommand::Zboot];
        platform.add_file("Image", b"bzImage");
        platform.add_file("initrd", &[0u8; 16]);
        let mut ctx = context(platform);
        let mut label = kernel_label("x86");
        label.initrd = Some("initrd".into());
        assert_eq!(label_boot(&mut ctx, &mut label), BootOutcome::Booted);
        assert_eq!(
            booted(&ctx),
            vec![(
                BootCommand::Zboot,
                argv(&["zboot", "0x40000000", "0", "0x48000000", "10"])
            )]
        );
    }

    #[test]
    fn no_boot_command_fails() {
        let mut platform = MockPlatform::with_addresses();
        platform.supported = vec![];
        platform.add_file("Image", b"raw");
        let mut ctx = context(platform);
        assert_eq!(label_boot(&mut ctx, &mut kernel_label("x")), BootOutcome::Failed);
        assert!(booted(&ctx).is_empty());
    }

    #[test]
    fn failing_boot_command_fails_the_label() {
        let mut platform = MockPlatform::with_addresses();
        platform.add_file("Image", b"raw");
        platform.boot_result = Err(CommandError::Failed { code: 1 });
        let mut ctx = context(platform);
        assert_eq!(label_boot(&mut ctx, &mut kernel_label("x")), BootOutcome::Failed);
        assert_eq!(booted(&ctx).len(), 1);
    }

    #[test]
    fn missing_kernel_fails_without_loading() {
        let mut ctx = context(MockPlatform::with_addresses());
        let mut label = Label::new("empty".into());
        assert_eq!(label_boot(&mut ctx, &mut label), BootOutcome::Failed);
        assert!(label.attempted);
        assert!(ctx.platform.loads().is_empty());
    }

    #[test]
    fn missing_initrd_fails_before_the_kernel() {
        let mut platform = MockPlatform::with_addresses();
        platform.add_file("Image", b"kernel");
        let mut ctx = context(platform);
        let mut label = kernel_label("x");
        label.initrd = Some("gone".into());
        assert_eq!(label_boot(&mut ctx, &mut label), BootOutcome::Failed);
        assert!(ctx.platform.loads().is_empty());
    }

    #[test]
    fn localboot_runs_localcmd() {
        let mut platform = MockPlatform::new();
        platform.env.set("localcmd", "run distro_bootcmd");
        platform.env.set("root", "/dev/mmcblk0p2");
        let mut ctx = context(platform);
        let mut label = Label::new("local".into());
        label.localboot = true;
        label.append = Some("root=${root}".into());
        assert_eq!(label_boot(&mut ctx, &mut label), BootOutcome::Localboot);
        assert_eq!(ctx.platform.commands, vec!["run distro_bootcmd".to_string()]);
        assert_eq!(ctx.env().get("bootargs"), Some("root=/dev/mmcblk0p2"));
    }

    #[test]
    fn negative_localboot_does_nothing() {
        let mut platform = MockPlatform::new();
        platform.env.set("localcmd", "run distro_bootcmd");
        let mut ctx = context(platform);
        let mut label = Label::new("local".into());
        label.localboot = true;
        label.localboot_val = -1;
        assert_eq!(label_boot(&mut ctx, &mut label), BootOutcome::Localboot);
        assert!(ctx.platform.commands.is_empty());
    }

    #[test]
    fn localboot_without_localcmd_still_reports_localboot() {
        let mut ctx = context(MockPlatform::new());
        let mut label = Label::new("local".into());
        label.localboot = true;
        assert_eq!(label_boot(&mut ctx, &mut label), BootOutcome::Localboot);
        assert!(ctx.platform.commands.is_empty());
    }

    #[test]
    fn ipappend_without_append() {
        let mut env: Environment = [
            ("ipaddr", "10.0.0.5"),
            ("serverip", "10.0.0.1"),
            ("gatewayip", "10.0.0.254"),
            ("netmask", "255.255.255.0"),
            ("ethaddr", "02:00:00:00:00:01"),
        ]
        .into_iter()
        .collect();
        let mut label = kernel_label("net");
        label.ipappend = IpAppend::from_bits_truncate(3);
        let bootargs = label_bootargs(&mut env, &label).unwrap();
        assert_eq!(
            bootargs.as_deref(),
            Some(" ip=10.0.0.5:10.0.0.1:10.0.0.254:255.255.255.0 BOOTIF=01-02-00-00-00-00-01")
        );
        assert_eq!(env.get("bootargs"), bootargs.as_deref());

        label.ipappend = IpAppend::BOOTIF;
        assert_eq!(
            label_bootargs(&mut env, &label).unwrap().as_deref(),
            Some(" BOOTIF=01-02-00-00-00-00-01")
        );

        label.ipappend = IpAppend::IP;
        env.remove("gatewayip");
        assert_eq!(
            label_bootargs(&mut env, &label).unwrap().as_deref(),
            Some(" ip=10.0.0.5:10.0.0.1:<NULL>:255.255.255.0")
        );
    }

    #[test]
    fn bootif_is_dropped_without_a_mac() {
        let mut env = Environment::new();
        let mut label = kernel_label("net");
        label.append = Some("quiet".into());
        label.ipappend = IpAppend::BOOTIF;
        assert_eq!(label_bootargs(&mut env, &label).unwrap().as_deref(), Some("quiet"));
    }

    #[test]
    fn nothing_to_append_leaves_bootargs_alone() {
        let mut env: Environment = [("bootargs", "old")].into_iter().collect();
        assert_eq!(label_bootargs(&mut env, &kernel_label("x")), Ok(None));
        assert_eq!(env.get("bootargs"), Some("old"));
    }

    #[test]
    fn overlong_bootargs_fail_the_label() {
        let mut platform = MockPlatform::with_addresses();
        platform.add_file("Image", b"kernel");
        let mut ctx = context(platform);
        let mut label = kernel_label("long");
        label.append = Some("x".repeat(SYS_CBSIZE));
        assert!(matches!(
            label_bootargs(ctx.platform.env_mut(), &label),
            Err(PxeError::BootargsOverflow { .. })
        ));
        assert_eq!(label_boot(&mut ctx, &mut label), BootOutcome::Failed);
        assert!(booted(&ctx).is_empty());

        label.append = Some("x".repeat(SYS_CBSIZE - 1));
        assert!(label_bootargs(ctx.platform.env_mut(), &label).is_ok());
    }

    #[test]
    fn fdt_paths() {
        let mut env = Environment::new();
        let mut label = Label::new("x".into());
        assert_eq!(fdt_path(&env, &label), None);

        label.fdtdir = Some("/dtbs".into());
        env.set("soc", "rk3399");
        env.set("board", "rockpro64");
        assert_eq!(fdt_path(&env, &label).as_deref(), Some("/dtbs/rk3399-rockpro64.dtb"));

        env.remove("soc");
        assert_eq!(fdt_path(&env, &label).as_deref(), Some("/dtbs/rockpro64.dtb"));

        label.fdtdir = Some("".into());
        env.set("fdtfile", "rockchip/rk3399-rockpro64.dtb");
        assert_eq!(fdt_path(&env, &label).as_deref(), Some("./rockchip/rk3399-rockpro64.dtb"));

        label.fdtdir = Some("/dtbs/".into());
        assert_eq!(fdt_path(&env, &label).as_deref(), Some("/dtbs/rockchip/rk3399-rockpro64.dtb"));

        label.fdt = Some("explicit.dtb".into());
        assert_eq!(fdt_path(&env, &label).as_deref(), Some("explicit.dtb"));
    }

    #[test]
    fn missing_explicit_fdt_fails() {
        let mut platform = MockPlatform::with_addresses();
        platform.add_file("Image", b"kernel");
        let mut ctx = context(platform);
        let mut label = kernel_label("x");
        label.fdt = Some("gone.dtb".into());
        assert_eq!(label_boot(&mut ctx, &mut label), BootOutcome::Failed);
        assert!(booted(&ctx).is_empty());
    }

    #[test]
    fn missing_fdtdir_guess_falls_back_to_fdt_addr() {
        let mut platform = MockPlatform::with_addresses();
        platform.add_file("Image", b"kernel");
        platform.env.set("fdt_addr", "0x43000000");
        let mut ctx = context(platform);
        let mut label = kernel_label("x");
        label.fdtdir = Some("dtbs".into());
        assert_eq!(label_boot(&mut ctx, &mut label), BootOutcome::Booted);
        assert_eq!(
            booted(&ctx)[0].1,
            argv(&["booti", "0x40000000", "-", "0x43000000"])
        );
    }

    #[test]
    fn control_fdt_is_the_last_resort() {
        let mut platform = MockPlatform::with_addresses();
        platform.env.remove("fdt_addr_r");
        platform.env.set("fdtcontroladdr", "0x7ff00000");
        platform.add_file("Image", b"kernel");
        let mut ctx = context(platform);
        assert_eq!(label_boot(&mut ctx, &mut kernel_label("x")), BootOutcome::Booted);
        assert_eq!(
            booted(&ctx)[0].1,
            argv(&["booti", "0x40000000", "-", "0x7ff00000"])
        );
    }

    #[test]
    fn overlays_and_kaslr_seed() {
        let mut platform = MockPlatform::with_addresses();
        platform.add_file("Image", b"kernel");
        platform.add_file("board.dtb", &FDT_MAGIC);
        platform.add_file("a.dtbo", &FDT_MAGIC);
        platform.add_file("bad.dtbo", b"nope");
        platform.add_file("b.dtbo", &FDT_MAGIC);
        let mut ctx = context(platform);
        let mut label = kernel_label("x");
        label.fdt = Some("board.dtb".into());
        label.fdtoverlays = Some("a.dtbo  missing.dtbo bad.dtbo b.dtbo".into());
        label.kaslrseed = true;

        assert_eq!(label_boot(&mut ctx, &mut label), BootOutcome::Booted);
        assert_eq!(ctx.platform.kaslr_seeds, vec![0x4400_0000]);
        assert_eq!(
            ctx.platform.overlays,
            vec![(0x4400_0000, 0x4500_0000), (0x4400_0000, 0x4500_0000)]
        );
    }

    #[test]
    fn overlays_need_an_address() {
        let mut platform = MockPlatform::with_addresses();
        platform.env.remove("fdtoverlay_addr_r");
        platform.add_file("Image", b"kernel");
        platform.add_file("board.dtb", &FDT_MAGIC);
        platform.add_file("a.dtbo", &FDT_MAGIC);
        let mut ctx = context(platform);
        let mut label = kernel_label("x");
        label.fdt = Some("board.dtb".into());
        label.fdtoverlays = Some("a.dtbo".into());
        assert_eq!(label_boot(&mut ctx, &mut label), BootOutcome::Booted);
        assert!(ctx.platform.overlays.is_empty());
    }

    #[test]
    fn kernel_addresses() {
        assert_eq!(kernel_load_addr("0x40000000", 0x1000), 0x4000_0000);
        assert_eq!(kernel_load_addr("40000000#conf-1", 0x1000), 0x4000_0000);
        assert_eq!(kernel_load_addr("0x40000000:kernel-1", 0x1000), 0x4000_0000);
        assert_eq!(kernel_load_addr("#conf-1", 0x1000), 0x1000);
    }
}
