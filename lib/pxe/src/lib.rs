//! Interpreter for pxelinux-style boot menus.
//!
//! A config file is fetched into the load area ([discover]), parsed into a
//! [PxeMenu] ([parser]), shown as a [select::SelectMenu] and the chosen
//! label is booted ([boot]). Everything outside this crate (file transfer,
//! memory, device trees, the boot commands) is reached through
//! [platform::Platform].
#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod boot;
pub mod context;
pub mod discover;
pub mod env;
pub mod error;
pub mod label;
pub mod lexer;
pub mod menu;
pub mod parser;
pub mod platform;
pub mod select;

#[cfg(test)]
mod testing;

pub use boot::{BootOutcome, label_boot};
pub use context::PxeContext;
pub use discover::pxe_get;
pub use env::Environment;
pub use error::PxeError;
pub use label::Label;
pub use menu::{PxeMenu, handle_pxe_menu};
pub use parser::parse_pxefile;
pub use platform::Platform;
pub use select::{MenuInput, ReadLine};

use log::error;

/// Parse the config file at `addr` and run its menu.
///
/// `prompt` forces the menu to be shown even when the file does not ask for
/// it.
pub fn pxe_process<P: Platform>(
    ctx: &mut PxeContext<P>,
    addr: usize,
    prompt: bool,
    input: &mut dyn MenuInput,
) -> Result<BootOutcome, PxeError> {
    let mut cfg = parse_pxefile(ctx, addr).inspect_err(|_| error!("Error parsing config file"))?;
    if prompt {
        cfg.prompt = true;
    }
    Ok(handle_pxe_menu(ctx, &mut cfg, input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        platform::BootCommand,
        select::tests::ScriptedInput,
        testing::{FDT_MAGIC, MockPlatform},
    };
    use alloc::{string::String, vec};

    fn context() -> PxeContext<MockPlatform> {
        let mut platform = MockPlatform::with_addresses();
        platform.env.set("ethaddr", "52:54:00:12:34:56");
        platform.env.set("ipaddr", "192.168.1.20");
        platform.env.set("serverip", "192.168.1.1");
        platform.env.set("gatewayip", "192.168.1.1");
        platform.env.set("netmask", "255.255.255.0");
        platform.add_file("tftp/Image", b"kernel");
        platform.add_file("tftp/initrd.img", &[0u8; 0x100]);
        platform.add_file("tftp/dtbs/board.dtb", &FDT_MAGIC);
        PxeContext::new(platform, false, Some("tftp/pxelinux.0")).unwrap()
    }

    #[test]
    fn discover_parse_and_boot() {
        let mut ctx = context();
        ctx.platform.env.set("fdtfile", "board.dtb");
        ctx.platform.add_file(
            "tftp/pxelinux.cfg/01-52-54-00-12-34-56",
            concat!(
                "default rescue\n",
                "label linux\n",
                "  kernel Image\n",
                "  initrd initrd.img\n",
                "  fdtdir dtbs\n",
                "  append console=ttyS0 root=/dev/nfs\n",
                "  ipappend 1\n",
                "label rescue\n",
                "  kernel missing\n",
            )
            .as_bytes(),
        );
        let found = pxe_get(&mut ctx).unwrap();
        let mut input = ScriptedInput::new(vec![]);
        let outcome = pxe_process(&mut ctx, found.addr, false, &mut input).unwrap();

        assert_eq!(outcome, BootOutcome::Booted);
        assert!(input.shown.is_empty());
        assert_eq!(
            ctx.platform.boots,
            vec![(
                BootCommand::Booti,
                vec![
                    String::from("booti"),
                    String::from("0x40000000"),
                    String::from("0x48000000:100"),
                    String::from("0x44000000"),
                ]
            )]
        );
        assert_eq!(
            ctx.env().get("bootargs"),
            Some(concat!(
                "console=ttyS0 root=/dev/nfs ",
                "ip=192.168.1.20:192.168.1.1:192.168.1.1:255.255.255.0"
            ))
        );
    }

    #[test]
    fn forced_prompt_shows_the_menu() {
        let mut ctx = context();
        let text = "menu title Pick one\nlabel a\nkernel Image\n";
        ctx.platform.poke(0x5000_0000, text.as_bytes());
        ctx.platform.poke(0x5000_0000 + text.len(), &[0]);
        let mut input = ScriptedInput::new(vec![ReadLine::Line("1".into())]);
        let outcome = pxe_process(&mut ctx, 0x5000_0000, true, &mut input).unwrap();
        assert_eq!(outcome, BootOutcome::Booted);
        assert_eq!(input.shown.len(), 1);
    }

    #[test]
    fn parse_errors_are_reported() {
        let mut ctx = context();
        let text = "label\n";
        ctx.platform.poke(0x5000_0000, text.as_bytes());
        ctx.platform.poke(0x5000_0000 + text.len(), &[0]);
        let mut input = ScriptedInput::new(vec![]);
        assert!(matches!(
            pxe_process(&mut ctx, 0x5000_0000, false, &mut input),
            Err(PxeError::ExpectedLiteral { .. })
        ));
        assert!(ctx.platform.boots.is_empty());
    }
}
