//! Recursive parser for pxelinux-style config files.
//!
//! The grammar is line oriented and has three contexts: the file itself, a
//! `menu` line and a `label` block. A label block has no end marker; it ends
//! at the first line the label parser does not understand, which is pushed
//! back for the enclosing context to handle.

use crate::{
    context::PxeContext,
    error::PxeError,
    label::{IpAppend, Label},
    lexer::{LexState, Lexer, TokenKind},
    menu::PxeMenu,
    platform::Platform,
};
use alloc::string::String;
use config::MAX_NEST_LEVEL;
use log::{debug, error, warn};
use utils::{num::AlignableTo, strtol::simple_strtol};

/// Parse a string literal running to the end of the line.
fn parse_sliteral(lexer: &mut Lexer) -> Result<String, PxeError> {
    let start = lexer.position();
    let token = lexer.next_token(LexState::StringLiteral);
    if token.kind != TokenKind::String {
        let snippet = lexer.snippet_since(start);
        warn!("Expected string literal: {}", snippet);
        return Err(PxeError::ExpectedLiteral { snippet });
    }
    Ok(token.value)
}

/// Parse a base-10 integer; trailing text on the line is ignored.
fn parse_integer(lexer: &mut Lexer) -> Result<i64, PxeError> {
    let start = lexer.position();
    let token = lexer.next_token(LexState::StringLiteral);
    if token.kind != TokenKind::String {
        let snippet = lexer.snippet_since(start);
        warn!("Expected string: {}", snippet);
        return Err(PxeError::ExpectedLiteral { snippet });
    }
    Ok(simple_strtol(&token.value, 10))
}

/// Parser state shared by one file and everything it includes.
pub struct Parser<'a, P: Platform> {
    ctx: &'a mut PxeContext<P>,
    cfg: &'a mut PxeMenu,
}

impl<'a, P: Platform> Parser<'a, P> {
    pub fn new(ctx: &'a mut PxeContext<P>, cfg: &'a mut PxeMenu) -> Parser<'a, P> {
        Parser { ctx, cfg }
    }

    /// Parse the `include` path, load that file to `base` and parse it at
    /// `nest_level`.
    fn handle_include(
        &mut self,
        lexer: &mut Lexer,
        base: usize,
        nest_level: usize,
    ) -> Result<(), PxeError> {
        let start = lexer.position();
        let include_path = parse_sliteral(lexer).inspect_err(|_| {
            warn!("Expected include path: {}", lexer.snippet_since(start));
        })?;
        if let Err(err) = self.ctx.get_pxe_file(&include_path, base) {
            error!("Couldn't retrieve {}", include_path);
            return Err(err);
        }
        let text = self.ctx.read_text(base)?;
        self.parse_top(&text, base, nest_level)
    }

    /// Handle the rest of a top-level `menu` line.
    fn parse_menu(
        &mut self,
        lexer: &mut Lexer,
        base: usize,
        nest_level: usize,
    ) -> Result<(), PxeError> {
        let start = lexer.position();
        let token = lexer.next_token(LexState::Keyword);
        match token.kind {
            TokenKind::Title => self.cfg.title = Some(parse_sliteral(lexer)?),
            TokenKind::Include => self.handle_include(lexer, base, nest_level + 1)?,
            TokenKind::Background => self.cfg.bmp = Some(parse_sliteral(lexer)?),
            _ => warn!(
                "Ignoring malformed menu command: {}",
                lexer.snippet_since(start)
            ),
        }
        lexer.skip_line();
        Ok(())
    }

    /// Handle a `menu` line inside the label block of the last label.
    fn parse_label_menu(&mut self, lexer: &mut Lexer) {
        let start = lexer.position();
        let token = lexer.next_token(LexState::Keyword);
        let Some(label) = self.cfg.labels.last_mut() else {
            return;
        };
        match token.kind {
            TokenKind::Default => {
                if self.cfg.default_label.is_none() {
                    self.cfg.default_label = Some(label.name.clone());
                }
            }
            TokenKind::Label => {
                // A bare `menu label` leaves the display name alone.
                if let Ok(text) = parse_sliteral(lexer) {
                    label.menu = Some(text);
                }
            }
            _ => warn!(
                "Ignoring malformed menu command: {}",
                lexer.snippet_since(start)
            ),
        }
        lexer.skip_line();
    }

    /// Parse a label block and append it to the menu.
    ///
    /// The label is added as soon as its name is known, so a failure later in
    /// the block still leaves it in the list.
    fn parse_label(&mut self, lexer: &mut Lexer) -> Result<(), PxeError> {
        let start = lexer.position();
        let name = parse_sliteral(lexer).inspect_err(|_| {
            warn!("Expected label name: {}", lexer.snippet_since(start));
        })?;
        debug!("label '{}'", name);
        self.cfg.labels.push(Label::new(name));

        loop {
            let token_start = lexer.position();
            let token = lexer.next_token(LexState::Keyword);
            if token.kind == TokenKind::Menu {
                self.parse_label_menu(lexer);
                continue;
            }
            let Some(label) = self.cfg.labels.last_mut() else {
                return Ok(());
            };
            match token.kind {
                TokenKind::Kernel | TokenKind::Linux => {
                    label.set_kernel(parse_sliteral(lexer)?);
                }
                TokenKind::Append => {
                    label.append = Some(parse_sliteral(lexer)?);
                    label.initrd_from_append();
                }
                TokenKind::Initrd => {
                    let path = parse_sliteral(lexer)?;
                    label.initrd.get_or_insert(path);
                }
                TokenKind::Fdt => {
                    let path = parse_sliteral(lexer)?;
                    label.fdt.get_or_insert(path);
                }
                TokenKind::FdtDir => {
                    let path = parse_sliteral(lexer)?;
                    label.fdtdir.get_or_insert(path);
                }
                TokenKind::FdtOverlays => {
                    let path = parse_sliteral(lexer)?;
                    label.fdtoverlays.get_or_insert(path);
                }
                TokenKind::Localboot => {
                    label.localboot = true;
                    label.localboot_val = parse_integer(lexer)?;
                }
                TokenKind::IpAppend => {
                    label.ipappend = IpAppend::from_bits_truncate(parse_integer(lexer)? as u32);
                }
                TokenKind::KaslrSeed => label.kaslrseed = true,
                TokenKind::Eol => {}
                _ => {
                    // Not ours: the label ends here and the enclosing
                    // context gets the token back.
                    lexer.rewind(token_start);
                    return Ok(());
                }
            }
        }
    }

    /// Parse one file. `base` is where the file sits in the load area and
    /// `nest_level` is 1 for the top-level file.
    pub fn parse_top(
        &mut self,
        text: &[u8],
        base: usize,
        nest_level: usize,
    ) -> Result<(), PxeError> {
        if nest_level > MAX_NEST_LEVEL {
            error!("Maximum nesting ({}) exceeded", MAX_NEST_LEVEL);
            return Err(PxeError::NestingTooDeep {
                limit: MAX_NEST_LEVEL,
            });
        }
        let text_len = text.iter().position(|x| *x == 0).unwrap_or(text.len());
        let mut lexer = Lexer::new(text);

        loop {
            let start = lexer.position();
            let token = lexer.next_token(LexState::Keyword);
            match token.kind {
                TokenKind::Menu => {
                    self.cfg.prompt = true;
                    // Leave room for the terminator of this file.
                    let next_base = base + (text_len + 1).align_up(4);
                    self.parse_menu(&mut lexer, next_base, nest_level)?;
                }
                TokenKind::Timeout => self.cfg.timeout = parse_integer(&mut lexer)?,
                TokenKind::Label => self.parse_label(&mut lexer)?,
                TokenKind::Default | TokenKind::OnTimeout => {
                    self.cfg.default_label = Some(parse_sliteral(&mut lexer)?);
                }
                TokenKind::Include => {
                    let next_base = base + text_len.align_up(4);
                    self.handle_include(&mut lexer, next_base, nest_level + 1)?;
                }
                TokenKind::Prompt => lexer.skip_line(),
                TokenKind::Eol => {}
                TokenKind::Eof => return Ok(()),
                _ => {
                    warn!("Ignoring unknown command: {}", lexer.snippet_since(start));
                    lexer.skip_line();
                }
            }
        }
    }
}

/// Parse the config file at `addr` into `cfg`.
///
/// On failure `cfg` keeps every label that was completely parsed before the
/// error, plus the one being parsed when it happened.
pub fn parse_pxefile_into<P: Platform>(
    ctx: &mut PxeContext<P>,
    addr: usize,
    cfg: &mut PxeMenu,
) -> Result<(), PxeError> {
    let text = ctx.read_text(addr)?;
    Parser::new(ctx, cfg).parse_top(&text, addr, 1)
}

/// Parse the config file at `addr`. Any error discards the whole menu.
pub fn parse_pxefile<P: Platform>(
    ctx: &mut PxeContext<P>,
    addr: usize,
) -> Result<PxeMenu, PxeError> {
    let mut cfg = PxeMenu::default();
    parse_pxefile_into(ctx, addr, &mut cfg)?;
    Ok(cfg)
}
