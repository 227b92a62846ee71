//! The parsed config as a boot menu.

use crate::{
    boot::{BootOutcome, label_boot},
    context::PxeContext,
    env::Environment,
    error::MenuError,
    label::Label,
    platform::Platform,
    select::{MenuInput, SelectMenu},
};
use alloc::{
    string::{String, ToString},
    vec::Vec,
};
use log::{debug, info, warn};

/// Everything a config file (and its includes) describes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PxeMenu {
    pub title: Option<String>,
    /// Background image shown behind the menu.
    pub bmp: Option<String>,
    pub prompt: bool,
    /// In tenths of a second, as written in the file.
    pub timeout: i64,
    pub default_label: Option<String>,
    /// Labels in file order.
    pub labels: Vec<Label>,
}

impl PxeMenu {
    /// Index of the first label called `name`.
    pub fn find_label(&self, name: &str) -> Option<usize> {
        self.labels.iter().position(|x| x.name == name)
    }

    /// Menu timeout in whole seconds, rounded up.
    pub fn timeout_secs(&self) -> u32 {
        if self.timeout <= 0 {
            return 0;
        }
        (self.timeout.saturating_add(9) / 10).min(u32::MAX as i64) as u32
    }

    /// Number the labels from 1 and build the selectable menu.
    ///
    /// Item data is the label's index in [Self::labels]. The default comes
    /// from `pxe_label_override` in `env` if that names a label, otherwise
    /// from the file.
    pub fn to_select_menu(&mut self, env: &Environment) -> SelectMenu<usize> {
        let mut menu = SelectMenu::new(self.title.as_deref(), self.timeout_secs(), self.prompt);
        let mut default_num = None;
        for (idx, label) in self.labels.iter_mut().enumerate() {
            label.num = (idx + 1).to_string();
            menu.item_add(&label.num, label.menu_line(), idx);
            if default_num.is_none() && self.default_label.as_deref() == Some(label.name.as_str()) {
                default_num = Some(label.num.clone());
            }
        }

        if let Some(name) = env.get("pxe_label_override") {
            match self.find_label(name) {
                Some(idx) => default_num = Some(self.labels[idx].num.clone()),
                None => warn!("Missing override pxe label: {}", name),
            }
        }

        match default_num {
            Some(num) => {
                if menu.default_set(&num).is_err() {
                    warn!("Missing default: {}", num);
                }
            }
            None => {
                if let Some(name) = &self.default_label {
                    warn!("Missing default: {}", name);
                }
            }
        }
        menu
    }
}

/// Try every label not attempted yet, in file order, until one boots.
pub fn boot_unattempted_labels<P: Platform>(
    ctx: &mut PxeContext<P>,
    cfg: &mut PxeMenu,
) -> BootOutcome {
    for label in cfg.labels.iter_mut().filter(|x| !x.attempted) {
        if label_boot(ctx, label) == BootOutcome::Booted {
            return BootOutcome::Booted;
        }
    }
    BootOutcome::Failed
}

/// Show the background image, if the config names one.
fn show_background<P: Platform>(ctx: &mut PxeContext<P>, bmp: &str) {
    let addr = ctx.platform.image_load_addr();
    if ctx.get_relfile(bmp, addr).is_err() {
        warn!("Skipping background bmp {} for failure", bmp);
        return;
    }
    if let Err(err) = ctx.platform.show_background(addr) {
        debug!("background {}: {}", bmp, err);
    }
}

/// Let the user (or the default) pick a label and boot it.
///
/// When nothing could be chosen, or the chosen label fails to boot, every
/// label not tried yet is booted in turn.
pub fn handle_pxe_menu<P: Platform>(
    ctx: &mut PxeContext<P>,
    cfg: &mut PxeMenu,
    input: &mut dyn MenuInput,
) -> BootOutcome {
    if let Some(bmp) = cfg.bmp.clone() {
        show_background(ctx, &bmp);
    }

    let menu = cfg.to_select_menu(ctx.env());
    match menu.get_choice(input) {
        Ok(idx) => {
            let outcome = label_boot(ctx, &mut cfg.labels[idx]);
            if outcome != BootOutcome::Failed {
                return outcome;
            }
        }
        Err(MenuError::NotFound) => info!("no label chosen, trying all {}", cfg.labels.len()),
        Err(MenuError::Interrupted) => return BootOutcome::Interrupted,
    }
    boot_unattempted_labels(ctx, cfg)
}
