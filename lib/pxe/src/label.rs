//! A single boot entry of a config file.

use alloc::string::String;
use bitflags::bitflags;

bitflags! {
    /// Arguments `ipappend` asks to add to the kernel command line.
    #[derive(Default)]
    pub struct IpAppend: u32 {
        /// `ip=<client>:<server>:<gateway>:<netmask>`
        const IP     = 0x1;
        /// `BOOTIF=01-<mac>`
        const BOOTIF = 0x2;
    }
}

/// One `label` block.
///
/// Fields are filled in line by line while the block is parsed; for most of
/// the optional paths the first occurrence wins.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Label {
    /// 1-based menu number, assigned when the menu is built.
    pub num: String,
    pub name: String,
    /// `menu label` text shown instead of [Self::name].
    pub menu: Option<String>,
    pub kernel: Option<String>,
    /// FIT configuration selector, including its leading `#`.
    pub config: Option<String>,
    pub append: Option<String>,
    pub initrd: Option<String>,
    pub fdt: Option<String>,
    pub fdtdir: Option<String>,
    /// Space separated overlay files.
    pub fdtoverlays: Option<String>,
    pub localboot: bool,
    pub localboot_val: i64,
    pub ipappend: IpAppend,
    pub kaslrseed: bool,
    pub attempted: bool,
}

impl Label {
    pub fn new(name: String) -> Label {
        Label {
            name,
            ..Default::default()
        }
    }

    /// The text the menu shows for this label.
    pub fn display_name(&self) -> &str {
        self.menu.as_deref().unwrap_or(&self.name)
    }

    /// Menu line: `"<num>:\t<display name>"`.
    pub fn menu_line(&self) -> String {
        alloc::format!("{}:\t{}", self.num, self.display_name())
    }

    /// Store a `kernel` path, splitting off a `#config` suffix.
    pub fn set_kernel(&mut self, path: String) {
        let mut path = path;
        if let Some(idx) = path.find('#') {
            self.config = Some(path.split_off(idx));
        }
        self.kernel = Some(path);
    }

    /// Fill [Self::initrd] from an `initrd=` argument inside [Self::append],
    /// unless an initrd is already known.
    pub fn initrd_from_append(&mut self) {
        if self.initrd.is_some() {
            return;
        }
        let Some(append) = &self.append else {
            return;
        };
        if let Some(idx) = append.find("initrd=") {
            let value = &append[idx + "initrd=".len()..];
            let end = value.find(' ').unwrap_or(value.len());
            self.initrd = Some(String::from(&value[..end]));
        }
    }
}
