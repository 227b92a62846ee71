//! Boot-monitor environment and `$(...)` / `${...}` expansion.

use crate::error::PxeError;
use alloc::{
    collections::btree_map::BTreeMap,
    string::{String, ToString},
};
use log::warn;
use utils::strtol::strict_strtoul;

/// Name/value store backing the boot monitor's environment variables.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    pub fn new() -> Environment {
        Environment {
            vars: BTreeMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(|x| x.as_str())
    }

    /// Set `name`; an empty value deletes the variable, as `setenv` does.
    pub fn set(&mut self, name: &str, value: &str) {
        if value.is_empty() {
            self.vars.remove(name);
        } else {
            self.vars.insert(name.to_string(), value.to_string());
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.vars.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Fetch a variable that has to be present, complaining when it is not.
    pub fn require(&self, name: &str) -> Result<&str, PxeError> {
        match self.get(name) {
            Some(value) => Ok(value),
            None => {
                warn!("missing environment variable: {}", name);
                Err(PxeError::MissingVariable {
                    name: name.to_string(),
                })
            }
        }
    }

    /// Fetch a variable holding a hex number (an address or a size).
    pub fn require_hex(&self, name: &str) -> Result<usize, PxeError> {
        let value = self.require(name)?;
        strict_strtoul(value, 16)
            .map(|x| x as usize)
            .ok_or_else(|| PxeError::InvalidNumber {
                name: name.to_string(),
                value: value.to_string(),
            })
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for Environment {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut env = Environment::new();
        for (k, v) in iter {
            env.set(k.as_ref(), v.as_ref());
        }
        env
    }
}

/// Scanner states of [process_macros].
#[derive(Clone, Copy, PartialEq, Eq)]
enum MacroState {
    /// Copying text, looking for an unescaped `$`.
    Text,
    /// Just saw `$`, expecting `(` or `{`.
    Dollar,
    /// Inside a reference, collecting the name up to `)` or `}`.
    Name,
    /// Inside single quotes, copying verbatim.
    Quoted,
}

/// Expand `$(name)` and `${name}` references in `input`.
///
/// Unset variables expand to nothing. Outside single quotes a backslash
/// makes the next character literal and is itself dropped, so `\\` gives one
/// backslash. Text inside single quotes is copied without expansion and
/// without the quotes. A reference that is never closed is dropped. The
/// result is cut to `max_len - 1` bytes, the room a command buffer of
/// `max_len` bytes has.
pub fn process_macros(input: &str, env: &Environment, max_len: usize) -> String {
    let mut output = String::new();
    let mut state = MacroState::Text;
    let mut prev = '\0';
    let mut name_start = 0;
    let limit = max_len.saturating_sub(1);

    let push = |output: &mut String, c: char| {
        if output.len() + c.len_utf8() <= limit {
            output.push(c);
        }
    };

    let mut chars = input.char_indices();
    while let Some((mut idx, mut c)) = chars.next() {
        if state != MacroState::Quoted && c == '\\' && prev != '\\' {
            let Some(next) = chars.next() else {
                break;
            };
            prev = c;
            (idx, c) = next;
        }
        match state {
            MacroState::Text => {
                if c == '\'' && prev != '\\' {
                    state = MacroState::Quoted;
                } else if c == '$' && prev != '\\' {
                    state = MacroState::Dollar;
                } else {
                    push(&mut output, c);
                }
            }
            MacroState::Dollar => {
                if c == '(' || c == '{' {
                    state = MacroState::Name;
                    name_start = idx + 1;
                } else {
                    state = MacroState::Text;
                    push(&mut output, '$');
                    push(&mut output, c);
                }
            }
            MacroState::Name => {
                if c == ')' || c == '}' {
                    let name = &input[name_start..idx];
                    if let Some(value) = env.get(name) {
                        for vc in value.chars() {
                            push(&mut output, vc);
                        }
                    }
                    state = MacroState::Text;
                }
            }
            MacroState::Quoted => {
                if c == '\'' && prev != '\\' {
                    state = MacroState::Text;
                } else {
                    push(&mut output, c);
                }
            }
        }
        prev = c;
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> Environment {
        [("console", "ttyS0,115200"), ("root", "/dev/mmcblk0p2")]
            .into_iter()
            .collect()
    }

    #[test]
    fn both_bracket_styles_expand() {
        assert_eq!(
            process_macros("console=${console} root=$(root) rw", &env(), 1024),
            "console=ttyS0,115200 root=/dev/mmcblk0p2 rw"
        );
    }

    #[test]
    fn unset_variables_vanish() {
        assert_eq!(process_macros("a=${nothing}b", &env(), 1024), "a=b");
    }

    #[test]
    fn lone_dollar_is_kept() {
        assert_eq!(process_macros("cost $5", &env(), 1024), "cost $5");
    }

    #[test]
    fn escapes_and_quotes() {
        assert_eq!(process_macros("x=\\${root}", &env(), 1024), "x=${root}");
        assert_eq!(
            process_macros("a=\\${root} b=c\\\\d", &env(), 1024),
            "a=${root} b=c\\d"
        );
        assert_eq!(process_macros("it\\'s ${root}", &env(), 1024), "it's /dev/mmcblk0p2");
        assert_eq!(process_macros("'a\\b'", &env(), 1024), "a\\b");
        assert_eq!(process_macros("trailing\\", &env(), 1024), "trailing");
        assert_eq!(process_macros("'${root}' ${root}", &env(), 1024), "${root} /dev/mmcblk0p2");
    }

    #[test]
    fn unterminated_reference_is_dropped() {
        assert_eq!(process_macros("quiet ${root", &env(), 1024), "quiet ");
    }

    #[test]
    fn output_is_bounded() {
        assert_eq!(process_macros("0123456789", &env(), 5), "0123");
    }

    #[test]
    fn hex_variables() {
        let mut env = env();
        env.set("kernel_addr_r", "0x40400000");
        env.set("broken", "0x40z");
        assert_eq!(env.require_hex("kernel_addr_r"), Ok(0x4040_0000));
        assert!(matches!(
            env.require_hex("broken"),
            Err(PxeError::InvalidNumber { .. })
        ));
        assert!(matches!(
            env.require_hex("missing"),
            Err(PxeError::MissingVariable { .. })
        ));
    }

    #[test]
    fn empty_value_unsets() {
        let mut env = env();
        env.set("root", "");
        assert_eq!(env.get("root"), None);
    }
}
