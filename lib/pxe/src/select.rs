//! Generic selectable menu.
//!
//! Items are looked up by key. Without a prompt the default item is chosen
//! straight away; with a prompt the menu is shown and the user types a key,
//! falling back to the default when the timeout runs out.

use crate::error::MenuError;
use alloc::{string::String, vec::Vec};
use log::warn;

/// Result of reading one line from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadLine {
    Line(String),
    /// Ctrl-C or equivalent.
    Interrupted,
    TimedOut,
}

/// Where a prompting menu gets its input from.
pub trait MenuInput {
    /// Show the menu title and its entries.
    fn display(&mut self, title: Option<&str>, entries: &[String]);
    /// Read a line after printing `prompt`. A `timeout` of 0 waits forever.
    fn read_line(&mut self, prompt: &str, timeout: u32) -> ReadLine;
}

struct MenuItem<T> {
    key: String,
    text: String,
    data: T,
}

pub struct SelectMenu<T> {
    title: Option<String>,
    /// Seconds to wait for input; 0 waits forever.
    timeout: u32,
    prompt: bool,
    items: Vec<MenuItem<T>>,
    default: Option<usize>,
}

impl<T: Clone> SelectMenu<T> {
    pub fn new(title: Option<&str>, timeout: u32, prompt: bool) -> SelectMenu<T> {
        SelectMenu {
            title: title.map(String::from),
            timeout,
            prompt,
            items: Vec::new(),
            default: None,
        }
    }

    pub fn timeout(&self) -> u32 {
        self.timeout
    }

    pub fn prompt(&self) -> bool {
        self.prompt
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn find(&self, key: &str) -> Option<usize> {
        self.items.iter().position(|x| x.key == key)
    }

    /// Add an item; re-using a key replaces that item's text and data.
    pub fn item_add(&mut self, key: &str, text: String, data: T) {
        match self.find(key) {
            Some(idx) => {
                self.items[idx].text = text;
                self.items[idx].data = data;
            }
            None => self.items.push(MenuItem {
                key: String::from(key),
                text,
                data,
            }),
        }
    }

    pub fn default_set(&mut self, key: &str) -> Result<(), MenuError> {
        let idx = self.find(key).ok_or(MenuError::NotFound)?;
        self.default = Some(idx);
        Ok(())
    }

    pub fn default_key(&self) -> Option<&str> {
        self.default.map(|x| self.items[x].key.as_str())
    }

    fn default_choice(&self) -> Result<T, MenuError> {
        match self.default {
            Some(idx) => Ok(self.items[idx].data.clone()),
            None => Err(MenuError::NotFound),
        }
    }

    /// Pick an item, asking `input` when the menu prompts.
    pub fn get_choice(&self, input: &mut dyn MenuInput) -> Result<T, MenuError> {
        if self.items.is_empty() {
            return Err(MenuError::NotFound);
        }
        if !self.prompt {
            return self.default_choice();
        }
        let entries: Vec<String> = self.items.iter().map(|x| x.text.clone()).collect();
        loop {
            input.display(self.title.as_deref(), &entries);
            match input.read_line("Enter choice: ", self.timeout) {
                ReadLine::Line(line) => {
                    let key = line.trim();
                    match self.find(key) {
                        Some(idx) => return Ok(self.items[idx].data.clone()),
                        None => warn!("{} not found", key),
                    }
                }
                ReadLine::Interrupted => {
                    warn!("<INTERRUPT>");
                    return Err(MenuError::Interrupted);
                }
                ReadLine::TimedOut => return self.default_choice(),
            }
        }
    }
}
