use std::{collections::BTreeMap, env, fs, path::PathBuf};

use serde::Deserialize;

/// One entry of `flags.json`.
#[derive(Deserialize)]
struct Flag {
    value: String,
    #[serde(default)]
    doc: String,
}

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let flags_path = PathBuf::from(manifest_dir).join("../../flags.json");
    let flags_str = fs::read_to_string(&flags_path)
        .unwrap_or_else(|err| panic!("Cannot read {}: {}", flags_path.display(), err));
    let flagmap: BTreeMap<String, Flag> = serde_json::from_str(&flags_str)
        .unwrap_or_else(|err| panic!("Malformed flags.json: {}", err));
    make_flags(&flagmap);
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=../../flags.json");
}

fn make_flags(flagmap: &BTreeMap<String, Flag>) {
    let mut s = String::new();
    for (key, flag) in flagmap {
        if key.chars().any(|c| !(c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')) {
            panic!("Flag name '{}' is not a constant name.", key);
        }
        if flag.value.parse::<usize>().is_err() {
            panic!("Flag '{}' has a non-numeric value '{}'.", key, flag.value);
        }
        if !flag.doc.is_empty() {
            s += format!("/// {}\n", flag.doc).as_str();
        }
        s += format!("pub const {}: usize = {};\n", key, flag.value).as_str();
    }
    let out_dir = env::var("OUT_DIR").unwrap();
    let path = PathBuf::from(out_dir).join("build_flags.rs");
    fs::write(path, s).unwrap();
}
