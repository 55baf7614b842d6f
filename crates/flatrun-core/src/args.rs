//! Argument vector construction.
//!
//! Pure functions of their inputs; the drivers own every side effect.

use crate::options::{CodegenOptions, DecodeOptions, Language};

fn push_includes(args: &mut Vec<String>, include_dirs: &[String]) {
    for dir in include_dirs {
        args.push("-I".to_string());
        args.push(dir.clone());
    }
}

/// `--binary --unknown-json -o <out> (-I <dir>)* <entry> <document>`
pub fn encode_args(out_dir: &str, include_dirs: &[String], entry: &str, document: &str) -> Vec<String> {
    let mut args = vec![
        "--binary".to_string(),
        "--unknown-json".to_string(),
        "-o".to_string(),
        out_dir.to_string(),
    ];
    push_includes(&mut args, include_dirs);
    args.push(entry.to_string());
    args.push(document.to_string());
    args
}

/// `--json --strict-json [--raw-binary] [--defaults-json] -o <out> (-I <dir>)* <entry> -- <input>`
pub fn decode_args(
    out_dir: &str,
    include_dirs: &[String],
    entry: &str,
    input: &str,
    options: &DecodeOptions,
) -> Vec<String> {
    let mut args = vec!["--json".to_string(), "--strict-json".to_string()];
    if options.raw_binary {
        args.push("--raw-binary".to_string());
    }
    if options.defaults_json {
        args.push("--defaults-json".to_string());
    }
    args.push("-o".to_string());
    args.push(out_dir.to_string());
    push_includes(&mut args, include_dirs);
    args.push(entry.to_string());
    args.push("--".to_string());
    args.push(input.to_string());
    args
}

/// `--<lang> -o <out> (-I <dir>)* [flags] <entry>`
pub fn codegen_args(
    language: Language,
    out_dir: &str,
    include_dirs: &[String],
    entry: &str,
    options: &CodegenOptions,
) -> Vec<String> {
    let mut args = vec![language.flag(), "-o".to_string(), out_dir.to_string()];
    push_includes(&mut args, include_dirs);
    args.extend(options.to_args());
    args.push(entry.to_string());
    args
}
