//! Typed options for the decode and code-generation drivers.

use crate::error::RunnerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target languages `flatc` can generate bindings for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Language {
    Cpp,
    Csharp,
    Dart,
    Go,
    Java,
    Json,
    Jsonschema,
    Kotlin,
    KotlinKmp,
    Lobster,
    Lua,
    Nim,
    Php,
    Python,
    Rust,
    Swift,
    Ts,
}

impl Language {
    /// Every supported language.
    pub const ALL: [Language; 17] = [
        Self::Cpp,
        Self::Csharp,
        Self::Dart,
        Self::Go,
        Self::Java,
        Self::Json,
        Self::Jsonschema,
        Self::Kotlin,
        Self::KotlinKmp,
        Self::Lobster,
        Self::Lua,
        Self::Nim,
        Self::Php,
        Self::Python,
        Self::Rust,
        Self::Swift,
        Self::Ts,
    ];

    /// The name `flatc` uses for the language.
    pub fn name(self) -> &'static str {
        match self {
            Self::Cpp => "cpp",
            Self::Csharp => "csharp",
            Self::Dart => "dart",
            Self::Go => "go",
            Self::Java => "java",
            Self::Json => "json",
            Self::Jsonschema => "jsonschema",
            Self::Kotlin => "kotlin",
            Self::KotlinKmp => "kotlin-kmp",
            Self::Lobster => "lobster",
            Self::Lua => "lua",
            Self::Nim => "nim",
            Self::Php => "php",
            Self::Python => "python",
            Self::Rust => "rust",
            Self::Swift => "swift",
            Self::Ts => "ts",
        }
    }

    /// The generator flag, e.g. `--rust`.
    pub fn flag(self) -> String {
        format!("--{}", self.name())
    }

    /// True if `flatc` honours `--gen-object-api` for this language.
    pub fn supports_object_api(self) -> bool {
        matches!(
            self,
            Self::Cpp
                | Self::Csharp
                | Self::Go
                | Self::Java
                | Self::Kotlin
                | Self::KotlinKmp
                | Self::Lua
                | Self::Php
                | Self::Python
                | Self::Rust
                | Self::Swift
        )
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = RunnerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.name() == s)
            .ok_or_else(|| RunnerError::InvalidInput(format!("unsupported language: {s}")))
    }
}

/// Code-generation feature flags. Every flag defaults to off.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenOptions {
    /// `--gen-object-api`
    pub gen_object_api: bool,
    /// `--gen-onefile`
    pub gen_onefile: bool,
    /// `--python-typing`
    pub python_typing: bool,
    /// `--python-version <version>`
    pub python_version: Option<String>,
    /// `--no-includes`
    pub no_includes: bool,
    /// `--gen-compare`
    pub gen_compare: bool,
    /// `--gen-name-strings`
    pub gen_name_strings: bool,
    /// `--reflect-names`
    pub reflect_names: bool,
    /// `--reflect-types`
    pub reflect_types: bool,
    /// `--gen-json-emit`
    pub gen_json_emit: bool,
    /// `--keep-prefix`
    pub keep_prefix: bool,
    /// `--preserve-case`
    pub preserve_case: bool,
}

impl CodegenOptions {
    /// Flags for the enabled options, in a fixed order.
    pub fn to_args(&self) -> Vec<String> {
        let leading = [
            (self.gen_object_api, "--gen-object-api"),
            (self.gen_onefile, "--gen-onefile"),
            (self.python_typing, "--python-typing"),
        ];
        let trailing = [
            (self.no_includes, "--no-includes"),
            (self.gen_compare, "--gen-compare"),
            (self.gen_name_strings, "--gen-name-strings"),
            (self.reflect_names, "--reflect-names"),
            (self.reflect_types, "--reflect-types"),
            (self.gen_json_emit, "--gen-json-emit"),
            (self.keep_prefix, "--keep-prefix"),
            (self.preserve_case, "--preserve-case"),
        ];

        let mut args: Vec<String> = leading
            .iter()
            .filter(|(on, _)| *on)
            .map(|(_, flag)| flag.to_string())
            .collect();
        if let Some(version) = &self.python_version {
            args.push("--python-version".to_string());
            args.push(version.clone());
        }
        args.extend(
            trailing
                .iter()
                .filter(|(on, _)| *on)
                .map(|(_, flag)| flag.to_string()),
        );
        args
    }
}

/// How decoded output is returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputEncoding {
    /// UTF-8 text.
    Text,
    /// Raw bytes.
    #[default]
    Bytes,
}

/// Options for the binary-decode driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Pass `--raw-binary`, decoding buffers without a file identifier
    /// (default: true).
    pub raw_binary: bool,
    /// Pass `--defaults-json`, emitting fields equal to their default
    /// (default: false).
    pub defaults_json: bool,
    /// Return text or bytes (default: bytes).
    pub encoding: OutputEncoding,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            raw_binary: true,
            defaults_json: false,
            encoding: OutputEncoding::Bytes,
        }
    }
}

/// A binary artifact to decode, addressed by its virtual path.
#[derive(Debug, Clone, Copy)]
pub struct BinaryInput<'a> {
    /// Virtual path; must end with the binary extension.
    pub path: &'a str,
    /// The binary buffer.
    pub data: &'a [u8],
}

/// Decoded document in the requested encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedOutput {
    Text(String),
    Bytes(Vec<u8>),
}

impl DecodedOutput {
    /// The raw document bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Bytes(bytes) => bytes,
        }
    }

    /// Consume into bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Text(text) => text.into_bytes(),
            Self::Bytes(bytes) => bytes,
        }
    }

    /// The text, if this is the text variant.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Bytes(_) => None,
        }
    }

    /// Parse the document as JSON.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_slice(self.as_bytes())
    }
}
