//! Shared test helpers: a scripted stand-in for `flatc` over `MemFs`.
//!
//! The fake understands the argument shapes the drivers produce. Its binary
//! "format" is a magic header followed by compact JSON, which is enough to
//! check mounting, argument construction, harvesting and cleanup without a
//! real compiler.

#![allow(dead_code)]

use async_trait::async_trait;
use flatrun_core::{Language, SchemaInput};
use flatrun_engine::fs::{file_name, join, parent_dir};
use flatrun_engine::{Engine, EngineError, EngineFactory, MemFs, OutputSink, VirtualFs};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Header written in front of every fake binary buffer.
pub const MAGIC: &[u8] = b"FAKEFB01";

pub const ORC: &str = r#"{ "name": "Orc", "pos": { "x": 1, "y": 2, "z": 3 } }"#;

/// Knobs shared between a test and the engines it creates.
#[derive(Debug, Default)]
pub struct FakeControl {
    pub invocations: AtomicUsize,
    /// Next call raises an internal fault instead of exiting.
    pub fault_next: AtomicBool,
    /// Next call exits 0 without writing anything.
    pub silent_next: AtomicBool,
    /// Instantiation fails while set.
    pub fail_instantiate: AtomicBool,
}

impl FakeControl {
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

pub struct FakeFlatc {
    fs: MemFs,
    control: Arc<FakeControl>,
    live: Option<Arc<AtomicUsize>>,
}

impl FakeFlatc {
    pub fn new() -> Self {
        Self::with_control(Arc::new(FakeControl::default()))
    }

    pub fn with_control(control: Arc<FakeControl>) -> Self {
        Self {
            fs: MemFs::new(),
            control,
            live: None,
        }
    }

    pub fn control(&self) -> Arc<FakeControl> {
        Arc::clone(&self.control)
    }
}

impl Drop for FakeFlatc {
    fn drop(&mut self) {
        if let Some(live) = &self.live {
            live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

enum Mode {
    Binary,
    Json,
    Code(Language),
}

#[derive(Default)]
struct Parsed {
    mode: Option<Mode>,
    out: Option<String>,
    includes: Vec<String>,
    flags: BTreeSet<String>,
    files: Vec<String>,
    binaries: Vec<String>,
}

fn parse(args: &[String]) -> Parsed {
    let mut parsed = Parsed::default();
    let mut iter = args.iter();
    let mut after_dashes = false;

    while let Some(arg) = iter.next() {
        if after_dashes {
            parsed.binaries.push(arg.clone());
            continue;
        }
        match arg.as_str() {
            "--" => after_dashes = true,
            "--binary" => parsed.mode = Some(Mode::Binary),
            "--json" => parsed.mode = Some(Mode::Json),
            "-o" => parsed.out = iter.next().cloned(),
            "-I" => parsed.includes.extend(iter.next().cloned()),
            "--python-version" => {
                iter.next();
                parsed.flags.insert(arg.clone());
            }
            flag if flag.starts_with("--") => match flag[2..].parse::<Language>() {
                Ok(lang) => parsed.mode = Some(Mode::Code(lang)),
                Err(_) => {
                    parsed.flags.insert(flag.to_string());
                }
            },
            _ => parsed.files.push(arg.clone()),
        }
    }
    parsed
}

/// Every `<keyword> "<value>";` in `text`.
fn quoted_after<'a>(text: &'a str, keyword: &str) -> Vec<&'a str> {
    text.lines()
        .filter_map(|line| {
            let rest = line.trim().strip_prefix(keyword)?.trim_start();
            rest.strip_prefix('"')?.split('"').next()
        })
        .collect()
}

fn stem(path: &str) -> &str {
    let name = file_name(path);
    name.rsplit_once('.').map_or(name, |(stem, _)| stem)
}

fn fail(sink: &mut dyn OutputSink, message: String) -> flatrun_engine::Result<()> {
    sink.print_err(&message);
    Err(EngineError::Exit(1))
}

impl FakeFlatc {
    fn resolve(&self, from: &str, name: &str, includes: &[String]) -> Option<String> {
        std::iter::once(parent_dir(from).to_string())
            .chain(includes.iter().cloned())
            .map(|dir| join(&dir, name))
            .find(|path| self.fs.stat(path).is_ok_and(|m| m.is_file()))
    }

    /// Load the entry and every include; returns the binary extension.
    fn load_schema(&self, entry: &str, includes: &[String]) -> Result<String, String> {
        let text = self
            .fs
            .read_to_string(entry)
            .map_err(|_| format!("error: unable to load file: {entry}"))?;

        let mut pending = vec![(entry.to_string(), text.clone())];
        let mut seen = BTreeSet::from([entry.to_string()]);
        while let Some((path, body)) = pending.pop() {
            for name in quoted_after(&body, "include") {
                let resolved = self.resolve(&path, name, includes).ok_or_else(|| {
                    format!("error: {path}: unable to locate include file: {name}")
                })?;
                if seen.insert(resolved.clone()) {
                    let body = self.fs.read_to_string(&resolved).map_err(|e| e.to_string())?;
                    pending.push((resolved, body));
                }
            }
        }

        Ok(quoted_after(&text, "file_extension")
            .first()
            .map_or("bin", |ext| *ext)
            .to_string())
    }

    fn write(&mut self, path: &str, data: &[u8]) -> Result<(), String> {
        self.fs
            .write_file(path, data)
            .map_err(|e| format!("error: unable to write output file {path}: {e}"))
    }

    fn encode(&mut self, parsed: &Parsed, out: &str, ext: &str) -> Result<(), String> {
        for input in &parsed.files[1..] {
            let raw = self
                .fs
                .read_file(input)
                .map_err(|_| format!("error: unable to load file: {input}"))?;
            let value: serde_json::Value = serde_json::from_slice(&raw)
                .map_err(|e| format!("error: {input}: parse error: {e}"))?;

            let mut buffer = MAGIC.to_vec();
            buffer.extend(serde_json::to_vec(&value).map_err(|e| e.to_string())?);
            self.write(&join(out, &format!("{}.{ext}", stem(input))), &buffer)?;
        }
        Ok(())
    }

    fn decode(&mut self, parsed: &Parsed, out: &str) -> Result<(), String> {
        for input in &parsed.binaries {
            let raw = self
                .fs
                .read_file(input)
                .map_err(|_| format!("error: unable to load file: {input}"))?;
            // Mirrors flatc quietly skipping buffers it can't interpret
            let Some(body) = raw.strip_prefix(MAGIC) else {
                continue;
            };
            let mut value: serde_json::Value =
                serde_json::from_slice(body).map_err(|e| e.to_string())?;
            if parsed.flags.contains("--defaults-json") {
                if let Some(object) = value.as_object_mut() {
                    object.entry("hp").or_insert(serde_json::json!(100));
                }
            }
            let text = serde_json::to_string_pretty(&value).map_err(|e| e.to_string())?;
            self.write(&join(out, &format!("{}.json", stem(input))), text.as_bytes())?;
        }
        Ok(())
    }

    fn codegen(&mut self, parsed: &Parsed, out: &str, lang: Language) -> Result<(), String> {
        if lang == Language::Lobster {
            return Err("error: lobster code generator: unsupported schema feature".into());
        }
        let ext = match lang {
            Language::Rust => "rs",
            Language::Python => "py",
            Language::Cpp => "h",
            Language::Csharp => "cs",
            Language::Kotlin | Language::KotlinKmp => "kt",
            other => other.name(),
        };
        let entry = &parsed.files[0];
        let stem = stem(entry).to_string();
        let banner = format!("// {lang} bindings for {entry}\n");
        self.write(&join(out, &format!("{stem}_generated.{ext}")), banner.as_bytes())?;

        if parsed.flags.contains("--gen-object-api") && !parsed.flags.contains("--gen-onefile") {
            let dir = join(out, &stem);
            if !self.fs.exists(&dir) {
                self.fs.mkdir(&dir).map_err(|e| e.to_string())?;
            }
            self.write(&join(&dir, &format!("object_api.{ext}")), banner.as_bytes())?;
        }
        Ok(())
    }
}

impl Engine for FakeFlatc {
    fn fs(&self) -> &dyn VirtualFs {
        &self.fs
    }

    fn fs_mut(&mut self) -> &mut dyn VirtualFs {
        &mut self.fs
    }

    fn call_main(&mut self, args: &[String], sink: &mut dyn OutputSink) -> flatrun_engine::Result<()> {
        self.control.invocations.fetch_add(1, Ordering::SeqCst);
        if self.control.fault_next.swap(false, Ordering::SeqCst) {
            return Err(EngineError::Fault("simulated abort".into()));
        }

        if args.iter().any(|a| a == "--help") {
            sink.print("Usage: flatc [OPTION]... FILE... [-- BINARY_FILE...]");
            sink.print("  --binary  Generate wire format binaries for any data definitions.");
            return Ok(());
        }
        if args.iter().any(|a| a == "--version") {
            sink.print("flatc version 25.2.10");
            return Ok(());
        }

        let parsed = parse(args);
        let Some(mode) = &parsed.mode else {
            return fail(sink, "error: no options: specify at least one generator.".into());
        };
        let Some(entry) = parsed.files.first().cloned() else {
            return fail(sink, "error: missing input files".into());
        };
        let ext = match self.load_schema(&entry, &parsed.includes) {
            Ok(ext) => ext,
            Err(message) => return fail(sink, message),
        };

        let out = parsed.out.clone().unwrap_or_else(|| "/".to_string());
        if !self.fs.stat(&out).is_ok_and(|m| m.is_dir) {
            return fail(sink, format!("error: output directory {out} does not exist"));
        }
        if self.control.silent_next.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        let result = match mode {
            Mode::Binary => self.encode(&parsed, &out, &ext),
            Mode::Json => self.decode(&parsed, &out),
            Mode::Code(lang) => {
                let lang = *lang;
                self.codegen(&parsed, &out, lang)
            }
        };
        match result {
            Ok(()) => Ok(()),
            Err(message) => fail(sink, message),
        }
    }
}

/// Hands out fake engines and counts the ones still alive.
#[derive(Debug, Clone, Default)]
pub struct FakeFactory {
    pub control: Arc<FakeControl>,
    live: Arc<AtomicUsize>,
}

impl FakeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EngineFactory for FakeFactory {
    type Engine = FakeFlatc;

    async fn instantiate(&self) -> flatrun_engine::Result<FakeFlatc> {
        tokio::task::yield_now().await;
        if self.control.fail_instantiate.load(Ordering::SeqCst) {
            return Err(EngineError::Startup("simulated startup failure".into()));
        }
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(FakeFlatc {
            fs: MemFs::new(),
            control: Arc::clone(&self.control),
            live: Some(Arc::clone(&self.live)),
        })
    }
}

pub const MONSTER_FBS: &str = r#"include "vec3.fbs";

namespace MyGame;

table Monster {
  name:string;
  pos:Vec3;
  hp:short = 100;
}

root_type Monster;
file_identifier "MONS";
file_extension "mon";
"#;

pub const VEC3_FBS: &str = r#"namespace MyGame;

struct Vec3 {
  x:float;
  y:float;
  z:float;
}
"#;

/// Monster schema with its include in a separate directory.
pub fn monster_schema() -> SchemaInput {
    monster_schema_with(VEC3_FBS)
}

pub fn monster_schema_with(vec3: &str) -> SchemaInput {
    SchemaInput::new(
        "/schema/monster.fbs",
        [
            ("/schema/monster.fbs", MONSTER_FBS),
            ("/schema/common/vec3.fbs", vec3),
        ],
    )
    .expect("valid schema")
}

/// Install a test subscriber; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
