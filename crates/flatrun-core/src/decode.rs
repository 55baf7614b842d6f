//! Binary-decode driver: binary buffer to JSON document.

use crate::args::decode_args;
use crate::bridge;
use crate::cleanup::Cleanup;
use crate::error::{Result, RunnerError};
use crate::options::{BinaryInput, DecodeOptions, DecodedOutput, OutputEncoding};
use crate::runner::{invocation_error, Runner};
use crate::schema::SchemaInput;
use flatrun_engine::fs::{components, parent_dir};
use flatrun_engine::Engine;

impl<E: Engine> Runner<E> {
    /// Decode a binary buffer into a JSON document.
    ///
    /// `input.data` is mounted at `input.path`, which must end with the
    /// binary extension. The document is written beside it with the text
    /// extension, which must not already exist. Both files are removed
    /// afterwards, and so is their directory if nothing else is left in it.
    pub fn decode(
        &mut self,
        schema: &SchemaInput,
        input: &BinaryInput<'_>,
        options: &DecodeOptions,
    ) -> Result<DecodedOutput> {
        let result = self.decode_buffer(schema, input, options);
        self.record("decode", result)
    }

    fn decode_buffer(
        &mut self,
        schema: &SchemaInput,
        input: &BinaryInput<'_>,
        options: &DecodeOptions,
    ) -> Result<DecodedOutput> {
        let out_path = self.output_path(input.path)?;
        let out_dir = parent_dir(&out_path).to_string();

        // An existing file there would be read back as the result and then
        // deleted by cleanup.
        if self.engine.fs().stat(&out_path).is_ok() {
            return Err(RunnerError::InvalidInput(format!(
                "decode output path {out_path} already exists"
            )));
        }

        let include_dirs = self.cache.ensure_mounted(self.engine.fs_mut(), schema)?;
        let args = decode_args(&out_dir, &include_dirs, schema.entry(), input.path, options);

        let result = self.run_decode(input, &out_path, &out_dir, args, options.encoding);

        let mut cleanup = Cleanup::new(self.engine.fs_mut());
        cleanup
            .unlink(input.path)
            .unlink(&out_path)
            .rmdir_if_empty(&out_dir);
        cleanup.finish().log("decode");

        result
    }

    /// `<stem>.<binary_extension>` becomes `<stem>.<text_extension>`.
    fn output_path(&self, input: &str) -> Result<String> {
        let suffix = format!(".{}", self.config.binary_extension);
        let stem = input
            .strip_suffix(&suffix)
            .filter(|stem| !stem.ends_with('/'))
            .filter(|_| components(input).is_ok_and(|parts| !parts.is_empty()));

        match stem {
            Some(stem) => Ok(format!("{stem}.{}", self.config.text_extension)),
            None => Err(RunnerError::InvalidInput(format!(
                "binary input path must be absolute and end with {suffix}, got {input:?}"
            ))),
        }
    }

    fn run_decode(
        &mut self,
        input: &BinaryInput<'_>,
        out_path: &str,
        out_dir: &str,
        args: Vec<String>,
        encoding: OutputEncoding,
    ) -> Result<DecodedOutput> {
        bridge::mount(self.engine.fs_mut(), input.path, input.data)?;

        let outcome = self.gateway.invoke(&mut self.engine, &args)?;
        if !outcome.success() {
            return Err(invocation_error(args, outcome));
        }

        let fs = self.engine.fs();
        if !fs.stat(out_path).is_ok_and(|meta| meta.is_file()) {
            return Err(RunnerError::MissingOutput {
                expected: out_path.to_string(),
                directory: out_dir.to_string(),
                present: fs.read_dir(out_dir).unwrap_or_default(),
                args,
                stdout: outcome.stdout,
                stderr: outcome.stderr,
            });
        }

        let output = match encoding {
            OutputEncoding::Text => DecodedOutput::Text(fs.read_to_string(out_path)?),
            OutputEncoding::Bytes => DecodedOutput::Bytes(fs.read_file(out_path)?),
        };
        tracing::debug!(
            runner_id = %self.id(),
            bytes = output.as_bytes().len(),
            "Decoded buffer"
        );
        Ok(output)
    }
}
