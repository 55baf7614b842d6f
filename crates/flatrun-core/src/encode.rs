//! Binary-encode driver: JSON document to binary buffer.

use crate::args::encode_args;
use crate::bridge;
use crate::cleanup::Cleanup;
use crate::error::{Result, RunnerError};
use crate::runner::{invocation_error, Runner};
use crate::schema::SchemaInput;
use flatrun_engine::fs::join;
use flatrun_engine::Engine;
use uuid::Uuid;

impl<E: Engine> Runner<E> {
    /// Encode `document` into the schema's binary format.
    ///
    /// The schema is mounted only if it differs from the one cached by the
    /// previous call. The document and output directory live under fresh
    /// unique paths and are removed before returning, on success and on
    /// failure alike.
    ///
    /// # Errors
    ///
    /// - [`RunnerError::EngineInvocation`] if `flatc` exits non-zero
    /// - [`RunnerError::MissingOutput`] if it exits 0 without writing a
    ///   binary artifact
    /// - [`RunnerError::Engine`] if the engine faults
    pub fn encode(&mut self, schema: &SchemaInput, document: impl AsRef<[u8]>) -> Result<Vec<u8>> {
        let result = self.encode_document(schema, document.as_ref());
        self.record("encode", result)
    }

    fn encode_document(&mut self, schema: &SchemaInput, document: &[u8]) -> Result<Vec<u8>> {
        let include_dirs = self.cache.ensure_mounted(self.engine.fs_mut(), schema)?;

        let root = &self.config.transient_root;
        let out_dir = join(root, &Uuid::new_v4().to_string());
        let doc_path = join(
            root,
            &format!("input-{}.{}", Uuid::new_v4(), self.config.text_extension),
        );
        let args = encode_args(&out_dir, &include_dirs, schema.entry(), &doc_path);

        let result = self.run_encode(&out_dir, &doc_path, document, args);

        let mut cleanup = Cleanup::new(self.engine.fs_mut());
        cleanup.unlink(&doc_path).remove_dir(&out_dir);
        cleanup.finish().log("encode");

        result
    }

    fn run_encode(
        &mut self,
        out_dir: &str,
        doc_path: &str,
        document: &[u8],
        args: Vec<String>,
    ) -> Result<Vec<u8>> {
        bridge::create_dir_all(self.engine.fs_mut(), out_dir)?;
        bridge::mount(self.engine.fs_mut(), doc_path, document)?;

        let outcome = self.gateway.invoke(&mut self.engine, &args)?;
        if !outcome.success() {
            return Err(invocation_error(args, outcome));
        }

        let suffix = format!(".{}", self.config.binary_extension);
        let present = self.engine.fs().read_dir(out_dir)?;
        let Some(name) = present.iter().find(|name| name.ends_with(&suffix)) else {
            return Err(RunnerError::MissingOutput {
                expected: suffix,
                directory: out_dir.to_string(),
                present,
                args,
                stdout: outcome.stdout,
                stderr: outcome.stderr,
            });
        };

        let bytes = self.engine.fs().read_file(&join(out_dir, name))?;
        tracing::debug!(runner_id = %self.id(), bytes = bytes.len(), "Encoded document");
        Ok(bytes)
    }
}
