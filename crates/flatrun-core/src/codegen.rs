//! Code-generation driver.

use crate::args::codegen_args;
use crate::bridge;
use crate::cleanup::Cleanup;
use crate::error::{Result, RunnerError};
use crate::options::{CodegenOptions, Language};
use crate::runner::Runner;
use crate::schema::SchemaInput;
use flatrun_engine::fs::{components, join};
use flatrun_engine::Engine;
use std::collections::BTreeMap;
use uuid::Uuid;

impl<E: Engine> Runner<E> {
    /// Generate `language` bindings for `schema`.
    ///
    /// Returns every generated file keyed by its path relative to the output
    /// directory. With `output_dir` unset, a fresh directory under the
    /// configured codegen root is used and removed afterwards; an explicit
    /// directory is left in place.
    ///
    /// The schema is always remounted here, bypassing the cache.
    ///
    /// # Errors
    ///
    /// [`RunnerError::CodeGeneration`] with `flatc`'s stderr if it exits
    /// non-zero.
    pub fn generate(
        &mut self,
        schema: &SchemaInput,
        language: Language,
        output_dir: Option<&str>,
        options: &CodegenOptions,
    ) -> Result<BTreeMap<String, String>> {
        let result = self.generate_code(schema, language, output_dir, options);
        self.record("generate", result)
    }

    fn generate_code(
        &mut self,
        schema: &SchemaInput,
        language: Language,
        output_dir: Option<&str>,
        options: &CodegenOptions,
    ) -> Result<BTreeMap<String, String>> {
        let (out_dir, temporary) = match output_dir {
            Some(dir) => {
                if components(dir).is_err() {
                    return Err(RunnerError::InvalidInput(format!(
                        "output directory must be absolute, got {dir:?}"
                    )));
                }
                (dir.to_string(), false)
            }
            None => (
                join(&self.config.codegen_root, &Uuid::new_v4().to_string()),
                true,
            ),
        };

        if options.gen_object_api && !language.supports_object_api() {
            tracing::debug!(%language, "Object API not supported for language, flag has no effect");
        }

        let result = self.run_codegen(schema, language, &out_dir, options);

        if temporary {
            let mut cleanup = Cleanup::new(self.engine.fs_mut());
            cleanup.remove_tree(&out_dir);
            cleanup.finish().log("generate");
        }

        result
    }

    fn run_codegen(
        &mut self,
        schema: &SchemaInput,
        language: Language,
        out_dir: &str,
        options: &CodegenOptions,
    ) -> Result<BTreeMap<String, String>> {
        bridge::create_dir_all(self.engine.fs_mut(), out_dir)?;

        // Mounting may overwrite files of a different cached schema
        if !self.cache.is_current(schema) {
            self.cache.invalidate();
        }
        bridge::mount_many(
            self.engine.fs_mut(),
            schema
                .files()
                .iter()
                .map(|(path, content)| (path.as_str(), content.as_bytes())),
        )?;

        let args = codegen_args(language, out_dir, &schema.include_dirs(), schema.entry(), options);
        let outcome = self.gateway.invoke(&mut self.engine, &args)?;
        if !outcome.success() {
            return Err(RunnerError::CodeGeneration(outcome.stderr));
        }

        let files = bridge::walk_relative(self.engine.fs(), out_dir)?;
        tracing::debug!(
            runner_id = %self.id(),
            %language,
            files = files.len(),
            "Generated code"
        );
        Ok(files)
    }
}
