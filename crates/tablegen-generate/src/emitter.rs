use tablegen_core::{GenerationContext, ResolvedTable};
use tracing::{debug, error, info};

use crate::errors::EmitError;
use crate::model::{EmitOptions, RenderedArtifacts};
use crate::{primary, secondary};

/// Renders resolved tables into the primary and secondary artifacts.
#[derive(Debug, Clone, Default)]
pub struct Emitter {
    options: EmitOptions,
}

impl Emitter {
    pub fn new(options: EmitOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EmitOptions {
        &self.options
    }

    /// Emit both artifacts. Tables are visited in ascending order of type
    /// name regardless of the order given. Refuses to run when `context`
    /// carries errors.
    pub fn emit(
        &self,
        context: &GenerationContext,
        tables: &[ResolvedTable],
    ) -> Result<RenderedArtifacts, EmitError> {
        if context.is_fatal() {
            let errors = context.diagnostics.errors().count();
            error!(event = "emit_aborted", errors);
            return Err(EmitError::Aborted { errors });
        }

        let mut ordered: Vec<&ResolvedTable> = tables.iter().collect();
        ordered.sort_by(|a, b| a.name().cmp(b.name()));

        let mut primary_artifact = primary::artifact(&self.options);
        let mut secondary_artifact = secondary::artifact(&self.options);
        for table in &ordered {
            debug!(event = "emit_table", table = table.name());
            primary::contribute(&mut primary_artifact, table)?;
            secondary::contribute(&mut secondary_artifact, table)?;
        }
        primary::load_all(&mut primary_artifact, &ordered)?;

        let rendered = RenderedArtifacts {
            primary: primary_artifact.render()?,
            secondary: secondary_artifact.render()?,
        };
        info!(
            event = "emit_done",
            tables = ordered.len(),
            primary_bytes = rendered.primary.len(),
            secondary_bytes = rendered.secondary.len()
        );
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablegen_core::Diagnostic;

    #[test]
    fn fatal_context_aborts() {
        let mut context = GenerationContext::new();
        context.report(Diagnostic::error("missing_key", "Buff", "no key"));
        context.report(Diagnostic::warning("malformed_tag", "c_buff.rs", "bad tag"));

        let err = Emitter::default().emit(&context, &[]).expect_err("aborted");
        assert!(matches!(err, EmitError::Aborted { errors: 1 }));
    }

    #[test]
    fn empty_input_still_renders_load_all() {
        let rendered = Emitter::default()
            .emit(&GenerationContext::new(), &[])
            .expect("emit");
        assert!(rendered.primary.contains("pub fn load_all() -> Result<(), TableError> {"));
        assert!(rendered.secondary.contains("use super::table::*;"));
    }
}
