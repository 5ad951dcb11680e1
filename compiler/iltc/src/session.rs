//! Per-member translation over one frozen type pool.

use std::sync::Arc;

use ilt_ir::{ExprArena, ExprId, TypePool};
use ilt_rewrite::{RewriteOutput, RewriteStats};
use ilt_types::{AssignabilityCache, TypeRelations};
use rayon::prelude::*;

use crate::config::TranslatorConfig;

/// Worker stack size. Member bodies recurse deeply and `stacker` grows the
/// stack on demand, but a larger initial segment avoids most growth.
const WORKER_STACK: usize = 16 * 1024 * 1024;

/// One decompiled member body.
#[derive(Clone, Debug)]
pub struct MemberBody {
    /// Display name used in logs.
    pub name: String,
    pub arena: ExprArena,
    pub root: ExprId,
}

impl MemberBody {
    pub fn new(name: impl Into<String>, arena: ExprArena, root: ExprId) -> Self {
        MemberBody {
            name: name.into(),
            arena,
            root,
        }
    }
}

/// Outcome of [`Translator::translate_all`].
#[derive(Clone, Debug, Default)]
pub struct TranslationReport {
    /// One output per member, in input order.
    pub outputs: Vec<RewriteOutput>,
    /// Rule counts summed over every member.
    pub stats: RewriteStats,
}

/// Translates member bodies against one frozen pool.
///
/// Every worker shares the same assignability cache, so a relation answered
/// for one member is never recomputed for another.
pub struct Translator {
    relations: TypeRelations,
    config: TranslatorConfig,
}

impl Translator {
    pub fn new(pool: Arc<TypePool>, config: TranslatorConfig) -> Self {
        Self::with_cache(pool, Arc::new(AssignabilityCache::new()), config)
    }

    /// Share a cache that outlives this translator, e.g. across assemblies
    /// read into the same pool.
    pub fn with_cache(
        pool: Arc<TypePool>,
        cache: Arc<AssignabilityCache>,
        config: TranslatorConfig,
    ) -> Self {
        Translator {
            relations: TypeRelations::new(pool, cache),
            config,
        }
    }

    pub fn relations(&self) -> &TypeRelations {
        &self.relations
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Rewrite one member body in place.
    #[tracing::instrument(level = "debug", skip_all, fields(member = %body.name))]
    pub fn translate_member(&self, body: &mut MemberBody) -> RewriteOutput {
        let output = ilt_rewrite::rewrite_with(
            &mut body.arena,
            body.root,
            &self.relations,
            self.config.rewrite_options(),
        );
        for (rule, count) in output.stats.iter() {
            tracing::trace!(rule = rule.name(), count, "rule fired");
        }
        output
    }

    /// Rewrite every body, on a worker pool unless the config says otherwise.
    pub fn translate_all(&self, bodies: &mut [MemberBody]) -> TranslationReport {
        let outputs = if self.config.parallel && bodies.len() > 1 {
            self.translate_parallel(bodies)
        } else {
            self.translate_sequential(bodies)
        };

        let mut stats = RewriteStats::default();
        for output in &outputs {
            stats.merge(&output.stats);
        }
        tracing::info!(
            members = outputs.len(),
            folds = stats.total(),
            cached_relations = self.relations.cache().len(),
            "translation finished"
        );
        TranslationReport { outputs, stats }
    }

    fn translate_sequential(&self, bodies: &mut [MemberBody]) -> Vec<RewriteOutput> {
        bodies
            .iter_mut()
            .map(|body| self.translate_member(body))
            .collect()
    }

    /// A scoped pool is torn down before returning, so nothing is left to the
    /// global pool's exit handlers.
    fn translate_parallel(&self, bodies: &mut [MemberBody]) -> Vec<RewriteOutput> {
        let mut builder = rayon::ThreadPoolBuilder::new().stack_size(WORKER_STACK);
        if let Some(threads) = self.config.threads {
            builder = builder.num_threads(threads);
        }

        let work = &mut *bodies;
        let translated = builder.build_scoped(rayon::ThreadBuilder::run, move |pool| {
            pool.install(|| {
                work.par_iter_mut()
                    .map(|body| self.translate_member(body))
                    .collect::<Vec<_>>()
            })
        });

        match translated {
            Ok(outputs) => outputs,
            Err(error) => {
                tracing::warn!("failed to create thread pool ({error}), translating sequentially");
                self.translate_sequential(bodies)
            }
        }
    }
}
