//! Dispatch orchestration
//!
//! Top-level control flow for one test invocation:
//! resolve → classify → (all-cached short-circuit | dispatch) → record.
//!
//! Cache writes only ever follow a completed execution: a run cancelled or
//! failed before the tool finished writes nothing, so no unexecuted target
//! can be recorded as passing. All failures abort the run immediately; the
//! ledger is only complete once `dispatch` returns `Ok`.

use crate::arguments::{compose_skip_arguments, scheme_argument, test_plan_argument};
use crate::classifier::{candidate_keys, classify};
use crate::ledger::RunLedger;
use crate::resolver::resolve_test_targets;
use crate::runner::TestRunner;
use crate::service::SelectiveTestingService;
use crate::Result;
use seltest_cache::{CacheBackend, CacheCategory, CacheItem, CacheSource, CacheStorableItem};
use seltest_core::{Error as CoreError, GraphContentHasher, GraphMapper, TestIdentifier};
use std::path::Path;

/// What one dispatch did, plus the completed run ledger.
#[derive(Debug)]
pub struct DispatchOutcome {
    /// The scheme the invocation targeted
    pub scheme: String,
    /// The test plan, when one was selected
    pub test_plan: Option<String>,
    /// The argument vector the underlying tool was (or would have been)
    /// invoked with
    pub arguments: Vec<String>,
    /// Whether every resolved target was cached and the tool was never run
    pub all_cached: bool,
    /// Identifiers skipped via cache hits, in declaration order
    pub skipped: Vec<TestIdentifier>,
    /// Identifiers that were executed this run, in declaration order
    pub executed: Vec<TestIdentifier>,
    /// The run's reporting ledger, complete and read-only
    pub ledger: RunLedger,
}

/// Orchestrates one selective-test run over injected collaborators.
pub struct TestDispatcher<'a> {
    mapper: &'a dyn GraphMapper,
    hasher: &'a dyn GraphContentHasher,
    backend: &'a dyn CacheBackend,
    service: &'a dyn SelectiveTestingService,
    runner: &'a dyn TestRunner,
    additional_hash_inputs: Vec<String>,
}

impl<'a> TestDispatcher<'a> {
    /// Create a dispatcher over the given collaborators
    pub fn new(
        mapper: &'a dyn GraphMapper,
        hasher: &'a dyn GraphContentHasher,
        backend: &'a dyn CacheBackend,
        service: &'a dyn SelectiveTestingService,
        runner: &'a dyn TestRunner,
    ) -> Self {
        Self {
            mapper,
            hasher,
            backend,
            service,
            runner,
            additional_hash_inputs: Vec::new(),
        }
    }

    /// Fold extra seed strings into every target hash (cross-cutting
    /// cache-busting inputs such as environment fingerprints).
    #[must_use]
    pub fn with_additional_hash_inputs(mut self, inputs: Vec<String>) -> Self {
        self.additional_hash_inputs = inputs;
        self
    }

    /// Run one dispatch: decide what to skip, invoke the tool if anything
    /// remains, and record the outcome.
    ///
    /// The scheme designation is checked before any graph mapping or
    /// hashing; an argument vector without `-scheme` fails with no side
    /// effects.
    ///
    /// # Errors
    /// Resolution, hashing, cache and invocation failures all abort the run
    /// with the originating error; nothing is recorded for a failed run.
    #[tracing::instrument(name = "dispatch", skip(self, arguments))]
    pub async fn dispatch(&self, root: &Path, arguments: &[String]) -> Result<DispatchOutcome> {
        // Fail fast on user input before touching the graph.
        let scheme_name = scheme_argument(arguments)?;
        let test_plan = test_plan_argument(arguments);

        let graph = self.mapper.map(root)?;
        let resolved = resolve_test_targets(&graph, &scheme_name, test_plan.as_deref())?;
        let hashes = self.hasher.hash_graph(&graph, &self.additional_hash_inputs)?;

        let (_, scheme) = graph
            .find_scheme(&scheme_name)
            .ok_or_else(|| CoreError::scheme_not_found(&scheme_name))?;
        let classification = classify(
            scheme,
            &graph,
            &resolved,
            &hashes,
            self.backend,
            self.service,
        )
        .await?;

        let mut ledger = RunLedger::new(graph.clone());

        if classification.all_cached(&resolved) {
            // The tool is never invoked and nothing new was produced, so no
            // store occurs; the ledger gets the hits with their original
            // provenance.
            for candidate in &resolved {
                if let Some(item) = classification.items.get(&candidate.identifier) {
                    ledger.record(&candidate.graph_target.project_path, item.clone());
                }
            }
            tracing::info!(
                scheme = %scheme_name,
                targets = resolved.len(),
                "Every test target is cached; skipping the invocation entirely"
            );
            return Ok(DispatchOutcome {
                scheme: scheme_name,
                test_plan,
                arguments: arguments.to_vec(),
                all_cached: true,
                skipped: classification.skippable,
                executed: Vec::new(),
                ledger,
            });
        }

        let composed = compose_skip_arguments(arguments, &classification.skippable);
        tracing::info!(
            scheme = %scheme_name,
            skipped = classification.skippable.len(),
            executed = resolved.len() - classification.skippable.len(),
            "Dispatching with cache-reduced invocation"
        );
        self.runner.run(&composed).await?;

        // Recording: persist every identifier that actually ran, then fill
        // the ledger with one item per resolved candidate.
        let keys = candidate_keys(&resolved, &hashes)?;
        let mut executed = Vec::new();
        let mut storable: Vec<CacheStorableItem> = Vec::new();
        for (candidate, key) in resolved.iter().zip(&keys) {
            if classification.is_hit(&candidate.identifier) {
                continue;
            }
            executed.push(candidate.identifier.clone());
            storable.push(key.clone());
        }
        if !storable.is_empty() {
            self.backend
                .store(&storable, CacheCategory::SelectiveTests)
                .await?;
        }

        for (candidate, key) in resolved.iter().zip(&keys) {
            let item = match classification.items.get(&candidate.identifier) {
                Some(existing) if classification.is_hit(&candidate.identifier) => existing.clone(),
                _ => CacheItem::new(
                    candidate.identifier.as_str(),
                    &key.hash,
                    CacheCategory::SelectiveTests,
                    CacheSource::Miss,
                ),
            };
            ledger.record(&candidate.graph_target.project_path, item);
        }

        Ok(DispatchOutcome {
            scheme: scheme_name,
            test_plan,
            arguments: composed,
            all_cached: false,
            skipped: classification.skippable,
            executed,
            ledger,
        })
    }
}
