use crate::api::ResourceApi;
use crate::logic::fetch::{PageFetcher, DEFAULT_PAGE_SIZE};
use crate::logic::report::{SyncReporter, LOG_REPORTER};
use crate::logic::resolve::CustomFieldResolver;
use crate::logic::stats::report_relationship_coverage;
use crate::model::{
    catalog, generate_run_id, CustomField, CustomFieldOption, Id, Resource, ResourceConfig,
};
use crate::store::MirrorStore;
use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Resource types a project sync depends on, in order.
const PROJECT_SYNC: &[&str] = &[
    "subsidiaries",
    "companies",
    "custom_fields",
    "custom_field_options",
    "workflows",
    "projects",
];

/// Resource types a deal sync depends on, in order.
const DEAL_SYNC: &[&str] = &[
    "subsidiaries",
    "companies",
    "people",
    "custom_fields",
    "custom_field_options",
    "deal_statuses",
    "deals",
];

/// Outcome of syncing one resource type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceOutcome {
    pub fetched: usize,
    pub stored: u64,
    pub entities_resolved: usize,
    pub entities_failed: usize,
}

/// Aggregate outcome of a sync run.
#[derive(Debug, Default)]
pub struct SyncSummary {
    pub run_id: Id,
    pub outcomes: BTreeMap<String, ResourceOutcome>,
    pub elapsed: Duration,
}

impl SyncSummary {
    pub fn total_fetched(&self) -> usize {
        self.outcomes.values().map(|outcome| outcome.fetched).sum()
    }

    pub fn total_entities_failed(&self) -> usize {
        self.outcomes
            .values()
            .map(|outcome| outcome.entities_failed)
            .sum()
    }

    fn log(&self) {
        log::info!(
            "sync run {} finished: {} resource types, {} records in {:.2?}",
            self.run_id,
            self.outcomes.len(),
            self.total_fetched(),
            self.elapsed
        );
        for (name, outcome) in &self.outcomes {
            log::info!(
                "  {}: {} fetched, {} stored, {} entities resolved, {} failed",
                name,
                outcome.fetched,
                outcome.stored,
                outcome.entities_resolved,
                outcome.entities_failed
            );
        }
    }
}

/// Sequences fetchers over the catalog in dependency order, hands the fetched
/// resources to the store, and runs custom-field resolution for entity types
/// that carry one. Strictly sequential; the first fetch failure aborts the
/// remaining sequence.
pub struct SyncRunner<'a, A: ResourceApi + ?Sized, S: MirrorStore + ?Sized> {
    api: &'a A,
    store: &'a S,
    page_size: usize,
    reporter: &'a dyn SyncReporter,
}

impl<'a, A: ResourceApi + ?Sized, S: MirrorStore + ?Sized> SyncRunner<'a, A, S> {
    pub fn new(api: &'a A, store: &'a S) -> Self {
        Self {
            api,
            store,
            page_size: DEFAULT_PAGE_SIZE,
            reporter: &LOG_REPORTER,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_reporter(mut self, reporter: &'a dyn SyncReporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Sync every resource type in the catalog.
    pub async fn sync_all(&self) -> Result<SyncSummary> {
        self.sync_configs(&catalog()).await
    }

    /// Sync projects and everything they depend on.
    pub async fn sync_projects(&self) -> Result<SyncSummary> {
        self.sync_named(PROJECT_SYNC).await
    }

    /// Sync deals and everything they depend on.
    pub async fn sync_deals(&self) -> Result<SyncSummary> {
        self.sync_named(DEAL_SYNC).await
    }

    /// Sync the named catalog entries in the given order.
    pub async fn sync_named(&self, names: &[impl AsRef<str>]) -> Result<SyncSummary> {
        let mut configs = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            match crate::model::find(name) {
                Some(config) => configs.push(config),
                None => bail!("unknown resource type '{}'", name),
            }
        }
        self.sync_configs(&configs).await
    }

    /// Run the given fetch sequence. The first failure halts the run; later
    /// resource types are not attempted.
    pub async fn sync_configs(&self, configs: &[ResourceConfig]) -> Result<SyncSummary> {
        let run_id = generate_run_id();
        let started = Instant::now();
        log::info!(
            "sync run {} starting: {} resource types",
            run_id,
            configs.len()
        );

        let mut outcomes = BTreeMap::new();
        for config in configs {
            let outcome = self
                .sync_resource(config)
                .await
                .with_context(|| format!("sync aborted at resource '{}'", config.name))?;
            outcomes.insert(config.name.to_string(), outcome);
        }

        let summary = SyncSummary {
            run_id,
            outcomes,
            elapsed: started.elapsed(),
        };
        summary.log();
        Ok(summary)
    }

    /// Fetch, report and store a single resource type.
    pub async fn sync_resource(&self, config: &ResourceConfig) -> Result<ResourceOutcome> {
        let started = Instant::now();

        let resources = PageFetcher::new(self.api)
            .with_page_size(self.page_size)
            .with_reporter(self.reporter)
            .fetch_all(config)
            .await?;

        report_relationship_coverage(self.reporter, config.name, &resources, config.includes.names());

        let stored = self
            .store
            .upsert_resources(config.name, &resources)
            .await
            .with_context(|| format!("Failed to store {} resources", config.name))?;

        self.index_field_catalog(config, &resources).await?;

        let (entities_resolved, entities_failed) = if config.custom_fields {
            self.resolve_entities(config, &resources).await?
        } else {
            (0, 0)
        };

        log::info!(
            "{}: {} fetched, {} stored in {:.2?}",
            config.name,
            resources.len(),
            stored,
            started.elapsed()
        );

        Ok(ResourceOutcome {
            fetched: resources.len(),
            stored,
            entities_resolved,
            entities_failed,
        })
    }

    /// Custom field and option resources also populate the typed lookup
    /// tables the resolver reads.
    async fn index_field_catalog(
        &self,
        config: &ResourceConfig,
        resources: &[Resource],
    ) -> Result<()> {
        match config.name {
            "custom_fields" => {
                let fields: Vec<CustomField> = resources
                    .iter()
                    .filter_map(CustomField::from_resource)
                    .collect();
                self.store
                    .upsert_custom_fields(&fields)
                    .await
                    .context("Failed to index custom fields")?;
            }
            "custom_field_options" => {
                let options: Vec<CustomFieldOption> = resources
                    .iter()
                    .filter_map(CustomFieldOption::from_resource)
                    .collect();
                self.store
                    .upsert_custom_field_options(&options)
                    .await
                    .context("Failed to index custom field options")?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Resolve custom field values entity by entity. One entity's failure is
    /// counted and reported but never aborts the batch.
    async fn resolve_entities(
        &self,
        config: &ResourceConfig,
        resources: &[Resource],
    ) -> Result<(usize, usize)> {
        let mut resolved = 0usize;
        let mut failed = 0usize;

        for resource in resources {
            let Some(fields) = resource.custom_fields() else {
                continue;
            };
            match CustomFieldResolver::resolve_entity(self.store, &resource.id, config.name, fields)
                .await
            {
                Ok(rows) => {
                    resolved += 1;
                    self.reporter.entity_resolved(config.name, &resource.id, rows);
                }
                Err(err) => {
                    failed += 1;
                    self.reporter
                        .entity_failed(config.name, &resource.id, &format!("{:#}", err));
                }
            }
        }

        Ok((resolved, failed))
    }
}
