//! Workspace facade: wires the source, measurer, summarizer and store together.

use crate::annotation::{AnnotationReport, AnnotationScheduler, Summarizer};
use crate::config::{ConfigLoader, ModtreeConfig};
use crate::document::MetadataDocument;
use crate::error::{AnnotationFailure, ApiError, StorageError, TreeError};
use crate::patch::{IncrementalPatcher, PatchReport};
use crate::store::{FileStore, MetadataStore};
use crate::tree::{
    collapse_folders, BudgetConfig, BudgetRebalancer, DiskFs, ModuleTree, ModuleTreeBuilder,
    SizeMeasurer, SourceFs, TokenMeasurer,
};
use crate::workspace::types::UpdateOutcome;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct Workspace {
    source: Arc<dyn SourceFs>,
    measurer: Arc<dyn SizeMeasurer>,
    store: Arc<dyn MetadataStore>,
    scheduler: AnnotationScheduler,
    budget: BudgetConfig,
}

impl Workspace {
    pub fn new(
        source: Arc<dyn SourceFs>,
        measurer: Arc<dyn SizeMeasurer>,
        summarizer: Arc<dyn Summarizer>,
        store: Arc<dyn MetadataStore>,
        config: &ModtreeConfig,
    ) -> Result<Self, ApiError> {
        config.validate()?;
        Ok(Self {
            scheduler: AnnotationScheduler::new(
                Arc::clone(&source),
                summarizer,
                config.annotation.clone(),
            ),
            source,
            measurer,
            store,
            budget: config.budget,
        })
    }

    /// Workspace rooted at a directory on disk, configured from its
    /// `.modtree/config.toml` and the environment, measuring in tokens.
    pub fn open(root: &Path, summarizer: Arc<dyn Summarizer>) -> Result<Self, ApiError> {
        let source = DiskFs::new(root).map_err(|source| TreeError::PathResolution {
            path: root.display().to_string(),
            source,
        })?;
        let config = ConfigLoader::load(source.root())?;
        let store = FileStore::new(config.storage.resolve_metadata_path(source.root()));
        info!(
            root = %source.root().display(),
            metadata = %store.path().display(),
            "Opened workspace"
        );
        Self::new(
            Arc::new(source),
            Arc::new(TokenMeasurer::new()?),
            summarizer,
            Arc::new(store),
            &config,
        )
    }

    /// Token cancelling in-flight annotation work
    pub fn cancellation_token(&self) -> CancellationToken {
        self.scheduler.cancellation_token()
    }

    /// Build, collapse and rebalance a fresh tree from the selected paths
    pub fn build_tree<S: AsRef<str>>(&self, paths: &[S]) -> Result<ModuleTree, ApiError> {
        let mut tree =
            ModuleTreeBuilder::new(self.source.as_ref(), self.measurer.as_ref()).build(paths)?;
        collapse_folders(&mut tree);
        let report = BudgetRebalancer::new(self.budget).rebalance(&mut tree);
        info!(
            modules = tree.module_count(),
            weight = tree.root().aggregate_weight(),
            merged = report.merged,
            rejected = report.rejected,
            "Built module tree"
        );
        Ok(tree)
    }

    pub async fn annotate(
        &self,
        tree: &mut ModuleTree,
    ) -> Result<AnnotationReport, AnnotationFailure> {
        self.scheduler.annotate(tree).await
    }

    /// Previously stored tree, if any
    pub fn load(&self) -> Result<Option<ModuleTree>, ApiError> {
        match self.store.load()? {
            Some(document) => Ok(Some(document.into_tree()?)),
            None => Ok(None),
        }
    }

    /// First run: build, annotate and store. Fails before doing any work if
    /// a document already exists.
    pub async fn create<S: AsRef<str> + Sync>(
        &self,
        paths: &[S],
    ) -> Result<UpdateOutcome, ApiError> {
        if self.store.exists()? {
            return Err(StorageError::AlreadyExists(self.store.location()).into());
        }
        let mut tree = self.build_tree(paths)?;
        let annotation = self.annotate(&mut tree).await;
        self.store.create(&MetadataDocument::from_tree(&tree))?;
        Ok(UpdateOutcome {
            tree,
            patch: PatchReport::default(),
            annotation: annotation?,
        })
    }

    /// Rebuild from the selected paths, carry still-valid annotations forward
    /// from the stored tree, annotate the rest and store the result.
    ///
    /// The tree is stored even when some modules fail to annotate, so the
    /// annotations that did succeed are reused by the next run.
    pub async fn update<S: AsRef<str> + Sync>(
        &self,
        paths: &[S],
    ) -> Result<UpdateOutcome, ApiError> {
        let previous = self.load()?;
        let mut tree = self.build_tree(paths)?;
        let patch = match &previous {
            Some(previous) => IncrementalPatcher::patch(previous, &mut tree),
            None => PatchReport::default(),
        };
        drop(previous);

        let annotation = self.annotate(&mut tree).await;
        self.store.save(&MetadataDocument::from_tree(&tree))?;
        Ok(UpdateOutcome {
            tree,
            patch,
            annotation: annotation?,
        })
    }

    /// Delete the stored document. Returns whether one existed.
    pub fn remove(&self) -> Result<bool, ApiError> {
        Ok(self.store.remove()?)
    }
}
