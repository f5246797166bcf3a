//! Annotation Scheduler
//!
//! Annotates a module tree bottom-up. Every module that still needs an
//! annotation gets its own task; a task waits on the completion signals of its
//! child modules, takes a permit from the shared semaphore and only then calls
//! the summarizer. Independent subtrees therefore proceed in parallel while a
//! parent never starts before all of its children have finished.
//!
//! Tasks never touch the tree. Outcomes are collected and written back
//! sequentially once every task has completed.

use crate::annotation::retry::RetryPolicy;
use crate::annotation::summarizer::{ChildAnnotation, FileContent, Summarizer, SummaryRequest};
use crate::annotation::Annotation;
use crate::error::{AnnotateError, AnnotationFailure, SummarizeError};
use crate::tree::{Module, ModuleTree, SourceFs, ROOT_NAME};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{oneshot, Semaphore};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// What a parent does when one of its children failed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Fail the parent with a dependency error
    #[default]
    Propagate,
    /// Summarize the parent from the children that did succeed
    SummarizeWithGaps,
}

/// Configuration for annotation runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    /// Maximum summarizer calls in flight at once
    pub max_concurrent: usize,
    /// Maximum retries of a rate-limited call
    pub max_retry_attempts: usize,
    /// Delay before the first retry (milliseconds)
    pub retry_delay_ms: u64,
    /// Upper bound for a single retry delay (milliseconds)
    pub max_retry_delay_ms: u64,
    pub failure_policy: FailurePolicy,
    /// Stop scheduling new summarizer calls after the first real failure
    pub cancel_on_first_error: bool,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            max_retry_attempts: 3,
            retry_delay_ms: 1000,
            max_retry_delay_ms: 30_000,
            failure_policy: FailurePolicy::Propagate,
            cancel_on_first_error: false,
        }
    }
}

impl AnnotationConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_concurrent == 0 {
            return Err("annotation.max_concurrent must be at least 1".to_string());
        }
        if self.retry_delay_ms > self.max_retry_delay_ms {
            return Err(format!(
                "annotation.retry_delay_ms ({}) exceeds annotation.max_retry_delay_ms ({})",
                self.retry_delay_ms, self.max_retry_delay_ms
            ));
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retry_attempts: self.max_retry_attempts,
            base_delay: Duration::from_millis(self.retry_delay_ms),
            max_delay: Duration::from_millis(self.max_retry_delay_ms),
        }
    }
}

/// Counters for one annotation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotationReport {
    /// Modules that received a fresh annotation
    pub annotated: usize,
    /// Modules that already carried an annotation
    pub reused: usize,
    pub failed: usize,
    /// Summarizer invocations, retries included
    pub calls: usize,
}

/// Completion signal sent from a child task to its parent. `None` means the
/// child ended without an annotation.
type Signal = Option<Annotation>;

/// One module to annotate, detached from the tree
struct Job {
    id: String,
    name: String,
    path: String,
    files: Vec<String>,
    children: Vec<usize>,
    existing: Option<Annotation>,
}

struct PendingChild {
    name: String,
    path: String,
    signal: oneshot::Receiver<Signal>,
}

/// State shared by every task of a run
struct TaskContext {
    summarizer: Arc<dyn Summarizer>,
    source: Arc<dyn SourceFs>,
    semaphore: Semaphore,
    cancel: CancellationToken,
    retry: RetryPolicy,
    failure_policy: FailurePolicy,
    cancel_on_first_error: bool,
}

pub struct AnnotationScheduler {
    summarizer: Arc<dyn Summarizer>,
    source: Arc<dyn SourceFs>,
    config: AnnotationConfig,
    cancel: CancellationToken,
}

impl AnnotationScheduler {
    pub fn new(
        source: Arc<dyn SourceFs>,
        summarizer: Arc<dyn Summarizer>,
        config: AnnotationConfig,
    ) -> Self {
        Self {
            summarizer,
            source,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Token aborting every run of this scheduler once cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &AnnotationConfig {
        &self.config
    }

    /// Annotate every module of `tree` that has no annotation yet.
    ///
    /// Successful annotations are written back even when other modules fail;
    /// the returned failure then lists every module left without one.
    pub async fn annotate(
        &self,
        tree: &mut ModuleTree,
    ) -> Result<AnnotationReport, AnnotationFailure> {
        let started = Instant::now();
        let mut jobs = Vec::with_capacity(tree.module_count());
        plan(tree.root(), &mut jobs);

        let context = Arc::new(TaskContext {
            summarizer: Arc::clone(&self.summarizer),
            source: Arc::clone(&self.source),
            semaphore: Semaphore::new(self.config.max_concurrent.max(1)),
            cancel: self.cancel.child_token(),
            retry: self.config.retry_policy(),
            failure_policy: self.config.failure_policy,
            cancel_on_first_error: self.config.cancel_on_first_error,
        });

        let identities: Vec<(String, String)> = jobs
            .iter()
            .map(|job| (job.name.clone(), job.path.clone()))
            .collect();
        let mut senders = Vec::with_capacity(jobs.len());
        let mut receivers = Vec::with_capacity(jobs.len());
        for _ in 0..jobs.len() {
            let (tx, rx) = oneshot::channel::<Signal>();
            senders.push(Some(tx));
            receivers.push(Some(rx));
        }

        let mut report = AnnotationReport::default();
        let mut outcomes: Vec<Option<Result<Annotation, AnnotateError>>> = vec![None; jobs.len()];
        let mut spawned = Vec::new();
        let mut handles = Vec::new();

        for (index, mut job) in jobs.into_iter().enumerate() {
            let signal = senders[index].take();
            if let Some(annotation) = job.existing.take() {
                // Nobody may be listening if the parent is done as well
                if let Some(tx) = signal {
                    let _ = tx.send(Some(annotation));
                }
                report.reused += 1;
                continue;
            }

            let children: Vec<PendingChild> = job
                .children
                .iter()
                .filter_map(|&child| {
                    let (name, path) = &identities[child];
                    receivers[child].take().map(|signal| PendingChild {
                        name: name.clone(),
                        path: path.clone(),
                        signal,
                    })
                })
                .collect();

            spawned.push((index, job.id.clone()));
            let context = Arc::clone(&context);
            handles.push(tokio::spawn(async move {
                run_job(&context, job, children, signal).await
            }));
        }

        debug!(
            tasks = spawned.len(),
            reused = report.reused,
            max_concurrent = self.config.max_concurrent,
            "Spawned annotation tasks"
        );

        let results = futures::future::join_all(handles).await;
        for ((index, id), joined) in spawned.into_iter().zip(results) {
            let (outcome, calls) = match joined {
                Ok(done) => done,
                Err(err) => {
                    error!(module = %id, error = %err, "Annotation task aborted");
                    (Err(AnnotateError::TaskPanicked { module: id }), 0)
                }
            };
            report.calls += calls;
            outcomes[index] = Some(outcome);
        }

        let mut failed = Vec::new();
        let mut index = 0;
        tree.root_mut().for_each_post_order_mut(&mut |module: &mut Module| {
            if let Some(outcome) = outcomes.get_mut(index).and_then(Option::take) {
                match outcome {
                    Ok(annotation) => {
                        module.set_annotation(annotation);
                        report.annotated += 1;
                    }
                    Err(err) => failed.push(err),
                }
            }
            index += 1;
        });
        report.failed = failed.len();

        info!(
            annotated = report.annotated,
            reused = report.reused,
            failed = report.failed,
            calls = report.calls,
            duration_ms = started.elapsed().as_millis(),
            "Annotation run completed"
        );

        let first = failed
            .iter()
            .find(|err| !err.is_propagated())
            .or_else(|| failed.first())
            .cloned();
        match first {
            None => Ok(report),
            Some(first) => Err(AnnotationFailure {
                first,
                failed,
                report,
            }),
        }
    }
}

/// Flatten the subtree into `jobs` in post-order, returning the index of
/// `module`'s own job
fn plan(module: &Module, jobs: &mut Vec<Job>) -> usize {
    let children = module
        .modules()
        .iter()
        .map(|child| plan(child, jobs))
        .collect();
    jobs.push(Job {
        id: module_id(module.path()),
        name: module.name().to_string(),
        path: module.path().to_string(),
        files: module.files().iter().map(|f| f.path.clone()).collect(),
        children,
        existing: module.annotation().cloned(),
    });
    jobs.len() - 1
}

/// Module identity used in errors and logs
fn module_id(path: &str) -> String {
    if path.is_empty() {
        ROOT_NAME.to_string()
    } else {
        path.to_string()
    }
}

async fn run_job(
    context: &TaskContext,
    job: Job,
    children: Vec<PendingChild>,
    signal: Option<oneshot::Sender<Signal>>,
) -> (Result<Annotation, AnnotateError>, usize) {
    let (outcome, calls) = annotate_module(context, &job, children).await;

    if let Err(err) = &outcome {
        if context.cancel_on_first_error && !err.is_propagated() {
            warn!(module = %job.id, "Cancelling remaining annotation work");
            context.cancel.cancel();
        }
    }
    if let Some(tx) = signal {
        let _ = tx.send(outcome.as_ref().ok().cloned());
    }
    (outcome, calls)
}

async fn annotate_module(
    context: &TaskContext,
    job: &Job,
    children: Vec<PendingChild>,
) -> (Result<Annotation, AnnotateError>, usize) {
    let mut child_annotations = Vec::with_capacity(children.len());
    let mut first_failed = None;
    for child in children {
        match child.signal.await {
            Ok(Some(annotation)) => child_annotations.push(ChildAnnotation {
                name: child.name,
                path: child.path,
                annotation,
            }),
            // a dropped sender means the child task died
            Ok(None) | Err(_) => {
                if first_failed.is_none() {
                    first_failed = Some(module_id(&child.path));
                }
            }
        }
    }

    if let Some(dependency) = first_failed {
        match context.failure_policy {
            FailurePolicy::Propagate => {
                debug!(module = %job.id, dependency = %dependency, "Child failed, propagating");
                return (
                    Err(AnnotateError::DependencyFailed {
                        module: job.id.clone(),
                        dependency,
                    }),
                    0,
                );
            }
            FailurePolicy::SummarizeWithGaps => {
                warn!(module = %job.id, dependency = %dependency, "Summarizing with missing child");
            }
        }
    }

    if context.cancel.is_cancelled() {
        return (Err(cancelled(job)), 0);
    }

    if job.files.is_empty() && job.children.is_empty() {
        return (Ok(Annotation::default()), 0);
    }

    let mut files = Vec::with_capacity(job.files.len());
    for path in &job.files {
        match context.source.read(path) {
            Ok(bytes) => files.push(FileContent {
                path: path.clone(),
                content: String::from_utf8_lossy(&bytes).into_owned(),
            }),
            Err(err) => {
                error!(module = %job.id, path = %path, error = %err, "Failed to read module file");
                return (
                    Err(AnnotateError::Content {
                        module: job.id.clone(),
                        path: path.clone(),
                        message: err.to_string(),
                    }),
                    0,
                );
            }
        }
    }

    let request = SummaryRequest {
        module_name: job.name.clone(),
        module_path: job.path.clone(),
        files,
        children: child_annotations,
    };
    summarize_with_retry(context, job, request).await
}

async fn summarize_with_retry(
    context: &TaskContext,
    job: &Job,
    request: SummaryRequest,
) -> (Result<Annotation, AnnotateError>, usize) {
    let mut calls = 0;
    let mut retry_count = 0;
    loop {
        let permit = tokio::select! {
            permit = context.semaphore.acquire() => permit,
            _ = context.cancel.cancelled() => return (Err(cancelled(job)), calls),
        };
        let Ok(permit) = permit else {
            return (Err(cancelled(job)), calls);
        };
        if context.cancel.is_cancelled() {
            return (Err(cancelled(job)), calls);
        }

        calls += 1;
        let start = Instant::now();
        let result = context.summarizer.summarize(request.clone()).await;
        drop(permit);

        match result {
            Ok(annotation) => {
                debug!(
                    module = %job.id,
                    calls,
                    duration_ms = start.elapsed().as_millis(),
                    "Module annotated"
                );
                return (Ok(annotation), calls);
            }
            Err(err) if err.is_retryable() && context.retry.should_retry(retry_count) => {
                let retry_after = match &err {
                    SummarizeError::RateLimited { retry_after } => *retry_after,
                    SummarizeError::Failed(_) => None,
                };
                let delay = context.retry.delay_for(retry_count, retry_after);
                retry_count += 1;
                warn!(
                    module = %job.id,
                    retry_count,
                    delay_ms = delay.as_millis(),
                    "Summarizer rate limited, retrying"
                );
                tokio::select! {
                    _ = sleep(delay) => {}
                    _ = context.cancel.cancelled() => return (Err(cancelled(job)), calls),
                }
            }
            Err(err) => {
                error!(
                    module = %job.id,
                    retry_count,
                    error = %err,
                    "Annotation failed permanently"
                );
                return (
                    Err(AnnotateError::Summarize {
                        module: job.id.clone(),
                        source: err,
                    }),
                    calls,
                );
            }
        }
    }
}

fn cancelled(job: &Job) -> AnnotateError {
    AnnotateError::Cancelled {
        module: job.id.clone(),
    }
}
