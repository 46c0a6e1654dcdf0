//! Benchmark runner - executes a suite against one model on a worker task

use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::{
    validate_model_config, validate_suite, AnswerFormat, DomainError, FewShotExample,
    ModelConfig, ModelEndpoint, PromptBuilder, ResponseGrader, RunEvent, RunId, RunProgress,
    RunReport, RunStatus, TestCase, TestResult, TokenUsage,
};
use crate::infrastructure::metrics::{record_generation, record_test, GenerationMetricParams};

const DEFAULT_GENERATE_TIMEOUT: Duration = Duration::from_secs(180);
const DEFAULT_EVENT_BUFFER: usize = 64;

/// One benchmark run to execute
#[derive(Debug, Clone)]
pub struct RunRequest {
    suite: Vec<TestCase>,
    model: ModelConfig,
    few_shot: Vec<FewShotExample>,
    include_case_examples: bool,
    timeout: Option<Duration>,
    cancel: Option<CancellationToken>,
}

impl RunRequest {
    pub fn new(suite: Vec<TestCase>, model: ModelConfig) -> Self {
        Self {
            suite,
            model,
            few_shot: Vec::new(),
            include_case_examples: true,
            timeout: None,
            cancel: None,
        }
    }

    pub fn with_few_shot(mut self, examples: Vec<FewShotExample>) -> Self {
        self.few_shot = examples;
        self
    }

    /// Prompt without the examples carried by individual test cases
    pub fn without_case_examples(mut self) -> Self {
        self.include_case_examples = false;
        self
    }

    /// Bound each generate call, overriding the runner default
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Use a caller-owned cancellation token instead of a fresh one
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn suite(&self) -> &[TestCase] {
        &self.suite
    }

    pub fn model(&self) -> &ModelConfig {
        &self.model
    }
}

/// Runs benchmark suites, at most one at a time per runner
#[derive(Debug)]
pub struct BenchmarkRunner {
    endpoint: Arc<dyn ModelEndpoint>,
    prompt_builder: PromptBuilder,
    grader: ResponseGrader,
    generate_timeout: Duration,
    event_buffer: usize,
    active: Arc<AtomicBool>,
}

impl BenchmarkRunner {
    pub fn new(endpoint: Arc<dyn ModelEndpoint>) -> Self {
        Self {
            endpoint,
            prompt_builder: PromptBuilder::default(),
            grader: ResponseGrader::default(),
            generate_timeout: DEFAULT_GENERATE_TIMEOUT,
            event_buffer: DEFAULT_EVENT_BUFFER,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Ask for and extract answers through `format` for every run
    pub fn with_answer_format(mut self, format: AnswerFormat) -> Self {
        self.prompt_builder = PromptBuilder::new(format.clone());
        self.grader = ResponseGrader::new(format);
        self
    }

    pub fn with_generate_timeout(mut self, timeout: Duration) -> Self {
        self.generate_timeout = timeout;
        self
    }

    pub fn with_event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = capacity.max(1);
        self
    }

    /// Whether a run is currently executing
    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Validate the request, check the endpoint, and start the run on a worker task.
    ///
    /// Fails without issuing any generate call when the configuration or suite
    /// is invalid, another run is active, or the endpoint cannot be reached.
    pub async fn start(&self, request: RunRequest) -> Result<BenchmarkRun, DomainError> {
        validate_model_config(&request.model)
            .map_err(|e| DomainError::validation(e.to_string()))?;
        validate_suite(&request.suite).map_err(|e| DomainError::validation(e.to_string()))?;

        let guard = RunGuard::acquire(&self.active)?;

        let model_name = request.model.name().to_string();
        match self.endpoint.list_models().await {
            Ok(installed) if !installed.contains(&model_name) => {
                warn!(
                    model = %model_name,
                    endpoint = %self.endpoint.location(),
                    "Model is not listed as installed; generate calls may fail"
                );
            }
            Ok(_) => {}
            Err(e) if e.is_unreachable() => return Err(e),
            Err(e) => {
                warn!(error = %e, "Could not list installed models; continuing");
            }
        }

        let run_id = RunId::new();
        let started_at = Utc::now();
        let cancel = request.cancel.clone().unwrap_or_default();
        let (tx, rx) = mpsc::channel(self.event_buffer);

        let prompt_builder = if request.include_case_examples {
            self.prompt_builder.clone()
        } else {
            self.prompt_builder.clone().without_case_examples()
        };

        let worker = RunWorker {
            run_id: run_id.clone(),
            endpoint: Arc::clone(&self.endpoint),
            prompt_builder,
            grader: self.grader.clone(),
            timeout: request.timeout.unwrap_or(self.generate_timeout),
            suite: request.suite,
            model: request.model,
            few_shot: request.few_shot,
            cancel: cancel.clone(),
            events: tx,
            started_at,
            _guard: guard,
        };

        let handle = tokio::spawn(worker.execute());

        Ok(BenchmarkRun {
            run_id,
            model_name,
            started_at,
            events: ReceiverStream::new(rx),
            cancel,
            handle,
            observed: Vec::new(),
        })
    }
}

/// Marks the runner busy until dropped
#[derive(Debug)]
struct RunGuard {
    active: Arc<AtomicBool>,
}

impl RunGuard {
    fn acquire(active: &Arc<AtomicBool>) -> Result<Self, DomainError> {
        active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| DomainError::RunAlreadyInProgress)?;

        Ok(Self {
            active: Arc::clone(active),
        })
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

struct RunWorker {
    run_id: RunId,
    endpoint: Arc<dyn ModelEndpoint>,
    prompt_builder: PromptBuilder,
    grader: ResponseGrader,
    timeout: Duration,
    suite: Vec<TestCase>,
    model: ModelConfig,
    few_shot: Vec<FewShotExample>,
    cancel: CancellationToken,
    events: mpsc::Sender<RunEvent>,
    started_at: DateTime<Utc>,
    _guard: RunGuard,
}

impl RunWorker {
    async fn execute(self) -> RunReport {
        let total = self.suite.len();
        info!(
            run_id = %self.run_id,
            model = %self.model.name(),
            temperature = self.model.temperature(),
            tests = total,
            "Benchmark run started"
        );

        let mut results = Vec::with_capacity(total);
        let mut status = RunStatus::Running;

        if !self
            .emit(RunEvent::Started {
                run_id: self.run_id.clone(),
                total,
            })
            .await
        {
            status = RunStatus::Cancelled;
        }

        for (index, test_case) in self.suite.iter().enumerate() {
            if status == RunStatus::Cancelled || self.cancel.is_cancelled() {
                status = RunStatus::Cancelled;
                break;
            }

            let current = RunProgress::new(index, total).with_current(test_case.name());
            if !self.emit(RunEvent::Progress(current)).await {
                status = RunStatus::Cancelled;
                break;
            }

            let result = self.run_test(test_case).await;
            results.push(result.clone());

            let delivered = self.emit(RunEvent::Result(result)).await
                && self
                    .emit(RunEvent::Progress(RunProgress::new(index + 1, total)))
                    .await;
            if !delivered {
                status = RunStatus::Cancelled;
            }
        }

        if status == RunStatus::Running {
            status = RunStatus::Completed;
        }

        let passed = results.iter().filter(|r: &&TestResult| r.passed()).count();
        info!(
            run_id = %self.run_id,
            model = %self.model.name(),
            status = %status,
            completed = results.len(),
            passed = passed,
            "Benchmark run finished"
        );

        RunReport {
            run_id: self.run_id.clone(),
            model_name: self.model.name().to_string(),
            status,
            results,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }

    /// Send an event; `false` means nobody is listening any more
    async fn emit(&self, event: RunEvent) -> bool {
        self.events.send(event).await.is_ok()
    }

    async fn run_test(&self, test_case: &TestCase) -> TestResult {
        let prompt = self.prompt_builder.build(test_case, &self.few_shot);
        let model_name = self.model.name();

        let start = Instant::now();
        let generate = self.endpoint.generate(&self.model, &prompt, self.timeout);
        let outcome = tokio::time::timeout(self.timeout, generate)
            .await
            .unwrap_or_else(|_| Err(DomainError::timeout("Generation", self.timeout)));
        let elapsed = start.elapsed();

        let result = match outcome {
            Ok(response) => {
                let tokens = TokenUsage::from_response(&response);
                record_generation(GenerationMetricParams {
                    endpoint: self.endpoint.location(),
                    model: model_name,
                    duration: elapsed,
                    success: true,
                    tokens,
                });

                let graded = self.grader.grade(test_case, &response.text);
                TestResult::graded(test_case, model_name, graded, response.text, elapsed)
                    .with_tokens(tokens)
            }
            Err(e) => {
                record_generation(GenerationMetricParams {
                    endpoint: self.endpoint.location(),
                    model: model_name,
                    duration: elapsed,
                    success: false,
                    tokens: None,
                });
                warn!(
                    test_id = %test_case.id(),
                    model = %model_name,
                    error = %e,
                    "Generation failed"
                );

                TestResult::execution_error(test_case, model_name, e.to_string(), elapsed)
            }
        };

        record_test(model_name, result.passed());
        debug!(
            test_id = %test_case.id(),
            passed = result.passed(),
            seconds = result.response_time_seconds(),
            grading_error = ?result.grading_error(),
            "Test graded"
        );

        result
    }
}

/// Handle to a running benchmark: its events, its cancellation token and its report
#[derive(Debug)]
pub struct BenchmarkRun {
    run_id: RunId,
    model_name: String,
    started_at: DateTime<Utc>,
    events: ReceiverStream<RunEvent>,
    cancel: CancellationToken,
    handle: JoinHandle<RunReport>,
    observed: Vec<TestResult>,
}

impl BenchmarkRun {
    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// Stop issuing new tests; the test in flight still completes
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Next event in run order, or `None` once the run has ended
    pub async fn next_event(&mut self) -> Option<RunEvent> {
        self.next().await
    }

    /// Drain remaining events and wait for the final report
    pub async fn finish(mut self) -> RunReport {
        while self.next().await.is_some() {}

        match self.handle.await {
            Ok(report) => report,
            Err(e) => {
                warn!(run_id = %self.run_id, error = %e, "Benchmark worker aborted");
                RunReport {
                    run_id: self.run_id,
                    model_name: self.model_name,
                    status: RunStatus::Failed,
                    results: self.observed,
                    started_at: self.started_at,
                    finished_at: Utc::now(),
                }
            }
        }
    }
}

impl Stream for BenchmarkRun {
    type Item = RunEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let polled = Pin::new(&mut self.events).poll_next(cx);
        if let Poll::Ready(Some(RunEvent::Result(result))) = &polled {
            self.observed.push(result.clone());
        }
        polled
    }
}
