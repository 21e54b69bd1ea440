//! The brain pipeline: one state document in, at most one new task out.
//!
//! Every invocation runs the same fixed sequence:
//!
//!   Readiness → Compile → Infer → Trim → Parse → Assemble
//!
//! The gateway is asked for a completion only after it reports ready, and the
//! document is touched only after the completion parses. Any failure before
//! assembly leaves the caller's document exactly as it was handed in.

use std::time::Instant;

use tracing::{debug, info, warn};

use aiminer_contracts::{
    document::StateDocument,
    error::{BrainError, BrainResult},
    inference::{InferenceRequest, SamplingConfig},
    outcome::{InvocationId, ProcessOutcome},
};

use crate::{
    assembler,
    traits::{
        Clock, DocumentDecoder, InferenceGateway, PromptCompiler, ResponseParser, SerdeDecoder,
        SystemClock,
    },
};

/// Wires the prompt compiler, inference gateway and response parser together.
///
/// The pipeline holds no per-request state, so a single instance can be shared
/// (behind an `Arc`) by any number of concurrent callers.
pub struct BrainPipeline {
    compiler: Box<dyn PromptCompiler>,
    gateway: Box<dyn InferenceGateway>,
    parser: Box<dyn ResponseParser>,
    decoder: Box<dyn DocumentDecoder>,
    clock: Box<dyn Clock>,
    sampling: SamplingConfig,
}

impl BrainPipeline {
    /// Create a pipeline with the system clock, the plain serde decoder and
    /// the fixed sampling configuration.
    pub fn new(
        compiler: Box<dyn PromptCompiler>,
        gateway: Box<dyn InferenceGateway>,
        parser: Box<dyn ResponseParser>,
    ) -> Self {
        Self {
            compiler,
            gateway,
            parser,
            decoder: Box::new(SerdeDecoder),
            clock: Box::new(SystemClock),
            sampling: SamplingConfig::default(),
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_decoder(mut self, decoder: Box<dyn DocumentDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn gateway_ready(&self) -> bool {
        self.gateway.is_ready()
    }

    pub fn gateway_description(&self) -> String {
        self.gateway.describe()
    }

    /// Render the prompt for `document` without calling the gateway.
    pub fn compile(&self, document: &StateDocument) -> String {
        self.compiler.compile(document)
    }

    /// Decode raw JSON and run the pipeline on it.
    ///
    /// Readiness is checked first, so an unavailable gateway is reported even
    /// for input that would not decode.
    pub fn process_value(&self, raw: serde_json::Value) -> BrainResult<ProcessOutcome> {
        self.ensure_ready()?;
        let document = self.decoder.decode(raw)?;
        self.run(document, InvocationId::new())
    }

    /// Run one invocation on a decoded document.
    ///
    /// # Errors
    ///
    /// `GatewayUnavailable` when the gateway is not ready (the gateway is
    /// never asked to infer), and whatever the gateway raises from `infer`.
    /// A completion that does not parse is not an error: the outcome carries
    /// `task_added = false` and the document unchanged.
    pub fn process(&self, document: StateDocument) -> BrainResult<ProcessOutcome> {
        self.ensure_ready()?;
        self.run(document, InvocationId::new())
    }

    fn ensure_ready(&self) -> BrainResult<()> {
        if self.gateway.is_ready() {
            return Ok(());
        }
        let gateway = self.gateway.describe();
        warn!(gateway = %gateway, "inference gateway not ready, refusing request");
        Err(BrainError::GatewayUnavailable {
            reason: format!("{gateway} is not ready"),
        })
    }

    fn run(&self, document: StateDocument, invocation: InvocationId) -> BrainResult<ProcessOutcome> {
        let started = Instant::now();

        debug!(
            invocation = %invocation,
            existing_tasks = document.task_count(),
            "brain pipeline starting"
        );

        // ── Compile ──────────────────────────────────────────────────────────
        let prompt = self.compiler.compile(&document);
        debug!(invocation = %invocation, prompt_chars = prompt.len(), "prompt compiled");

        // ── Infer ────────────────────────────────────────────────────────────
        let request = InferenceRequest::new(prompt, self.sampling.clone());
        let raw = self.gateway.infer(&request).map_err(|e| {
            warn!(invocation = %invocation, error = %e, "inference failed");
            e
        })?;
        let completion = raw.trim().to_string();
        debug!(invocation = %invocation, completion = %completion, "completion received");

        // ── Parse ────────────────────────────────────────────────────────────
        let Some(task) = self.parser.parse(&completion) else {
            warn!(
                invocation = %invocation,
                completion = %completion,
                "completion did not match the action grammar, no task added"
            );
            return Ok(ProcessOutcome {
                document,
                task_added: false,
                task: None,
                processing_time_ms: elapsed_ms(started),
                completion,
            });
        };

        // ── Assemble ─────────────────────────────────────────────────────────
        let (document, task) = assembler::assemble(document, task, self.clock.now_millis())?;

        info!(
            invocation = %invocation,
            task_id = task.id,
            task_type = %task.task_type(),
            "task added"
        );

        Ok(ProcessOutcome {
            document,
            task_added: true,
            task: Some(task),
            processing_time_ms: elapsed_ms(started),
            completion,
        })
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

// ── Tests ────────────────────────────────────────────────────────────────────
