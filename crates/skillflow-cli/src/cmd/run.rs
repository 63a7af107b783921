use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use skillflow_client::{
    ClientConfig, InvocationRequest, InvocationResult, InvokeOptions, Progress, ProgressHandler,
};
use tokio_util::sync::CancellationToken;

use crate::output::{print_json, print_outputs};

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(clap::Args)]
pub struct RunArgs {
    /// Instruction text for the workflow
    #[arg(long)]
    task: String,

    /// Extra background passed alongside the task
    #[arg(long, default_value = "")]
    context: String,

    /// Research depth, clamped to 1..=5
    #[arg(long, default_value = "3", allow_negative_numbers = true)]
    depth: i64,

    /// Give up after this many seconds (default: wait for the stream to close)
    #[arg(long)]
    timeout: Option<u64>,

    /// Don't print node progress to stderr
    #[arg(long, short = 'q')]
    quiet: bool,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(config: ClientConfig, args: RunArgs, json: bool) -> Result<()> {
    let request = InvocationRequest::new(args.task)?
        .with_context(args.context)
        .with_depth(args.depth);

    let rt = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    let result = rt.block_on(invoke(config, &request, args.timeout, args.quiet));

    if json {
        print_json(&result)?;
    }

    match result {
        InvocationResult::Success { data, metadata } => {
            if !json {
                print_outputs(&data, &metadata);
            }
            Ok(())
        }
        InvocationResult::Failure { error } => anyhow::bail!(error),
    }
}

async fn invoke(
    config: ClientConfig,
    request: &InvocationRequest,
    timeout: Option<u64>,
    quiet: bool,
) -> InvocationResult {
    let token = CancellationToken::new();
    let on_interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, cancelling workflow");
            on_interrupt.cancel();
        }
    });

    let mut options = InvokeOptions::default().cancel_with(token);
    if let Some(secs) = timeout {
        options = options.timeout(Duration::from_secs(secs));
    }
    if !quiet {
        options = options.on_progress(progress_printer());
    }

    skillflow_client::invoke(config, request, options).await
}

fn progress_printer() -> ProgressHandler {
    Arc::new(|progress: &Progress| match progress {
        Progress::NodeStarted { title } => eprintln!("[started]  {title}"),
        Progress::NodeFinished { title } => eprintln!("[finished] {title}"),
        Progress::WorkflowFinished { run_id } if run_id.is_empty() => {
            eprintln!("[done]")
        }
        Progress::WorkflowFinished { run_id } => eprintln!("[done]     run {run_id}"),
    })
}
