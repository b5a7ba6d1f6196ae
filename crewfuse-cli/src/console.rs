//! Human-readable progress banners on stdout.

#![allow(clippy::print_stdout)]

use async_trait::async_trait;
use crewfuse::callback::{CrewHooks, LoggingHooks, Phase};
use crewfuse::crew::{Crew, CrewOutput};
use crewfuse::task::{TaskDescriptor, TaskOutput};
use crewfuse::Error;

const RULE_WIDTH: usize = 70;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Prints a titled banner between two rules.
pub fn banner(title: &str) {
    println!("\n{}", rule());
    println!(" {title}");
    println!("{}\n", rule());
}

/// Headline for the completion banner.
///
/// A trace error only reaches here when the crew itself succeeded, so it reads
/// as a completed run whose traces were lost.
#[must_use]
pub const fn outcome_label(outcome: Result<(), &Error>) -> &'static str {
    match outcome {
        Ok(()) => "RUN COMPLETED",
        Err(e) if e.is_trace() => "RUN COMPLETED, TRACES NOT DELIVERED",
        Err(_) => "RUN FAILED",
    }
}

/// Prints the completion banner and, when tracing is on, where to find it.
pub fn completion(outcome: Result<(), &Error>, langfuse_host: Option<&str>) {
    println!("\n{}", rule());
    println!(" {}", outcome_label(outcome));
    println!("{}", rule());

    if let Some(host) = langfuse_host {
        println!("\nView logs in LangFuse: {host}");
    }
}

/// Prints phase and task banners, then forwards to [`LoggingHooks`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleHooks {
    log: LoggingHooks,
}

#[async_trait]
impl CrewHooks for ConsoleHooks {
    async fn on_phase(&self, phase: Phase) {
        match phase {
            Phase::Executing => println!("\n {phase}...\n"),
            _ => println!(" {phase}..."),
        }
        self.log.on_phase(phase).await;
    }

    async fn on_crew_start(&self, crew: &Crew) {
        self.log.on_crew_start(crew).await;
    }

    async fn on_task_start(&self, index: usize, task: &TaskDescriptor) {
        println!(" [{}] {}", index + 1, task.agent().role());
        self.log.on_task_start(index, task).await;
    }

    async fn on_task_end(&self, index: usize, output: &TaskOutput) {
        self.log.on_task_end(index, output).await;
    }

    async fn on_crew_end(&self, crew: &Crew, output: &CrewOutput) {
        self.log.on_crew_end(crew, output).await;
        banner("CREW RESULTS:");
        println!("{output}");
        println!("{}", rule());
    }

    async fn on_error(&self, crew: &Crew, err: &Error) {
        self.log.on_error(crew, err).await;
    }
}
