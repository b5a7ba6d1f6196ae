//! The two-stage research crew.
//!
//! An "AI Research Specialist" gathers material and a "Technical Writer"
//! turns it into a report. An optional topic narrows both tasks by
//! prefixing their descriptions. The whole run is reported as one trace
//! named [`TRACE_NAME`].

use std::sync::Arc;

use tracing::info;

use crate::agent::AgentDescriptor;
use crate::callback::{CrewHooks, Phase};
use crate::crew::{Crew, CrewOutput, Process};
use crate::error::Result;
use crate::orchestrator::Orchestrator;
use crate::task::TaskDescriptor;
use crate::trace::{self, SharedTraceCollector, TraceRecord, TraceSession};

/// Name of the trace reported for a research run.
pub const TRACE_NAME: &str = "crewai_research";

/// Topic reported in trace metadata when none is given.
pub const DEFAULT_TOPIC: &str = "AI advancements";

/// Name of the assembled crew.
pub const CREW_NAME: &str = "research";

/// Role of the research agent.
pub const RESEARCH_ROLE: &str = "AI Research Specialist";
/// Goal of the research agent.
pub const RESEARCH_GOAL: &str = "Research the latest advancements in AI technology";
/// Backstory of the research agent.
pub const RESEARCH_BACKSTORY: &str = "You are an AI enthusiast with a passion for staying updated \
on cutting-edge developments in artificial intelligence. You excel at finding, analyzing, and \
summarizing the most recent and relevant information about AI advancements.";

/// Role of the writer agent.
pub const WRITER_ROLE: &str = "Technical Writer";
/// Goal of the writer agent.
pub const WRITER_GOAL: &str = "Write comprehensive reports on AI technology based on research";
/// Backstory of the writer agent.
pub const WRITER_BACKSTORY: &str = "You are a skilled technical writer with expertise in \
translating complex AI concepts into clear and engaging content. You have a talent for creating \
well-structured, informative reports that are accessible to both technical and non-technical \
audiences.";

/// Research task description before topic injection.
pub const RESEARCH_DESCRIPTION: &str = "Research the latest advancements in AI technology.

Focus on:
1. Recent breakthroughs in AI models and architectures
2. New applications of AI in various industries
3. Emerging trends and future directions
4. Key challenges and ethical considerations

Provide a detailed summary with specific examples and data where available.";

/// What the research task should produce.
pub const RESEARCH_EXPECTED_OUTPUT: &str =
    "A detailed research summary of AI advancements with specific examples and data.";

/// Writing task description before topic injection.
pub const WRITING_DESCRIPTION: &str = "Write a comprehensive report on the latest advancements \
in AI technology based on the research provided.

The report should include:
1. Executive Summary
2. Key AI Advancements
3. Industry Applications
4. Future Trends
5. Challenges and Considerations
6. Conclusion

Make it engaging, well-structured, and professionally formatted.";

/// What the writing task should produce.
pub const WRITING_EXPECTED_OUTPUT: &str =
    "A well-structured comprehensive report on AI technology (minimum 500 words).";

/// The research specialist.
#[must_use]
pub fn research_agent() -> AgentDescriptor {
    AgentDescriptor::new(RESEARCH_ROLE, RESEARCH_GOAL, RESEARCH_BACKSTORY)
        .allow_delegation(false)
        .verbose(true)
}

/// The technical writer.
#[must_use]
pub fn writer_agent() -> AgentDescriptor {
    AgentDescriptor::new(WRITER_ROLE, WRITER_GOAL, WRITER_BACKSTORY)
        .allow_delegation(false)
        .verbose(true)
}

/// The research stage, assigned to `agent`.
#[must_use]
pub fn research_task(agent: Arc<AgentDescriptor>) -> TaskDescriptor {
    TaskDescriptor::new(RESEARCH_DESCRIPTION, RESEARCH_EXPECTED_OUTPUT, agent)
}

/// The writing stage, assigned to `agent`.
#[must_use]
pub fn writing_task(agent: Arc<AgentDescriptor>) -> TaskDescriptor {
    TaskDescriptor::new(WRITING_DESCRIPTION, WRITING_EXPECTED_OUTPUT, agent)
}

/// Returns the topic if it is present and non-empty.
///
/// An empty string counts as no topic. Whitespace is kept as given.
#[must_use]
pub fn effective_topic(topic: Option<&str>) -> Option<&str> {
    topic.filter(|t| !t.is_empty())
}

/// Narrows both tasks to `topic`.
///
/// Prepends `"Research {topic}. "` to the research description and
/// `"Write a report about {topic}. "` to the writing description. Without an
/// effective topic both descriptions are left untouched.
pub fn inject_topic(
    research: &mut TaskDescriptor,
    writing: &mut TaskDescriptor,
    topic: Option<&str>,
) {
    if let Some(topic) = effective_topic(topic) {
        research.prefix_description(&format!("Research {topic}. "));
        writing.prefix_description(&format!("Write a report about {topic}. "));
    }
}

/// Orders the two stages into a sequential crew: research, then writing.
fn assemble(
    researcher: Arc<AgentDescriptor>,
    writer: Arc<AgentDescriptor>,
    research: TaskDescriptor,
    writing: TaskDescriptor,
) -> Crew {
    Crew::new(CREW_NAME)
        .agents([researcher, writer])
        .tasks([research, writing])
        .process(Process::Sequential)
}

fn research_agents() -> (Arc<AgentDescriptor>, Arc<AgentDescriptor>) {
    (Arc::new(research_agent()), Arc::new(writer_agent()))
}

/// Both stages, already narrowed to `topic`.
fn research_tasks(
    researcher: &Arc<AgentDescriptor>,
    writer: &Arc<AgentDescriptor>,
    topic: Option<&str>,
) -> (TaskDescriptor, TaskDescriptor) {
    let mut research = research_task(Arc::clone(researcher));
    let mut writing = writing_task(Arc::clone(writer));
    inject_topic(&mut research, &mut writing, topic);
    (research, writing)
}

/// Builds the research crew for an optional topic without running it.
#[must_use]
pub fn build_research_crew(topic: Option<&str>) -> Crew {
    let (researcher, writer) = research_agents();
    let (research, writing) = research_tasks(&researcher, &writer, topic);
    assemble(researcher, writer, research, writing)
}

/// The trace record for a research run: name plus `system` and `topic`
/// metadata.
#[must_use]
pub fn trace_record(topic: Option<&str>) -> TraceRecord {
    TraceRecord::new(TRACE_NAME)
        .metadata("system", "multi-agent")
        .metadata("topic", effective_topic(topic).unwrap_or(DEFAULT_TOPIC))
}

/// Builds and runs the research crew inside an open trace session.
///
/// Reports each assembly phase to `hooks`, awaits the orchestrator until both
/// stages finish and records the stringified result as the trace output.
///
/// # Errors
///
/// Any orchestrator or trace error, unchanged.
pub async fn run_research_crew(
    orchestrator: &dyn Orchestrator,
    hooks: &dyn CrewHooks,
    session: &TraceSession,
    topic: Option<&str>,
) -> Result<CrewOutput> {
    hooks.on_phase(Phase::CreatingAgents).await;
    let (researcher, writer) = research_agents();

    hooks.on_phase(Phase::CreatingTasks).await;
    let (research, writing) = research_tasks(&researcher, &writer, topic);

    hooks.on_phase(Phase::AssemblingCrew).await;
    let crew = assemble(researcher, writer, research, writing);

    hooks.on_phase(Phase::Executing).await;
    info!(trace_id = %session.trace_id(), tasks = crew.task_list().len(), "kicking off crew");
    let output = orchestrator.kickoff(&crew).await?;

    session.record_output(&output.to_string()).await?;
    Ok(output)
}

/// Runs the research crew under a fresh trace and flushes `collector` on
/// every exit path.
///
/// # Errors
///
/// The run error if the crew failed, otherwise the flush error if delivery
/// failed.
pub async fn run_research(
    orchestrator: &dyn Orchestrator,
    hooks: &dyn CrewHooks,
    collector: SharedTraceCollector,
    topic: Option<&str>,
) -> Result<CrewOutput> {
    trace::scoped(collector, trace_record(topic), |session| async move {
        run_research_crew(orchestrator, hooks, &session, topic).await
    })
    .await
}
