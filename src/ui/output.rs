use colored::*;
use serde_json::Value;
use terminal_size::{terminal_size, Width};

use crate::agent::{AgentEvent, EventSink};
use crate::error::GennyError;
use crate::ingest::IngestReport;
use crate::session::ProfileBuffer;

use super::highlight::AnswerRenderer;

const PROFILE_PREVIEW_CHARS: usize = 500;

pub fn terminal_width() -> usize {
    terminal_size()
        .map(|(Width(w), _)| w as usize)
        .unwrap_or(80)
}

fn rule() -> String {
    "─".repeat(terminal_width().min(80))
}

/// Renders agent progress as status lines on stderr.
pub struct ConsoleObserver {
    verbose: bool,
}

impl ConsoleObserver {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl EventSink for ConsoleObserver {
    fn emit(&self, event: AgentEvent) {
        match event {
            AgentEvent::ModelRequested { iteration } if iteration == 1 => {
                eprintln!("{}", "Thinking...".dimmed());
            }
            AgentEvent::ModelRequested { iteration } => {
                eprintln!("{}", format!("Reading results... (step {})", iteration).dimmed());
            }
            AgentEvent::ToolStarted { name, arguments, .. } => {
                display_tool_started(&name, &Value::Object(arguments));
            }
            AgentEvent::ToolFinished { name, error: Some(error), .. } => {
                display_tool_error(&name, &error);
            }
            AgentEvent::ToolFinished { name, chars, .. } => {
                if self.verbose {
                    eprintln!("{}", format!("✅ Found results ({}: {} chars).", name, chars).green());
                } else {
                    eprintln!("{}", "✅ Found results.".green());
                }
            }
            AgentEvent::Transition { .. } | AgentEvent::Completed { .. } => {}
        }
    }
}

pub fn display_tool_started(name: &str, arguments: &Value) {
    let label = if name == crate::tools::WEB_SEARCH_TOOL {
        "🔍 Searching"
    } else {
        "🔧 Calling tool"
    };
    let args = match arguments.get("query").and_then(|q| q.as_str()) {
        Some(query) => query.to_string(),
        None => arguments.to_string(),
    };
    eprintln!("{}", format!("{}: {}", label, args).cyan());
}

pub fn display_tool_error(name: &str, error: &str) {
    eprintln!("{}", format!("Tool '{}' failed: {}", name, error).yellow());
}

pub fn display_answer(renderer: &AnswerRenderer, text: &str) {
    if text.trim().is_empty() {
        println!("{}", "(The assistant returned an empty answer.)".dimmed());
        return;
    }
    println!("{}", renderer.render(text).trim_end());
    println!("{}", rule().dimmed());
}

pub fn display_error(err: &GennyError) {
    match err {
        GennyError::LoopLimitExceeded {
            partial: Some(partial),
            ..
        } => {
            eprintln!("{} {}", "Error:".red(), err);
            println!("{}", "Partial answer:".yellow());
            println!("{}", partial);
        }
        _ => eprintln!("{} {}", "An error occurred:".red(), err),
    }
}

pub fn display_warning(message: &str) {
    eprintln!("{}", message.yellow());
}

pub fn display_success(message: &str) {
    println!("{}", message.green());
}

pub fn display_ingest_report(report: &IngestReport) {
    for name in &report.loaded {
        println!("{}", format!("Read {}", name).dimmed());
    }
    for failure in &report.failures {
        eprintln!("{}", failure.to_string().red());
    }
    if report.has_new_text() {
        display_success("New File Loaded! ✅");
    }
}

pub fn display_profile(profile: &ProfileBuffer) {
    if profile.is_empty() {
        println!("{}", "No student data loaded yet. Use /upload <file>.".dimmed());
        return;
    }
    println!("{}", "Current analyzed data:".cyan());
    println!("{}", profile.preview(PROFILE_PREVIEW_CHARS));
}

pub fn display_students(names: &[String]) {
    if names.is_empty() {
        println!("{}", "No saved students.".dimmed());
        return;
    }
    println!("{}", "Saved students:".cyan());
    for name in names {
        println!("  {}", name);
    }
}

pub fn display_greeting(renderer: &AnswerRenderer, greeting: &str) {
    println!("{}", "Elite U.S. College Advisor".bold());
    println!("{}", rule().dimmed());
    display_answer(renderer, greeting);
}

pub fn display_help() {
    let lines = [
        ("/upload <path>...", "Add transcripts, resumes or score reports to the profile"),
        ("/profile", "Show the loaded student data"),
        ("/save <name>", "Save the profile under a student name"),
        ("/load <name>", "Replace the profile with a saved one"),
        ("/students", "List saved students"),
        ("/reset", "Clear the profile and start a new chat"),
        ("/quit", "Exit"),
    ];
    for (command, help) in lines {
        println!("  {:<20}{}", command.cyan(), help.dimmed());
    }
}
