use colored::Colorize;
use corrode_common::{Diagnostic, DiagnosticCategory};
use corrode_coroutine::{ChildOrigin, FrameChild, PreflightStackFrame, format_frame};

use crate::driver::ResolveRun;

pub struct Reporter {
    color: bool,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter { color }
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    pub fn render_diagnostics<'d>(&self, diagnostics: impl IntoIterator<Item = &'d Diagnostic>) -> String {
        let mut out = String::new();
        for (index, diagnostic) in diagnostics.into_iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            out.push_str(&self.format_diagnostic(diagnostic));
        }
        out
    }

    /// `file:start-end - error C1001: message`
    pub fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String {
        let file = if diagnostic.file.is_empty() {
            "<unknown>"
        } else {
            diagnostic.file.as_str()
        };
        let location = format!(
            "{}:{}-{}",
            file,
            diagnostic.start,
            diagnostic.start + diagnostic.length
        );
        let location = if self.color {
            location.cyan().to_string()
        } else {
            location
        };

        format!(
            "{} - {} {}: {}",
            location,
            self.format_category(diagnostic.category),
            self.format_code(diagnostic.code),
            diagnostic.message_text
        )
    }

    pub fn render_summary(&self, run: &ResolveRun) -> String {
        let errors = run.diagnostics().filter(|d| d.is_error()).count();
        let summary = format!(
            "Resolved {} file{}, {} error{}.",
            run.files.len(),
            plural(run.files.len()),
            errors,
            plural(errors)
        );
        match (self.color, errors) {
            (false, _) => summary,
            (true, 0) => summary.green().to_string(),
            (true, _) => summary.red().bold().to_string(),
        }
    }

    fn format_category(&self, category: DiagnosticCategory) -> String {
        let label = match category {
            DiagnosticCategory::Error => "error",
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Suggestion => "suggestion",
            DiagnosticCategory::Message => "message",
        };
        if !self.color {
            return label.to_string();
        }
        match category {
            DiagnosticCategory::Error => label.red().bold().to_string(),
            DiagnosticCategory::Warning => label.yellow().bold().to_string(),
            DiagnosticCategory::Suggestion | DiagnosticCategory::Message => label.blue().to_string(),
        }
    }

    fn format_code(&self, code: u32) -> String {
        let code = format!("C{code}");
        if self.color {
            code.dimmed().to_string()
        } else {
            code
        }
    }

    // =========================================================================
    // Coroutine frames
    // =========================================================================

    /// The composite frame: coroutine header, restored logical frames,
    /// the physical frames it sits on, then its variables.
    pub fn render_frame(&self, frame: &PreflightStackFrame) -> String {
        let info = &frame.coroutine_info;
        let name = info
            .name
            .clone()
            .unwrap_or_else(|| info.root.to_string());
        let mut header = format!("Coroutine {name}");
        if let Some(type_name) = &info.root_type_name {
            header.push_str(&format!(" [{type_name}]"));
        }

        let mut lines = vec![if self.color {
            header.bold().to_string()
        } else {
            header
        }];
        for item in &info.stack_trace {
            lines.push(format!("  at {}", item.location));
        }
        if info.stack_trace.is_empty() {
            lines.push(format!("  at {}", format_frame(frame.descriptor.physical())));
        }

        lines.push(self.section("  resumed from"));
        for physical in &frame.thread_pre_coroutine_frames {
            lines.push(format!("    {}", format_frame(physical)));
        }

        let children = frame.children();
        if !children.is_empty() {
            lines.push(self.section("Variables"));
            lines.extend(children.iter().map(|child| self.format_child(child)));
        }
        lines.join("\n")
    }

    fn format_child(&self, child: &FrameChild) -> String {
        let line = format!("  {} = {}", child.name, child.value);
        match child.origin {
            ChildOrigin::Spilled if self.color => format!("{}  {}", line, "(spilled)".dimmed()),
            ChildOrigin::Spilled => format!("{line}  (spilled)"),
            ChildOrigin::This | ChildOrigin::Local => line,
        }
    }

    fn section(&self, title: &str) -> String {
        if self.color {
            title.dimmed().to_string()
        } else {
            title.to_string()
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}
