//! Human-readable compilation traces
//!
//! Renders the tree back into surface syntax after each reduction, with the
//! nodes reduced so far shown as their regex fragments. Everything here runs
//! after compilation has finished, from the recorded [`Reduction`]s.

use crate::ast::{NodePath, Term};
use crate::compiler::Reduction;
use std::collections::HashMap;
use std::fmt;

/// Render a term in surface syntax
pub fn render(term: &Term) -> String {
    term.to_string()
}

/// Render a term in surface syntax, writing the fragment from `compiled`
/// in place of every node whose path it contains
pub fn render_partial(term: &Term, compiled: &HashMap<NodePath, String>) -> String {
    let mut out = String::new();
    term.write_surface(&mut Vec::new(), &mut out, &|path: &[usize]| {
        compiled.get(path).map(String::as_str)
    });
    out
}

/// One line of a trace
#[derive(Debug, Clone, PartialEq)]
pub struct TraceStep {
    /// What happened: `Original`, a rule name, `#Macro`, or `Final`
    pub label: String,
    /// The whole expression as it looks after this step
    pub rendering: String,
}

/// The full sequence of steps of one compilation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trace {
    steps: Vec<TraceStep>,
}

impl Trace {
    /// Replay `reductions` over `term`, ending with the final `fragment`
    pub fn build(term: &Term, reductions: &[Reduction], fragment: &str) -> Self {
        let mut steps = vec![TraceStep {
            label: "Original".to_string(),
            rendering: render(term),
        }];

        let mut compiled = HashMap::new();
        for reduction in reductions {
            compiled.insert(reduction.path.clone(), reduction.fragment.clone());
            let label = match term.at(&reduction.path) {
                Some(Term::MacroCall { name, .. }) => format!("#{}", name),
                _ => reduction.rule.to_string(),
            };
            steps.push(TraceStep {
                label,
                rendering: render_partial(term, &compiled),
            });
        }

        steps.push(TraceStep {
            label: "Final".to_string(),
            rendering: fragment.to_string(),
        });
        Trace { steps }
    }

    /// All steps, first to last
    pub fn steps(&self) -> &[TraceStep] {
        &self.steps
    }

    /// Check if nothing was traced
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            writeln!(f, "  {:18} {}", step.label, step.rendering)?;
        }
        Ok(())
    }
}
