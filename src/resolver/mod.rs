//! Dependency resolution between fields.
//!
//! Cascading selections (province → district → ward, or any dependent
//! dropdown) are declared on fields as parent/child ids. Resolution turns
//! those declarations into a [`DependencyGraph`] and reports the links that
//! cannot be honoured:
//!
//! - a link naming a field id the template does not have
//! - a cycle, where a field is transitively its own parent
//!
//! These are [`TemplateDefect`]s, not parse failures. A template with a
//! broken dependency still parses and can be rendered read-only; validation
//! reports the defects as structural errors so the form cannot be marked
//! compliant.
//!
//! Row-template fields are checked once against the row template, not once
//! per submitted row.

pub mod dependency_graph;

pub use dependency_graph::DependencyGraph;

use crate::core::TemplateDefect;
use crate::model::Template;

/// A dependency graph together with the defects found while building it.
#[derive(Debug)]
pub struct Resolution<'a> {
    /// Graph over the template's fields, dangling links excluded
    pub graph: DependencyGraph<'a>,
    /// Dangling links and cycles
    pub structural_errors: Vec<TemplateDefect>,
}

impl Resolution<'_> {
    /// Whether the dependencies are fully consistent.
    #[must_use]
    pub fn is_sound(&self) -> bool {
        self.structural_errors.is_empty()
    }
}

/// Build the dependency graph for a template.
pub fn resolve_dependencies(template: &Template) -> Resolution<'_> {
    let (graph, structural_errors) = dependency_graph::build_graph(template);
    tracing::debug!(
        target: "resolver",
        "Resolved {} dependency edge(s) for {}, {} defect(s)",
        graph.edge_count(),
        template.form_code(),
        structural_errors.len()
    );
    Resolution {
        graph,
        structural_errors,
    }
}
