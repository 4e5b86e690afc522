//! Dialect membership checking.
//!
//! A [Dialect] is a restricted set of permitted variants defining a
//! sub-language of the IR. The [DialectChecker] verifies that every node of
//! a tree belongs to the set. Violations are a query result, not an error:
//! the checker reports them in a [ConformanceReport] and never raises.

use crate::error::IrError;
use crate::ir::Node;
use crate::ir::NodeId;
use crate::ir::Schema;
use crate::visit::child_steps;
use crate::visit::Path;
use crate::visit::Visitor;
use std::collections::HashSet;
use std::sync::Arc;

/// A named set of permitted variants.
#[derive(Clone, Debug)]
pub struct Dialect {
    name: String,
    members: HashSet<String>,
}

impl Dialect {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            members: HashSet::new(),
        }
    }
    pub fn with_member(mut self, schema: &Arc<Schema>) -> Self {
        self.members.insert(schema.name().to_string());
        self
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Whether `schema` belongs to the dialect under the given membership
    /// rule.
    pub fn permits(&self, schema: &Schema, membership: Membership) -> bool {
        match membership {
            Membership::Exact => self.members.contains(schema.name()),
            Membership::IncludeDescendants => schema
                .ancestors()
                .any(|ancestor| self.members.contains(ancestor.name())),
        }
    }
}

/// How membership is decided.
///
/// The demonstrated use of dialects only exercises exact sets, so `Exact` is
/// the default; `IncludeDescendants` additionally accepts any variant whose
/// ancestor chain reaches a member.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Membership {
    Exact,
    IncludeDescendants,
}

/// Whether the check stops at the first violation or enumerates all of
/// them. In both modes the subtree below a violating node is never
/// explored.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CheckMode {
    FirstViolation,
    AllViolations,
}

/// One node found outside the dialect.
#[derive(Clone, Debug)]
pub struct Violation {
    pub kind: String,
    pub id: NodeId,
    /// The field path from the checked root down to the offending node.
    pub path: Path,
}

impl Violation {
    /// The path rendered as `body[1].left`, or `<root>` when the checked
    /// root itself is the violation.
    pub fn path_display(&self) -> String {
        if self.path.is_empty() {
            return "<root>".to_string();
        }
        self.path
            .iter()
            .map(|step| step.to_string())
            .collect::<Vec<String>>()
            .join(".")
    }
}

/// The outcome of a dialect check.
#[derive(Debug, Default)]
pub struct ConformanceReport {
    violations: Vec<Violation>,
}

impl ConformanceReport {
    pub fn is_conformant(&self) -> bool {
        self.violations.is_empty()
    }
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

/// A [Visitor] specialization that checks a tree against a dialect.
pub struct DialectChecker {
    dialect: Dialect,
    membership: Membership,
    mode: CheckMode,
}

struct CheckCtx {
    violations: Vec<Violation>,
    path: Path,
    done: bool,
}

impl DialectChecker {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            membership: Membership::Exact,
            mode: CheckMode::AllViolations,
        }
    }
    pub fn membership(mut self, membership: Membership) -> Self {
        self.membership = membership;
        self
    }
    pub fn mode(mut self, mode: CheckMode) -> Self {
        self.mode = mode;
        self
    }
    /// Check the whole tree rooted at `root`.
    ///
    /// Pre-order traversal; a violating node is recorded together with the
    /// field path leading to it and its subtree is skipped. `Err` can only
    /// arise from engine misuse, never from a violation.
    pub fn check(&self, root: &Node) -> Result<ConformanceReport, IrError> {
        let dialect = self.dialect.clone();
        let membership = self.membership;
        let mode = self.mode;
        let mut visitor: Visitor<CheckCtx> = Visitor::new();
        visitor.fallback(move |visitor, node, ctx: &mut CheckCtx| {
            if ctx.done {
                return Ok(());
            }
            if dialect.permits(node.schema(), membership) {
                for (step, child) in child_steps(node) {
                    ctx.path.push(step);
                    visitor.visit(child, ctx)?;
                    ctx.path.pop();
                    if ctx.done {
                        break;
                    }
                }
                Ok(())
            } else {
                ctx.violations.push(Violation {
                    kind: node.kind().to_string(),
                    id: node.id(),
                    path: ctx.path.clone(),
                });
                if mode == CheckMode::FirstViolation {
                    ctx.done = true;
                }
                Ok(())
            }
        });
        let mut ctx = CheckCtx {
            violations: vec![],
            path: vec![],
            done: false,
        };
        visitor.visit(root, &mut ctx)?;
        Ok(ConformanceReport {
            violations: ctx.violations,
        })
    }
}
