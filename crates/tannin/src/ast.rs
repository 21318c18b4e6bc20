//! The parsed template tree.
//!
//! Templates are parsed once into a tree of [`Node`]s and rendered by
//! walking it, instead of rewriting the source text pass by pass. Control
//! directives become nested nodes; everything else is literal text or an
//! interpolation.

use crate::cond::CondExpr;
use crate::path::VarPath;

/// One node of a parsed template.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal output text.
    Text(String),
    /// `{$path.mod()}` interpolation. The context tracker may append an
    /// escaping modifier to the path's chain before rendering.
    Var(VarPath),
    /// `{if}…{elseif}…{else}…{endif}`.
    If(IfNode),
    /// `{loop key,item in path}…{endloop}`.
    Loop(LoopNode),
    /// `{block name}…{endblock}`.
    Block(BlockNode),
    /// `{switch}…{case}…{default}…{endswitch}` (legacy dialect).
    Switch(SwitchNode),
    /// `{include target, k=v…}`.
    Include(IncludeNode),
}

/// A conditional with its `elseif` chain.
#[derive(Debug, Clone, PartialEq)]
pub struct IfNode {
    /// `(condition, body)` for the `if` and each `elseif`, in order.
    pub branches: Vec<(CondExpr, Vec<Node>)>,
    /// The `{else}` body, if any.
    pub else_body: Option<Vec<Node>>,
}

/// An iteration over a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopNode {
    /// Binding for the element position or property name, if requested.
    pub key: Option<String>,
    /// Binding for the element value.
    pub item: String,
    /// Path to the collection.
    pub path: VarPath,
    pub body: Vec<Node>,
}

/// A named, override-able output region.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockNode {
    pub name: String,
    pub body: Vec<Node>,
}

/// A switch over one subject value.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchNode {
    /// The value being switched on.
    pub subject: CondExpr,
    /// `(case value, body)` in source order. The first loosely-equal case
    /// renders; there is no fallthrough.
    pub cases: Vec<(CondExpr, Vec<Node>)>,
    /// The `{default}` body, if any.
    pub default: Option<Vec<Node>>,
}

/// A nested template substitution.
#[derive(Debug, Clone, PartialEq)]
pub struct IncludeNode {
    /// Path or URL of the included content.
    pub target: String,
    /// `k=v` parameters bound into the child's context; a bare key binds
    /// `true`.
    pub params: Vec<(String, Option<String>)>,
}

/// A whole parsed template: its nodes plus the base it extends, if any.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TemplateAst {
    pub nodes: Vec<Node>,
    /// Base template path declared by `{extends}`.
    pub base: Option<String>,
}
