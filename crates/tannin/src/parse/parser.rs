//! Builds the template tree from the token stream.
//!
//! One pass over the tokens produces nested [`Node`]s. The `{extends}`
//! directive is consumed here — it contributes no node, only the base
//! reference on the resulting [`TemplateAst`] — and declaring it twice is a
//! fatal inheritance error.

use crate::ast::{BlockNode, IfNode, IncludeNode, LoopNode, Node, SwitchNode, TemplateAst};
use crate::cond::CondExpr;
use crate::error::{RenderError, Result};
use crate::path::VarPath;

use super::tokenizer::{split_directive, Token};

/// Parses a token stream into a template tree.
pub fn parse(tokens: Vec<Token<'_>>) -> Result<TemplateAst> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        base: None,
    };
    let (nodes, terminator) = parser.parse_nodes(&[])?;
    if let Some(body) = terminator {
        return Err(RenderError::eval("unexpected directive", format!("{{{body}}}")));
    }
    Ok(TemplateAst {
        nodes,
        base: parser.base,
    })
}

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    base: Option<String>,
}

impl<'a> Parser<'a> {
    /// Parses nodes until a directive whose keyword is in `terminators` (its
    /// full body is returned) or the end of input (`None`).
    fn parse_nodes(&mut self, terminators: &[&str]) -> Result<(Vec<Node>, Option<&'a str>)> {
        let mut nodes = Vec::new();
        while self.pos < self.tokens.len() {
            let token = self.tokens[self.pos];
            self.pos += 1;
            match token {
                Token::Text(text) => nodes.push(Node::Text(text.to_string())),
                Token::Interp(body) => nodes.push(Node::Var(VarPath::parse(body))),
                Token::Directive(body) => {
                    let (keyword, rest) = split_directive(body);
                    if terminators.contains(&keyword) {
                        return Ok((nodes, Some(body)));
                    }
                    match keyword {
                        "extends" => self.handle_extends(rest)?,
                        "if" => nodes.push(self.parse_if(rest)?),
                        "loop" | "for" => nodes.push(self.parse_loop(body, rest)?),
                        "block" => nodes.push(self.parse_block(rest)?),
                        "switch" => nodes.push(self.parse_switch(body, rest)?),
                        "include" => nodes.push(parse_include(rest)),
                        _ => {
                            return Err(RenderError::eval(
                                "unexpected directive",
                                format!("{{{body}}}"),
                            ))
                        }
                    }
                }
            }
        }
        Ok((nodes, None))
    }

    fn handle_extends(&mut self, rest: &str) -> Result<()> {
        if self.base.is_some() {
            return Err(RenderError::MultipleExtends);
        }
        self.base = Some(unquote(rest).to_string());
        Ok(())
    }

    fn parse_if(&mut self, condition: &str) -> Result<Node> {
        let mut branches = Vec::new();
        let mut else_body = None;
        let mut cond = parse_condition(condition)?;
        loop {
            let (body, terminator) = self.parse_nodes(&["elseif", "else", "endif", "/if"])?;
            let Some(term) = terminator else {
                return Err(RenderError::eval("missing {endif}", "{if}"));
            };
            let (keyword, rest) = split_directive(term);
            match keyword {
                "elseif" => {
                    branches.push((cond, body));
                    cond = parse_condition(rest)?;
                }
                "else" => {
                    branches.push((cond, body));
                    let (tail, terminator) = self.parse_nodes(&["endif", "/if"])?;
                    if terminator.is_none() {
                        return Err(RenderError::eval("missing {endif}", "{else}"));
                    }
                    else_body = Some(tail);
                    break;
                }
                _ => {
                    branches.push((cond, body));
                    break;
                }
            }
        }
        Ok(Node::If(IfNode {
            branches,
            else_body,
        }))
    }

    fn parse_loop(&mut self, full: &str, rest: &str) -> Result<Node> {
        let fragment = format!("{{{full}}}");
        let Some((vars_part, path_part)) = rest.split_once(" in ") else {
            return Err(RenderError::eval("malformed loop, expected 'in'", fragment));
        };

        let vars = strip_whitespace(vars_part);
        let mut names = vars.split(',').map(|v| v.trim_start_matches('$'));
        let first = names.next().unwrap_or("");
        let second = names.next();
        let (key, item) = match second {
            Some(item) => (Some(first), item),
            None => (None, first),
        };
        if item.is_empty() {
            return Err(RenderError::eval("loop is missing an item binding", fragment));
        }

        let path = VarPath::parse(path_part.trim().trim_start_matches('$'));
        let (body, terminator) =
            self.parse_nodes(&["endloop", "endfor", "/loop", "/for"])?;
        if terminator.is_none() {
            return Err(RenderError::eval("missing {endloop}", fragment));
        }
        Ok(Node::Loop(LoopNode {
            key: key.filter(|k| !k.is_empty()).map(str::to_string),
            item: item.to_string(),
            path,
            body,
        }))
    }

    fn parse_block(&mut self, rest: &str) -> Result<Node> {
        let name = unquote(rest).to_string();
        let (body, terminator) = self.parse_nodes(&["endblock"])?;
        if terminator.is_none() {
            return Err(RenderError::eval("missing {endblock}", format!("{{block {name}}}")));
        }
        Ok(Node::Block(BlockNode { name, body }))
    }

    fn parse_switch(&mut self, full: &str, rest: &str) -> Result<Node> {
        let fragment = format!("{{{full}}}");
        let subject = parse_condition(rest)?;
        let mut cases = Vec::new();
        let mut default = None;

        // Text between {switch} and the first {case} is not rendered.
        let (_, mut terminator) =
            self.parse_nodes(&["case", "default", "endswitch", "/switch"])?;
        loop {
            let Some(term) = terminator else {
                return Err(RenderError::eval("missing {endswitch}", fragment));
            };
            let (keyword, term_rest) = split_directive(term);
            match keyword {
                "case" => {
                    let value = parse_condition(term_rest)?;
                    let (body, next) = self.parse_nodes(&[
                        "case", "default", "endswitch", "/switch", "endcase", "/case",
                    ])?;
                    cases.push((value, body));
                    terminator = self.skip_case_end(next)?;
                }
                "default" => {
                    let (body, next) =
                        self.parse_nodes(&["endswitch", "/switch", "endcase", "/case"])?;
                    default = Some(body);
                    terminator = self.skip_case_end(next)?;
                }
                _ => break, // endswitch or /switch
            }
        }
        Ok(Node::Switch(SwitchNode {
            subject,
            cases,
            default,
        }))
    }

    /// After a case body closed by `{endcase}`, scans ahead to whatever ends
    /// or continues the switch.
    fn skip_case_end(&mut self, terminator: Option<&'a str>) -> Result<Option<&'a str>> {
        match terminator {
            Some(body) if matches!(split_directive(body).0, "endcase" | "/case") => {
                let (_, next) =
                    self.parse_nodes(&["case", "default", "endswitch", "/switch"])?;
                Ok(next)
            }
            other => Ok(other),
        }
    }
}

fn parse_condition(text: &str) -> Result<CondExpr> {
    CondExpr::parse(text).map_err(|message| RenderError::eval(message, text.to_string()))
}

fn parse_include(rest: &str) -> Node {
    let mut parts = rest.split(',');
    let target = unquote(parts.next().unwrap_or("").trim()).to_string();
    let params = parts
        .map(|kv| match kv.split_once('=') {
            Some((k, v)) => (k.trim().to_string(), Some(unquote(v.trim()).to_string())),
            None => (kv.trim().to_string(), None),
        })
        .filter(|(k, _)| !k.is_empty())
        .collect();
    Node::Include(IncludeNode { target, params })
}

/// Strips one pair of surrounding double quotes, if present.
fn unquote(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(s)
}

/// Removes whitespace outside double-quoted strings, escape-aware.
fn strip_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_string = false;
    let mut escaped = false;
    for ch in s.chars() {
        if escaped {
            escaped = false;
            out.push(ch);
            continue;
        }
        match ch {
            '\\' => {
                escaped = true;
                out.push(ch);
            }
            '"' => {
                in_string = !in_string;
                out.push(ch);
            }
            c if c.is_whitespace() && !in_string => {}
            c => out.push(c),
        }
    }
    out
}
