//! PEST-based parser for Cadence script
//!
//! Produces AST nodes with span information for error reporting. Two entry
//! points mirror the two-stage evaluation: `parse_expression` accepts exactly
//! one expression, `parse_program` accepts a statement list.

use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;

use super::ast::{AssignOp, BinaryOp, Expr, MemberAccess, Span, Stmt, UnaryOp};

mod layout;
pub mod semantic_validator;

pub use layout::MAX_NESTING_DEPTH;


/* ===================== PEST Parser ===================== */

#[derive(Parser)]
#[grammar = "interpreter/parser/cadence.pest"]
struct CadenceParser;

/* ===================== Error Types ===================== */

#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    PestError(String, Option<Span>),
    BuildError(String, Option<Span>),
}

impl ParseError {
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::PestError(_, span) => *span,
            ParseError::BuildError(_, span) => *span,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ParseError::PestError(msg, _) => msg,
            ParseError::BuildError(msg, _) => msg,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::PestError(msg, _) => write!(f, "{}", msg),
            ParseError::BuildError(msg, _) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ParseError {}

impl ParseError {
    fn from_pest(err: pest::error::Error<Rule>, lines: &LineIndex<'_>) -> Self {
        let span = match &err.location {
            pest::error::InputLocation::Pos(pos) => lines.span(*pos, *pos),
            pest::error::InputLocation::Span((start, end)) => lines.span(*start, *end),
        };
        let message = err
            .renamed_rules(describe_rule)
            .variant
            .message()
            .into_owned();
        ParseError::PestError(message, Some(span))
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

fn describe_rule(rule: &Rule) -> String {
    match rule {
        Rule::EOI => "end of input".to_string(),
        Rule::expression | Rule::expression_input => "expression".to_string(),
        Rule::statement => "statement".to_string(),
        Rule::identifier => "identifier".to_string(),
        Rule::block => "'{'".to_string(),
        Rule::assign_op => "'='".to_string(),
        other => format!("{:?}", other),
    }
}

/* ===================== Span Helpers ===================== */

/// Byte offsets of line starts, for offset to line/column lookups
pub(crate) struct LineIndex<'s> {
    source: &'s str,
    starts: Vec<usize>,
}

impl<'s> LineIndex<'s> {
    pub(crate) fn new(source: &'s str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { source, starts }
    }

    pub(crate) fn source(&self) -> &'s str {
        self.source
    }

    /// 0-indexed (line, column); columns count characters
    fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.source.len());
        let line = self.starts.partition_point(|&start| start <= offset) - 1;
        let line_start = self.starts[line];
        let col = self
            .source
            .get(line_start..offset)
            .map_or(offset - line_start, |text| text.chars().count());
        (line, col)
    }

    pub(crate) fn span(&self, start: usize, end: usize) -> Span {
        let (start_line, start_col) = self.line_col(start);
        let (end_line, end_col) = self.line_col(end);
        Span::new(start, end, start_line, start_col, end_line, end_col)
    }
}

/// Convert a PEST pair's span to our Span type
fn pair_to_span(pair: &Pair<Rule>, lines: &LineIndex<'_>) -> Span {
    let pest_span = pair.as_span();
    lines.span(pest_span.start(), pest_span.end())
}

/* ===================== Public API ===================== */

/// Parse input that must consist of exactly one expression
pub fn parse_expression(source: &str) -> ParseResult<Expr> {
    let lines = LineIndex::new(source);
    let text = layout::prepare(&lines)?;
    let mut pairs = CadenceParser::parse(Rule::expression_input, &text)
        .map_err(|err| ParseError::from_pest(err, &lines))?;
    let input = next_pair(&mut pairs, None, "expression input")?;
    let input_span = pair_to_span(&input, &lines);
    let mut inner = significant(input.into_inner());
    let expr_pair = next_pair(&mut inner, Some(input_span), "expression")?;
    build_expression(expr_pair, &lines)
}

/// Parse input as a list of statements
pub fn parse_program(source: &str) -> ParseResult<Vec<Stmt>> {
    let lines = LineIndex::new(source);
    let text = layout::prepare(&lines)?;
    let mut pairs = CadenceParser::parse(Rule::program, &text)
        .map_err(|err| ParseError::from_pest(err, &lines))?;
    let program = next_pair(&mut pairs, None, "program")?;
    build_statements(program.into_inner(), &lines)
}

/* ===================== Pair Helpers ===================== */

/// Drop keyword and end-of-input tokens that carry no AST content
fn significant(pairs: Pairs<'_, Rule>) -> impl Iterator<Item = Pair<'_, Rule>> {
    pairs.filter(|pair| {
        !matches!(
            pair.as_rule(),
            Rule::EOI
                | Rule::kw_if
                | Rule::kw_else
                | Rule::kw_while
                | Rule::kw_for
                | Rule::kw_in
                | Rule::kw_fn
                | Rule::kw_return
                | Rule::kw_break
                | Rule::kw_continue
                | Rule::kw_throw
                | Rule::kw_try
                | Rule::kw_catch
        )
    })
}

fn next_pair<'i>(
    pairs: &mut impl Iterator<Item = Pair<'i, Rule>>,
    span: Option<Span>,
    expected: &str,
) -> ParseResult<Pair<'i, Rule>> {
    pairs
        .next()
        .ok_or_else(|| ParseError::BuildError(format!("Expected {}", expected), span))
}

/* ===================== Statement Builders ===================== */

fn build_statements(pairs: Pairs<'_, Rule>, lines: &LineIndex<'_>) -> ParseResult<Vec<Stmt>> {
    significant(pairs)
        .map(|pair| build_statement(pair, lines))
        .collect()
}

fn build_block(pair: Pair<Rule>, lines: &LineIndex<'_>) -> ParseResult<Vec<Stmt>> {
    // block = { "{" ~ (statement ~ ";"*)* ~ "}" }
    build_statements(pair.into_inner(), lines)
}

fn build_statement(pair: Pair<Rule>, lines: &LineIndex<'_>) -> ParseResult<Stmt> {
    let span = pair_to_span(&pair, lines);

    match pair.as_rule() {
        Rule::statement => {
            let inner = next_pair(&mut pair.into_inner(), Some(span), "statement")?;
            build_statement(inner, lines)
        }
        Rule::fn_def => build_fn_def(pair, lines),
        Rule::if_stmt => build_if_stmt(pair, lines),
        Rule::while_stmt => {
            let mut inner = significant(pair.into_inner());
            let test = build_expression(next_pair(&mut inner, Some(span), "condition")?, lines)?;
            let body = build_block(next_pair(&mut inner, Some(span), "loop body")?, lines)?;
            Ok(Stmt::While { test, body, span })
        }
        Rule::for_stmt => {
            let mut inner = significant(pair.into_inner());
            let binding = next_pair(&mut inner, Some(span), "loop variable")?
                .as_str()
                .to_string();
            let iterable =
                build_expression(next_pair(&mut inner, Some(span), "iterable")?, lines)?;
            let body = build_block(next_pair(&mut inner, Some(span), "loop body")?, lines)?;
            Ok(Stmt::For {
                binding,
                iterable,
                body,
                span,
            })
        }
        Rule::try_stmt => {
            let mut inner = significant(pair.into_inner());
            let body = build_block(next_pair(&mut inner, Some(span), "try body")?, lines)?;
            let catch_var = next_pair(&mut inner, Some(span), "catch variable")?
                .as_str()
                .to_string();
            let catch_body =
                build_block(next_pair(&mut inner, Some(span), "catch body")?, lines)?;
            Ok(Stmt::Try {
                body,
                catch_var,
                catch_body,
                span,
            })
        }
        Rule::return_stmt => {
            let value = significant(pair.into_inner())
                .next()
                .map(|expr_pair| build_expression(expr_pair, lines))
                .transpose()?;
            Ok(Stmt::Return { value, span })
        }
        Rule::throw_stmt => {
            let mut inner = significant(pair.into_inner());
            let value = build_expression(next_pair(&mut inner, Some(span), "value")?, lines)?;
            Ok(Stmt::Throw { value, span })
        }
        Rule::break_stmt => Ok(Stmt::Break { span }),
        Rule::continue_stmt => Ok(Stmt::Continue { span }),
        Rule::assign_stmt => build_assign_stmt(pair, lines),
        Rule::expr_stmt => {
            let expr_pair = next_pair(&mut pair.into_inner(), Some(span), "expression")?;
            let expr = build_expression(expr_pair, lines)?;
            Ok(Stmt::Expr { expr, span })
        }
        _ => Err(ParseError::BuildError(
            format!("Unexpected statement rule: {:?}", pair.as_rule()),
            Some(span),
        )),
    }
}

fn build_fn_def(pair: Pair<Rule>, lines: &LineIndex<'_>) -> ParseResult<Stmt> {
    // fn_def = { kw_fn ~ identifier ~ "(" ~ param_list? ~ ")" ~ block }
    let span = pair_to_span(&pair, lines);
    let mut inner = significant(pair.into_inner());

    let name = next_pair(&mut inner, Some(span), "function name")?
        .as_str()
        .to_string();

    let next = next_pair(&mut inner, Some(span), "function body")?;
    let (params, block_pair) = if next.as_rule() == Rule::param_list {
        let params: Vec<String> = next
            .into_inner()
            .map(|id_pair| id_pair.as_str().to_string())
            .collect();
        (params, next_pair(&mut inner, Some(span), "function body")?)
    } else {
        (vec![], next)
    };

    for (i, param) in params.iter().enumerate() {
        if params[..i].contains(param) {
            return Err(ParseError::BuildError(
                format!("Duplicate parameter '{}' in function '{}'", param, name),
                Some(span),
            ));
        }
    }

    let body = build_block(block_pair, lines)?;
    Ok(Stmt::FnDef {
        name,
        params,
        body,
        span,
    })
}

fn build_if_stmt(pair: Pair<Rule>, lines: &LineIndex<'_>) -> ParseResult<Stmt> {
    // if_stmt = { kw_if ~ expression ~ block ~ else_clause? }
    let span = pair_to_span(&pair, lines);
    let mut inner = significant(pair.into_inner());

    let test = build_expression(next_pair(&mut inner, Some(span), "condition")?, lines)?;
    let then_body = build_block(next_pair(&mut inner, Some(span), "'{'")?, lines)?;

    let else_body = match inner.next() {
        Some(else_pair) => {
            let else_span = pair_to_span(&else_pair, lines);
            let mut else_inner = significant(else_pair.into_inner());
            let branch = next_pair(&mut else_inner, Some(else_span), "else branch")?;
            match branch.as_rule() {
                Rule::if_stmt => Some(vec![build_if_stmt(branch, lines)?]),
                _ => Some(build_block(branch, lines)?),
            }
        }
        None => None,
    };

    Ok(Stmt::If {
        test,
        then_body,
        else_body,
        span,
    })
}

fn build_assign_stmt(pair: Pair<Rule>, lines: &LineIndex<'_>) -> ParseResult<Stmt> {
    // assign_stmt = { identifier ~ assign_segment* ~ assign_op ~ expression }
    let span = pair_to_span(&pair, lines);
    let mut inner = pair.into_inner();

    let var = next_pair(&mut inner, Some(span), "variable name")?
        .as_str()
        .to_string();

    let mut path = Vec::new();
    let mut op = AssignOp::Set;
    for part in inner.by_ref() {
        let part_span = pair_to_span(&part, lines);
        match part.as_rule() {
            Rule::assign_segment => {
                let seg = next_pair(&mut part.into_inner(), Some(part_span), "member access")?;
                match seg.as_rule() {
                    Rule::identifier => path.push(MemberAccess::Prop {
                        property: seg.as_str().to_string(),
                        span: part_span,
                    }),
                    _ => path.push(MemberAccess::Index {
                        expr: build_expression(seg, lines)?,
                        span: part_span,
                    }),
                }
            }
            Rule::assign_op => {
                op = match part.as_str() {
                    "=" => AssignOp::Set,
                    "+=" => AssignOp::Add,
                    "-=" => AssignOp::Sub,
                    "*=" => AssignOp::Mul,
                    "/=" => AssignOp::Div,
                    other => {
                        return Err(ParseError::BuildError(
                            format!("Unknown assignment operator: {}", other),
                            Some(part_span),
                        ))
                    }
                };
                break;
            }
            _ => {
                return Err(ParseError::BuildError(
                    format!("Unexpected assignment part: {:?}", part.as_rule()),
                    Some(part_span),
                ))
            }
        }
    }

    let value = build_expression(next_pair(&mut inner, Some(span), "value")?, lines)?;

    Ok(Stmt::Assign {
        var,
        path,
        op,
        value,
        span,
    })
}

/* ===================== Expression Builders ===================== */

fn build_binary_expr(pair: Pair<Rule>, lines: &LineIndex<'_>) -> ParseResult<Expr> {
    let span = pair_to_span(&pair, lines);
    let mut inner = pair.into_inner();

    let mut left = build_expression(next_pair(&mut inner, Some(span), "operand")?, lines)?;

    while let Some(op_pair) = inner.next() {
        let op = match op_pair.as_rule() {
            Rule::op_or => BinaryOp::Or,
            Rule::op_and => BinaryOp::And,
            Rule::op_eq => BinaryOp::Eq,
            Rule::op_ne => BinaryOp::Ne,
            Rule::op_lt => BinaryOp::Lt,
            Rule::op_lte => BinaryOp::Lte,
            Rule::op_gt => BinaryOp::Gt,
            Rule::op_gte => BinaryOp::Gte,
            Rule::op_in => BinaryOp::In,
            Rule::op_add => BinaryOp::Add,
            Rule::op_sub => BinaryOp::Sub,
            Rule::op_mul => BinaryOp::Mul,
            Rule::op_div => BinaryOp::Div,
            Rule::op_floordiv => BinaryOp::FloorDiv,
            Rule::op_mod => BinaryOp::Mod,
            other => {
                return Err(ParseError::BuildError(
                    format!("Unknown binary operator: {:?}", other),
                    Some(span),
                ))
            }
        };

        let right_pair = next_pair(
            &mut inner,
            Some(span),
            "right operand after operator",
        )?;
        let right = build_expression(right_pair, lines)?;
        let new_span = left.span().merge(&right.span());

        left = Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            span: new_span,
        };
    }

    Ok(left)
}

fn build_expression(pair: Pair<Rule>, lines: &LineIndex<'_>) -> ParseResult<Expr> {
    let span = pair_to_span(&pair, lines);

    match pair.as_rule() {
        Rule::expression | Rule::primary | Rule::literal => {
            let inner = next_pair(&mut pair.into_inner(), Some(span), "expression")?;
            build_expression(inner, lines)
        }
        Rule::ternary_expr => {
            let mut inner = pair.into_inner();
            let condition =
                build_expression(next_pair(&mut inner, Some(span), "condition")?, lines)?;

            match inner.next() {
                Some(consequent_pair) => {
                    let consequent = build_expression(consequent_pair, lines)?;
                    let alternate = build_expression(
                        next_pair(&mut inner, Some(span), "':' branch")?,
                        lines,
                    )?;
                    Ok(Expr::Ternary {
                        condition: Box::new(condition),
                        consequent: Box::new(consequent),
                        alternate: Box::new(alternate),
                        span,
                    })
                }
                None => Ok(condition),
            }
        }
        Rule::or_expr
        | Rule::and_expr
        | Rule::equality_expr
        | Rule::comparison_expr
        | Rule::additive_expr
        | Rule::multiplicative_expr => build_binary_expr(pair, lines),
        Rule::unary_expr => {
            let mut inner = pair.into_inner();
            let first = next_pair(&mut inner, Some(span), "operand")?;

            let op = match first.as_rule() {
                Rule::op_not => UnaryOp::Not,
                Rule::op_neg => UnaryOp::Neg,
                _ => return build_expression(first, lines),
            };
            let operand = build_expression(next_pair(&mut inner, Some(span), "operand")?, lines)?;
            Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
                span,
            })
        }
        Rule::power_expr => {
            // power_expr = { postfix_expr ~ (op_pow ~ unary_expr)? }
            let mut inner = pair.into_inner();
            let base = build_expression(next_pair(&mut inner, Some(span), "operand")?, lines)?;
            match inner.next() {
                Some(_op_pow) => {
                    let exponent = build_expression(
                        next_pair(&mut inner, Some(span), "exponent")?,
                        lines,
                    )?;
                    Ok(Expr::Binary {
                        op: BinaryOp::Pow,
                        left: Box::new(base),
                        right: Box::new(exponent),
                        span,
                    })
                }
                None => Ok(base),
            }
        }
        Rule::postfix_expr => build_postfix_expr(pair, lines),
        Rule::identifier => {
            let name = pair.as_str().to_string();
            Ok(Expr::Ident { name, span })
        }
        Rule::integer => {
            let num_str = pair.as_str();
            let value = num_str.parse::<i64>().map_err(|_| {
                ParseError::BuildError(
                    format!("Integer literal '{}' is out of range", num_str),
                    Some(span),
                )
            })?;
            Ok(Expr::LitInt { v: value, span })
        }
        Rule::float => {
            let num_str = pair.as_str();
            let value = num_str.parse::<f64>().map_err(|e| {
                ParseError::BuildError(
                    format!("Failed to parse number '{}': {}", num_str, e),
                    Some(span),
                )
            })?;
            Ok(Expr::LitFloat { v: value, span })
        }
        Rule::boolean => {
            let value = pair.as_str() == "true";
            Ok(Expr::LitBool { v: value, span })
        }
        Rule::string => {
            let content = next_pair(&mut pair.into_inner(), Some(span), "string content")?;
            Ok(Expr::LitStr {
                v: unescape(content.as_str()),
                span,
            })
        }
        Rule::null_lit => Ok(Expr::LitNull { span }),
        Rule::list_lit => {
            let elements = match pair.into_inner().next() {
                Some(arg_list) => build_arg_list(arg_list, lines)?,
                None => vec![],
            };
            Ok(Expr::LitList { elements, span })
        }
        Rule::dict_lit => {
            let mut entries = Vec::new();
            for entry in pair.into_inner() {
                let entry_span = pair_to_span(&entry, lines);
                let mut kv = entry.into_inner();
                let key = build_expression(next_pair(&mut kv, Some(entry_span), "key")?, lines)?;
                let value =
                    build_expression(next_pair(&mut kv, Some(entry_span), "value")?, lines)?;
                entries.push((key, value));
            }
            Ok(Expr::LitDict { entries, span })
        }
        _ => Err(ParseError::BuildError(
            format!("Unexpected expression rule: {:?}", pair.as_rule()),
            Some(span),
        )),
    }
}

fn build_postfix_expr(pair: Pair<Rule>, lines: &LineIndex<'_>) -> ParseResult<Expr> {
    // postfix_expr = { primary ~ postfix* }
    let span = pair_to_span(&pair, lines);
    let mut inner = pair.into_inner();
    let mut expr = build_expression(next_pair(&mut inner, Some(span), "operand")?, lines)?;

    for postfix_pair in inner {
        let postfix_span = pair_to_span(&postfix_pair, lines);
        let suffix = next_pair(&mut postfix_pair.into_inner(), Some(postfix_span), "suffix")?;
        let new_span = expr.span().merge(&postfix_span);

        expr = match suffix.as_rule() {
            Rule::call_suffix => {
                let args = match suffix.into_inner().next() {
                    Some(arg_list) => build_arg_list(arg_list, lines)?,
                    None => vec![],
                };
                Expr::Call {
                    callee: Box::new(expr),
                    args,
                    span: new_span,
                }
            }
            Rule::index_suffix => {
                let index_pair = next_pair(&mut suffix.into_inner(), Some(postfix_span), "index")?;
                Expr::Index {
                    object: Box::new(expr),
                    index: Box::new(build_expression(index_pair, lines)?),
                    span: new_span,
                }
            }
            Rule::member_suffix => {
                let prop_pair =
                    next_pair(&mut suffix.into_inner(), Some(postfix_span), "property")?;
                Expr::Member {
                    object: Box::new(expr),
                    property: prop_pair.as_str().to_string(),
                    span: new_span,
                }
            }
            other => {
                return Err(ParseError::BuildError(
                    format!("Unexpected postfix rule: {:?}", other),
                    Some(postfix_span),
                ))
            }
        };
    }

    Ok(expr)
}

fn build_arg_list(pair: Pair<Rule>, lines: &LineIndex<'_>) -> ParseResult<Vec<Expr>> {
    pair.into_inner()
        .map(|expr_pair| build_expression(expr_pair, lines))
        .collect()
}

/// Resolve backslash escapes in a string literal body
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
