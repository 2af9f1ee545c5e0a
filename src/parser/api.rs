use std::iter::Peekable;
use std::rc::Rc;
use std::str::Chars;
use std::time::Instant;

use pest::error::{Error, ErrorVariant};
use pest::iterators::Pair;
use pest::{Parser, Position, Span};
use pest_derive::Parser;

use super::ast::*;
use super::static_semantics::{
    find_duplicate_parameter, has_use_strict_directive, is_restricted_in_strict_mode,
    is_strict_mode_reserved_word, ObjectLiteralKeys,
};
use crate::runner::ds::js_string::JsString;
use crate::runner::ds::object_property::PropertyKey;
use crate::runner::ds::operations::type_conversion::{number_to_string, string_to_number};

#[derive(Parser)]
#[grammar = "parser/js_grammar.pest"] // relative to src
pub struct JsParser;

const TAB_WIDTH: usize = 2;
const MAX_SAFE_INTEGER: f64 = 9007199254740992.0;

impl JsParser {
    /// Parses a script into its AST, running the early-error checks on the way.
    pub fn parse_to_ast_from_str(script: &str) -> Result<ProgramData, Error<Rule>> {
        Self::parse_to_ast_with_strictness(script, false)
    }

    /// Same as [`JsParser::parse_to_ast_from_str`], but `strict` forces strict mode on the
    /// whole program even without a directive.
    pub fn parse_to_ast_with_strictness(
        script: &str,
        strict: bool,
    ) -> Result<ProgramData, Error<Rule>> {
        let start = Instant::now();
        let mut pairs = JsParser::parse(Rule::script, script)?;
        tracing::debug!(elapsed_us = start.elapsed().as_micros() as u64, "parsed script");
        let pair = match pairs.next() {
            Some(pair) => pair,
            None => {
                return Err(Error::new_from_pos(
                    ErrorVariant::CustomError {
                        message: "Empty parse result".to_string(),
                    },
                    Position::from_start(script),
                ))
            }
        };
        AstBuilder::new(script, strict).build_ast_from_script(pair)
    }
}

/// Renders the raw parse tree, one rule per line, indented by depth.
pub fn parse_to_token_tree(script: &str) -> Result<String, Error<Rule>> {
    let start = Instant::now();
    let pairs = JsParser::parse(Rule::script, script)?;
    tracing::debug!(elapsed_us = start.elapsed().as_micros() as u64, "parsed script");
    let mut tree = vec![];
    for pair in pairs {
        tree.push(pair_to_string(pair, 0).join("\n"));
    }
    Ok(tree.join("\n"))
}

fn pair_to_string(pair: Pair<Rule>, level: usize) -> Vec<String> {
    let mut tree = vec![];
    let span = pair.as_span();
    let rule_name = format!(
        "{:?} => ({},{}) #{:?}",
        pair.as_rule(),
        span.start(),
        span.end(),
        span.as_str()
    );
    let string_pads = " ".repeat(level * TAB_WIDTH);
    tree.push(format!("{}{}", string_pads, rule_name));
    for child_pair in pair.into_inner() {
        tree.append(pair_to_string(child_pair, level + 1).as_mut());
    }
    tree
}

fn get_meta(pair: &Pair<Rule>) -> Meta {
    let span = pair.as_span();
    Meta {
        start_index: span.start(),
        end_index: span.end(),
    }
}

fn get_unexpected_error(id: i32, pair: &Pair<Rule>) -> Error<Rule> {
    let message = format!("Unexpected state reached [{:?}] - {}", pair.as_rule(), id);
    Error::new_from_span(ErrorVariant::CustomError { message }, pair.as_span())
}

fn is_keyword_token(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::break_kw
            | Rule::case_kw
            | Rule::catch_kw
            | Rule::const_kw
            | Rule::continue_kw
            | Rule::debugger_kw
            | Rule::default_kw
            | Rule::do_kw
            | Rule::else_kw
            | Rule::finally_kw
            | Rule::for_kw
            | Rule::function_kw
            | Rule::get_kw
            | Rule::if_kw
            | Rule::in_kw
            | Rule::let_kw
            | Rule::new_kw
            | Rule::return_kw
            | Rule::set_kw
            | Rule::switch_kw
            | Rule::this_kw
            | Rule::throw_kw
            | Rule::try_kw
            | Rule::var_kw
            | Rule::while_kw
            | Rule::with_kw
    )
}

/// Child pairs without the keyword tokens.
fn significant_children(pair: Pair<Rule>) -> impl Iterator<Item = Pair<Rule>> {
    pair.into_inner().filter(|p| !is_keyword_token(p.as_rule()))
}

fn identifier_data(pair: &Pair<Rule>) -> IdentifierData {
    IdentifierData {
        name: JsString::from(pair.as_str()),
        meta: get_meta(pair),
    }
}

fn declaration_kind(pair: &Pair<Rule>) -> Option<VariableDeclarationKind> {
    match pair.as_rule() {
        Rule::var_kw => Some(VariableDeclarationKind::Var),
        Rule::let_kw => Some(VariableDeclarationKind::Let),
        Rule::const_kw => Some(VariableDeclarationKind::Const),
        _ => None,
    }
}

fn statement_is_loop(pair: &Pair<Rule>) -> bool {
    match pair.as_rule() {
        Rule::while_statement
        | Rule::do_while_statement
        | Rule::for_statement
        | Rule::for_in_statement => true,
        Rule::labelled_statement => pair
            .clone()
            .into_inner()
            .last()
            .map(|body| statement_is_loop(&body))
            .unwrap_or(false),
        _ => false,
    }
}

fn number_literal_from_f64(value: f64) -> NumberLiteralType {
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER && !(value == 0.0 && value.is_sign_negative()) {
        NumberLiteralType::IntegerLiteral(value as i64)
    } else {
        NumberLiteralType::FloatLiteral(value)
    }
}

fn read_hex_digits(chars: &mut Peekable<Chars>, count: usize) -> Option<u32> {
    let mut value = 0;
    for _ in 0..count {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    Some(value)
}

fn push_code_point(units: &mut Vec<u16>, code: u32) {
    if code <= 0xFFFF {
        units.push(code as u16);
    } else {
        let c = code - 0x10000;
        units.push(0xD800 + (c >> 10) as u16);
        units.push(0xDC00 + (c & 0x3FF) as u16);
    }
}

/// Decodes the escapes in the raw text between a string literal's quotes into UTF-16 units.
pub(crate) fn decode_string_escapes(raw: &str, strict: bool) -> Result<JsString, String> {
    let mut units: Vec<u16> = Vec::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    let mut buf = [0u16; 2];
    while let Some(c) = chars.next() {
        if c != '\\' {
            units.extend_from_slice(c.encode_utf16(&mut buf));
            continue;
        }
        let escaped = match chars.next() {
            Some(e) => e,
            None => return Err("Invalid or unexpected token".to_string()),
        };
        match escaped {
            'n' => units.push(0x0A),
            't' => units.push(0x09),
            'r' => units.push(0x0D),
            'b' => units.push(0x08),
            'f' => units.push(0x0C),
            'v' => units.push(0x0B),
            // Line continuation.
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            'x' => {
                let value = read_hex_digits(&mut chars, 2)
                    .ok_or_else(|| "Invalid hexadecimal escape sequence".to_string())?;
                units.push(value as u16);
            }
            'u' if chars.peek() == Some(&'{') => {
                chars.next();
                let mut code: u32 = 0;
                let mut digits = 0;
                loop {
                    match chars.next() {
                        Some('}') if digits > 0 => break,
                        Some(h) => match h.to_digit(16) {
                            Some(d) if code <= 0x10FFFF => {
                                code = code * 16 + d;
                                digits += 1;
                            }
                            _ => return Err("Invalid Unicode escape sequence".to_string()),
                        },
                        None => return Err("Invalid Unicode escape sequence".to_string()),
                    }
                }
                if code > 0x10FFFF {
                    return Err("Undefined Unicode code-point".to_string());
                }
                push_code_point(&mut units, code);
            }
            'u' => {
                let value = read_hex_digits(&mut chars, 4)
                    .ok_or_else(|| "Invalid Unicode escape sequence".to_string())?;
                units.push(value as u16);
            }
            '0' if !matches!(chars.peek(), Some('0'..='9')) => units.push(0),
            '0'..='7' => {
                if strict {
                    return Err("Octal escape sequences are not allowed in strict mode.".to_string());
                }
                let first = escaped.to_digit(8).unwrap_or(0);
                let max_len = if first <= 3 { 3 } else { 2 };
                let mut value = first;
                let mut len = 1;
                while len < max_len {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            chars.next();
                            len += 1;
                        }
                        None => break,
                    }
                }
                units.push(value as u16);
            }
            other => units.extend_from_slice(other.encode_utf16(&mut buf)),
        }
    }
    Ok(JsString::from_units(units))
}

fn binary_operator_from(pair: &Pair<Rule>) -> Result<BinaryOperator, Error<Rule>> {
    Ok(match pair.as_str() {
        "*" => BinaryOperator::Multiply,
        "/" => BinaryOperator::Divide,
        "%" => BinaryOperator::Modulo,
        "+" => BinaryOperator::Add,
        "-" => BinaryOperator::Subtract,
        "<<" => BinaryOperator::BitwiseLeftShift,
        ">>" => BinaryOperator::BitwiseRightShift,
        ">>>" => BinaryOperator::BitwiseUnsignedRightShift,
        "<" => BinaryOperator::LessThan,
        "<=" => BinaryOperator::LessThanEqual,
        ">" => BinaryOperator::GreaterThan,
        ">=" => BinaryOperator::GreaterThanEqual,
        "instanceof" => BinaryOperator::InstanceOf,
        "in" => BinaryOperator::In,
        "==" => BinaryOperator::LooselyEqual,
        "!=" => BinaryOperator::LooselyUnequal,
        "===" => BinaryOperator::StrictlyEqual,
        "!==" => BinaryOperator::StrictlyUnequal,
        "&" => BinaryOperator::BitwiseAnd,
        "^" => BinaryOperator::BitwiseXor,
        "|" => BinaryOperator::BitwiseOr,
        _ => return Err(get_unexpected_error(1, pair)),
    })
}

fn assignment_operator_from(pair: &Pair<Rule>) -> Result<AssignmentOperator, Error<Rule>> {
    Ok(match pair.as_str() {
        "=" => AssignmentOperator::Equals,
        "+=" => AssignmentOperator::AddEquals,
        "-=" => AssignmentOperator::SubtractEquals,
        "*=" => AssignmentOperator::MultiplyEquals,
        "/=" => AssignmentOperator::DivideEquals,
        "%=" => AssignmentOperator::ModuloEquals,
        "<<=" => AssignmentOperator::BitwiseLeftShiftEquals,
        ">>=" => AssignmentOperator::BitwiseRightShiftEquals,
        ">>>=" => AssignmentOperator::BitwiseUnsignedRightShiftEquals,
        "|=" => AssignmentOperator::BitwiseOrEquals,
        "&=" => AssignmentOperator::BitwiseAndEquals,
        "^=" => AssignmentOperator::BitwiseXorEquals,
        _ => return Err(get_unexpected_error(2, pair)),
    })
}

struct LabelInfo {
    name: JsString,
    is_loop: bool,
}

/// Per-function state collected while building a body.
struct FunctionFrame {
    declarations: HoistedDeclarations,
    strict: bool,
    uses_arguments: bool,
    is_program: bool,
    labels: Vec<LabelInfo>,
    iteration_depth: usize,
    breakable_depth: usize,
}

impl FunctionFrame {
    fn new(strict: bool, is_program: bool) -> Self {
        FunctionFrame {
            declarations: HoistedDeclarations::default(),
            strict,
            uses_arguments: false,
            is_program,
            labels: vec![],
            iteration_depth: 0,
            breakable_depth: 0,
        }
    }
}

struct AstBuilder<'s> {
    script: &'s str,
    current: FunctionFrame,
    enclosing: Vec<FunctionFrame>,
    /// `let`/`const` names of the innermost block, function body or switch.
    current_lexical: Vec<JsString>,
    enclosing_lexical: Vec<Vec<JsString>>,
}

impl<'s> AstBuilder<'s> {
    fn new(script: &'s str, strict: bool) -> Self {
        AstBuilder {
            script,
            current: FunctionFrame::new(strict, true),
            enclosing: vec![],
            current_lexical: vec![],
            enclosing_lexical: vec![],
        }
    }

    fn error_at(&self, message: impl Into<String>, meta: &Meta) -> Error<Rule> {
        let variant = ErrorVariant::CustomError {
            message: message.into(),
        };
        match Span::new(self.script, meta.start_index, meta.end_index) {
            Some(span) => Error::new_from_span(variant, span),
            None => Error::new_from_pos(variant, Position::from_start(self.script)),
        }
    }

    fn next_pair<'i>(&self, pairs: &mut impl Iterator<Item = Pair<'i, Rule>>, meta: &Meta) -> Result<Pair<'i, Rule>, Error<Rule>> {
        pairs
            .next()
            .ok_or_else(|| self.error_at("Unexpected end of construct", meta))
    }

    fn enter_function(&mut self, strict: bool) {
        let outer = std::mem::replace(&mut self.current, FunctionFrame::new(strict, false));
        self.enclosing.push(outer);
        self.enclosing_lexical.push(std::mem::take(&mut self.current_lexical));
    }

    fn exit_function(&mut self) -> FunctionFrame {
        let outer = self
            .enclosing
            .pop()
            .unwrap_or_else(|| FunctionFrame::new(false, true));
        let mut frame = std::mem::replace(&mut self.current, outer);
        frame.declarations.lexical_names = self.pop_lexical_scope();
        frame
    }

    fn push_lexical_scope(&mut self) {
        self.enclosing_lexical.push(std::mem::take(&mut self.current_lexical));
    }

    fn pop_lexical_scope(&mut self) -> Vec<JsString> {
        let outer = self.enclosing_lexical.pop().unwrap_or_default();
        std::mem::replace(&mut self.current_lexical, outer)
    }

    fn declare_var(&mut self, name: &JsString) {
        let names = &mut self.current.declarations.var_names;
        if !names.contains(name) {
            names.push(name.clone());
        }
    }

    fn declare_lexical(&mut self, id: &IdentifierData) -> Result<(), Error<Rule>> {
        if self.current_lexical.contains(&id.name) {
            return Err(self.error_at(
                format!("Identifier '{}' has already been declared", id.name),
                &id.meta,
            ));
        }
        self.current_lexical.push(id.name.clone());
        Ok(())
    }

    fn check_strict_binding(&self, id: &IdentifierData) -> Result<(), Error<Rule>> {
        if !self.current.strict {
            Ok(())
        } else if is_restricted_in_strict_mode(&id.name) {
            Err(self.error_at("Unexpected eval or arguments in strict mode", &id.meta))
        } else if is_strict_mode_reserved_word(&id.name) {
            Err(self.error_at("Unexpected strict mode reserved word", &id.meta))
        } else {
            Ok(())
        }
    }

    fn check_assignment_target(&self, target: &ExpressionType, message: &str) -> Result<(), Error<Rule>> {
        if !target.is_valid_simple_assignment_target() {
            return Err(self.error_at(message, target.get_meta()));
        }
        if let ExpressionType::Identifier(id) = target {
            self.check_strict_binding(id)?;
        }
        Ok(())
    }

    fn build_binding_identifier(&self, pair: &Pair<Rule>) -> Result<IdentifierData, Error<Rule>> {
        let id = identifier_data(pair);
        self.check_strict_binding(&id)?;
        Ok(id)
    }

    fn build_identifier_reference(&mut self, pair: &Pair<Rule>) -> IdentifierData {
        let id = identifier_data(pair);
        if id.name == JsString::from("arguments") {
            self.current.uses_arguments = true;
        }
        id
    }

    fn build_ast_from_script(mut self, pair: Pair<Rule>) -> Result<ProgramData, Error<Rule>> {
        let meta = get_meta(&pair);
        let statements: Vec<Pair<Rule>> = pair
            .into_inner()
            .filter(|p| p.as_rule() != Rule::EOI)
            .collect();
        let strict = self.current.strict || has_use_strict_directive(&statements);
        self.current.strict = strict;
        let body = self.build_ast_from_statement_list(statements)?;
        let mut declarations = std::mem::take(&mut self.current.declarations);
        declarations.lexical_names = std::mem::take(&mut self.current_lexical);
        Ok(ProgramData {
            meta,
            body,
            declarations,
            strict,
        })
    }

    fn build_ast_from_statement_list<'i>(
        &mut self,
        pairs: impl IntoIterator<Item = Pair<'i, Rule>>,
    ) -> Result<Vec<StatementType>, Error<Rule>> {
        let mut statements = vec![];
        for pair in pairs {
            statements.push(self.build_ast_from_statement(pair)?);
        }
        Ok(statements)
    }

    fn build_ast_from_statement(&mut self, pair: Pair<Rule>) -> Result<StatementType, Error<Rule>> {
        let meta = get_meta(&pair);
        Ok(match pair.as_rule() {
            Rule::block_statement => StatementType::BlockStatement(self.build_ast_from_block(pair)?),
            Rule::variable_statement => {
                let list = self.next_pair(&mut significant_children(pair), &meta)?;
                let declaration = self.build_ast_from_variable_declaration_list(
                    meta,
                    list,
                    VariableDeclarationKind::Var,
                )?;
                StatementType::DeclarationStatement(DeclarationType::VariableDeclaration(declaration))
            }
            Rule::lexical_declaration => {
                let mut inner = pair.into_inner();
                let kind_pair = self.next_pair(&mut inner, &meta)?;
                let kind = declaration_kind(&kind_pair)
                    .ok_or_else(|| get_unexpected_error(3, &kind_pair))?;
                let list = self.next_pair(&mut inner, &meta)?;
                let declaration = self.build_ast_from_variable_declaration_list(meta, list, kind)?;
                for declarator in &declaration.declarations {
                    self.declare_lexical(&declarator.id)?;
                }
                StatementType::DeclarationStatement(DeclarationType::VariableDeclaration(declaration))
            }
            Rule::function_declaration => {
                let f = self.build_ast_from_function(pair)?;
                self.current.declarations.function_declarations.push(f.clone());
                StatementType::DeclarationStatement(DeclarationType::FunctionDeclaration(f))
            }
            Rule::empty_statement => StatementType::EmptyStatement { meta },
            Rule::debugger_statement => StatementType::DebuggerStatement { meta },
            Rule::expression_statement => {
                let expression = self.next_pair(&mut pair.into_inner(), &meta)?;
                StatementType::ExpressionStatement {
                    meta,
                    expression: Box::new(self.build_ast_from_expression(expression)?),
                }
            }
            Rule::if_statement => {
                let mut inner = significant_children(pair);
                let test = self.next_pair(&mut inner, &meta)?;
                let test = self.build_ast_from_expression(test)?;
                let consequent = self.next_pair(&mut inner, &meta)?;
                let consequent = self.build_ast_from_statement(consequent)?;
                let alternate = match inner.next() {
                    Some(p) => Some(Box::new(self.build_ast_from_statement(p)?)),
                    None => None,
                };
                StatementType::IfStatement {
                    meta,
                    test: Box::new(test),
                    consequent: Box::new(consequent),
                    alternate,
                }
            }
            Rule::while_statement => {
                let mut inner = significant_children(pair);
                let test = self.next_pair(&mut inner, &meta)?;
                let test = self.build_ast_from_expression(test)?;
                let body = self.next_pair(&mut inner, &meta)?;
                StatementType::WhileStatement {
                    meta,
                    test: Box::new(test),
                    body: Box::new(self.build_ast_from_loop_body(body)?),
                }
            }
            Rule::do_while_statement => {
                let mut inner = significant_children(pair);
                let body = self.next_pair(&mut inner, &meta)?;
                let body = self.build_ast_from_loop_body(body)?;
                let test = self.next_pair(&mut inner, &meta)?;
                StatementType::DoWhileStatement {
                    meta,
                    test: Box::new(self.build_ast_from_expression(test)?),
                    body: Box::new(body),
                }
            }
            Rule::for_statement => self.build_ast_from_for_statement(pair)?,
            Rule::for_in_statement => self.build_ast_from_for_in_statement(pair)?,
            Rule::continue_statement => {
                let label = significant_children(pair).next().map(|p| identifier_data(&p));
                match &label {
                    Some(l) => match self.current.labels.iter().find(|i| i.name == l.name) {
                        Some(info) if info.is_loop => {}
                        Some(_) => {
                            return Err(self.error_at(
                                format!(
                                    "Illegal continue statement: '{}' does not denote an iteration statement",
                                    l.name
                                ),
                                &meta,
                            ))
                        }
                        None => {
                            return Err(self.error_at(format!("Undefined label '{}'", l.name), &l.meta))
                        }
                    },
                    None if self.current.iteration_depth == 0 => {
                        return Err(self.error_at(
                            "Illegal continue statement: no surrounding iteration statement",
                            &meta,
                        ))
                    }
                    None => {}
                }
                StatementType::ContinueStatement { meta, label }
            }
            Rule::break_statement => {
                let label = significant_children(pair).next().map(|p| identifier_data(&p));
                match &label {
                    Some(l) => {
                        if !self.current.labels.iter().any(|i| i.name == l.name) {
                            return Err(self.error_at(format!("Undefined label '{}'", l.name), &l.meta));
                        }
                    }
                    None => {
                        if self.current.iteration_depth + self.current.breakable_depth == 0 {
                            return Err(self.error_at("Illegal break statement", &meta));
                        }
                    }
                }
                StatementType::BreakStatement { meta, label }
            }
            Rule::return_statement => {
                if self.current.is_program {
                    return Err(self.error_at("Illegal return statement", &meta));
                }
                let argument = match significant_children(pair).next() {
                    Some(p) => Some(Box::new(self.build_ast_from_expression(p)?)),
                    None => None,
                };
                StatementType::ReturnStatement { meta, argument }
            }
            Rule::with_statement => {
                if self.current.strict {
                    return Err(self.error_at(
                        "Strict mode code may not include a with statement",
                        &meta,
                    ));
                }
                let mut inner = significant_children(pair);
                let object = self.next_pair(&mut inner, &meta)?;
                let object = self.build_ast_from_expression(object)?;
                let body = self.next_pair(&mut inner, &meta)?;
                StatementType::WithStatement {
                    meta,
                    object: Box::new(object),
                    body: Box::new(self.build_ast_from_statement(body)?),
                }
            }
            Rule::switch_statement => self.build_ast_from_switch_statement(pair)?,
            Rule::throw_statement => {
                let argument = self.next_pair(&mut significant_children(pair), &meta)?;
                StatementType::ThrowStatement {
                    meta,
                    argument: Box::new(self.build_ast_from_expression(argument)?),
                }
            }
            Rule::try_statement => self.build_ast_from_try_statement(pair)?,
            Rule::labelled_statement => {
                let mut inner = pair.into_inner();
                let label = identifier_data(&self.next_pair(&mut inner, &meta)?);
                if self.current.labels.iter().any(|i| i.name == label.name) {
                    return Err(self.error_at(
                        format!("Label '{}' has already been declared", label.name),
                        &label.meta,
                    ));
                }
                let body = self.next_pair(&mut inner, &meta)?;
                self.current.labels.push(LabelInfo {
                    name: label.name.clone(),
                    is_loop: statement_is_loop(&body),
                });
                let body = self.build_ast_from_statement(body);
                self.current.labels.pop();
                StatementType::LabeledStatement {
                    meta,
                    label,
                    body: Box::new(body?),
                }
            }
            _ => return Err(get_unexpected_error(4, &pair)),
        })
    }

    fn build_ast_from_block(&mut self, pair: Pair<Rule>) -> Result<BlockStatementData, Error<Rule>> {
        let meta = get_meta(&pair);
        self.push_lexical_scope();
        let body = self.build_ast_from_statement_list(pair.into_inner());
        let lexical_names = self.pop_lexical_scope();
        Ok(BlockStatementData {
            meta,
            body: body?,
            lexical_names,
        })
    }

    fn build_ast_from_loop_body(&mut self, pair: Pair<Rule>) -> Result<StatementType, Error<Rule>> {
        self.current.iteration_depth += 1;
        let body = self.build_ast_from_statement(pair);
        self.current.iteration_depth -= 1;
        body
    }

    fn build_ast_from_variable_declaration_list(
        &mut self,
        meta: Meta,
        pair: Pair<Rule>,
        kind: VariableDeclarationKind,
    ) -> Result<VariableDeclarationData, Error<Rule>> {
        let mut declarations = vec![];
        for declarator in pair.into_inner() {
            let declarator_meta = get_meta(&declarator);
            let mut inner = declarator.into_inner();
            let id = self.build_binding_identifier(&self.next_pair(&mut inner, &declarator_meta)?)?;
            let init = match inner.next() {
                Some(p) => Some(Box::new(self.build_ast_from_assignment_expression(p)?)),
                None => None,
            };
            if kind == VariableDeclarationKind::Const && init.is_none() {
                return Err(self.error_at("Missing initializer in const declaration", &declarator_meta));
            }
            if kind == VariableDeclarationKind::Var {
                self.declare_var(&id.name);
            }
            declarations.push(VariableDeclaratorData {
                meta: declarator_meta,
                id,
                init,
            });
        }
        Ok(VariableDeclarationData {
            meta,
            declarations,
            kind,
        })
    }

    fn build_ast_from_for_statement(&mut self, pair: Pair<Rule>) -> Result<StatementType, Error<Rule>> {
        let meta = get_meta(&pair);
        let mut init = None;
        let mut test = None;
        let mut update = None;
        let mut body = None;
        for child in significant_children(pair) {
            let child_meta = get_meta(&child);
            match child.as_rule() {
                Rule::for_init => {
                    let inner = self.next_pair(&mut child.into_inner(), &child_meta)?;
                    init = Some(if inner.as_rule() == Rule::for_declaration {
                        let mut parts = inner.into_inner();
                        let kind_pair = self.next_pair(&mut parts, &child_meta)?;
                        let kind = declaration_kind(&kind_pair)
                            .ok_or_else(|| get_unexpected_error(5, &kind_pair))?;
                        let list = self.next_pair(&mut parts, &child_meta)?;
                        VariableDeclarationOrExpression::VariableDeclaration(
                            self.build_ast_from_variable_declaration_list(child_meta, list, kind)?,
                        )
                    } else {
                        VariableDeclarationOrExpression::Expression(Box::new(
                            self.build_ast_from_expression(inner)?,
                        ))
                    });
                }
                Rule::for_test => {
                    let inner = self.next_pair(&mut child.into_inner(), &child_meta)?;
                    test = Some(Box::new(self.build_ast_from_expression(inner)?));
                }
                Rule::for_update => {
                    let inner = self.next_pair(&mut child.into_inner(), &child_meta)?;
                    update = Some(Box::new(self.build_ast_from_expression(inner)?));
                }
                _ => body = Some(self.build_ast_from_loop_body(child)?),
            }
        }
        let body = body.ok_or_else(|| self.error_at("Missing loop body", &meta))?;
        Ok(StatementType::ForStatement {
            meta,
            init,
            test,
            update,
            body: Box::new(body),
        })
    }

    fn build_ast_from_for_in_statement(&mut self, pair: Pair<Rule>) -> Result<StatementType, Error<Rule>> {
        let meta = get_meta(&pair);
        let mut inner = significant_children(pair);
        let left_pair = self.next_pair(&mut inner, &meta)?;
        let left = if left_pair.as_rule() == Rule::for_binding {
            let binding_meta = get_meta(&left_pair);
            let mut parts = left_pair.into_inner();
            let kind_pair = self.next_pair(&mut parts, &binding_meta)?;
            let kind = declaration_kind(&kind_pair).ok_or_else(|| get_unexpected_error(6, &kind_pair))?;
            let id = self.build_binding_identifier(&self.next_pair(&mut parts, &binding_meta)?)?;
            if kind == VariableDeclarationKind::Var {
                self.declare_var(&id.name);
            }
            VariableDeclarationOrExpression::VariableDeclaration(VariableDeclarationData {
                meta: binding_meta,
                declarations: vec![VariableDeclaratorData {
                    meta: id.meta,
                    id,
                    init: None,
                }],
                kind,
            })
        } else {
            let target = self.build_ast_from_left_hand_side_expression(left_pair)?;
            self.check_assignment_target(&target, "Invalid left-hand side in for-in loop")?;
            VariableDeclarationOrExpression::Expression(Box::new(target))
        };
        let right = self.next_pair(&mut inner, &meta)?;
        let right = self.build_ast_from_expression(right)?;
        let body = self.next_pair(&mut inner, &meta)?;
        let body = self.build_ast_from_loop_body(body)?;
        Ok(StatementType::ForInStatement(ForIteratorData {
            meta,
            left,
            right: Box::new(right),
            body: Box::new(body),
        }))
    }

    fn build_ast_from_switch_statement(&mut self, pair: Pair<Rule>) -> Result<StatementType, Error<Rule>> {
        let meta = get_meta(&pair);
        let mut inner = significant_children(pair);
        let discriminant = self.next_pair(&mut inner, &meta)?;
        let discriminant = self.build_ast_from_expression(discriminant)?;
        self.current.breakable_depth += 1;
        self.push_lexical_scope();
        let cases = self.build_ast_from_case_clauses(inner);
        let lexical_names = self.pop_lexical_scope();
        self.current.breakable_depth -= 1;
        Ok(StatementType::SwitchStatement {
            meta,
            discriminant: Box::new(discriminant),
            cases: cases?,
            lexical_names,
        })
    }

    fn build_ast_from_case_clauses<'i>(
        &mut self,
        clauses: impl Iterator<Item = Pair<'i, Rule>>,
    ) -> Result<Vec<SwitchCaseData>, Error<Rule>> {
        let mut cases = vec![];
        let mut seen_default = false;
        for clause in clauses {
            let meta = get_meta(&clause);
            let is_default = clause.as_rule() == Rule::default_clause;
            let mut inner = significant_children(clause);
            let test = if is_default {
                if seen_default {
                    return Err(self.error_at("More than one default clause in switch statement", &meta));
                }
                seen_default = true;
                None
            } else {
                let test = self.next_pair(&mut inner, &meta)?;
                Some(Box::new(self.build_ast_from_expression(test)?))
            };
            let consequent = self.build_ast_from_statement_list(inner)?;
            cases.push(SwitchCaseData {
                meta,
                test,
                consequent,
            });
        }
        Ok(cases)
    }

    fn build_ast_from_try_statement(&mut self, pair: Pair<Rule>) -> Result<StatementType, Error<Rule>> {
        let meta = get_meta(&pair);
        let mut block = None;
        let mut handler = None;
        let mut finalizer = None;
        for child in significant_children(pair) {
            let child_meta = get_meta(&child);
            match child.as_rule() {
                Rule::block_statement => block = Some(self.build_ast_from_block(child)?),
                Rule::catch_clause => {
                    let mut inner = significant_children(child);
                    let param = self.build_binding_identifier(&self.next_pair(&mut inner, &child_meta)?)?;
                    let body = self.next_pair(&mut inner, &child_meta)?;
                    handler = Some(CatchClauseData {
                        meta: child_meta,
                        param,
                        body: self.build_ast_from_block(body)?,
                    });
                }
                Rule::finally_clause => {
                    let body = self.next_pair(&mut significant_children(child), &child_meta)?;
                    finalizer = Some(self.build_ast_from_block(body)?);
                }
                _ => return Err(get_unexpected_error(7, &child)),
            }
        }
        let block = block.ok_or_else(|| self.error_at("Missing try block", &meta))?;
        Ok(StatementType::TryStatement {
            meta,
            block,
            handler,
            finalizer,
        })
    }

    fn build_ast_from_function(&mut self, pair: Pair<Rule>) -> Result<Rc<FunctionData>, Error<Rule>> {
        let meta = get_meta(&pair);
        let mut id = None;
        let mut params = vec![];
        let mut body = None;
        for child in significant_children(pair) {
            match child.as_rule() {
                Rule::identifier => id = Some(identifier_data(&child)),
                Rule::formal_parameters => {
                    params = child.into_inner().map(|p| identifier_data(&p)).collect()
                }
                Rule::function_body => body = Some(child),
                _ => return Err(get_unexpected_error(8, &child)),
            }
        }
        let body = body.ok_or_else(|| self.error_at("Missing function body", &meta))?;
        self.build_function_from_parts(meta, id, params, body)
    }

    fn build_function_from_parts(
        &mut self,
        meta: Meta,
        id: Option<IdentifierData>,
        params: Vec<IdentifierData>,
        body_pair: Pair<Rule>,
    ) -> Result<Rc<FunctionData>, Error<Rule>> {
        let body_meta = get_meta(&body_pair);
        let statements: Vec<Pair<Rule>> = body_pair.into_inner().collect();
        let strict = self.current.strict || has_use_strict_directive(&statements);
        if strict {
            for name in id.iter().chain(params.iter()) {
                if is_restricted_in_strict_mode(&name.name) {
                    return Err(self.error_at("Unexpected eval or arguments in strict mode", &name.meta));
                }
                if is_strict_mode_reserved_word(&name.name) {
                    return Err(self.error_at("Unexpected strict mode reserved word", &name.meta));
                }
            }
            if let Some(duplicate) = find_duplicate_parameter(&params) {
                return Err(self.error_at(
                    "Duplicate parameter name not allowed in this context",
                    &duplicate.meta,
                ));
            }
        }
        self.enter_function(strict);
        let body = self.build_ast_from_statement_list(statements);
        let frame = self.exit_function();
        Ok(Rc::new(FunctionData {
            meta,
            id,
            params,
            body: FunctionBodyData {
                meta: body_meta,
                body: body?,
                declarations: frame.declarations,
                strict,
                uses_arguments: frame.uses_arguments,
            },
        }))
    }

    fn build_ast_from_expression(&mut self, pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
        let meta = get_meta(&pair);
        let mut expressions = vec![];
        for inner in pair.into_inner() {
            expressions.push(self.build_ast_from_assignment_expression(inner)?);
        }
        if expressions.len() == 1 {
            if let Some(only) = expressions.pop() {
                return Ok(only);
            }
        }
        Ok(ExpressionType::SequenceExpression { meta, expressions })
    }

    fn build_ast_from_assignment_expression(&mut self, pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
        let meta = get_meta(&pair);
        let mut inner = pair.into_inner();
        let target = self.next_pair(&mut inner, &meta)?;
        let target = self.build_ast_from_conditional_expression(target)?;
        let operator = match inner.next() {
            Some(op) => assignment_operator_from(&op)?,
            None => return Ok(target),
        };
        self.check_assignment_target(&target, "Invalid left-hand side in assignment")?;
        let value = self.next_pair(&mut inner, &meta)?;
        let value = self.build_ast_from_assignment_expression(value)?;
        Ok(ExpressionType::AssignmentExpression {
            meta,
            operator,
            left: Box::new(target),
            right: Box::new(value),
        })
    }

    fn build_ast_from_conditional_expression(&mut self, pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
        let meta = get_meta(&pair);
        let mut inner = pair.into_inner();
        let test = self.next_pair(&mut inner, &meta)?;
        let test = self.build_ast_from_operand(test)?;
        let consequent = match inner.next() {
            Some(p) => self.build_ast_from_assignment_expression(p)?,
            None => return Ok(test),
        };
        let alternate = self.next_pair(&mut inner, &meta)?;
        let alternate = self.build_ast_from_assignment_expression(alternate)?;
        Ok(ExpressionType::ConditionalExpression {
            meta,
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        })
    }

    /// Builds any expression level from `logical_or_expression` down to `unary_expression`.
    fn build_ast_from_operand(&mut self, pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
        match pair.as_rule() {
            Rule::logical_or_expression => self.build_ast_from_logical_expression(pair, LogicalOperator::Or),
            Rule::logical_and_expression => self.build_ast_from_logical_expression(pair, LogicalOperator::And),
            Rule::bitwise_or_expression
            | Rule::bitwise_xor_expression
            | Rule::bitwise_and_expression
            | Rule::equality_expression
            | Rule::relational_expression
            | Rule::shift_expression
            | Rule::additive_expression
            | Rule::multiplicative_expression => self.build_ast_from_binary_expression(pair),
            Rule::unary_expression => self.build_ast_from_unary_expression(pair),
            _ => Err(get_unexpected_error(9, &pair)),
        }
    }

    fn build_ast_from_logical_expression(
        &mut self,
        pair: Pair<Rule>,
        operator: LogicalOperator,
    ) -> Result<ExpressionType, Error<Rule>> {
        let meta = get_meta(&pair);
        let mut inner = pair.into_inner();
        let first = self.next_pair(&mut inner, &meta)?;
        let mut left = self.build_ast_from_operand(first)?;
        for operand in inner {
            let right = self.build_ast_from_operand(operand)?;
            left = ExpressionType::LogicalExpression {
                meta: Meta {
                    start_index: left.get_meta().start_index,
                    end_index: right.get_meta().end_index,
                },
                operator,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn build_ast_from_binary_expression(&mut self, pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
        let meta = get_meta(&pair);
        let mut inner = pair.into_inner();
        let first = self.next_pair(&mut inner, &meta)?;
        let mut left = self.build_ast_from_operand(first)?;
        while let Some(op) = inner.next() {
            let operator = binary_operator_from(&op)?;
            let right = self.next_pair(&mut inner, &meta)?;
            let right = self.build_ast_from_operand(right)?;
            left = ExpressionType::BinaryExpression {
                meta: Meta {
                    start_index: left.get_meta().start_index,
                    end_index: right.get_meta().end_index,
                },
                operator,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn build_ast_from_unary_expression(&mut self, pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
        let meta = get_meta(&pair);
        let mut inner: Vec<Pair<Rule>> = pair.into_inner().collect();
        let operand = inner
            .pop()
            .ok_or_else(|| self.error_at("Unexpected end of construct", &meta))?;
        let mut expression = self.build_ast_from_postfix_expression(operand)?;
        for op in inner.into_iter().rev() {
            let meta = Meta {
                start_index: op.as_span().start(),
                end_index: expression.get_meta().end_index,
            };
            let operator = match op.as_str() {
                "++" | "--" => {
                    self.check_assignment_target(
                        &expression,
                        "Invalid left-hand side expression in prefix operation",
                    )?;
                    let operator = if op.as_str() == "++" {
                        UpdateOperator::PlusPlus
                    } else {
                        UpdateOperator::MinusMinus
                    };
                    expression = ExpressionType::UpdateExpression {
                        meta,
                        operator,
                        argument: Box::new(expression),
                        prefix: true,
                    };
                    continue;
                }
                "delete" => {
                    if self.current.strict && matches!(expression, ExpressionType::Identifier(_)) {
                        return Err(self.error_at(
                            "Delete of an unqualified identifier in strict mode.",
                            &meta,
                        ));
                    }
                    UnaryOperator::Delete
                }
                "void" => UnaryOperator::Void,
                "typeof" => UnaryOperator::TypeOf,
                "+" => UnaryOperator::Plus,
                "-" => UnaryOperator::Minus,
                "~" => UnaryOperator::BitwiseNot,
                "!" => UnaryOperator::LogicalNot,
                _ => return Err(get_unexpected_error(10, &op)),
            };
            expression = ExpressionType::UnaryExpression {
                meta,
                operator,
                argument: Box::new(expression),
            };
        }
        Ok(expression)
    }

    fn build_ast_from_postfix_expression(&mut self, pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
        let meta = get_meta(&pair);
        let mut inner = pair.into_inner();
        let operand = self.next_pair(&mut inner, &meta)?;
        let argument = self.build_ast_from_left_hand_side_expression(operand)?;
        match inner.next() {
            None => Ok(argument),
            Some(op) => {
                self.check_assignment_target(
                    &argument,
                    "Invalid left-hand side expression in postfix operation",
                )?;
                let operator = if op.as_str() == "++" {
                    UpdateOperator::PlusPlus
                } else {
                    UpdateOperator::MinusMinus
                };
                Ok(ExpressionType::UpdateExpression {
                    meta,
                    operator,
                    argument: Box::new(argument),
                    prefix: false,
                })
            }
        }
    }

    fn build_ast_from_left_hand_side_expression(
        &mut self,
        pair: Pair<Rule>,
    ) -> Result<ExpressionType, Error<Rule>> {
        let meta = get_meta(&pair);
        let mut inner = pair.into_inner();
        let first = self.next_pair(&mut inner, &meta)?;
        let mut expression = match first.as_rule() {
            Rule::member_expression => self.build_ast_from_member_expression(first)?,
            Rule::new_expression => self.build_ast_from_new_expression(first)?,
            _ => return Err(get_unexpected_error(11, &first)),
        };
        for suffix in inner {
            expression = self.apply_suffix(expression, suffix)?;
        }
        Ok(expression)
    }

    fn build_ast_from_member_expression(&mut self, pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
        let meta = get_meta(&pair);
        let mut inner = pair.into_inner();
        let first = self.next_pair(&mut inner, &meta)?;
        let mut expression = match first.as_rule() {
            Rule::new_member_expression => {
                let new_meta = get_meta(&first);
                let mut parts = significant_children(first);
                let callee = self.next_pair(&mut parts, &new_meta)?;
                let callee = self.build_ast_from_member_expression(callee)?;
                let arguments = self.next_pair(&mut parts, &new_meta)?;
                ExpressionType::NewExpression {
                    meta: new_meta,
                    callee: Box::new(callee),
                    arguments: self.build_ast_from_arguments(arguments)?,
                }
            }
            Rule::primary_expression => self.build_ast_from_primary_expression(first)?,
            _ => return Err(get_unexpected_error(12, &first)),
        };
        for suffix in inner {
            expression = self.apply_suffix(expression, suffix)?;
        }
        Ok(expression)
    }

    fn build_ast_from_new_expression(&mut self, pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
        let meta = get_meta(&pair);
        let callee = self.next_pair(&mut significant_children(pair), &meta)?;
        let callee = match callee.as_rule() {
            Rule::member_expression => self.build_ast_from_member_expression(callee)?,
            Rule::new_expression => self.build_ast_from_new_expression(callee)?,
            _ => return Err(get_unexpected_error(13, &callee)),
        };
        Ok(ExpressionType::NewExpression {
            meta,
            callee: Box::new(callee),
            arguments: vec![],
        })
    }

    fn apply_suffix(&mut self, object: ExpressionType, suffix: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
        let suffix_meta = get_meta(&suffix);
        let meta = Meta {
            start_index: object.get_meta().start_index,
            end_index: suffix_meta.end_index,
        };
        Ok(match suffix.as_rule() {
            Rule::arguments => ExpressionType::CallExpression {
                meta,
                callee: Box::new(object),
                arguments: self.build_ast_from_arguments(suffix)?,
            },
            Rule::computed_member_suffix => {
                let property = self.next_pair(&mut suffix.into_inner(), &suffix_meta)?;
                ExpressionType::MemberExpression(MemberExpressionType::ComputedMemberExpression {
                    meta,
                    object: Box::new(object),
                    property: Box::new(self.build_ast_from_expression(property)?),
                })
            }
            Rule::dot_member_suffix => {
                let property = self.next_pair(&mut suffix.into_inner(), &suffix_meta)?;
                ExpressionType::MemberExpression(MemberExpressionType::SimpleMemberExpression {
                    meta,
                    object: Box::new(object),
                    property: identifier_data(&property),
                })
            }
            _ => return Err(get_unexpected_error(14, &suffix)),
        })
    }

    fn build_ast_from_arguments(&mut self, pair: Pair<Rule>) -> Result<Vec<ExpressionType>, Error<Rule>> {
        let mut arguments = vec![];
        for argument in pair.into_inner() {
            arguments.push(self.build_ast_from_assignment_expression(argument)?);
        }
        Ok(arguments)
    }

    fn build_ast_from_primary_expression(&mut self, pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
        let meta = get_meta(&pair);
        let inner = self.next_pair(&mut pair.into_inner(), &meta)?;
        Ok(match inner.as_rule() {
            Rule::this_kw => ExpressionType::ThisExpression { meta },
            Rule::function_expression => ExpressionType::FunctionExpression(self.build_ast_from_function(inner)?),
            Rule::identifier => ExpressionType::Identifier(self.build_identifier_reference(&inner)),
            Rule::literal => ExpressionType::Literal(self.build_ast_from_literal(inner)?),
            Rule::array_literal => {
                let mut elements = vec![];
                for element in inner.into_inner() {
                    elements.push(match element.as_rule() {
                        Rule::elision => None,
                        _ => Some(self.build_ast_from_assignment_expression(element)?),
                    });
                }
                ExpressionType::ArrayExpression { meta, elements }
            }
            Rule::object_literal => self.build_ast_from_object_literal(inner)?,
            Rule::parenthesized_expression => {
                let expression = self.next_pair(&mut inner.into_inner(), &meta)?;
                self.build_ast_from_expression(expression)?
            }
            _ => return Err(get_unexpected_error(15, &inner)),
        })
    }

    fn build_ast_from_literal(&mut self, pair: Pair<Rule>) -> Result<LiteralData, Error<Rule>> {
        let meta = get_meta(&pair);
        let inner = self.next_pair(&mut pair.into_inner(), &meta)?;
        let value = match inner.as_rule() {
            Rule::null_literal => LiteralType::NullLiteral,
            Rule::boolean_literal => LiteralType::BooleanLiteral(inner.as_str() == "true"),
            Rule::numeric_literal => LiteralType::NumberLiteral(number_literal_from_f64(
                string_to_number(&JsString::from(inner.as_str())),
            )),
            Rule::string_literal => LiteralType::StringLiteral(self.build_ast_from_string_literal(inner)?),
            _ => return Err(get_unexpected_error(16, &inner)),
        };
        Ok(LiteralData { meta, value })
    }

    fn build_ast_from_string_literal(&self, pair: Pair<Rule>) -> Result<JsString, Error<Rule>> {
        let meta = get_meta(&pair);
        let raw = pair.into_inner().next().map(|p| p.as_str()).unwrap_or("");
        decode_string_escapes(raw, self.current.strict).map_err(|message| self.error_at(message, &meta))
    }

    fn build_property_key(&self, pair: Pair<Rule>) -> Result<PropertyKey, Error<Rule>> {
        let meta = get_meta(&pair);
        let inner = self.next_pair(&mut pair.into_inner(), &meta)?;
        Ok(match inner.as_rule() {
            Rule::identifier_name => PropertyKey::from(inner.as_str()),
            Rule::string_literal => PropertyKey::from(self.build_ast_from_string_literal(inner)?),
            Rule::numeric_literal => {
                let n = string_to_number(&JsString::from(inner.as_str()));
                PropertyKey::from(JsString::from(number_to_string(n)))
            }
            _ => return Err(get_unexpected_error(17, &inner)),
        })
    }

    fn build_ast_from_object_literal(&mut self, pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
        let meta = get_meta(&pair);
        let mut keys = ObjectLiteralKeys::new(self.current.strict);
        let mut properties = vec![];
        for definition in pair.into_inner() {
            let definition_meta = get_meta(&definition);
            let mut inner = definition.into_inner();
            let first = self.next_pair(&mut inner, &definition_meta)?;
            let (key, value) = match first.as_rule() {
                Rule::getter_definition => {
                    let accessor_meta = get_meta(&first);
                    let mut parts = significant_children(first);
                    let key = self.build_property_key(self.next_pair(&mut parts, &accessor_meta)?)?;
                    let body = self.next_pair(&mut parts, &accessor_meta)?;
                    let f = self.build_function_from_parts(accessor_meta, None, vec![], body)?;
                    (key, PropertyValue::Get(f))
                }
                Rule::setter_definition => {
                    let accessor_meta = get_meta(&first);
                    let mut parts = significant_children(first);
                    let key = self.build_property_key(self.next_pair(&mut parts, &accessor_meta)?)?;
                    let param = identifier_data(&self.next_pair(&mut parts, &accessor_meta)?);
                    let body = self.next_pair(&mut parts, &accessor_meta)?;
                    let f = self.build_function_from_parts(accessor_meta, None, vec![param], body)?;
                    (key, PropertyValue::Set(f))
                }
                Rule::property_name => {
                    let key = self.build_property_key(first)?;
                    let value = self.next_pair(&mut inner, &definition_meta)?;
                    (key, PropertyValue::Init(self.build_ast_from_assignment_expression(value)?))
                }
                _ => return Err(get_unexpected_error(18, &first)),
            };
            keys.add(&key, &value)
                .map_err(|message| self.error_at(message, &definition_meta))?;
            properties.push(PropertyData {
                meta: definition_meta,
                key,
                value,
            });
        }
        Ok(ExpressionType::ObjectExpression { meta, properties })
    }
}
