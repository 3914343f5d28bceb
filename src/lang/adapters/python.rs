//! Python literal scanner with tree-sitter integration.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::PathBuf;

use tree_sitter::{Node, Parser, Tree};

use crate::core::config::ExtractionConfig;
use crate::core::errors::{LiteralistError, Result};
use crate::lang::common::{
    ConstantDefinition, DiscoveredLiteral, LiteralValue, Occurrence, ScannedFile, SourceAnalyzer,
};
use crate::lang::python_literal::{decode_string_token, StringToken};
use crate::lang::registry::create_parser_for_language;

#[cfg(test)]
#[path = "python_tests.rs"]
mod tests;

/// `re` module functions whose first positional argument is a pattern.
pub const REGEX_FUNCTIONS: &[&str] = &[
    "compile", "search", "match", "fullmatch", "split", "findall", "finditer", "sub", "subn",
];

const IMPORT_KINDS: &[&str] = &[
    "import_statement",
    "import_from_statement",
    "future_import_statement",
];

/// Python-specific literal discovery
pub struct PythonScanner {
    /// Tree-sitter parser for Python
    parser: Parser,
}

/// Inherited state while walking the tree.
#[derive(Debug, Clone, Copy, Default)]
struct VisitContext {
    /// Inside the arguments of a call listed in `ignored_calls`
    in_ignored_call: bool,
    /// Inside the pattern argument of a regular-expression call
    regex_pattern: bool,
}

impl PythonScanner {
    /// Create a new Python scanner
    pub fn new() -> Result<Self> {
        let parser = create_parser_for_language("py")?;
        Ok(Self { parser })
    }

    fn parse_tree(&mut self, source: &str) -> Result<Tree> {
        self.parser
            .parse(source, None)
            .ok_or_else(|| LiteralistError::parse("python", "Failed to parse Python source"))
    }

    /// Parse and reject trees that contain syntax errors.
    fn parse_valid(&mut self, source: &str, file_path: &str) -> Result<Tree> {
        let tree = self.parse_tree(source)?;
        let root = tree.root_node();
        if root.has_error() {
            let (line, column) = first_error(root)
                .map(|node| {
                    let pos = node.start_position();
                    (Some(pos.row + 1), Some(pos.column))
                })
                .unwrap_or((None, None));
            return Err(LiteralistError::parse_with_location(
                "python",
                "Source contains syntax errors",
                file_path,
                line,
                column,
            ));
        }
        Ok(tree)
    }

    /// Walk the tree iteratively and collect every extractable literal.
    fn collect_literals(
        root: Node<'_>,
        source: &str,
        file_path: &str,
        config: &ExtractionConfig,
    ) -> Vec<DiscoveredLiteral> {
        let definitions = literal_definitions(root, source);
        let mut docstrings: HashSet<usize> = HashSet::new();
        if let Some(doc) = docstring_node(root) {
            docstrings.insert(doc.start_byte());
        }

        let mut literals = Vec::new();
        let mut stack = vec![(root, VisitContext::default())];

        while let Some((node, ctx)) = stack.pop() {
            let value = match node.kind() {
                "string" | "concatenated_string" => {
                    if ctx.in_ignored_call || docstrings.contains(&node.start_byte()) {
                        continue;
                    }
                    string_value(node, source).filter(|v| keep_sequence(v, config))
                }
                "integer" => {
                    if ctx.in_ignored_call || !config.scan_ints {
                        continue;
                    }
                    parse_integer(node_text(node, source))
                        .filter(|v| !config.ignored_numbers.contains_int(*v))
                        .map(LiteralValue::Int)
                }
                "float" => {
                    if ctx.in_ignored_call || !config.scan_floats {
                        continue;
                    }
                    parse_float(node_text(node, source))
                        .filter(|v| !config.ignored_numbers.contains_real(*v))
                        .map(LiteralValue::Real)
                }
                // Bare names in patterns are capture targets.
                "case_pattern" => continue,
                "call" => {
                    push_call_children(node, ctx, source, config, &mut stack);
                    continue;
                }
                "function_definition" | "class_definition" => {
                    if let Some(doc) = node
                        .child_by_field_name("body")
                        .and_then(docstring_node)
                    {
                        docstrings.insert(doc.start_byte());
                    }
                    push_children(node, ctx, &mut stack);
                    continue;
                }
                _ => {
                    push_children(node, ctx, &mut stack);
                    continue;
                }
            };

            if let Some(value) = value {
                let start = node.start_position();
                let end = node.end_position();
                literals.push(DiscoveredLiteral {
                    value,
                    occurrence: Occurrence {
                        filepath: file_path.to_string(),
                        lineno: start.row + 1,
                        col_offset: start.column,
                        end_lineno: end.row + 1,
                        end_col_offset: end.column,
                        definition_of: definitions
                            .get(&(node.start_byte(), node.end_byte()))
                            .cloned(),
                        is_regex_arg: ctx.regex_pattern,
                    },
                });
            }
        }

        literals
    }
}

impl SourceAnalyzer for PythonScanner {
    fn scan_source(
        &mut self,
        source: &str,
        file_path: &str,
        config: &ExtractionConfig,
    ) -> Result<ScannedFile> {
        let tree = self.parse_valid(source, file_path)?;
        let root = tree.root_node();
        let (top_level_names, imported_names) = top_level_names(root, source);

        Ok(ScannedFile {
            path: PathBuf::from(file_path),
            literals: Self::collect_literals(root, source, file_path, config),
            top_level_names,
            imported_names,
        })
    }

    fn constant_definitions(&mut self, source: &str) -> Result<Vec<ConstantDefinition>> {
        let tree = self.parse_valid(source, "<constants>")?;
        let root = tree.root_node();

        let mut definitions = Vec::new();
        for stmt in module_statements(root) {
            let Some(assign) = assignment_in(stmt) else {
                continue;
            };
            let (Some(left), Some(right)) = (
                assign.child_by_field_name("left"),
                assign.child_by_field_name("right"),
            ) else {
                continue;
            };
            if left.kind() != "identifier" || right.kind() == "assignment" {
                continue;
            }
            definitions.push(ConstantDefinition {
                name: node_text(left, source).to_string(),
                value: plain_literal_value(right, source),
            });
        }
        Ok(definitions)
    }

    fn insertion_line(&mut self, source: &str) -> usize {
        let Ok(tree) = self.parse_tree(source) else {
            return 0;
        };
        let root = tree.root_node();
        if root.has_error() {
            return 0;
        }

        let last_import = module_statements(root)
            .into_iter()
            .filter(|stmt| IMPORT_KINDS.contains(&stmt.kind()))
            .map(|stmt| stmt.end_position().row + 1)
            .max();
        if let Some(line) = last_import {
            return line;
        }

        let mut line = if source.starts_with("#!") { 1 } else { 0 };
        if let Some(doc) = docstring_node(root) {
            line = line.max(doc.end_position().row + 1);
        }
        line
    }
}

fn node_text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

fn push_children<'t>(node: Node<'t>, ctx: VisitContext, stack: &mut Vec<(Node<'t>, VisitContext)>) {
    let mut cursor = node.walk();
    let children: Vec<Node<'t>> = node.children(&mut cursor).collect();
    stack.extend(children.into_iter().rev().map(|child| (child, ctx)));
}

/// Schedule the parts of a call, marking ignored-call arguments and the
/// pattern argument of `re.*` calls.
fn push_call_children<'t>(
    node: Node<'t>,
    ctx: VisitContext,
    source: &str,
    config: &ExtractionConfig,
    stack: &mut Vec<(Node<'t>, VisitContext)>,
) {
    let function = node.child_by_field_name("function");
    let mut inner = ctx;
    if let Some(name) = function.and_then(|f| dotted_name(f, source)) {
        if config.ignored_calls.contains(&name) {
            inner.in_ignored_call = true;
        }
    }
    let is_regex = function.is_some_and(|f| is_regex_function(f, source));

    let mut scheduled: Vec<(Node<'t>, VisitContext)> = Vec::new();
    if let Some(function) = function {
        scheduled.push((function, inner));
    }
    if let Some(arguments) = node.child_by_field_name("arguments") {
        if is_regex && arguments.kind() == "argument_list" {
            let mut pattern_seen = false;
            let mut cursor = arguments.walk();
            for arg in arguments.named_children(&mut cursor) {
                let positional =
                    !matches!(arg.kind(), "keyword_argument" | "dictionary_splat" | "comment");
                let mut arg_ctx = inner;
                arg_ctx.regex_pattern = positional && !pattern_seen;
                pattern_seen |= positional;
                scheduled.push((arg, arg_ctx));
            }
        } else {
            scheduled.push((arguments, inner));
        }
    }
    stack.extend(scheduled.into_iter().rev());
}

/// Dotted name of a call target (`os.path.join`), or `None` for computed targets.
fn dotted_name(node: Node<'_>, source: &str) -> Option<String> {
    match node.kind() {
        "identifier" => Some(node_text(node, source).to_string()),
        "attribute" => {
            let attr = node_text(node.child_by_field_name("attribute")?, source);
            match node.child_by_field_name("object").and_then(|o| dotted_name(o, source)) {
                Some(parent) => Some(format!("{parent}.{attr}")),
                None => Some(attr.to_string()),
            }
        }
        _ => None,
    }
}

fn is_regex_function(function: Node<'_>, source: &str) -> bool {
    if function.kind() != "attribute" {
        return false;
    }
    let object = function.child_by_field_name("object");
    let attribute = function.child_by_field_name("attribute");
    match (object, attribute) {
        (Some(object), Some(attribute)) => {
            object.kind() == "identifier"
                && node_text(object, source) == "re"
                && REGEX_FUNCTIONS.contains(&node_text(attribute, source))
        }
        _ => false,
    }
}

/// Statements of a module or block, comments excluded.
fn module_statements(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// Docstring expression of a module or block body, if present.
fn docstring_node(body: Node<'_>) -> Option<Node<'_>> {
    let first = module_statements(body).into_iter().next()?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let mut cursor = first.walk();
    let exprs: Vec<Node<'_>> = first.named_children(&mut cursor).collect();
    match exprs.as_slice() {
        [expr] if matches!(expr.kind(), "string" | "concatenated_string") => Some(*expr),
        _ => None,
    }
}

fn assignment_in(stmt: Node<'_>) -> Option<Node<'_>> {
    if stmt.kind() != "expression_statement" {
        return None;
    }
    let mut cursor = stmt.walk();
    let first = stmt.named_children(&mut cursor).next()?;
    (first.kind() == "assignment").then_some(first)
}

/// Map from the byte range of each module-level `NAME = <literal>` right-hand
/// side to `NAME`.
fn literal_definitions(root: Node<'_>, source: &str) -> HashMap<(usize, usize), String> {
    let mut definitions = HashMap::new();
    for stmt in module_statements(root) {
        let Some(assign) = assignment_in(stmt) else {
            continue;
        };
        let (Some(left), Some(right)) = (
            assign.child_by_field_name("left"),
            assign.child_by_field_name("right"),
        ) else {
            continue;
        };
        if left.kind() == "identifier"
            && matches!(
                right.kind(),
                "string" | "concatenated_string" | "integer" | "float"
            )
        {
            definitions.insert(
                (right.start_byte(), right.end_byte()),
                node_text(left, source).to_string(),
            );
        }
    }
    definitions
}

/// Identifiers bound at module level, and the subset bound by imports.
fn top_level_names(root: Node<'_>, source: &str) -> (BTreeSet<String>, BTreeSet<String>) {
    let mut names = BTreeSet::new();
    let mut imported = BTreeSet::new();
    for stmt in module_statements(root) {
        match stmt.kind() {
            "function_definition" | "class_definition" => {
                if let Some(name) = stmt.child_by_field_name("name") {
                    names.insert(node_text(name, source).to_string());
                }
            }
            "decorated_definition" => {
                if let Some(name) = stmt
                    .child_by_field_name("definition")
                    .and_then(|def| def.child_by_field_name("name"))
                {
                    names.insert(node_text(name, source).to_string());
                }
            }
            "expression_statement" => {
                let mut current = assignment_in(stmt);
                while let Some(assign) = current {
                    if let Some(left) = assign.child_by_field_name("left") {
                        if left.kind() == "identifier" {
                            names.insert(node_text(left, source).to_string());
                        }
                    }
                    current = assign
                        .child_by_field_name("right")
                        .filter(|right| right.kind() == "assignment");
                }
            }
            kind if IMPORT_KINDS.contains(&kind) => {
                let mut cursor = stmt.walk();
                for name_node in stmt.children_by_field_name("name", &mut cursor) {
                    if let Some(bound) = import_binding(name_node, source) {
                        names.insert(bound.clone());
                        imported.insert(bound);
                    }
                }
            }
            _ => {}
        }
    }
    (names, imported)
}

fn import_binding(node: Node<'_>, source: &str) -> Option<String> {
    match node.kind() {
        "aliased_import" => Some(node_text(node.child_by_field_name("alias")?, source).to_string()),
        "dotted_name" => {
            let mut cursor = node.walk();
            let first = node.named_children(&mut cursor).next()?;
            Some(node_text(first, source).to_string())
        }
        "identifier" => Some(node_text(node, source).to_string()),
        _ => None,
    }
}

/// Value of a string or implicitly concatenated string expression.
fn string_value(node: Node<'_>, source: &str) -> Option<LiteralValue> {
    let token = match node.kind() {
        "string" => decode_string_token(node_text(node, source))?,
        "concatenated_string" => {
            let mut parts = Vec::new();
            let mut cursor = node.walk();
            for part in node.named_children(&mut cursor) {
                match part.kind() {
                    "string" => parts.push(decode_string_token(node_text(part, source))?),
                    "comment" => {}
                    _ => return None,
                }
            }
            join_tokens(parts)?
        }
        _ => return None,
    };
    match token {
        StringToken::Text(s) => Some(LiteralValue::Text(s)),
        StringToken::Bytes(b) => Some(LiteralValue::Bytes(b)),
        StringToken::Formatted => None,
    }
}

fn join_tokens(parts: Vec<StringToken>) -> Option<StringToken> {
    let mut iter = parts.into_iter();
    let mut joined = iter.next()?;
    for part in iter {
        joined = match (joined, part) {
            (StringToken::Text(mut a), StringToken::Text(b)) => {
                a.push_str(&b);
                StringToken::Text(a)
            }
            (StringToken::Bytes(mut a), StringToken::Bytes(b)) => {
                a.extend(b);
                StringToken::Bytes(a)
            }
            _ => return None,
        };
    }
    Some(joined)
}

fn keep_sequence(value: &LiteralValue, config: &ExtractionConfig) -> bool {
    match value {
        LiteralValue::Text(s) => {
            s.chars().count() >= config.min_length && !config.ignored_strings.contains(s)
        }
        LiteralValue::Bytes(b) => config.scan_bytes && b.len() >= config.min_length,
        _ => true,
    }
}

/// Literal value of a right-hand side, without any extraction filters.
fn plain_literal_value(node: Node<'_>, source: &str) -> Option<LiteralValue> {
    match node.kind() {
        "string" | "concatenated_string" => string_value(node, source),
        "integer" => parse_integer(node_text(node, source)).map(LiteralValue::Int),
        "float" => parse_float(node_text(node, source)).map(LiteralValue::Real),
        _ => None,
    }
}

/// Parse an integer token (`0x1F`, `1_000`, `0o17`). Imaginary tokens and
/// values outside the 64-bit range yield `None`.
pub(crate) fn parse_integer(text: &str) -> Option<i64> {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != '_')
        .collect::<String>()
        .to_ascii_lowercase();
    if cleaned.ends_with('j') || cleaned.ends_with('l') {
        return None;
    }
    let (digits, radix) = if let Some(rest) = cleaned.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = cleaned.strip_prefix("0o") {
        (rest, 8)
    } else if let Some(rest) = cleaned.strip_prefix("0b") {
        (rest, 2)
    } else {
        (cleaned.as_str(), 10)
    };
    i64::from_str_radix(digits, radix).ok()
}

/// Parse a real token. Imaginary and non-finite values yield `None`.
pub(crate) fn parse_float(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    if cleaned.ends_with('j') || cleaned.ends_with('J') {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    None
}
