//! L1 extractor (component B, spec.md §4.2).
//!
//! Follows `features/parsing/plugins/typescript.rs`'s (`extract_class`,
//! `extract_interface`, `extract_function`, `extract_parameters`,
//! `extract_decorators`) field-name-first, tolerate-missing-children style,
//! retargeted to spec.md §3's `Module` shape instead of a generic IR
//! node/edge pair.

use crate::parsing::{Language, Node, ParsedTree};
use crate::shared::hash::sha256_hex;

use super::model::{
    Class, Export, ExportType, Function, FunctionKind, Import, ImportName, Interface, Module,
    ModuleLanguage, Parameter, Property, TypeAlias, Variable, VariableKind, Visibility,
};

/// spec.md §4.2: given source text and a file path, return a `Module`.
pub fn extract_module(tree: &ParsedTree, file_path: &str) -> Module {
    let content_hash = sha256_hex(tree.source());
    let language: ModuleLanguage = tree.language().into();
    let mut module = Module::new(file_path, language, content_hash);

    let root = tree.root();
    let children = root.children();

    let mut leading_comments = Vec::new();
    for child in &children {
        if child.kind() == "comment" {
            leading_comments.push(clean_comment(child.text()));
        } else {
            break;
        }
    }
    if !leading_comments.is_empty() {
        module.docstring = Some(leading_comments.join("\n"));
    }

    for (idx, child) in children.iter().enumerate() {
        match child.kind() {
            "import_statement" => module.imports.push(parse_import(*child)),
            "export_statement" => parse_export_statement(*child, &mut module, &children, idx),
            "function_declaration" | "generator_function_declaration" => {
                let mut f = parse_function(*child);
                f.docstring = extract_docstring(&children, idx);
                module.functions.push(f);
            }
            "class_declaration" => module.classes.push(parse_class(*child)),
            "interface_declaration" => module.interfaces.push(parse_interface(*child)),
            "type_alias_declaration" => module.type_aliases.push(parse_type_alias(*child)),
            "lexical_declaration" | "variable_declaration" => {
                let (vars, funcs) = parse_variable_declaration(*child);
                module.variables.extend(vars);
                module.functions.extend(funcs);
            }
            "expression_statement" => {
                if let Some(assign) = child.find_child("assignment_expression") {
                    if let Some(f) = parse_assignment_as_function(assign) {
                        module.functions.push(f);
                    }
                }
            }
            _ => {}
        }
    }

    module
}

fn strip_type_annotation(text: &str) -> String {
    text.trim_start_matches(':').trim().to_string()
}

fn clean_comment(text: &str) -> String {
    let text = text.trim();
    let text = text.strip_prefix("/**").or_else(|| text.strip_prefix("/*")).unwrap_or(text);
    let text = text.strip_suffix("*/").unwrap_or(text);
    let text = text.strip_prefix("//").unwrap_or(text);
    text.lines()
        .map(|l| l.trim().trim_start_matches('*').trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Looks one root-level sibling back for a `comment` node immediately
/// preceding `children[idx]` (decorators in between are skipped).
fn extract_docstring(children: &[Node<'_>], idx: usize) -> Option<String> {
    let mut j = idx;
    while j > 0 {
        j -= 1;
        let prev = children[j];
        if prev.kind() == "decorator" {
            continue;
        }
        if prev.kind() == "comment" {
            return Some(clean_comment(prev.text()));
        }
        break;
    }
    None
}

fn collect_decorators(node: Node<'_>) -> Vec<String> {
    node.children()
        .into_iter()
        .filter(|c| c.kind() == "decorator")
        .map(|c| c.text().to_string())
        .collect()
}

fn accessibility(node: Node<'_>, name_node: Option<Node<'_>>) -> Visibility {
    if let Some(modifier) = node.find_child("accessibility_modifier") {
        return match modifier.text() {
            "private" => Visibility::Private,
            "protected" => Visibility::Protected,
            "public" => Visibility::Public,
            _ => Visibility::None,
        };
    }
    // spec.md §4.2 step 3: "a private_property_identifier implies visibility = private".
    if matches!(name_node.map(|n| n.kind()), Some("private_property_identifier")) {
        return Visibility::Private;
    }
    Visibility::None
}

fn parse_import(node: Node<'_>) -> Import {
    let line = node.span().start_line;
    let is_type_only = node.children().iter().any(|c| c.kind() == "type");
    let module = node
        .find_child("string")
        .map(|s| strip_quotes(s.text()))
        .unwrap_or_default();

    let mut names = Vec::new();
    if let Some(clause) = node.find_child("import_clause") {
        for part in clause.children() {
            match part.kind() {
                "identifier" => names.push(ImportName {
                    name: part.text().to_string(),
                    alias: None,
                    is_default: true,
                    is_namespace: false,
                    is_type_only,
                }),
                "namespace_import" => {
                    if let Some(id) = part.find_child("identifier") {
                        names.push(ImportName {
                            name: id.text().to_string(),
                            alias: None,
                            is_default: false,
                            is_namespace: true,
                            is_type_only,
                        });
                    }
                }
                "named_imports" => {
                    for spec in part.find_children("import_specifier") {
                        let name_node = spec.child_by_field_name("name");
                        let alias_node = spec.child_by_field_name("alias");
                        let name = name_node.map(|n| n.text().to_string()).unwrap_or_default();
                        let spec_type_only = is_type_only
                            || spec.children().iter().any(|c| c.kind() == "type");
                        names.push(ImportName {
                            name,
                            alias: alias_node.map(|n| n.text().to_string()),
                            is_default: false,
                            is_namespace: false,
                            is_type_only: spec_type_only,
                        });
                    }
                }
                _ => {}
            }
        }
    }

    Import {
        module,
        names,
        is_type_only,
        is_dynamic: false,
        line,
    }
}

fn strip_quotes(text: &str) -> String {
    text.trim_matches(|c| c == '"' || c == '\'' || c == '`').to_string()
}

fn parse_export_statement(node: Node<'_>, module: &mut Module, siblings: &[Node<'_>], idx: usize) {
    let is_default = node.children().iter().any(|c| c.kind() == "default");
    let is_type_only = node.children().iter().any(|c| c.kind() == "type");
    let line = node.span().start_line;

    let decl = node.children().into_iter().find(|c| {
        matches!(
            c.kind(),
            "function_declaration"
                | "generator_function_declaration"
                | "class_declaration"
                | "interface_declaration"
                | "type_alias_declaration"
                | "lexical_declaration"
                | "variable_declaration"
        )
    });

    if let Some(decl) = decl {
        match decl.kind() {
            "function_declaration" | "generator_function_declaration" => {
                let mut f = parse_function(decl);
                f.is_exported = true;
                f.export_type = if is_default { ExportType::Default } else { ExportType::Named };
                f.docstring = extract_docstring(siblings, idx);
                let name = f.name.clone();
                module.exports.push(Export {
                    name: if is_default { "default".to_string() } else { name.clone() },
                    local_name: Some(name),
                    is_default,
                    is_re_export: false,
                    source_module: None,
                    is_type_only,
                    line,
                });
                module.functions.push(f);
            }
            "class_declaration" => {
                let mut c = parse_class(decl);
                let name = c.name.clone();
                c.is_exported = true;
                c.export_type = if is_default { ExportType::Default } else { ExportType::Named };
                module.exports.push(Export {
                    name: if is_default { "default".to_string() } else { name.clone() },
                    local_name: Some(name),
                    is_default,
                    is_re_export: false,
                    source_module: None,
                    is_type_only,
                    line,
                });
                module.classes.push(c);
            }
            "interface_declaration" => {
                let iface = parse_interface(decl);
                module.exports.push(Export {
                    name: iface.name.clone(),
                    local_name: Some(iface.name.clone()),
                    is_default,
                    is_re_export: false,
                    source_module: None,
                    is_type_only: true,
                    line,
                });
                module.interfaces.push(iface);
            }
            "type_alias_declaration" => {
                let alias = parse_type_alias(decl);
                module.exports.push(Export {
                    name: alias.name.clone(),
                    local_name: Some(alias.name.clone()),
                    is_default,
                    is_re_export: false,
                    source_module: None,
                    is_type_only: true,
                    line,
                });
                module.type_aliases.push(alias);
            }
            "lexical_declaration" | "variable_declaration" => {
                let (mut vars, mut funcs) = parse_variable_declaration(decl);
                for v in &mut vars {
                    v.is_exported = true;
                    v.export_type = ExportType::Named;
                    module.exports.push(Export {
                        name: v.name.clone(),
                        local_name: Some(v.name.clone()),
                        is_default: false,
                        is_re_export: false,
                        source_module: None,
                        is_type_only: false,
                        line: v.line,
                    });
                }
                for f in &mut funcs {
                    f.is_exported = true;
                    f.export_type = ExportType::Named;
                    module.exports.push(Export {
                        name: f.name.clone(),
                        local_name: Some(f.name.clone()),
                        is_default: false,
                        is_re_export: false,
                        source_module: None,
                        is_type_only: false,
                        line: f.line,
                    });
                }
                module.variables.extend(vars);
                module.functions.extend(funcs);
            }
            _ => {}
        }
        return;
    }

    let source_module = node.find_child("string").map(|s| strip_quotes(s.text()));

    if let Some(clause) = node.find_child("export_clause") {
        for spec in clause.find_children("export_specifier") {
            let name_node = spec.child_by_field_name("name");
            let alias_node = spec.child_by_field_name("alias");
            let local = name_node.map(|n| n.text().to_string()).unwrap_or_default();
            let exported_name = alias_node.map(|n| n.text().to_string()).unwrap_or_else(|| local.clone());
            module.exports.push(Export {
                name: exported_name,
                local_name: Some(local),
                is_default: false,
                is_re_export: source_module.is_some(),
                source_module: source_module.clone(),
                is_type_only,
                line: spec.span().start_line,
            });
        }
        return;
    }

    if node.children().iter().any(|c| c.kind() == "*") {
        module.exports.push(Export {
            name: "*".to_string(),
            local_name: None,
            is_default: false,
            is_re_export: true,
            source_module,
            is_type_only,
            line,
        });
        return;
    }

    if is_default {
        let expr = node
            .children()
            .into_iter()
            .rev()
            .find(|c| !matches!(c.kind(), "export" | "default" | ";"));
        if let Some(expr) = expr {
            if matches!(expr.kind(), "arrow_function" | "function_expression") {
                let mut f = parse_function(expr);
                f.name = "default".to_string();
                f.kind = FunctionKind::Expression;
                f.is_exported = true;
                f.export_type = ExportType::Default;
                module.exports.push(Export {
                    name: "default".to_string(),
                    local_name: Some(f.name.clone()),
                    is_default: true,
                    is_re_export: false,
                    source_module: None,
                    is_type_only: false,
                    line,
                });
                module.functions.push(f);
                return;
            }
            let local = if expr.kind() == "identifier" {
                Some(expr.text().to_string())
            } else {
                None
            };
            module.exports.push(Export {
                name: "default".to_string(),
                local_name: local,
                is_default: true,
                is_re_export: false,
                source_module: None,
                is_type_only: false,
                line,
            });
        }
    }
}

fn parse_function(node: Node<'_>) -> Function {
    let name_node = node.child_by_field_name("name");
    let name = name_node.map(|n| n.text().to_string()).unwrap_or_default();
    let span = node.span();
    let mut f = Function::new(name, span.start_line, span);
    f.is_async = node.children().iter().any(|c| c.kind() == "async");
    f.is_generator = node.children().iter().any(|c| c.kind() == "*");
    f.decorators = collect_decorators(node);
    f.kind = match node.kind() {
        "arrow_function" => FunctionKind::Arrow,
        "function_expression" => FunctionKind::Expression,
        _ => FunctionKind::Declaration,
    };
    if let Some(params) = node.child_by_field_name("parameters") {
        // A single bare identifier parameter skips `formal_parameters`
        // entirely in the grammar (`x => x + 1`).
        if params.kind() == "identifier" {
            f.params.push(Parameter::new(params.text()));
        } else {
            f.params = parse_formal_parameters(params);
        }
    }
    if let Some(rt) = node.child_by_field_name("return_type") {
        f.return_type = Some(strip_type_annotation(rt.text()));
    }
    f
}

fn parse_formal_parameters(params_node: Node<'_>) -> Vec<Parameter> {
    let mut out = Vec::new();
    for child in params_node.children() {
        match child.kind() {
            "required_parameter" | "optional_parameter" | "rest_parameter" => {
                out.extend(parse_parameter_node(child));
            }
            "identifier" => out.push(Parameter::new(child.text())),
            _ => {}
        }
    }
    out
}

fn parse_parameter_node(node: Node<'_>) -> Vec<Parameter> {
    let is_rest = node.kind() == "rest_parameter";
    let is_optional = node.kind() == "optional_parameter";
    let pattern = node
        .child_by_field_name("pattern")
        .or_else(|| node.find_child("identifier"));

    let type_ = node.child_by_field_name("type").map(|t| strip_type_annotation(t.text()));
    let default_value = node.child_by_field_name("value").map(|v| v.text().to_string());

    match pattern {
        Some(p) if p.kind() == "object_pattern" => destructure_object_pattern(p),
        Some(p) if p.kind() == "array_pattern" => destructure_array_pattern(p),
        Some(p) => vec![Parameter {
            name: p.text().to_string(),
            type_,
            default_value,
            is_rest,
            is_optional,
        }],
        None => Vec::new(),
    }
}

/// spec.md §4.2 edge case: `{a, b}` destructured parameters must still
/// contribute named parameters rather than one literal `"{a,b}"` name.
fn destructure_object_pattern(pattern: Node<'_>) -> Vec<Parameter> {
    let mut out = Vec::new();
    for child in pattern.named_children() {
        match child.kind() {
            "shorthand_property_identifier_pattern" => out.push(Parameter::new(child.text())),
            "pair_pattern" => {
                if let Some(value) = child.child_by_field_name("value") {
                    out.push(Parameter::new(value.text()));
                }
            }
            "rest_pattern" => {
                if let Some(id) = child.find_child("identifier") {
                    let mut p = Parameter::new(id.text());
                    p.is_rest = true;
                    out.push(p);
                }
            }
            _ => {}
        }
    }
    out
}

fn destructure_array_pattern(pattern: Node<'_>) -> Vec<Parameter> {
    pattern
        .named_children()
        .into_iter()
        .filter(|c| c.kind() == "identifier")
        .map(Parameter::new_from_node)
        .collect()
}

impl Parameter {
    fn new_from_node(node: Node<'_>) -> Parameter {
        Parameter::new(node.text())
    }
}

fn parse_class(node: Node<'_>) -> Class {
    let name = node.child_by_field_name("name").map(|n| n.text().to_string()).unwrap_or_default();
    let span = node.span();
    let mut class = Class::new(name, span.start_line, span);
    class.decorators = collect_decorators(node);
    class.is_abstract = node.children().iter().any(|c| c.kind() == "abstract");

    for heritage in node.find_children("class_heritage") {
        for part in heritage.children() {
            match part.kind() {
                "extends_clause" => {
                    if let Some(t) = part.named_children().into_iter().next() {
                        class.bases.push(t.text().to_string());
                    }
                }
                "implements_clause" => {
                    for t in part.named_children() {
                        if matches!(t.kind(), "type_identifier" | "generic_type") {
                            class.implements.push(t.text().to_string());
                        }
                    }
                }
                _ => {}
            }
        }
    }

    if let Some(body) = node.child_by_field_name("body") {
        for member in body.children() {
            match member.kind() {
                "method_definition" => class.methods.push(parse_method(member)),
                "public_field_definition" | "private_field_definition" => {
                    class.properties.push(parse_field(member))
                }
                _ => {}
            }
        }
    }

    class
}

fn parse_method(node: Node<'_>) -> Function {
    let name_node = node.child_by_field_name("name");
    let name = name_node.map(|n| n.text().to_string()).unwrap_or_default();
    let span = node.span();
    let mut f = Function::new(name, span.start_line, span);
    f.is_method = true;
    f.is_async = node.children().iter().any(|c| c.kind() == "async");
    f.is_generator = node.children().iter().any(|c| c.kind() == "*");
    f.is_static = node.children().iter().any(|c| c.kind() == "static");
    f.decorators = collect_decorators(node);
    f.visibility = accessibility(node, name_node);
    if let Some(params) = node.child_by_field_name("parameters") {
        f.params = parse_formal_parameters(params);
    }
    if let Some(rt) = node.child_by_field_name("return_type") {
        f.return_type = Some(strip_type_annotation(rt.text()));
    }
    f
}

fn parse_field(node: Node<'_>) -> Property {
    let name_node = node.child_by_field_name("name");
    let name = name_node.map(|n| n.text().to_string()).unwrap_or_default();
    let mut p = Property::new(name, node.span().start_line);
    p.is_static = node.children().iter().any(|c| c.kind() == "static");
    p.is_readonly = node.children().iter().any(|c| c.kind() == "readonly");
    p.visibility = accessibility(node, name_node);
    if let Some(t) = node.child_by_field_name("type") {
        p.type_ = Some(strip_type_annotation(t.text()));
    }
    if let Some(v) = node.child_by_field_name("value") {
        p.default_value = Some(v.text().to_string());
    }
    p
}

fn parse_interface(node: Node<'_>) -> Interface {
    let name = node.child_by_field_name("name").map(|n| n.text().to_string()).unwrap_or_default();
    let span = node.span();
    let mut iface = Interface::new(name, span.start_line, span);

    for part in node.children() {
        if part.kind().contains("extends") {
            for t in part.named_children() {
                if matches!(t.kind(), "type_identifier" | "generic_type") {
                    iface.extends.push(t.text().to_string());
                }
            }
        }
    }

    if let Some(body) = node.child_by_field_name("body") {
        for member in body.children() {
            match member.kind() {
                "method_signature" => iface.methods.push(parse_method(member)),
                "property_signature" => iface.properties.push(parse_field(member)),
                _ => {}
            }
        }
    }

    iface
}

fn parse_type_alias(node: Node<'_>) -> TypeAlias {
    let name = node.child_by_field_name("name").map(|n| n.text().to_string()).unwrap_or_default();
    let span = node.span();
    let definition = match node.child_by_field_name("value") {
        Some(v) => v.text().to_string(),
        None => node
            .text()
            .split_once('=')
            .map(|(_, rhs)| rhs.trim().trim_end_matches(';').trim().to_string())
            .unwrap_or_default(),
    };
    TypeAlias {
        name,
        definition,
        line: span.start_line,
        span,
    }
}

fn parse_variable_declaration(node: Node<'_>) -> (Vec<Variable>, Vec<Function>) {
    let var_kind = match node
        .children()
        .iter()
        .find(|c| matches!(c.kind(), "const" | "let" | "var"))
        .map(|c| c.kind())
    {
        Some("const") => VariableKind::Const,
        Some("var") => VariableKind::Var,
        _ => VariableKind::Let,
    };

    let mut vars = Vec::new();
    let mut funcs = Vec::new();

    for decl in node.find_children("variable_declarator") {
        let name_node = decl.child_by_field_name("name");
        let name = name_node.map(|n| n.text().to_string()).unwrap_or_default();
        if name.is_empty() {
            continue;
        }

        if let Some(value) = decl.child_by_field_name("value") {
            if matches!(value.kind(), "arrow_function" | "function_expression") {
                let mut f = parse_function(value);
                f.name = name;
                f.line = decl.span().start_line;
                f.span = decl.span();
                funcs.push(f);
                continue;
            }
        }

        let mut var = Variable {
            name,
            kind: var_kind,
            type_: None,
            is_exported: false,
            export_type: ExportType::None,
            line: decl.span().start_line,
        };
        if let Some(t) = decl.child_by_field_name("type") {
            var.type_ = Some(strip_type_annotation(t.text()));
        }
        vars.push(var);
    }

    (vars, funcs)
}

fn parse_assignment_as_function(assign: Node<'_>) -> Option<Function> {
    let left = assign.child_by_field_name("left")?;
    let right = assign.child_by_field_name("right")?;
    if !matches!(right.kind(), "arrow_function" | "function_expression") {
        return None;
    }
    let mut f = parse_function(right);
    f.name = left.text().to_string();
    f.line = assign.span().start_line;
    f.span = assign.span();
    Some(f)
}
