//! L1 value model (spec.md §3): `Module`, `Function`, and the declaration
//! records hanging off it. All records are produced once by the extractor
//! and are immutable thereafter (spec.md §3 "Lifecycle").

use serde::{Deserialize, Serialize};

use crate::shared::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportType {
    Named,
    Default,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
    Protected,
    None,
}

/// Discriminates a declared `function` statement from a variable bound to
/// an arrow or function-expression value (spec.md §9 "Arrow-function
/// recognition"). Downstream layers treat all three uniformly as
/// `Function` records; only name resolution in L2/L3 cares which one it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionKind {
    Declaration,
    Arrow,
    Expression,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    pub is_rest: bool,
    pub is_optional: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_: None,
            default_value: None,
            is_rest: false,
            is_optional: false,
        }
    }

    fn signature(&self) -> String {
        let mut s = String::new();
        if self.is_rest {
            s.push_str("...");
        }
        s.push_str(&self.name);
        if self.is_optional {
            s.push('?');
        }
        if let Some(ty) = &self.type_ {
            s.push_str(": ");
            s.push_str(ty);
        }
        if let Some(default) = &self.default_value {
            s.push_str(" = ");
            s.push_str(default);
        }
        s
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub params: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    pub is_method: bool,
    pub is_async: bool,
    pub is_generator: bool,
    pub is_exported: bool,
    pub export_type: ExportType,
    pub decorators: Vec<String>,
    pub line: u32,
    pub span: Span,
    pub visibility: Visibility,
    pub is_static: bool,
    pub kind: FunctionKind,
}

impl Function {
    pub fn new(name: impl Into<String>, line: u32, span: Span) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            return_type: None,
            docstring: None,
            is_method: false,
            is_async: false,
            is_generator: false,
            is_exported: false,
            export_type: ExportType::None,
            decorators: Vec::new(),
            line,
            span,
            visibility: Visibility::None,
            is_static: false,
            kind: FunctionKind::Declaration,
        }
    }

    /// spec.md §8 invariant 1: async prefix iff `isAsync`, generator marker
    /// iff `isGenerator`, parameters joined by `", "`, type suffix iff typed.
    pub fn signature(&self) -> String {
        let mut s = String::new();
        if self.is_async {
            s.push_str("async ");
        }
        if self.is_method {
            if self.is_generator {
                s.push('*');
            }
        } else {
            s.push_str("function");
            if self.is_generator {
                s.push('*');
            }
            s.push(' ');
        }
        s.push_str(&self.name);
        s.push('(');
        s.push_str(
            &self
                .params
                .iter()
                .map(Parameter::signature)
                .collect::<Vec<_>>()
                .join(", "),
        );
        s.push(')');
        if let Some(rt) = &self.return_type {
            s.push_str(": ");
            s.push_str(rt);
        }
        s
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportName {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub is_default: bool,
    pub is_namespace: bool,
    pub is_type_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    pub module: String,
    pub names: Vec<ImportName>,
    pub is_type_only: bool,
    pub is_dynamic: bool,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Export {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_name: Option<String>,
    pub is_default: bool,
    pub is_re_export: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_module: Option<String>,
    pub is_type_only: bool,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_readonly: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    pub line: u32,
}

impl Property {
    pub fn new(name: impl Into<String>, line: u32) -> Self {
        Self {
            name: name.into(),
            type_: None,
            visibility: Visibility::None,
            is_static: false,
            is_readonly: false,
            default_value: None,
            line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub name: String,
    pub bases: Vec<String>,
    pub implements: Vec<String>,
    pub methods: Vec<Function>,
    pub properties: Vec<Property>,
    pub is_abstract: bool,
    pub is_exported: bool,
    pub export_type: ExportType,
    pub decorators: Vec<String>,
    pub line: u32,
    pub span: Span,
}

impl Class {
    pub fn new(name: impl Into<String>, line: u32, span: Span) -> Self {
        Self {
            name: name.into(),
            bases: Vec::new(),
            implements: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            is_abstract: false,
            is_exported: false,
            export_type: ExportType::None,
            decorators: Vec::new(),
            line,
            span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,
    pub extends: Vec<String>,
    pub methods: Vec<Function>,
    pub properties: Vec<Property>,
    pub line: u32,
    pub span: Span,
}

impl Interface {
    pub fn new(name: impl Into<String>, line: u32, span: Span) -> Self {
        Self {
            name: name.into(),
            extends: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            line,
            span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeAlias {
    pub name: String,
    pub definition: String,
    pub line: u32,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Const,
    Let,
    Var,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub kind: VariableKind,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    pub is_exported: bool,
    pub export_type: ExportType,
    pub line: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleLanguage {
    Typescript,
    Javascript,
}

impl From<crate::parsing::Language> for ModuleLanguage {
    fn from(language: crate::parsing::Language) -> Self {
        match language {
            crate::parsing::Language::TypeScript => ModuleLanguage::Typescript,
            crate::parsing::Language::JavaScript => ModuleLanguage::Javascript,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub file_path: String,
    pub language: ModuleLanguage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    pub imports: Vec<Import>,
    pub exports: Vec<Export>,
    pub functions: Vec<Function>,
    pub classes: Vec<Class>,
    pub interfaces: Vec<Interface>,
    pub type_aliases: Vec<TypeAlias>,
    pub variables: Vec<Variable>,
    pub content_hash: String,
}

impl Module {
    pub fn new(file_path: impl Into<String>, language: ModuleLanguage, content_hash: String) -> Self {
        Self {
            file_path: file_path.into(),
            language,
            docstring: None,
            imports: Vec::new(),
            exports: Vec::new(),
            functions: Vec::new(),
            classes: Vec::new(),
            interfaces: Vec::new(),
            type_aliases: Vec::new(),
            variables: Vec::new(),
            content_hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_matches_spec_scenario_one() {
        let mut f = Function::new("add", 1, Span::new(1, 0, 1, 10));
        f.return_type = Some("number".to_string());
        f.params.push(Parameter {
            name: "a".to_string(),
            type_: Some("number".to_string()),
            default_value: None,
            is_rest: false,
            is_optional: false,
        });
        f.params.push(Parameter {
            name: "b".to_string(),
            type_: Some("number".to_string()),
            default_value: None,
            is_rest: false,
            is_optional: false,
        });
        assert_eq!(f.signature(), "function add(a: number, b: number): number");
    }

    #[test]
    fn signature_reflects_async_and_generator() {
        let mut f = Function::new("run", 1, Span::new(1, 0, 1, 1));
        f.is_async = true;
        f.is_generator = true;
        assert_eq!(f.signature(), "async function* run()");
    }
}
