//! Component B: module structure extraction (spec.md §4.2).

pub mod extractor;
pub mod model;

pub use extractor::extract_module;
pub use model::{
    Class, Export, ExportType, Function, FunctionKind, Import, ImportName, Interface, Module,
    ModuleLanguage, Parameter, Property, TypeAlias, Variable, VariableKind, Visibility,
};
