//! Heuristic structural extraction.
//!
//! The analyzer runs the language's [`RuleSet`] over raw text, one rule at a
//! time, and records every match with its 1-based line. It never fails: text
//! in a language without rules yields an empty [`FileStructure`].

mod rules;
mod text;

pub use rules::{
    BaseList, BodyStyle, ClassRule, DeclRule, ExportConvention, ExtractionRule, FunctionRule,
    ImplRule, MemberRules, RuleRegistry, RuleSet, SpecifierMode, SpecifierRule,
};
pub use text::{LineIndex, collapse_whitespace, split_params};

use crate::error::Result;
use crate::indexer::Language;
use crate::types::{ClassInfo, Declaration, FunctionInfo};
use regex::{Captures, Regex};
use std::sync::Arc;
use text::{
    base_name, brace_body, brace_level_lines, indented_body, indented_level_lines,
    split_top_level, window,
};

/// Longest member declaration looked at from a single body line
const MEMBER_WINDOW: usize = 512;

/// Structural facts extracted from one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileStructure {
    pub functions: Vec<FunctionInfo>,
    pub classes: Vec<ClassInfo>,
    pub interfaces: Vec<Declaration>,
    pub types: Vec<Declaration>,
    pub imports: Vec<String>,
    pub exports: Vec<String>,
}

impl FileStructure {
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
            && self.classes.is_empty()
            && self.interfaces.is_empty()
            && self.types.is_empty()
            && self.imports.is_empty()
            && self.exports.is_empty()
    }
}

/// Applies registered rule sets to file contents
#[derive(Debug, Clone)]
pub struct StructuralAnalyzer {
    registry: Arc<RuleRegistry>,
}

impl StructuralAnalyzer {
    /// Analyzer over the built-in rule sets
    pub fn new() -> Result<Self> {
        Ok(Self::with_registry(RuleRegistry::builtin()?))
    }

    pub fn with_registry(registry: RuleRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Extract declarations, imports and exports from `content`
    pub fn analyze(&self, content: &str, language: Option<Language>) -> FileStructure {
        let Some(set) = language.and_then(|l| self.registry.get(l)) else {
            return FileStructure::default();
        };

        let mut extraction = Extraction::new(content, set);
        for rule in &set.rules {
            extraction.apply(rule);
        }
        extraction.finish()
    }
}

/// Mutable state for one analyze call
struct Extraction<'a> {
    content: &'a str,
    lines: LineIndex,
    set: &'a RuleSet,
    functions: Vec<FunctionInfo>,
    methods: Vec<FunctionInfo>,
    classes: Vec<ClassInfo>,
    interfaces: Vec<Declaration>,
    types: Vec<Declaration>,
    imports: Vec<(usize, String)>,
    exports: Vec<(usize, String)>,
    /// `(target, trait)` pairs from impl blocks
    impls: Vec<(String, String)>,
}

impl<'a> Extraction<'a> {
    fn new(content: &'a str, set: &'a RuleSet) -> Self {
        Self {
            content,
            lines: LineIndex::new(content),
            set,
            functions: Vec::new(),
            methods: Vec::new(),
            classes: Vec::new(),
            interfaces: Vec::new(),
            types: Vec::new(),
            imports: Vec::new(),
            exports: Vec::new(),
            impls: Vec::new(),
        }
    }

    fn apply(&mut self, rule: &ExtractionRule) {
        match rule {
            ExtractionRule::Function(rule) => self.functions_from(rule),
            ExtractionRule::Class(rule) => self.classes_from(rule),
            ExtractionRule::Impl(rule) => self.impls_from(rule),
            ExtractionRule::Interface(rule) => {
                let found = self.declarations_from(rule);
                self.interfaces.extend(found);
            }
            ExtractionRule::TypeAlias(rule) => {
                let found = self.declarations_from(rule);
                self.types.extend(found);
            }
            ExtractionRule::Import(rule) => {
                let found = self.specifiers_from(rule);
                self.imports.extend(found);
            }
            ExtractionRule::Export(rule) => {
                let found = self.specifiers_from(rule);
                self.exports.extend(found);
            }
        }
    }

    fn functions_from(&mut self, rule: &FunctionRule) {
        for caps in rule.pattern.captures_iter(self.content) {
            let Some(name) = caps.name("name") else {
                continue;
            };
            let owner = caps
                .name("receiver")
                .and_then(|r| receiver_type(r.as_str()));
            let is_exported = self.set.exports.is_exported(
                caps.name("export").map(|m| m.as_str()),
                name.as_str(),
                false,
            );
            self.functions.push(FunctionInfo {
                name: name.as_str().to_string(),
                line: self.lines.line_of(name.start()),
                parameters: parameters(&caps),
                return_type: return_type(&caps),
                is_exported,
                owner,
            });
        }
    }

    fn classes_from(&mut self, rule: &ClassRule) {
        for caps in rule.pattern.captures_iter(self.content) {
            let Some(name) = caps.name("name") else {
                continue;
            };
            let (extends, implements) = bases(&caps, rule.bases);
            let is_exported = self.set.exports.is_exported(
                caps.name("export").map(|m| m.as_str()),
                name.as_str(),
                false,
            );

            let mut class = ClassInfo {
                name: name.as_str().to_string(),
                line: self.lines.line_of(name.start()),
                methods: Vec::new(),
                properties: Vec::new(),
                extends,
                implements,
                is_exported,
            };

            let header_indent = caps.name("indent").map_or(0, |m| m.as_str().len());
            let header_end = caps.get(0).map_or(name.end(), |m| m.end());
            self.members(&rule.members, &mut class, name.end(), header_end, header_indent);
            self.classes.push(class);
        }
    }

    fn impls_from(&mut self, rule: &ImplRule) {
        for caps in rule.pattern.captures_iter(self.content) {
            let Some(target) = caps.name("target") else {
                continue;
            };
            let mut holder = ClassInfo {
                name: target.as_str().to_string(),
                line: self.lines.line_of(target.start()),
                methods: Vec::new(),
                properties: Vec::new(),
                extends: None,
                implements: Vec::new(),
                is_exported: false,
            };
            self.members(&rule.members, &mut holder, target.end(), target.end(), 0);

            if let Some(trait_name) = caps.name("trait") {
                let trait_name = trait_name.as_str();
                let short = trait_name.rsplit("::").next().unwrap_or(trait_name);
                self.impls.push((holder.name, short.to_string()));
            }
        }
    }

    /// Scan the body following a class-like header for methods and properties
    fn members(
        &mut self,
        members: &MemberRules,
        class: &mut ClassInfo,
        name_end: usize,
        header_end: usize,
        header_indent: usize,
    ) {
        let (starts, body_start, body_end) = match self.set.body {
            BodyStyle::Braces => match brace_body(self.content, name_end) {
                Some((open, close)) => (brace_level_lines(self.content, open, close), open, close),
                None => return,
            },
            BodyStyle::Indentation => match indented_body(self.content, header_end, header_indent)
            {
                Some(body) => (
                    indented_level_lines(self.content, body),
                    body.start,
                    body.end,
                ),
                None => return,
            },
        };

        for start in starts {
            let slice = window(self.content, start, body_end, MEMBER_WINDOW);

            if let Some(method) = &members.method
                && let Some(caps) = anchored(method, slice)
                && let Some(name) = caps.name("name")
                && !members.is_reserved(name.as_str())
                && !caps
                    .name("ret")
                    .is_some_and(|r| members.is_reserved(r.as_str().trim()))
            {
                let modifiers = if has_group(method, "export") {
                    Some(caps.name("export").map_or("", |m| m.as_str()))
                } else {
                    None
                };
                let is_exported =
                    self.set
                        .exports
                        .is_exported(modifiers, name.as_str(), class.is_exported);
                push_unique(&mut class.methods, name.as_str());
                self.methods.push(FunctionInfo {
                    name: name.as_str().to_string(),
                    line: self.lines.line_of(start + name.start()),
                    parameters: parameters(&caps),
                    return_type: return_type(&caps),
                    is_exported,
                    owner: Some(class.name.clone()),
                });
                continue;
            }

            if let Some(property) = &members.property
                && let Some(caps) = anchored(property, slice)
                && let Some(name) = caps.name("name")
                && !members.is_reserved(name.as_str())
                && !caps
                    .name("type")
                    .is_some_and(|t| members.is_reserved(t.as_str()))
            {
                push_unique(&mut class.properties, name.as_str());
            }
        }

        if let Some(attribute) = &members.attribute {
            let body = &self.content[body_start..body_end];
            for caps in attribute.captures_iter(body) {
                if let Some(name) = caps.name("name") {
                    push_unique(&mut class.properties, name.as_str());
                }
            }
        }
    }

    fn declarations_from(&self, rule: &DeclRule) -> Vec<Declaration> {
        rule.pattern
            .captures_iter(self.content)
            .filter(|caps| {
                !caps
                    .name("target")
                    .is_some_and(|t| rule.reject_targets.contains(&t.as_str()))
            })
            .filter_map(|caps| {
                let name = caps.name("name")?;
                Some(Declaration {
                    name: name.as_str().to_string(),
                    line: self.lines.line_of(name.start()),
                    is_exported: self.set.exports.is_exported(
                        caps.name("export").map(|m| m.as_str()),
                        name.as_str(),
                        false,
                    ),
                })
            })
            .collect()
    }

    fn specifiers_from(&self, rule: &SpecifierRule) -> Vec<(usize, String)> {
        let mut found = Vec::new();
        for caps in rule.pattern.captures_iter(self.content) {
            let Some(spec) = caps.name("spec") else {
                continue;
            };
            for value in expand_specifier(spec.as_str(), rule.mode) {
                found.push((spec.start(), value));
            }
        }
        found
    }

    fn finish(mut self) -> FileStructure {
        // Body scans rediscover declarations the function rules already saw
        for method in std::mem::take(&mut self.methods) {
            match self
                .functions
                .iter_mut()
                .find(|f| f.name == method.name && f.line == method.line)
            {
                Some(existing) => {
                    if existing.owner.is_none() {
                        existing.owner = method.owner;
                    }
                }
                None => self.functions.push(method),
            }
        }

        for function in &self.functions {
            if let Some(owner) = &function.owner
                && let Some(class) = self.classes.iter_mut().find(|c| &c.name == owner)
            {
                push_unique(&mut class.methods, &function.name);
            }
        }

        for (target, trait_name) in &self.impls {
            if let Some(class) = self.classes.iter_mut().find(|c| &c.name == target) {
                push_unique(&mut class.implements, trait_name);
            }
        }

        self.functions.sort_by_key(|f| f.line);
        self.classes.sort_by_key(|c| c.line);
        self.interfaces.sort_by_key(|d| d.line);
        self.types.sort_by_key(|d| d.line);

        let imports = ordered_unique(self.imports);
        let mut exports = ordered_unique(self.exports);

        if matches!(self.set.exports, ExportConvention::Keyword(_)) {
            mark_exported(&exports, &mut self.functions, &mut self.classes);
            for decl in self.interfaces.iter_mut().chain(self.types.iter_mut()) {
                if exports.contains(&decl.name) {
                    decl.is_exported = true;
                }
            }
        }

        if exports.is_empty() {
            exports = exported_names(&self.functions, &self.classes, &self.interfaces, &self.types);
        }

        FileStructure {
            functions: self.functions,
            classes: self.classes,
            interfaces: self.interfaces,
            types: self.types,
            imports,
            exports,
        }
    }
}

/// Captures at the very start of `text`, if any
fn anchored<'t>(regex: &Regex, text: &'t str) -> Option<Captures<'t>> {
    regex
        .captures(text)
        .filter(|caps| caps.get(0).is_some_and(|m| m.start() == 0))
}

fn has_group(regex: &Regex, group: &str) -> bool {
    regex.capture_names().flatten().any(|n| n == group)
}

fn parameters(caps: &Captures<'_>) -> Vec<String> {
    caps.name("params")
        .or_else(|| caps.name("param"))
        .map(|m| split_params(m.as_str()))
        .unwrap_or_default()
}

fn return_type(caps: &Captures<'_>) -> Option<String> {
    caps.name("ret")
        .map(|m| collapse_whitespace(m.as_str().trim_end_matches('{')))
        .filter(|r| !r.is_empty())
}

/// Type name from a Go receiver such as `s *Server` or `*Cache[K]`
fn receiver_type(receiver: &str) -> Option<String> {
    let last = receiver.split_whitespace().last()?;
    let ty = last.trim_start_matches('*');
    let ty = ty.split('[').next().unwrap_or(ty);
    (!ty.is_empty()).then(|| ty.to_string())
}

fn bases(caps: &Captures<'_>, style: BaseList) -> (Option<String>, Vec<String>) {
    match style {
        BaseList::Explicit => {
            let extends = caps
                .name("extends")
                .map(|m| base_name(m.as_str()))
                .filter(|e| !e.is_empty());
            let implements = caps
                .name("implements")
                .map(|m| base_list(m.as_str()))
                .unwrap_or_default();
            (extends, implements)
        }
        BaseList::FirstExtends => {
            let mut all = caps
                .name("bases")
                .map(|m| base_list(m.as_str()))
                .unwrap_or_default();
            all.retain(|b| !b.contains('='));
            if all.is_empty() {
                return (None, all);
            }
            let first = all.remove(0);
            let extends = (first != "object").then_some(first);
            (extends, all)
        }
        BaseList::InterfacePrefix => {
            let mut extends = None;
            let mut implements = Vec::new();
            for base in caps
                .name("bases")
                .map(|m| base_list(m.as_str()))
                .unwrap_or_default()
            {
                if looks_like_interface(&base) || extends.is_some() {
                    implements.push(base);
                } else {
                    extends = Some(base);
                }
            }
            (extends, implements)
        }
    }
}

fn base_list(raw: &str) -> Vec<String> {
    split_top_level(raw)
        .into_iter()
        .map(|b| base_name(&b))
        .filter(|b| !b.is_empty())
        .collect()
}

/// `IDisposable`-style names
fn looks_like_interface(name: &str) -> bool {
    let short = name.rsplit('.').next().unwrap_or(name);
    let mut chars = short.chars();
    chars.next() == Some('I') && chars.next().is_some_and(char::is_uppercase)
}

fn expand_specifier(raw: &str, mode: SpecifierMode) -> Vec<String> {
    match mode {
        SpecifierMode::Single => {
            let value = collapse_whitespace(raw);
            if value.is_empty() {
                Vec::new()
            } else {
                vec![value]
            }
        }
        SpecifierMode::CommaList => raw
            .split(',')
            .filter_map(|part| {
                let part = part.trim();
                let part = part.strip_prefix("type ").unwrap_or(part);
                let part = part.trim_start_matches("...");
                let part = match part.split_once(" as ") {
                    Some((_, alias)) => alias,
                    None => part,
                };
                let part = part.split(':').next().unwrap_or(part).trim();
                is_identifier(part).then(|| part.to_string())
            })
            .collect(),
        SpecifierMode::QuotedList => quoted_strings(raw),
        SpecifierMode::NameList => raw
            .split(',')
            .filter_map(|part| part.split_whitespace().next())
            .map(str::to_string)
            .collect(),
    }
}

fn is_identifier(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

fn quoted_strings(raw: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut chars = raw.char_indices();
    while let Some((start, c)) = chars.next() {
        if c != '"' && c != '\'' {
            continue;
        }
        if let Some((end, _)) = chars.by_ref().find(|(_, q)| *q == c) {
            let value = &raw[start + 1..end];
            if !value.is_empty() {
                found.push(value.to_string());
            }
        }
    }
    found
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

/// Sort by source offset and drop repeats, keeping the first occurrence
fn ordered_unique(mut entries: Vec<(usize, String)>) -> Vec<String> {
    entries.sort_by_key(|(offset, _)| *offset);
    let mut values: Vec<String> = Vec::with_capacity(entries.len());
    for (_, value) in entries {
        if !values.contains(&value) {
            values.push(value);
        }
    }
    values
}

/// `export { foo }` and `module.exports = { foo }` export declarations by name
fn mark_exported(exports: &[String], functions: &mut [FunctionInfo], classes: &mut [ClassInfo]) {
    for function in functions.iter_mut().filter(|f| f.owner.is_none()) {
        if exports.contains(&function.name) {
            function.is_exported = true;
        }
    }
    for class in classes.iter_mut() {
        if exports.contains(&class.name) {
            class.is_exported = true;
        }
    }
}

fn exported_names(
    functions: &[FunctionInfo],
    classes: &[ClassInfo],
    interfaces: &[Declaration],
    types: &[Declaration],
) -> Vec<String> {
    let mut named: Vec<(usize, &str)> = functions
        .iter()
        .filter(|f| f.is_exported && f.owner.is_none())
        .map(|f| (f.line, f.name.as_str()))
        .chain(
            classes
                .iter()
                .filter(|c| c.is_exported)
                .map(|c| (c.line, c.name.as_str())),
        )
        .chain(
            interfaces
                .iter()
                .chain(types)
                .filter(|d| d.is_exported)
                .map(|d| (d.line, d.name.as_str())),
        )
        .collect();
    named.sort_by_key(|(line, _)| *line);

    let mut names: Vec<String> = Vec::with_capacity(named.len());
    for (_, name) in named {
        push_unique(&mut names, name);
    }
    names
}

#[cfg(test)]
mod tests;
