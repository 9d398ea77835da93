//! Per-language extraction rule tables.
//!
//! A [`RuleRegistry`] maps a [`Language`] to an ordered [`RuleSet`]. Every rule
//! is a compiled regex with a small set of named groups that the analyzer
//! understands:
//!
//! | group        | meaning                                             |
//! |--------------|-----------------------------------------------------|
//! | `name`       | declared identifier                                 |
//! | `params`     | raw parameter list (or `param` for a lone parameter) |
//! | `ret`        | return type                                         |
//! | `export`     | modifier prefix checked against the export convention |
//! | `receiver`   | Go method receiver                                  |
//! | `extends`    | single base class                                   |
//! | `implements` | comma separated interfaces                          |
//! | `bases`      | mixed base list split by [`BaseList`]               |
//! | `target`     | impl target or alias target                         |
//! | `trait`      | trait implemented by an impl block                  |
//! | `spec`       | import/export specifier text                        |
//! | `type`       | member type, only used for keyword filtering        |
//!
//! New languages are added by registering another rule set, never by
//! branching in the analyzer.

use crate::indexer::Language;
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::sync::Arc;

/// How declarations decide their exported flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportConvention {
    /// Exported when the `export` group contains this keyword
    Keyword(&'static str),
    /// Exported unless the name starts with `_` (Python)
    Underscore,
    /// Exported when the name starts with an uppercase letter (Go)
    Capitalized,
}

impl ExportConvention {
    /// Exported flag for a declaration.
    ///
    /// `modifiers` is `None` when the rule has no `export` group at all, in
    /// which case `fallback` applies to keyword languages.
    pub fn is_exported(&self, modifiers: Option<&str>, name: &str, fallback: bool) -> bool {
        if name.starts_with('#') {
            return false;
        }
        match self {
            ExportConvention::Keyword(keyword) => match modifiers {
                Some(text) => text
                    .split(|c: char| !c.is_alphanumeric() && c != '_')
                    .any(|word| word == *keyword),
                None => fallback,
            },
            ExportConvention::Underscore => !name.starts_with('_'),
            ExportConvention::Capitalized => name.chars().next().is_some_and(char::is_uppercase),
        }
    }
}

/// How class bodies are delimited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyStyle {
    Braces,
    Indentation,
}

/// How a `bases` group is split into `extends` and `implements`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseList {
    /// The rule captures `extends` and `implements` separately
    Explicit,
    /// First base is the superclass, the rest are mixins (Python)
    FirstExtends,
    /// `IName` entries are interfaces, the first other entry is the superclass (C#)
    InterfacePrefix,
}

/// How a `spec` group is turned into specifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecifierMode {
    /// The whole group, whitespace collapsed
    Single,
    /// `a, b as c, d: e` style lists of identifiers
    CommaList,
    /// Every quoted string inside the group
    QuotedList,
    /// Comma separated dotted names with optional `as` aliases
    NameList,
}

/// Rules applied to the lines directly inside a class or impl body
#[derive(Debug)]
pub struct MemberRules {
    pub method: Option<Regex>,
    pub property: Option<Regex>,
    /// Matched anywhere in the body, e.g. `self.x = ...`
    pub attribute: Option<Regex>,
    /// Identifiers that look like members but are statements or keywords
    pub reserved: &'static [&'static str],
}

impl MemberRules {
    pub fn none() -> Self {
        Self {
            method: None,
            property: None,
            attribute: None,
            reserved: &[],
        }
    }

    pub fn is_reserved(&self, word: &str) -> bool {
        self.reserved.contains(&word)
    }
}

#[derive(Debug)]
pub struct FunctionRule {
    pub pattern: Regex,
}

#[derive(Debug)]
pub struct ClassRule {
    pub pattern: Regex,
    pub bases: BaseList,
    pub members: MemberRules,
}

/// Attaches methods and traits to a type declared elsewhere (Rust `impl`)
#[derive(Debug)]
pub struct ImplRule {
    pub pattern: Regex,
    pub members: MemberRules,
}

#[derive(Debug)]
pub struct DeclRule {
    pub pattern: Regex,
    /// Matches whose `target` group is one of these are dropped
    pub reject_targets: &'static [&'static str],
}

#[derive(Debug)]
pub struct SpecifierRule {
    pub pattern: Regex,
    pub mode: SpecifierMode,
}

/// A single typed extraction rule
#[derive(Debug)]
pub enum ExtractionRule {
    Function(FunctionRule),
    Class(ClassRule),
    Impl(ImplRule),
    Interface(DeclRule),
    TypeAlias(DeclRule),
    Import(SpecifierRule),
    Export(SpecifierRule),
}

/// Ordered rules for one language
#[derive(Debug)]
pub struct RuleSet {
    pub exports: ExportConvention,
    pub body: BodyStyle,
    pub rules: Vec<ExtractionRule>,
}

/// Language to rule set mapping
#[derive(Debug, Default, Clone)]
pub struct RuleRegistry {
    sets: HashMap<Language, Arc<RuleSet>>,
}

impl RuleRegistry {
    /// Registry with no languages
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with the built-in TypeScript, JavaScript, Python, Rust, Go,
    /// Java and C# rule sets
    pub fn builtin() -> Result<Self, regex::Error> {
        let mut registry = Self::empty();
        registry.register(Language::TypeScript, ecmascript(true)?);
        registry.register(Language::JavaScript, ecmascript(false)?);
        registry.register(Language::Python, python()?);
        registry.register(Language::Rust, rust()?);
        registry.register(Language::Go, go()?);
        registry.register(Language::Java, java()?);
        registry.register(Language::CSharp, csharp()?);
        Ok(registry)
    }

    /// Add or replace the rule set for a language
    pub fn register(&mut self, language: Language, set: RuleSet) {
        self.sets.insert(language, Arc::new(set));
    }

    pub fn get(&self, language: Language) -> Option<&RuleSet> {
        self.sets.get(&language).map(Arc::as_ref)
    }

    /// Registered languages in stable order
    pub fn languages(&self) -> Vec<Language> {
        let mut languages: Vec<Language> = self.sets.keys().copied().collect();
        languages.sort();
        languages
    }
}

fn rx(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).multi_line(true).build()
}

fn function(pattern: &str) -> Result<ExtractionRule, regex::Error> {
    Ok(ExtractionRule::Function(FunctionRule {
        pattern: rx(pattern)?,
    }))
}

fn interface(pattern: &str) -> Result<ExtractionRule, regex::Error> {
    Ok(ExtractionRule::Interface(DeclRule {
        pattern: rx(pattern)?,
        reject_targets: &[],
    }))
}

fn type_alias(pattern: &str) -> Result<ExtractionRule, regex::Error> {
    Ok(ExtractionRule::TypeAlias(DeclRule {
        pattern: rx(pattern)?,
        reject_targets: &[],
    }))
}

fn import(pattern: &str, mode: SpecifierMode) -> Result<ExtractionRule, regex::Error> {
    Ok(ExtractionRule::Import(SpecifierRule {
        pattern: rx(pattern)?,
        mode,
    }))
}

fn export(pattern: &str, mode: SpecifierMode) -> Result<ExtractionRule, regex::Error> {
    Ok(ExtractionRule::Export(SpecifierRule {
        pattern: rx(pattern)?,
        mode,
    }))
}

fn optional(pattern: &str) -> Result<Option<Regex>, regex::Error> {
    rx(pattern).map(Some)
}

const ECMA_RESERVED: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "function", "super", "new", "typeof",
    "await", "do", "else", "break", "continue", "case", "default", "throw", "delete", "void",
    "yield",
];

/// TypeScript and JavaScript share one table; TypeScript adds interfaces,
/// type aliases and enums.
fn ecmascript(typescript: bool) -> Result<RuleSet, regex::Error> {
    let mut rules = vec![
        function(
            r"^[ \t]*(?P<export>export[ \t]+(?:default[ \t]+)?)?(?:declare[ \t]+)?(?:async[ \t]+)?function\b[ \t]*\*?[ \t]*(?P<name>[A-Za-z_$][\w$]*)[ \t]*(?:<[^>(]*>)?[ \t]*\((?P<params>[^)]*)\)(?:[ \t]*:[ \t]*(?P<ret>[^{;\n]+))?",
        )?,
        function(
            r"^[ \t]*(?P<export>export[ \t]+)?(?:const|let|var)[ \t]+(?P<name>[A-Za-z_$][\w$]*)[ \t]*(?::[^=\n]+)?=[ \t]*(?:async[ \t]+)?(?:\((?P<params>[^)]*)\)|(?P<param>[A-Za-z_$][\w$]*))(?:[ \t]*:[ \t]*(?P<ret>[^=\n]+?))?[ \t]*=>",
        )?,
        function(
            r"^[ \t]*(?P<export>export[ \t]+)?(?:const|let|var)[ \t]+(?P<name>[A-Za-z_$][\w$]*)[ \t]*=[ \t]*(?:async[ \t]+)?function\b[ \t]*\*?[ \t]*[\w$]*[ \t]*\((?P<params>[^)]*)\)",
        )?,
        ExtractionRule::Class(ClassRule {
            pattern: rx(
                r"^[ \t]*(?P<export>export[ \t]+(?:default[ \t]+)?)?(?:declare[ \t]+)?(?:abstract[ \t]+)?class[ \t]+(?P<name>[A-Za-z_$][\w$]*)(?:[ \t]*<[^>{]*>)?(?:[ \t]+extends[ \t]+(?P<extends>[\w$.]+)(?:<[^>{]*>)?)?(?:[ \t]+implements[ \t]+(?P<implements>[^{]+?))?\s*\{",
            )?,
            bases: BaseList::Explicit,
            members: MemberRules {
                method: optional(
                    r"^[ \t]*(?:(?:public|private|protected|static|readonly|async|abstract|override|declare|get|set)[ \t]+)*\*?(?P<name>#?[A-Za-z_$][\w$]*)[ \t]*\??[ \t]*(?:<[^>(]*>)?[ \t]*\((?P<params>[^)]*)\)(?:[ \t]*:[ \t]*(?P<ret>[^{;\n]+?))?[ \t]*(?:\{|;|$)",
                )?,
                property: optional(
                    r"^[ \t]*(?:(?:public|private|protected|static|readonly|declare|override|accessor)[ \t]+)*(?P<name>#?[A-Za-z_$][\w$]*)[ \t]*[?!]?[ \t]*(?::[^;=(){},\n]+)?[ \t]*(?:=|;|$)",
                )?,
                attribute: None,
                reserved: ECMA_RESERVED,
            },
        }),
        import(
            r#"^[ \t]*import[ \t]+(?:type[ \t]+)?(?:[^'";]*?[ \t]from[ \t]*)?['"](?P<spec>[^'"\n]+)['"]"#,
            SpecifierMode::Single,
        )?,
        import(
            r#"^[ \t]*export[ \t]+(?:type[ \t]+)?(?:\*(?:[ \t]+as[ \t]+[\w$]+)?|\{[^}]*\})[ \t]*from[ \t]*['"](?P<spec>[^'"\n]+)['"]"#,
            SpecifierMode::Single,
        )?,
        import(
            r#"\brequire[ \t]*\([ \t]*['"](?P<spec>[^'"\n]+)['"][ \t]*\)"#,
            SpecifierMode::Single,
        )?,
        import(
            r#"\bimport[ \t]*\([ \t]*['"](?P<spec>[^'"\n]+)['"][ \t]*\)"#,
            SpecifierMode::Single,
        )?,
        export(
            r"^[ \t]*export[ \t]+(?:default[ \t]+)?(?:declare[ \t]+)?(?:async[ \t]+)?(?:abstract[ \t]+)?(?:function[ \t]*\*?[ \t]*|(?:const[ \t]+enum|class|const|let|var|interface|type|enum|namespace)[ \t]+)(?P<spec>[A-Za-z_$][\w$]*)",
            SpecifierMode::Single,
        )?,
        export(r"^[ \t]*export[ \t]*\{(?P<spec>[^}]*)\}", SpecifierMode::CommaList)?,
        export(
            r"^[ \t]*export[ \t]+default[ \t]+(?P<spec>[A-Za-z_$][\w$]*)[ \t]*;?[ \t]*$",
            SpecifierMode::Single,
        )?,
        export(
            r"^[ \t]*(?:module\.)?exports\.(?P<spec>[A-Za-z_$][\w$]*)[ \t]*=",
            SpecifierMode::Single,
        )?,
        export(
            r"^[ \t]*module\.exports[ \t]*=[ \t]*\{(?P<spec>[^}]*)\}",
            SpecifierMode::CommaList,
        )?,
        export(
            r"^[ \t]*module\.exports[ \t]*=[ \t]*(?P<spec>[A-Za-z_$][\w$]*)[ \t]*;?[ \t]*$",
            SpecifierMode::Single,
        )?,
    ];

    if typescript {
        rules.push(interface(
            r"^[ \t]*(?P<export>export[ \t]+(?:default[ \t]+)?)?(?:declare[ \t]+)?interface[ \t]+(?P<name>[A-Za-z_$][\w$]*)",
        )?);
        rules.push(type_alias(
            r"^[ \t]*(?P<export>export[ \t]+)?(?:declare[ \t]+)?type[ \t]+(?P<name>[A-Za-z_$][\w$]*)[ \t]*(?:<[^>=]*>)?[ \t]*=",
        )?);
        rules.push(type_alias(
            r"^[ \t]*(?P<export>export[ \t]+)?(?:declare[ \t]+)?(?:const[ \t]+)?enum[ \t]+(?P<name>[A-Za-z_$][\w$]*)",
        )?);
    }

    Ok(RuleSet {
        exports: ExportConvention::Keyword("export"),
        body: BodyStyle::Braces,
        rules,
    })
}

fn python() -> Result<RuleSet, regex::Error> {
    Ok(RuleSet {
        exports: ExportConvention::Underscore,
        body: BodyStyle::Indentation,
        rules: vec![
            function(
                r"^(?P<indent>[ \t]*)(?:async[ \t]+)?def[ \t]+(?P<name>\w+)[ \t]*\((?P<params>[^)]*)\)[ \t]*(?:->[ \t]*(?P<ret>[^:\n]+?))?[ \t]*:",
            )?,
            ExtractionRule::Class(ClassRule {
                pattern: rx(
                    r"^(?P<indent>[ \t]*)class[ \t]+(?P<name>\w+)[ \t]*(?:\((?P<bases>[^)]*)\))?[ \t]*:",
                )?,
                bases: BaseList::FirstExtends,
                members: MemberRules {
                    method: optional(
                        r"^[ \t]*(?:async[ \t]+)?def[ \t]+(?P<name>\w+)[ \t]*\((?P<params>[^)]*)\)(?:[ \t]*->[ \t]*(?P<ret>[^:\n]+?))?[ \t]*:",
                    )?,
                    property: optional(r"^[ \t]*(?P<name>[A-Za-z_]\w*)[ \t]*(?::[^=\n]*|=[^=\n])")?,
                    attribute: optional(
                        r"\bself\.(?P<name>[A-Za-z_]\w*)[ \t]*(?::[^=\n]+)?=[^=]",
                    )?,
                    reserved: &[
                        "else", "try", "finally", "pass", "return", "if", "elif", "for", "while",
                        "with", "def", "class", "raise", "lambda",
                    ],
                },
            }),
            import(
                r"^[ \t]*import[ \t]+(?P<spec>[\w.]+(?:[ \t]+as[ \t]+\w+)?(?:[ \t]*,[ \t]*[\w.]+(?:[ \t]+as[ \t]+\w+)?)*)",
                SpecifierMode::NameList,
            )?,
            import(
                r"^[ \t]*from[ \t]+(?P<spec>\.*[\w.]*)[ \t]+import\b",
                SpecifierMode::Single,
            )?,
            export(
                r"^__all__[ \t]*\+?=[ \t]*[\[(](?P<spec>[^\])]*)[\])]",
                SpecifierMode::QuotedList,
            )?,
        ],
    })
}

const RUST_FN: &str = r#"^[ \t]*(?:(?P<export>pub[ \t]+)|pub[ \t]*\([^)]*\)[ \t]*)?(?:default[ \t]+)?(?:const[ \t]+)?(?:async[ \t]+)?(?:unsafe[ \t]+)?(?:extern[ \t]+"[^"]*"[ \t]+)?fn[ \t]+(?P<name>\w+)[ \t]*(?:<[^(]*>)?[ \t]*\((?P<params>[^)]*)\)(?:[ \t]*->[ \t]*(?P<ret>[^{;]+?))?[ \t]*(?:where\b[^{;]*)?[{;]"#;

fn rust() -> Result<RuleSet, regex::Error> {
    Ok(RuleSet {
        exports: ExportConvention::Keyword("pub"),
        body: BodyStyle::Braces,
        rules: vec![
            function(RUST_FN)?,
            ExtractionRule::Class(ClassRule {
                pattern: rx(
                    r"^[ \t]*(?:(?P<export>pub[ \t]+)|pub[ \t]*\([^)]*\)[ \t]*)?(?:struct|enum|union)[ \t]+(?P<name>\w+)",
                )?,
                bases: BaseList::Explicit,
                members: MemberRules {
                    method: None,
                    property: optional(
                        r"^[ \t]*(?:pub(?:[ \t]*\([^)]*\))?[ \t]+)?(?P<name>[A-Za-z_]\w*)[ \t]*(?::[^:]|[({,=]|$)",
                    )?,
                    attribute: None,
                    reserved: &["where", "impl", "fn"],
                },
            }),
            ExtractionRule::Impl(ImplRule {
                pattern: rx(
                    r"^[ \t]*(?:unsafe[ \t]+)?impl\b[ \t]*(?:<[^{]*?>)?[ \t]*(?:!?(?P<trait>[\w:]+)(?:<[^{]*?>)?[ \t]+for[ \t]+)?(?P<target>\w+)",
                )?,
                members: MemberRules {
                    method: optional(RUST_FN)?,
                    property: None,
                    attribute: None,
                    reserved: &[],
                },
            }),
            interface(
                r"^[ \t]*(?:(?P<export>pub[ \t]+)|pub[ \t]*\([^)]*\)[ \t]*)?(?:unsafe[ \t]+)?trait[ \t]+(?P<name>\w+)",
            )?,
            type_alias(
                r"^[ \t]*(?:(?P<export>pub[ \t]+)|pub[ \t]*\([^)]*\)[ \t]*)?type[ \t]+(?P<name>\w+)",
            )?,
            import(
                r"^[ \t]*(?:pub(?:[ \t]*\([^)]*\))?[ \t]+)?use[ \t]+(?P<spec>[^;]+);",
                SpecifierMode::Single,
            )?,
            import(
                r"^[ \t]*(?:pub(?:[ \t]*\([^)]*\))?[ \t]+)?(?P<spec>mod[ \t]+\w+)[ \t]*;",
                SpecifierMode::Single,
            )?,
            export(
                r"^pub[ \t]+use[ \t]+(?P<spec>[^;]+);",
                SpecifierMode::Single,
            )?,
            export(
                r#"^pub[ \t]+(?:(?:const|async|unsafe|extern[ \t]+"[^"]*")[ \t]+)*(?:fn|struct|enum|trait|type|const|static|mod|union)[ \t]+(?P<spec>\w+)"#,
                SpecifierMode::Single,
            )?,
        ],
    })
}

fn go() -> Result<RuleSet, regex::Error> {
    Ok(RuleSet {
        exports: ExportConvention::Capitalized,
        body: BodyStyle::Braces,
        rules: vec![
            function(
                r"^func[ \t]*(?:\((?P<receiver>[^)]*)\)[ \t]*)?(?P<name>\w+)[ \t]*(?:\[[^\]]*\])?[ \t]*\((?P<params>[^)]*)\)[ \t]*(?P<ret>[^{\n]*)",
            )?,
            ExtractionRule::Class(ClassRule {
                pattern: rx(r"^type[ \t]+(?P<name>\w+)(?:\[[^\]]*\])?[ \t]+struct\b")?,
                bases: BaseList::Explicit,
                members: MemberRules {
                    method: None,
                    property: optional(
                        r"^[ \t]*(?P<name>[A-Za-z_]\w*)(?:[ \t]*,[ \t]*\w+)*[ \t]+[^\s/]",
                    )?,
                    attribute: None,
                    reserved: &[],
                },
            }),
            interface(r"^type[ \t]+(?P<name>\w+)(?:\[[^\]]*\])?[ \t]+interface\b")?,
            ExtractionRule::TypeAlias(DeclRule {
                pattern: rx(
                    r"^type[ \t]+(?P<name>\w+)(?:\[[^\]]*\])?[ \t]*=?[ \t]*(?P<target>[\w.*\[\]]+)",
                )?,
                reject_targets: &["struct", "interface"],
            }),
            import(
                r#"^import[ \t]+(?:[\w.]+[ \t]+)?"(?P<spec>[^"]+)""#,
                SpecifierMode::Single,
            )?,
            import(r"^import[ \t]*\((?P<spec>[^)]*)\)", SpecifierMode::QuotedList)?,
        ],
    })
}

const JVM_RESERVED: &[&str] = &[
    "if", "for", "while", "switch", "catch", "synchronized", "return", "new", "throw", "else",
    "try", "do", "class", "interface", "enum", "record", "struct", "event", "delegate", "using",
    "namespace", "lock", "foreach", "case", "yield", "await",
];

fn java() -> Result<RuleSet, regex::Error> {
    Ok(RuleSet {
        exports: ExportConvention::Keyword("public"),
        body: BodyStyle::Braces,
        rules: vec![
            ExtractionRule::Class(ClassRule {
                pattern: rx(
                    r"^[ \t]*(?:@\w+(?:\([^)]*\))?\s+)*(?P<export>(?:(?:public|private|protected|abstract|static|final|sealed|non-sealed|strictfp)[ \t]+)*)(?:class|enum|record)[ \t]+(?P<name>\w+)(?:[ \t]*<[^{]*?>)?(?:[ \t]*\([^)]*\))?(?:\s+extends\s+(?P<extends>[\w.]+)(?:<[^{]*?>)?)?(?:\s+implements\s+(?P<implements>[^{]+?))?\s*(?:permits[^{]*)?\{",
                )?,
                bases: BaseList::Explicit,
                members: MemberRules {
                    method: optional(
                        r"^[ \t]*(?:@\w+(?:\([^)]*\))?[ \t]+)*(?P<export>(?:(?:public|private|protected|static|final|abstract|synchronized|native|default|strictfp)[ \t]+)*)(?:<[^>]+>[ \t]+)?(?:(?P<ret>[\w.$]+(?:<[^()]*?>)?(?:\[\])*)[ \t]+)?(?P<name>[A-Za-z_$][\w$]*)[ \t]*\((?P<params>[^)]*)\)[ \t]*(?:throws[ \t]+[\w., \t]+)?\s*(?:\{|;)",
                    )?,
                    property: optional(
                        r"^[ \t]*(?:@\w+(?:\([^)]*\))?[ \t]+)*(?:(?:public|private|protected|static|final|transient|volatile)[ \t]+)*(?P<type>[\w.$]+(?:<[^()]*?>)?(?:\[\])*)[ \t]+(?P<name>[A-Za-z_$][\w$]*)[ \t]*(?:=|;)",
                    )?,
                    attribute: None,
                    reserved: JVM_RESERVED,
                },
            }),
            interface(
                r"^[ \t]*(?P<export>(?:(?:public|private|protected|abstract|static|sealed|non-sealed|strictfp)[ \t]+)*)@?interface[ \t]+(?P<name>\w+)",
            )?,
            import(
                r"^[ \t]*import[ \t]+(?:static[ \t]+)?(?P<spec>[\w.]+(?:\.\*)?)[ \t]*;",
                SpecifierMode::Single,
            )?,
        ],
    })
}

fn csharp() -> Result<RuleSet, regex::Error> {
    Ok(RuleSet {
        exports: ExportConvention::Keyword("public"),
        body: BodyStyle::Braces,
        rules: vec![
            ExtractionRule::Class(ClassRule {
                pattern: rx(
                    r"^[ \t]*(?:\[[^\]\n]*\][ \t]*)*(?P<export>(?:(?:public|private|protected|internal|abstract|sealed|static|partial|readonly|unsafe|file)[ \t]+)*)(?:class|struct|record(?:[ \t]+(?:class|struct))?)[ \t]+(?P<name>\w+)(?:[ \t]*<[^>{]*>)?(?:[ \t]*\([^)]*\))?(?:[ \t]*:[ \t]*(?P<bases>[^{;]+?))?\s*(?:where[^{]*)?(?:\{|;)",
                )?,
                bases: BaseList::InterfacePrefix,
                members: MemberRules {
                    method: optional(
                        r"^[ \t]*(?:\[[^\]\n]*\][ \t]*)*(?P<export>(?:(?:public|private|protected|internal|static|virtual|override|abstract|sealed|async|extern|unsafe|new|partial|readonly)[ \t]+)*)(?:(?P<ret>[\w.?]+(?:<[^()]*?>)?(?:\[\])*\??)[ \t]+)?(?P<name>[A-Za-z_]\w*)[ \t]*(?:<[^>(]*>)?[ \t]*\((?P<params>[^)]*)\)[ \t]*(?::[ \t]*(?:base|this)[ \t]*\([^)]*\))?[ \t]*(?:where[^{]*)?\s*(?:\{|;|=>)",
                    )?,
                    property: optional(
                        r"^[ \t]*(?:\[[^\]\n]*\][ \t]*)*(?:(?:public|private|protected|internal|static|readonly|const|volatile|virtual|override|abstract|required|new)[ \t]+)*(?P<type>[\w.?]+(?:<[^()]*?>)?(?:\[\])*\??)[ \t]+(?P<name>[A-Za-z_]\w*)[ \t]*(?:=|;|\{|$)",
                    )?,
                    attribute: None,
                    reserved: JVM_RESERVED,
                },
            }),
            interface(
                r"^[ \t]*(?:\[[^\]\n]*\][ \t]*)*(?P<export>(?:(?:public|private|protected|internal|partial)[ \t]+)*)interface[ \t]+(?P<name>\w+)",
            )?,
            type_alias(
                r"^[ \t]*(?:\[[^\]\n]*\][ \t]*)*(?P<export>(?:(?:public|private|protected|internal)[ \t]+)*)enum[ \t]+(?P<name>\w+)",
            )?,
            import(
                r"^[ \t]*(?:global[ \t]+)?using[ \t]+(?:static[ \t]+)?(?:\w+[ \t]*=[ \t]*)?(?P<spec>[\w.]+)[ \t]*;",
                SpecifierMode::Single,
            )?,
        ],
    })
}
