use super::*;

fn analyze(content: &str, language: Language) -> FileStructure {
    StructuralAnalyzer::new()
        .unwrap()
        .analyze(content, Some(language))
}

fn names(functions: &[FunctionInfo]) -> Vec<&str> {
    functions.iter().map(|f| f.name.as_str()).collect()
}

fn function<'a>(structure: &'a FileStructure, name: &str) -> &'a FunctionInfo {
    structure
        .functions
        .iter()
        .find(|f| f.name == name)
        .unwrap_or_else(|| panic!("missing function {}", name))
}

const TYPESCRIPT: &str = r#"import { Database } from './db';
import type { Config } from "../config";
const fs = require('fs');

export interface Credentials {
  username: string;
}

export type Token = string;

enum Role { Admin, User }

export class UserService implements Auth, Logger {
  private db: Database;
  count = 0;

  constructor(db: Database) {
    this.db = db;
  }

  async authenticate(username: string, password: string): Promise<boolean> {
    if (username) {
      return true;
    }
    return false;
  }
}

export function foo(a, b) {}

export const helper = (x: number): number => x * 2;

function internal() {}
"#;

#[test]
fn test_exported_function_round_trip() {
    let structure = analyze("export function foo(a, b) {}", Language::JavaScript);
    let foo = function(&structure, "foo");
    assert_eq!(foo.parameters.len(), 2);
    assert!(foo.is_exported);
    assert_eq!(foo.line, 1);
}

#[test]
fn test_typescript_functions_and_methods() {
    let structure = analyze(TYPESCRIPT, Language::TypeScript);
    assert_eq!(
        names(&structure.functions),
        vec!["constructor", "authenticate", "foo", "helper", "internal"]
    );

    let authenticate = function(&structure, "authenticate");
    assert_eq!(authenticate.line, 21);
    assert_eq!(
        authenticate.parameters,
        vec!["username: string", "password: string"]
    );
    assert_eq!(authenticate.return_type.as_deref(), Some("Promise<boolean>"));
    assert_eq!(authenticate.owner.as_deref(), Some("UserService"));

    let helper = function(&structure, "helper");
    assert!(helper.is_exported);
    assert_eq!(helper.parameters, vec!["x: number"]);
    assert_eq!(helper.return_type.as_deref(), Some("number"));

    assert!(!function(&structure, "internal").is_exported);
}

#[test]
fn test_typescript_class_members() {
    let structure = analyze(TYPESCRIPT, Language::TypeScript);
    assert_eq!(structure.classes.len(), 1);

    let class = &structure.classes[0];
    assert_eq!(class.name, "UserService");
    assert_eq!(class.line, 13);
    assert!(class.is_exported);
    assert_eq!(class.implements, vec!["Auth", "Logger"]);
    assert_eq!(class.methods, vec!["constructor", "authenticate"]);
    assert_eq!(class.properties, vec!["db", "count"]);
}

#[test]
fn test_typescript_declarations_imports_exports() {
    let structure = analyze(TYPESCRIPT, Language::TypeScript);

    assert_eq!(structure.interfaces.len(), 1);
    assert_eq!(structure.interfaces[0].name, "Credentials");
    assert_eq!(structure.interfaces[0].line, 5);
    assert!(structure.interfaces[0].is_exported);

    let types: Vec<(&str, bool)> = structure
        .types
        .iter()
        .map(|t| (t.name.as_str(), t.is_exported))
        .collect();
    assert_eq!(types, vec![("Token", true), ("Role", false)]);

    assert_eq!(structure.imports, vec!["./db", "../config", "fs"]);
    assert_eq!(
        structure.exports,
        vec!["Credentials", "Token", "UserService", "foo", "helper"]
    );
}

#[test]
fn test_javascript_has_no_interfaces() {
    let structure = analyze("interface Foo {}\ntype Bar = 1;", Language::JavaScript);
    assert!(structure.interfaces.is_empty());
    assert!(structure.types.is_empty());
}

#[test]
fn test_commonjs_exports_mark_declarations() {
    let source =
        "function connect(url) {}\nclass Pool {}\nmodule.exports = { connect, Pool: Pool };\n";
    let structure = analyze(source, Language::JavaScript);

    assert_eq!(structure.exports, vec!["connect", "Pool"]);
    assert!(function(&structure, "connect").is_exported);
    assert!(structure.classes[0].is_exported);
}

#[test]
fn test_overloads_are_all_recorded() {
    let source = "function parse(input: string): Node;\nfunction parse(input: Buffer): Node;\nfunction parse(input: any): Node { return input; }\n";
    let structure = analyze(source, Language::TypeScript);

    let lines: Vec<usize> = structure
        .functions
        .iter()
        .filter(|f| f.name == "parse")
        .map(|f| f.line)
        .collect();
    assert_eq!(lines, vec![1, 2, 3]);
    assert!(
        structure
            .functions
            .iter()
            .all(|f| f.return_type.as_deref() == Some("Node"))
    );
}

const PYTHON: &str = r#"import os, sys as system
from .models import User

__all__ = ["AuthService", 'login']


class AuthService(BaseService, LoggingMixin):
    retries = 3

    def __init__(self, db):
        self.db = db
        self._token: str = ""

    def authenticate(self, username, password) -> bool:
        return True

    def _hash(self, value):
        return value


def login(user):
    pass


def _private():
    pass
"#;

#[test]
fn test_python_class() {
    let structure = analyze(PYTHON, Language::Python);
    assert_eq!(structure.classes.len(), 1);

    let class = &structure.classes[0];
    assert_eq!(class.name, "AuthService");
    assert_eq!(class.line, 7);
    assert_eq!(class.extends.as_deref(), Some("BaseService"));
    assert_eq!(class.implements, vec!["LoggingMixin"]);
    assert_eq!(class.methods, vec!["__init__", "authenticate", "_hash"]);
    assert_eq!(class.properties, vec!["retries", "db", "_token"]);
    assert!(class.is_exported);
}

#[test]
fn test_python_functions() {
    let structure = analyze(PYTHON, Language::Python);
    assert_eq!(
        names(&structure.functions),
        vec!["__init__", "authenticate", "_hash", "login", "_private"]
    );

    let authenticate = function(&structure, "authenticate");
    assert_eq!(authenticate.line, 14);
    assert_eq!(authenticate.parameters, vec!["username", "password"]);
    assert_eq!(authenticate.return_type.as_deref(), Some("bool"));
    assert_eq!(authenticate.owner.as_deref(), Some("AuthService"));
    assert!(authenticate.is_exported);

    assert!(!function(&structure, "_hash").is_exported);
    assert!(function(&structure, "login").is_exported);
    assert!(!function(&structure, "_private").is_exported);
    assert_eq!(function(&structure, "login").owner, None);
}

#[test]
fn test_python_imports_and_all() {
    let structure = analyze(PYTHON, Language::Python);
    assert_eq!(structure.imports, vec!["os", "sys", ".models"]);
    assert_eq!(structure.exports, vec!["AuthService", "login"]);
}

#[test]
fn test_python_exports_derived_without_all() {
    let source = "def visible():\n    pass\n\ndef _hidden():\n    pass\n\nclass _Impl: pass\n";
    let structure = analyze(source, Language::Python);
    assert_eq!(structure.exports, vec!["visible"]);
    assert_eq!(structure.classes.len(), 1);
    assert!(structure.classes[0].methods.is_empty());
}

const RUST: &str = r#"use std::collections::HashMap;
use crate::config::{Config, SearchConfig};
mod helpers;

pub struct Cache {
    entries: HashMap<String, u32>,
    pub capacity: usize,
}

pub trait Store {
    fn get(&self, key: &str) -> Option<u32>;
}

impl Cache {
    pub fn new(capacity: usize) -> Self {
        Self { entries: HashMap::new(), capacity }
    }

    fn evict(&mut self) {}
}

impl Store for Cache {
    fn get(&self, key: &str) -> Option<u32> {
        self.entries.get(key).copied()
    }
}

pub(crate) fn internal() {}

pub type Result<T> = std::result::Result<T, String>;
"#;

#[test]
fn test_rust_struct_and_impls() {
    let structure = analyze(RUST, Language::Rust);
    assert_eq!(structure.classes.len(), 1);

    let cache = &structure.classes[0];
    assert_eq!(cache.name, "Cache");
    assert!(cache.is_exported);
    assert_eq!(cache.properties, vec!["entries", "capacity"]);
    assert_eq!(cache.methods, vec!["new", "evict", "get"]);
    assert_eq!(cache.implements, vec!["Store"]);
}

#[test]
fn test_rust_functions() {
    let structure = analyze(RUST, Language::Rust);

    let new = function(&structure, "new");
    assert_eq!(new.line, 15);
    assert_eq!(new.parameters, vec!["capacity: usize"]);
    assert_eq!(new.return_type.as_deref(), Some("Self"));
    assert_eq!(new.owner.as_deref(), Some("Cache"));
    assert!(new.is_exported);

    let evict = function(&structure, "evict");
    assert!(evict.parameters.is_empty());
    assert!(!evict.is_exported);

    let gets: Vec<(usize, Option<&str>)> = structure
        .functions
        .iter()
        .filter(|f| f.name == "get")
        .map(|f| (f.line, f.owner.as_deref()))
        .collect();
    assert_eq!(gets, vec![(11, None), (23, Some("Cache"))]);

    assert!(!function(&structure, "internal").is_exported);
}

#[test]
fn test_rust_declarations_imports_exports() {
    let structure = analyze(RUST, Language::Rust);
    assert_eq!(structure.interfaces[0].name, "Store");
    assert_eq!(structure.types[0].name, "Result");
    assert_eq!(
        structure.imports,
        vec![
            "std::collections::HashMap",
            "crate::config::{Config, SearchConfig}",
            "mod helpers"
        ]
    );
    assert_eq!(structure.exports, vec!["Cache", "Store", "Result"]);
}

const GO: &str = r#"package server

import (
	"fmt"
	"net/http"
)

import "strings"

type Server struct {
	Addr    string
	handler http.Handler
}

type Handler interface {
	Serve()
}

type ID = string

func (s *Server) Start(port int) error {
	return nil
}

func NewServer(addr string) *Server {
	return &Server{Addr: addr}
}

func helper() {}
"#;

#[test]
fn test_go_receivers_attach_to_struct() {
    let structure = analyze(GO, Language::Go);

    let server = &structure.classes[0];
    assert_eq!(server.name, "Server");
    assert_eq!(server.line, 10);
    assert_eq!(server.properties, vec!["Addr", "handler"]);
    assert_eq!(server.methods, vec!["Start"]);

    let start = function(&structure, "Start");
    assert_eq!(start.owner.as_deref(), Some("Server"));
    assert_eq!(start.parameters, vec!["port int"]);
    assert_eq!(start.return_type.as_deref(), Some("error"));
    assert!(start.is_exported);

    let helper = function(&structure, "helper");
    assert!(!helper.is_exported);
    assert_eq!(helper.return_type, None);
}

#[test]
fn test_go_declarations_and_imports() {
    let structure = analyze(GO, Language::Go);
    assert_eq!(structure.interfaces.len(), 1);
    assert_eq!(structure.interfaces[0].name, "Handler");
    assert_eq!(structure.types.len(), 1);
    assert_eq!(structure.types[0].name, "ID");
    assert_eq!(structure.imports, vec!["fmt", "net/http", "strings"]);
    assert_eq!(structure.exports, vec!["Server", "Handler", "ID", "NewServer"]);
}

const JAVA: &str = r#"package com.example.auth;

import java.util.List;
import com.example.db.UserRepository;

@Service
public class UserService extends BaseService implements Authenticator, Closeable {
    private final UserRepository repository;
    private int attempts = 0;

    public UserService(UserRepository repository) {
        this.repository = repository;
    }

    @Override
    public boolean authenticate(String user, String password) throws AuthException {
        return repository.check(user, password);
    }

    List<String> names() {
        return List.of();
    }
}

interface Authenticator {
    boolean authenticate(String user, String password);
}
"#;

#[test]
fn test_java_class() {
    let structure = analyze(JAVA, Language::Java);
    let class = &structure.classes[0];
    assert_eq!(class.name, "UserService");
    assert_eq!(class.line, 7);
    assert_eq!(class.extends.as_deref(), Some("BaseService"));
    assert_eq!(class.implements, vec!["Authenticator", "Closeable"]);
    assert_eq!(class.methods, vec!["UserService", "authenticate", "names"]);
    assert_eq!(class.properties, vec!["repository", "attempts"]);
    assert!(class.is_exported);

    let authenticate = function(&structure, "authenticate");
    assert_eq!(authenticate.line, 16);
    assert_eq!(authenticate.parameters.len(), 2);
    assert_eq!(authenticate.return_type.as_deref(), Some("boolean"));
    assert!(authenticate.is_exported);
    assert!(!function(&structure, "names").is_exported);
}

#[test]
fn test_java_overloads_share_one_method_name() {
    let source = r#"public class Repo {
    public void save(String name) {
    }

    public void save(int id) {
    }
}
"#;
    let structure = analyze(source, Language::Java);

    assert_eq!(structure.classes[0].methods, vec!["save"]);
    let overloads: Vec<usize> = structure
        .functions
        .iter()
        .filter(|f| f.name == "save")
        .map(|f| f.line)
        .collect();
    assert_eq!(overloads, vec![2, 5]);
}

#[test]
fn test_java_interfaces_imports_exports() {
    let structure = analyze(JAVA, Language::Java);
    assert_eq!(structure.interfaces[0].name, "Authenticator");
    assert!(!structure.interfaces[0].is_exported);
    assert_eq!(
        structure.imports,
        vec!["java.util.List", "com.example.db.UserRepository"]
    );
    assert_eq!(structure.exports, vec!["UserService"]);
}

const CSHARP: &str = r#"using System;
using System.Collections.Generic;

namespace App.Services
{
    public class OrderService : BaseService, IOrderService, IDisposable
    {
        private readonly IRepository _repo;
        public string Name { get; set; }

        public OrderService(IRepository repo) : base(repo)
        {
            _repo = repo;
        }

        public async Task<Order> GetOrder(int id)
        {
            return await _repo.Find(id);
        }
    }

    public interface IOrderService
    {
        Task<Order> GetOrder(int id);
    }

    internal enum Status { Open, Closed }
}
"#;

#[test]
fn test_csharp_class() {
    let structure = analyze(CSHARP, Language::CSharp);
    let class = &structure.classes[0];
    assert_eq!(class.name, "OrderService");
    assert_eq!(class.line, 6);
    assert_eq!(class.extends.as_deref(), Some("BaseService"));
    assert_eq!(class.implements, vec!["IOrderService", "IDisposable"]);
    assert_eq!(class.properties, vec!["_repo", "Name"]);
    assert_eq!(class.methods, vec!["OrderService", "GetOrder"]);

    let get_order = function(&structure, "GetOrder");
    assert_eq!(get_order.return_type.as_deref(), Some("Task<Order>"));
    assert_eq!(get_order.parameters, vec!["int id"]);
    assert!(get_order.is_exported);
}

#[test]
fn test_csharp_declarations() {
    let structure = analyze(CSHARP, Language::CSharp);
    assert_eq!(structure.interfaces[0].name, "IOrderService");
    assert!(structure.interfaces[0].is_exported);
    assert_eq!(structure.types[0].name, "Status");
    assert!(!structure.types[0].is_exported);
    assert_eq!(structure.imports, vec!["System", "System.Collections.Generic"]);
    assert_eq!(structure.exports, vec!["OrderService", "IOrderService"]);
}

#[test]
fn test_unsupported_language_is_empty() {
    let analyzer = StructuralAnalyzer::new().unwrap();
    assert!(analyzer.analyze("def ruby; end", Some(Language::Ruby)).is_empty());
    assert!(analyzer.analyze("function foo() {}", None).is_empty());
    assert!(analyzer.registry().get(Language::Markdown).is_none());
    assert!(analyzer.registry().get(Language::Go).is_some());
}

#[test]
fn test_builtin_languages() {
    let registry = RuleRegistry::builtin().unwrap();
    assert_eq!(
        registry.languages(),
        vec![
            Language::TypeScript,
            Language::JavaScript,
            Language::Python,
            Language::Rust,
            Language::Go,
            Language::Java,
            Language::CSharp,
        ]
    );
}

#[test]
fn test_registered_rule_set() {
    let mut registry = RuleRegistry::empty();
    registry.register(
        Language::Kotlin,
        RuleSet {
            exports: ExportConvention::Keyword("public"),
            body: BodyStyle::Braces,
            rules: vec![ExtractionRule::Function(FunctionRule {
                pattern: Regex::new(
                    r"(?m)^(?P<export>public\s+)?fun\s+(?P<name>\w+)\((?P<params>[^)]*)\)",
                )
                .unwrap(),
            })],
        },
    );
    let analyzer = StructuralAnalyzer::with_registry(registry);

    let structure = analyzer.analyze(
        "fun main(args: Array<String>) {}\npublic fun greet(name: String) {}",
        Some(Language::Kotlin),
    );
    assert_eq!(names(&structure.functions), vec!["main", "greet"]);
    assert!(!structure.functions[0].is_exported);
    assert!(structure.functions[1].is_exported);
    assert_eq!(structure.exports, vec!["greet"]);
}

#[test]
fn test_analyze_is_deterministic() {
    let analyzer = StructuralAnalyzer::new().unwrap();
    let first = analyzer.analyze(TYPESCRIPT, Some(Language::TypeScript));
    let second = analyzer.analyze(TYPESCRIPT, Some(Language::TypeScript));
    assert_eq!(first, second);
}

#[test]
fn test_export_convention() {
    let keyword = ExportConvention::Keyword("pub");
    assert!(keyword.is_exported(Some("pub "), "x", false));
    assert!(!keyword.is_exported(Some(""), "x", true));
    assert!(keyword.is_exported(None, "x", true));
    assert!(!keyword.is_exported(None, "#x", true));

    assert!(ExportConvention::Underscore.is_exported(None, "visible", false));
    assert!(!ExportConvention::Underscore.is_exported(None, "_hidden", true));
    assert!(ExportConvention::Capitalized.is_exported(None, "Serve", false));
    assert!(!ExportConvention::Capitalized.is_exported(None, "serve", true));
}
