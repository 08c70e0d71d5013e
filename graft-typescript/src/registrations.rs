//! Registration statements of a dependency container file.
//!
//! A container file imports every registered class and registers it with a
//! statement of the shape `register<IFoo, Foo>(ServiceTypes.Foo);`. The
//! call name comes from `graft.toml`. Registrations may sit at the top
//! level or inside a function body.

use std::path::Path;

use graft_codegen::LineEnding;
use graft_core::{Injectable, UNKNOWN_MODULE};
use indexmap::IndexMap;
use tracing::debug;

use crate::{
    error::{Error, Result},
    scanner::{SplitMode, Token, TokenKind, Unit, matching_close, split_units, tokenize},
};

/// Imported local symbol to module specifier.
pub type ImportMap = IndexMap<String, String>;

/// Collect every registration in `src` made through `call`.
///
/// Module paths resolve through the file's imports, first by the concrete
/// class and then by the interface. Unresolvable entries get
/// [`UNKNOWN_MODULE`]. The result is sorted by registration key.
///
/// # Example
///
/// ```
/// use graft_typescript::extract_registrations;
///
/// let src = "import {IFoo, Foo} from 'modules/foo';\nregister<IFoo, Foo>(Keys.Foo);\n";
/// let (found, imports) = extract_registrations(src, "register").unwrap();
///
/// assert_eq!(found[0].name, "Foo");
/// assert_eq!(found[0].module_path, "modules/foo");
/// assert_eq!(imports.len(), 2);
/// ```
pub fn extract_registrations(src: &str, call: &str) -> Result<(Vec<Injectable>, ImportMap)> {
    let scanned = scan(src, call)?;
    let mut found: Vec<Injectable> = scanned
        .registrations
        .into_iter()
        .map(|r| {
            let module_path = scanned
                .imports
                .get(&r.concrete)
                .or_else(|| scanned.imports.get(&r.interface))
                .map_or(UNKNOWN_MODULE, String::as_str);
            Injectable::new(r.concrete, r.interface, r.key, module_path)
        })
        .collect();
    found.sort_by(|a, b| a.registration_key.cmp(&b.registration_key));
    Ok((found, scanned.imports))
}

/// Read `path` and collect its registrations.
pub fn extract_registrations_from_file(
    path: impl AsRef<Path>,
    call: &str,
) -> Result<(Vec<Injectable>, ImportMap)> {
    let path = path.as_ref();
    let src = std::fs::read_to_string(path).map_err(|source| {
        Box::new(Error::Io {
            path: path.to_path_buf(),
            source,
        })
    })?;
    debug!(path = %path.display(), "extracting registrations");
    extract_registrations(&src, call).map_err(|e| e.with_source_name(path.display().to_string()))
}

pub fn registration_statement(call: &str, injectable: &Injectable) -> String {
    format!(
        "{call}<{}, {}>({});",
        injectable.interface_name, injectable.name, injectable.registration_key
    )
}

pub fn import_statement(injectable: &Injectable) -> String {
    format!(
        "import {{ {}, {} }} from '{}';",
        injectable.interface_name, injectable.name, injectable.module_path
    )
}

/// Add the import and the registration of `injectable` to a container file.
///
/// The import goes after the last import statement. The registration goes
/// before the first registration with a greater key, so a sorted file stays
/// sorted. The first registration of a file goes into its registering
/// function: the only top-level function, or the one whose name starts
/// with `call`. Existing text is left byte for byte as it was.
pub fn insert_registration(src: &str, call: &str, injectable: &Injectable) -> Result<String> {
    let line_ending = LineEnding::detect(src);
    let src = LineEnding::normalize(src);
    let src: &str = &src;
    let scanned = scan(src, call)?;
    if scanned
        .registrations
        .iter()
        .any(|r| r.key == injectable.registration_key)
    {
        return Err(Box::new(Error::DuplicateKey {
            declaration: format!("'{call}' registrations"),
            key: injectable.registration_key.clone(),
        }));
    }

    let statement = registration_statement(call, injectable);
    let registration = match scanned
        .registrations
        .iter()
        .find(|r| r.key > injectable.registration_key)
    {
        Some(next) => {
            let at = line_start(src, next.start);
            let prefix = &src[at..next.start];
            if prefix.trim().is_empty() {
                Insertion::new(at, format!("{prefix}{statement}\n"))
            } else {
                // Shares its line with an earlier statement.
                let indent = leading_whitespace(prefix);
                Insertion::new(next.start, format!("{statement}\n{indent}"))
            }
        }
        None => match scanned.registrations.last() {
            Some(last) => {
                let indent_at = line_start(src, last.start);
                let indent = leading_whitespace(&src[indent_at..last.start]);
                Insertion::after_line(src, last.end, format!("{indent}{statement}\n"))
            }
            None => first_registration(src, call, &scanned.bodies, &statement)?,
        },
    };

    let mut insertions = vec![registration];
    if scanned.imports.get(&injectable.name) != Some(&injectable.module_path) {
        let line = format!("{}\n", import_statement(injectable));
        insertions.push(match scanned.last_import_end {
            Some(end) => Insertion::after_line(src, end, line),
            None => Insertion::new(0, line),
        });
    }

    // Later offsets first. On a tie the import lands before the registration.
    insertions.sort_by(|a, b| b.at.cmp(&a.at));
    let mut out = src.to_string();
    for insertion in &insertions {
        out.insert_str(insertion.at, &insertion.text);
    }
    debug!(key = %injectable.registration_key, "inserted registration");
    Ok(line_ending.restore(out))
}

struct Insertion {
    at: usize,
    text: String,
}

impl Insertion {
    fn new(at: usize, text: String) -> Self {
        Self { at, text }
    }

    /// Insert at the start of the line following `offset`.
    fn after_line(src: &str, offset: usize, text: String) -> Self {
        match src[offset..].find('\n') {
            Some(i) => Self::new(offset + i + 1, text),
            None if src.is_empty() || src.ends_with('\n') => Self::new(src.len(), text),
            None => Self::new(src.len(), format!("\n{text}")),
        }
    }
}

/// Insertion for a file without registrations.
fn first_registration(
    src: &str,
    call: &str,
    bodies: &[Body],
    statement: &str,
) -> Result<Insertion> {
    let named: Vec<&Body> = bodies
        .iter()
        .filter(|b| b.name.as_deref().is_some_and(|n| n.starts_with(call)))
        .collect();
    let body = match (bodies, named.as_slice()) {
        ([], _) => return Ok(Insertion::after_line(src, src.len(), format!("{statement}\n"))),
        ([body], _) => body,
        (_, [body]) => *body,
        _ => {
            return Err(Box::new(Error::RegistrationTarget {
                call: call.to_string(),
                count: bodies.len(),
            }));
        }
    };

    let indent = leading_whitespace(&src[line_start(src, body.open)..]);
    if src[body.open..body.close].contains('\n') {
        let at = line_start(src, body.close);
        Ok(Insertion::new(at, format!("{indent}  {statement}\n")))
    } else {
        Ok(Insertion::new(body.close, format!("\n{indent}  {statement}\n{indent}")))
    }
}

fn line_start(src: &str, offset: usize) -> usize {
    src[..offset].rfind('\n').map_or(0, |i| i + 1)
}

fn leading_whitespace(text: &str) -> &str {
    let trimmed = text.trim_start_matches([' ', '\t']);
    &text[..text.len() - trimmed.len()]
}

struct Registration {
    interface: String,
    concrete: String,
    key: String,
    /// Start of the statement including its leading comments.
    start: usize,
    /// End of the statement including a trailing comment.
    end: usize,
}

/// Block body of a top-level function.
struct Body {
    name: Option<String>,
    /// End of the opening brace.
    open: usize,
    /// Start of the closing brace.
    close: usize,
}

struct Scanned {
    imports: ImportMap,
    last_import_end: Option<usize>,
    registrations: Vec<Registration>,
    bodies: Vec<Body>,
}

fn scan(src: &str, call: &str) -> Result<Scanned> {
    let tokens = tokenize(src)?;
    let mut scanned = Scanned {
        imports: ImportMap::new(),
        last_import_end: None,
        registrations: Vec::new(),
        bodies: Vec::new(),
    };
    scan_statements(src, &tokens, call, true, &mut scanned)?;
    Ok(scanned)
}

fn scan_statements(
    src: &str,
    tokens: &[Token],
    call: &str,
    top_level: bool,
    scanned: &mut Scanned,
) -> Result<()> {
    for unit in split_units(src, tokens, SplitMode::TopLevel).units {
        let first = unit.tokens[0];
        if top_level && first.is_ident(src, "import") {
            if let Some((symbols, module)) = parse_import(src, &unit)? {
                for symbol in symbols {
                    scanned.imports.insert(symbol.to_string(), module.to_string());
                }
                scanned.last_import_end = Some(unit_end(&unit));
            }
        } else if first.is_ident(src, call) && !is_property(src, &unit) {
            let (interface, concrete, key) = parse_registration(src, &unit, call)?;
            scanned.registrations.push(Registration {
                interface,
                concrete,
                key,
                start: unit.leading.first().map_or(unit.start(), |c| c.start),
                end: unit_end(&unit),
            });
        } else {
            if top_level && let Some(body) = function_body(src, &unit) {
                scanned.bodies.push(body);
            }
            scan_nested_bodies(src, &unit.tokens, call, scanned)?;
        }
    }
    Ok(())
}

/// `function name() { ... }` or `const name = () => { ... };`
fn function_body(src: &str, unit: &Unit) -> Option<Body> {
    let tokens = &unit.tokens;
    let mut last = tokens.len().checked_sub(1)?;
    if tokens[last].is_punct(src, ";") {
        last = last.checked_sub(1)?;
    }
    if !tokens[last].is_punct(src, "}") {
        return None;
    }
    let open = (0..last)
        .find(|i| tokens[*i].is_punct(src, "{") && matching_close(src, tokens, *i) == Some(last))?;
    let head = &tokens[..open];
    if !head
        .iter()
        .any(|t| t.is_ident(src, "function") || t.is_punct(src, "=>"))
    {
        return None;
    }
    let name = head
        .windows(2)
        .find(|w| {
            ["function", "const", "let", "var"]
                .iter()
                .any(|word| w[0].is_ident(src, word))
                && w[1].kind == TokenKind::Ident
        })
        .map(|w| w[1].text(src).to_string());
    Some(Body {
        name,
        open: tokens[open].end,
        close: tokens[last].start,
    })
}

/// A property named like the call inside an object literal, `register: fn`.
fn is_property(src: &str, unit: &Unit) -> bool {
    unit.tokens
        .get(1)
        .is_some_and(|t| t.is_punct(src, ":") || t.is_punct(src, ","))
}

/// Descend into every braced block of a statement.
fn scan_nested_bodies(
    src: &str,
    tokens: &[Token],
    call: &str,
    scanned: &mut Scanned,
) -> Result<()> {
    let mut index = 0;
    while index < tokens.len() {
        if tokens[index].is_punct(src, "{")
            && let Some(close) = matching_close(src, tokens, index)
        {
            scan_statements(src, &tokens[index + 1..close], call, false, scanned)?;
            index = close + 1;
        } else {
            index += 1;
        }
    }
    Ok(())
}

fn unit_end(unit: &Unit) -> usize {
    unit.trailing.map_or(unit.end(), |c| c.end)
}

fn malformed(message: &str, src: &str, unit: &Unit) -> Box<Error> {
    Error::parse_shape(message, src, (unit.start(), unit.end() - unit.start()))
}

struct Cursor<'a> {
    src: &'a str,
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str, tokens: &'a [Token]) -> Self {
        Self {
            src,
            tokens,
            pos: 0,
        }
    }

    fn peek_text(&self, offset: usize) -> Option<&'a str> {
        self.tokens.get(self.pos + offset).map(|t| t.text(self.src))
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn eat(&mut self, text: &str) -> bool {
        let matched = self.peek_text(0) == Some(text);
        if matched {
            self.pos += 1;
        }
        matched
    }

    fn take(&mut self, kind: TokenKind) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos).filter(|t| t.kind == kind)?;
        self.pos += 1;
        Some(token)
    }

    fn ident(&mut self) -> Option<&'a str> {
        let src = self.src;
        self.take(TokenKind::Ident).map(|t| t.text(src))
    }

    fn string(&mut self) -> Option<&'a str> {
        let src = self.src;
        self.take(TokenKind::Str).map(|t| t.unquoted(src))
    }
}

/// Parse `import ... from 'module';` into its local symbols and module.
///
/// `Ok(None)` for forms that bind nothing from a module, such as dynamic
/// imports or `import x = require(...)`.
fn parse_import<'a>(src: &'a str, unit: &'a Unit) -> Result<Option<(Vec<&'a str>, &'a str)>> {
    let error = || malformed("malformed import statement", src, unit);
    let mut c = Cursor::new(src, &unit.tokens);
    c.pos = 1;

    if matches!(c.peek_text(0), Some("(" | ".")) {
        return Ok(None);
    }
    if c.peek_text(0) == Some("type") && !matches!(c.peek_text(1), Some("from" | "," | "=")) {
        c.pos += 1;
    }

    let mut symbols = Vec::new();
    if let Some(module) = c.string() {
        return finish_import(c, symbols, module).ok_or_else(error).map(Some);
    }

    if let Some(default) = c.ident() {
        if c.eat("=") {
            return Ok(None);
        }
        symbols.push(default);
        if !c.eat(",") {
            return finish_from(c, symbols).ok_or_else(error).map(Some);
        }
    }

    if c.eat("*") {
        if !c.eat("as") {
            return Err(error());
        }
        symbols.push(c.ident().ok_or_else(error)?);
    } else if c.eat("{") {
        parse_named_imports(&mut c, &mut symbols).ok_or_else(error)?;
    } else {
        return Err(error());
    }

    finish_from(c, symbols).ok_or_else(error).map(Some)
}

fn parse_named_imports<'a>(c: &mut Cursor<'a>, symbols: &mut Vec<&'a str>) -> Option<()> {
    loop {
        if c.eat("}") {
            return Some(());
        }
        if c.peek_text(0) == Some("type") && !matches!(c.peek_text(1), Some("," | "}" | "as")) {
            c.pos += 1;
        }
        let imported = c.ident().or_else(|| c.string())?;
        let local = if c.eat("as") { c.ident()? } else { imported };
        symbols.push(local);
        if !c.eat(",") {
            return c.eat("}").then_some(());
        }
    }
}

fn finish_from<'a>(mut c: Cursor<'a>, symbols: Vec<&'a str>) -> Option<(Vec<&'a str>, &'a str)> {
    if !c.eat("from") {
        return None;
    }
    let module = c.string()?;
    finish_import(c, symbols, module)
}

fn finish_import<'a>(
    mut c: Cursor<'a>,
    symbols: Vec<&'a str>,
    module: &'a str,
) -> Option<(Vec<&'a str>, &'a str)> {
    // Import attributes are not inspected.
    if matches!(c.peek_text(0), Some("with" | "assert")) {
        return Some((symbols, module));
    }
    c.eat(";");
    c.at_end().then_some((symbols, module))
}

fn parse_registration(src: &str, unit: &Unit, call: &str) -> Result<(String, String, String)> {
    let error = || {
        malformed(
            &format!("malformed registration, expected `{call}<Interface, Concrete>(Key)`"),
            src,
            unit,
        )
    };
    let mut c = Cursor::new(src, &unit.tokens);
    c.pos = 1;

    if !c.eat("<") {
        return Err(error());
    }
    let interface = c.ident().ok_or_else(error)?;
    if !c.eat(",") {
        return Err(error());
    }
    let concrete = c.ident().ok_or_else(error)?;
    if !(c.eat(">") && c.eat("(")) {
        return Err(error());
    }
    let mut key = c.ident().ok_or_else(error)?.to_string();
    while c.eat(".") {
        key.push('.');
        key.push_str(c.ident().ok_or_else(error)?);
    }
    if !c.eat(")") {
        return Err(error());
    }
    c.eat(";");
    if !c.at_end() {
        return Err(error());
    }
    Ok((interface.to_string(), concrete.to_string(), key))
}
