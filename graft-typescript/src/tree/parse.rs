use super::{Node, NodeId, NodeKind, SourceTree};
use crate::{
    error::Result,
    scanner::{
        SplitMode, Token, TokenKind, Unit, matching_close, skip_decorators, split_units, tokenize,
    },
};

const CLASS_MODIFIERS: &[&str] = &[
    "public",
    "private",
    "protected",
    "static",
    "readonly",
    "abstract",
    "declare",
    "override",
    "accessor",
    "async",
    "get",
    "set",
];

/// A declaration recognized in a top-level unit.
struct Declaration {
    kind: NodeKind,
    name: Option<String>,
    /// Token index of the opening brace of the body.
    open: usize,
    /// Token index of the closing brace of the body.
    close: usize,
}

pub(super) fn parse(src: &str) -> Result<SourceTree> {
    let tokens = tokenize(src)?;
    let split = split_units(src, &tokens, SplitMode::TopLevel);
    let templates: Vec<Span> = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Template && src[t.start..t.end].contains('\n'))
        .map(|t| (t.start, t.end))
        .collect();

    let mut tree = SourceTree {
        trailing_newline: src.ends_with('\n'),
        ..SourceTree::default()
    };
    for unit in &split.units {
        let id = parse_unit(&mut tree, src, unit, &templates);
        tree.roots.push(id);
    }
    tree.dangling = comments(src, &split.dangling);
    Ok(tree)
}

fn parse_unit(tree: &mut SourceTree, src: &str, unit: &Unit, templates: &[Span]) -> NodeId {
    let tokens = &unit.tokens;
    let declaration = enum_declaration(src, tokens)
        .or_else(|| class_declaration(src, tokens))
        .or_else(|| object_declaration(src, tokens));

    let mut node = match &declaration {
        Some(decl) => {
            let (text, verbatim) =
                dedent_code(src, unit.start(), tokens[decl.open].end, templates);
            Node {
                kind: decl.kind,
                name: decl.name.clone(),
                text,
                close: src[tokens[decl.close].end..unit.end()].to_string(),
                verbatim,
                ..Node::member(None, "")
            }
        }
        None => {
            let (text, verbatim) = dedent_code(src, unit.start(), unit.end(), templates);
            Node {
                kind: NodeKind::Statement,
                verbatim,
                ..Node::member(None, text)
            }
        }
    };
    node.leading = comments(src, &unit.leading);
    node.trailing = unit.trailing.map(|c| dedent(src, c.start, c.end));

    let id = tree.add_node(node);
    if let Some(decl) = declaration {
        let body = &tokens[decl.open + 1..decl.close];
        let mode = if decl.kind == NodeKind::Class {
            SplitMode::ClassBody
        } else {
            SplitMode::Commas
        };
        let split = split_units(src, body, mode);
        for member in &split.units {
            let key = match decl.kind {
                NodeKind::Enum => enum_key(src, &member.tokens),
                NodeKind::Object => object_key(src, &member.tokens),
                _ => class_key(src, &member.tokens),
            };
            let (text, verbatim) = dedent_code(src, member.start(), member.end(), templates);
            let mut child = Node::member(key, text);
            child.verbatim = verbatim;
            child.leading = comments(src, &member.leading);
            child.trailing = member.trailing.map(|c| dedent(src, c.start, c.end));
            tree.append_child(id, child);
        }
        tree.node_mut(id).dangling = comments(src, &split.dangling);
    }
    id
}

fn comments(src: &str, tokens: &[Token]) -> Vec<String> {
    tokens.iter().map(|c| dedent(src, c.start, c.end)).collect()
}

/// Byte range of a multi-line template literal.
type Span = (usize, usize);

/// Slice `src[start..end]` and strip the indentation of its first line
/// from the lines that follow.
fn dedent(src: &str, start: usize, end: usize) -> String {
    dedent_code(src, start, end, &[]).0
}

/// Like [`dedent`], but lines that continue one of `templates` are kept
/// untouched. Their indices are returned alongside the text.
fn dedent_code(src: &str, start: usize, end: usize, templates: &[Span]) -> (String, Vec<usize>) {
    let line_start = src[..start].rfind('\n').map_or(0, |i| i + 1);
    let column = start - line_start;
    let mut lines = src[start..end].split('\n');
    let first = lines.next().unwrap_or_default();
    let mut out = first.to_string();
    let mut verbatim = Vec::new();
    let mut newline = start + first.len();
    for (index, line) in lines.enumerate() {
        out.push('\n');
        if templates.iter().any(|(s, e)| *s < newline && newline < *e) {
            verbatim.push(index + 1);
            out.push_str(line);
        } else {
            let strip = line
                .bytes()
                .take(column)
                .take_while(|b| *b == b' ' || *b == b'\t')
                .count();
            out.push_str(&line[strip..]);
        }
        newline += line.len() + 1;
    }
    (out, verbatim)
}

fn skip_words(src: &str, tokens: &[Token], mut index: usize, words: &[&str]) -> usize {
    while index < tokens.len()
        && tokens[index].kind == TokenKind::Ident
        && words.contains(&tokens[index].text(src))
    {
        index += 1;
    }
    index
}

fn ident_at(src: &str, tokens: &[Token], index: usize) -> Option<String> {
    tokens
        .get(index)
        .filter(|t| t.kind == TokenKind::Ident)
        .map(|t| t.text(src).to_string())
}

/// `export declare const enum Name { ... }`
fn enum_declaration(src: &str, tokens: &[Token]) -> Option<Declaration> {
    let index = skip_words(src, tokens, 0, &["export", "declare", "const"]);
    if !tokens.get(index)?.is_ident(src, "enum") {
        return None;
    }
    let name = ident_at(src, tokens, index + 1)?;
    let open = index + 2;
    body(src, tokens, NodeKind::Enum, Some(name), open)
}

/// `@decorator export default abstract class Name<T> extends Base implements I { ... }`
fn class_declaration(src: &str, tokens: &[Token]) -> Option<Declaration> {
    let index = skip_decorators(src, tokens, 0);
    let index = skip_words(src, tokens, index, &["export", "default", "declare", "abstract"]);
    if !tokens.get(index)?.is_ident(src, "class") {
        return None;
    }
    let name = ident_at(src, tokens, index + 1)
        .filter(|name| name != "extends" && name != "implements");

    let mut angle = 0usize;
    let mut nesting = 0usize;
    for (open, token) in tokens.iter().enumerate().skip(index + 1) {
        if token.kind != TokenKind::Punct {
            continue;
        }
        match token.text(src) {
            "<" => angle += 1,
            ">" => angle = angle.saturating_sub(1),
            "(" | "[" => nesting += 1,
            ")" | "]" => nesting = nesting.saturating_sub(1),
            "{" if angle == 0 && nesting == 0 => {
                return body(src, tokens, NodeKind::Class, name, open);
            }
            _ => {}
        }
    }
    None
}

/// `export const Name: Type = { ... } as const;`
fn object_declaration(src: &str, tokens: &[Token]) -> Option<Declaration> {
    let index = skip_words(src, tokens, 0, &["export", "declare"]);
    let keyword = tokens.get(index)?.text(src);
    if !matches!(keyword, "const" | "let" | "var") {
        return None;
    }
    let name = ident_at(src, tokens, index + 1)?;

    let mut index = index + 2;
    if tokens.get(index)?.is_punct(src, ":") {
        let mut depth = 0usize;
        while let Some(token) = tokens.get(index) {
            match token.text(src) {
                "{" | "(" | "[" | "<" => depth += 1,
                "}" | ")" | "]" | ">" => depth = depth.saturating_sub(1),
                "=" if depth == 0 => break,
                _ => {}
            }
            index += 1;
        }
    }
    if !tokens.get(index)?.is_punct(src, "=") {
        return None;
    }

    let open = index + 1;
    if !tokens.get(open)?.is_punct(src, "{") {
        return None;
    }
    let close = matching_close(src, tokens, open)?;
    let mut rest = &tokens[close + 1..];
    if rest.last().is_some_and(|t| t.is_punct(src, ";")) {
        rest = &rest[..rest.len() - 1];
    }
    let tail_ok = rest.is_empty()
        || (rest.len() == 2 && rest[0].is_ident(src, "as") && rest[1].is_ident(src, "const"))
        || (rest.len() >= 2 && rest[0].is_ident(src, "satisfies"));
    if !tail_ok {
        return None;
    }
    Some(Declaration {
        kind: NodeKind::Object,
        name: Some(name),
        open,
        close,
    })
}

/// Accept the body opening at `open` when its closing brace ends the unit.
fn body(
    src: &str,
    tokens: &[Token],
    kind: NodeKind,
    name: Option<String>,
    open: usize,
) -> Option<Declaration> {
    if !tokens.get(open)?.is_punct(src, "{") {
        return None;
    }
    let close = matching_close(src, tokens, open)?;
    let rest = &tokens[close + 1..];
    let ends_unit = rest.is_empty() || (rest.len() == 1 && rest[0].is_punct(src, ";"));
    ends_unit.then_some(Declaration {
        kind,
        name,
        open,
        close,
    })
}

fn is_name(token: &Token) -> bool {
    matches!(
        token.kind,
        TokenKind::Ident | TokenKind::Str | TokenKind::Number
    )
}

fn literal_key(src: &str, token: &Token) -> Option<String> {
    match token.kind {
        TokenKind::Ident | TokenKind::Number => Some(token.text(src).to_string()),
        TokenKind::Str => Some(token.unquoted(src).to_string()),
        _ => None,
    }
}

fn enum_key(src: &str, tokens: &[Token]) -> Option<String> {
    literal_key(src, tokens.first()?)
}

fn object_key(src: &str, tokens: &[Token]) -> Option<String> {
    let mut index = 0;
    let first = tokens.first()?;
    if matches!(first.text(src), "get" | "set" | "async")
        && tokens.get(1).is_some_and(|t| is_name(t) || t.is_punct(src, "*"))
    {
        index = 1;
    }
    if tokens.get(index)?.is_punct(src, "*") {
        index += 1;
    }
    literal_key(src, tokens.get(index)?)
}

fn class_key(src: &str, tokens: &[Token]) -> Option<String> {
    let mut index = skip_decorators(src, tokens, 0);
    while let Some(token) = tokens.get(index)
        && token.kind == TokenKind::Ident
        && CLASS_MODIFIERS.contains(&token.text(src))
        && tokens.get(index + 1).is_some_and(is_name)
    {
        index += 1;
    }
    let token = tokens.get(index)?;
    if token.is_ident(src, "static") && tokens.get(index + 1)?.is_punct(src, "{") {
        return None;
    }
    literal_key(src, token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(src: &str, kind: NodeKind, name: &str) -> Vec<Option<String>> {
        let tree = SourceTree::parse(src).unwrap();
        let id = tree.find_declarations(kind, name)[0];
        tree.node(id)
            .children
            .iter()
            .map(|child| tree.node(*child).name.clone())
            .collect()
    }

    #[test]
    fn test_dedent() {
        let src = "class A {\n    foo() {\n      bar();\n    }\n}";
        let start = src.find("foo").unwrap();
        let end = src.rfind("    }").unwrap() + 5;
        assert_eq!(dedent(src, start, end), "foo() {\n  bar();\n}");
    }

    #[test]
    fn test_dedent_keeps_template_lines() {
        let src = "class A {\n    foo = `a\n    b\nc`;\n    bar() {}\n}";
        let start = src.find("foo").unwrap();
        let end = src.find("bar() {}").unwrap() + 8;
        let tick = src.find('`').unwrap();
        let templates = [(tick, src.find("c`").unwrap() + 2)];
        let (text, verbatim) = dedent_code(src, start, end, &templates);
        assert_eq!(text, "foo = `a\n    b\nc`;\nbar() {}");
        assert_eq!(verbatim, vec![1, 2]);
    }

    #[test]
    fn test_enum_keys() {
        let src = "export const enum E { A = 1, 'b-c' = 2, D }";
        assert_eq!(
            keys(src, NodeKind::Enum, "E"),
            [Some("A".into()), Some("b-c".into()), Some("D".into())]
        );
    }

    #[test]
    fn test_object_keys() {
        let src = "const O: Record<string, unknown> = {\n  a: 1,\n  get b() { return 2; },\n  \
                   async *c() {},\n  ...rest,\n  [computed]: 3,\n  'q': 4,\n} satisfies Foo;";
        assert_eq!(
            keys(src, NodeKind::Object, "O"),
            [
                Some("a".into()),
                Some("b".into()),
                Some("c".into()),
                None,
                None,
                Some("q".into()),
            ]
        );
    }

    #[test]
    fn test_class_keys() {
        let src = "export default abstract class C<T extends { a: 1 }> extends B implements I {\n  \
                   private static readonly x = 1;\n  #secret: string;\n  get value(): number {\n    \
                   return 1;\n  }\n  [key: string]: unknown;\n  static {\n    init();\n  }\n  \
                   get() {}\n}";
        assert_eq!(
            keys(src, NodeKind::Class, "C"),
            [
                Some("x".into()),
                Some("#secret".into()),
                Some("value".into()),
                None,
                None,
                Some("get".into()),
            ]
        );
    }

    #[test]
    fn test_object_with_trailing_expression_is_statement() {
        let tree = SourceTree::parse("const o = { a: 1 }.a;\nlet p = { b: 2 };\n").unwrap();
        let kinds: Vec<_> = tree.roots().iter().map(|id| tree.node(*id).kind).collect();
        assert_eq!(kinds, [NodeKind::Statement, NodeKind::Object]);
    }
}
