use graft_codegen::CodeBuilder;

use super::{NodeId, SourceTree};

pub(super) fn print(tree: &SourceTree) -> String {
    let mut builder = CodeBuilder::typescript();
    for id in tree.roots() {
        print_node(tree, &mut builder, *id, "");
    }
    for comment in &tree.dangling {
        builder.push_lines(comment);
    }

    let mut out = builder.build();
    if !tree.trailing_newline && out.ends_with('\n') {
        out.pop();
    }
    out
}

fn print_node(tree: &SourceTree, builder: &mut CodeBuilder, id: NodeId, separator: &str) {
    let node = tree.node(id);
    for comment in &node.leading {
        builder.push_lines(comment);
    }
    let trailing = node
        .trailing
        .as_ref()
        .map(|comment| format!(" {comment}"))
        .unwrap_or_default();

    if !node.kind.is_declaration() {
        push_text(builder, &format!("{}{separator}{trailing}", node.text), &node.verbatim);
        return;
    }

    let close = format!("}}{}{trailing}", node.close);
    if node.children.is_empty() && node.dangling.is_empty() {
        push_text(builder, &format!("{}{close}", node.text), &node.verbatim);
        return;
    }

    let member_separator = if node.kind.comma_separated() { "," } else { "" };
    push_text(builder, &node.text, &node.verbatim);
    builder.push_indent();
    for child in &node.children {
        print_node(tree, builder, *child, member_separator);
    }
    for comment in &node.dangling {
        builder.push_lines(comment);
    }
    builder.push_dedent();
    builder.push_lines(&close);
}

/// Print `text` line by line. Lines listed in `verbatim` belong to a template
/// literal and are written without indentation.
fn push_text(builder: &mut CodeBuilder, text: &str, verbatim: &[usize]) {
    if text.is_empty() {
        return;
    }
    for (index, line) in text.split('\n').enumerate() {
        if verbatim.contains(&index) {
            builder.push_raw(line).push_blank();
        } else if line.trim().is_empty() {
            builder.push_blank();
        } else {
            builder.push_line(line);
        }
    }
}
