//! Deterministic rendering of the CUE expression tree.
//!
//! Output follows `cue fmt` conventions: tab indentation, one declaration per
//! line, blank lines after the package clause and the import block. The same
//! tree always renders to the same bytes.

use super::ast::{Constraint, Decl, Expr, Field, File, ImportSpec, Label, Lit, StructLit};
use itertools::Itertools;

/// Render a complete CUE source file, ending in a newline.
pub fn file(f: &File) -> String {
    let mut out = String::new();
    if let Some(doc) = &f.doc {
        push_comment(&mut out, doc, 0);
    }
    out.push_str("package ");
    out.push_str(&f.package);
    out.push('\n');
    if !f.imports.is_empty() {
        out.push('\n');
        if let [spec] = f.imports.as_slice() {
            out.push_str("import ");
            push_import(&mut out, spec);
            out.push('\n');
        } else {
            out.push_str("import (\n");
            for spec in &f.imports {
                out.push('\t');
                push_import(&mut out, spec);
                out.push('\n');
            }
            out.push_str(")\n");
        }
    }
    if !f.decls.is_empty() {
        out.push('\n');
        for decl in &f.decls {
            push_decl(&mut out, decl, 0);
        }
    }
    out
}

/// Render a single expression.
pub fn expr(e: &Expr) -> String {
    let mut out = String::new();
    push_expr(&mut out, e, 0, 0, false);
    out
}

/// Quote a string as a CUE double-quoted literal.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn push_import(out: &mut String, spec: &ImportSpec) {
    // An alias is only written when the bound identifier differs from the
    // path's final segment.
    let implied = spec.path.rsplit('/').next().unwrap_or(&spec.path);
    if spec.ident != implied {
        out.push_str(&spec.ident);
        out.push(' ');
    }
    out.push_str(&quote(&spec.path));
}

fn push_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push('\t');
    }
}

fn push_comment(out: &mut String, text: &str, indent: usize) {
    for line in text.lines() {
        push_indent(out, indent);
        if line.is_empty() {
            out.push_str("//\n");
        } else {
            out.push_str("// ");
            out.push_str(line);
            out.push('\n');
        }
    }
}

fn push_decl(out: &mut String, decl: &Decl, indent: usize) {
    match decl {
        Decl::Field(field) => push_field(out, field, indent),
        Decl::Embed(e) => {
            push_indent(out, indent);
            push_expr(out, e, indent, 0, false);
            out.push('\n');
        }
    }
}

fn push_field(out: &mut String, field: &Field, indent: usize) {
    if let Some(doc) = &field.doc {
        push_comment(out, doc, indent);
    }
    push_indent(out, indent);
    match &field.label {
        Label::Ident(name) => out.push_str(name),
        Label::Quoted(name) => out.push_str(&quote(name)),
    }
    match field.constraint {
        Constraint::Regular => {}
        Constraint::Optional => out.push('?'),
        Constraint::Required => out.push('!'),
    }
    out.push_str(": ");
    push_expr(out, &field.value, indent, 0, false);
    out.push('\n');
}

/// `parent_prec` and `right` describe the binary context of the parent, so a
/// nested operand is parenthesised when its operator binds no tighter; `|` is
/// left-associative, so a disjunction on the right of a disjunction keeps its
/// parentheses.
fn push_expr(out: &mut String, e: &Expr, indent: usize, parent_prec: u8, right: bool) {
    match e {
        Expr::Ident(name) => out.push_str(name),
        Expr::Lit(lit) => push_lit(out, lit),
        Expr::Binary { op, lhs, rhs } => {
            let prec = op.precedence();
            let parens = prec < parent_prec || (prec == parent_prec && right);
            if parens {
                out.push('(');
            }
            push_expr(out, lhs, indent, prec, false);
            out.push(' ');
            out.push_str(op.symbol());
            out.push(' ');
            push_expr(out, rhs, indent, prec, true);
            if parens {
                out.push(')');
            }
        }
        Expr::Unary { op, operand } => {
            out.push_str(op.symbol());
            push_expr(out, operand, indent, u8::MAX, true);
        }
        Expr::List { elts, ellipsis } => {
            out.push('[');
            for (i, elt) in elts.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                push_expr(out, elt, indent, 0, false);
            }
            if let Some(item) = ellipsis {
                if !elts.is_empty() {
                    out.push_str(", ");
                }
                out.push_str("...");
                push_expr(out, item, indent, 0, false);
            }
            out.push(']');
        }
        Expr::Struct(lit) => push_struct(out, lit, indent),
        Expr::Selector { base, sel } => {
            push_expr(out, base, indent, u8::MAX, false);
            out.push('.');
            out.push_str(sel);
        }
        Expr::Index { base, index } => {
            push_expr(out, base, indent, u8::MAX, false);
            out.push('[');
            push_expr(out, index, indent, 0, false);
            out.push(']');
        }
        Expr::Call { func, args } => {
            push_expr(out, func, indent, u8::MAX, false);
            out.push('(');
            out.push_str(&args.iter().map(expr).join(", "));
            out.push(')');
        }
    }
}

fn push_struct(out: &mut String, lit: &StructLit, indent: usize) {
    if lit.elts.is_empty() {
        out.push_str("{}");
        return;
    }
    out.push_str("{\n");
    for decl in &lit.elts {
        push_decl(out, decl, indent + 1);
    }
    push_indent(out, indent);
    out.push('}');
}

fn push_lit(out: &mut String, lit: &Lit) {
    match lit {
        Lit::Str(s) => out.push_str(&quote(s)),
        Lit::Int(v) => out.push_str(&v.to_string()),
        Lit::Float(v) => out.push_str(&v.to_string()),
        Lit::Bool(v) => out.push_str(if *v { "true" } else { "false" }),
        Lit::Null => out.push_str("null"),
    }
}
