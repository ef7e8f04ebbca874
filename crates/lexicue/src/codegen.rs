//! The lowering engine: tree-directed translation of Lexicon type nodes into
//! CUE expressions, one generator per document.

use crate::cue::ast::{self, Constraint, Expr, StructLit, UnOp};
use crate::deps::DependencyGraph;
use crate::error::{CodegenError, Result};
use crate::lexicon::{
    LexInteger, LexNumber, LexObject, LexString, LexType, LexXrpcBody, LexiconDoc,
};
use crate::{nsid, LEXICUE_PKG};
use smol_str::SmolStr;
use std::collections::BTreeMap;

/// Identifier the prelude package binds to in generated files.
const LEXICUE_IDENT: &str = "lex";

/// The CUE standard-library package used for list bounds.
const LIST_PKG: &str = "list";

/// Per-document lowering context.
pub struct Generator<'g> {
    id: &'g str,
    pkg: String,
    current_def: SmolStr,
    use_map: bool,
    module_root: &'g str,
    imports_by_pkg: BTreeMap<String, SmolStr>,
    deps: &'g mut DependencyGraph,
}

impl<'g> Generator<'g> {
    pub fn new(
        id: &'g str,
        use_map: bool,
        module_root: &'g str,
        deps: &'g mut DependencyGraph,
    ) -> Result<Self> {
        let pkg = if use_map {
            module_root.to_owned()
        } else {
            nsid::id_to_pkg(module_root, id)?
        };
        Ok(Self {
            id,
            pkg,
            current_def: SmolStr::default(),
            use_map,
            module_root,
            imports_by_pkg: BTreeMap::new(),
            deps,
        })
    }

    /// Archive entry path for this document's generated file.
    pub fn entry_name(&self) -> String {
        let dir = nsid::trim_root(&self.pkg, self.module_root);
        if self.use_map {
            format!("{dir}/{}.cue", self.id)
        } else {
            format!("{dir}/defs.cue")
        }
    }

    /// Lower a whole document into a CUE file: the `main` definition first
    /// (its description becomes the package doc comment), then the remaining
    /// definitions in name order. In map mode every definition instead becomes
    /// an entry of a single `#def` mapping keyed by its qualified name.
    pub fn lower(&mut self, doc: &LexiconDoc) -> Result<ast::File> {
        let mut file = ast::File {
            doc: None,
            package: SmolStr::new(nsid::implied_import_ident(&self.pkg)),
            imports: Vec::new(),
            decls: Vec::new(),
        };
        let mut map_defs = StructLit::default();

        if let Some(t) = doc.defs.get("main") {
            self.current_def = SmolStr::new_static("#main");
            let e = self
                .cue_for_definition(t)
                .map_err(|err| CodegenError::definition("main", err))?;
            if self.use_map {
                map_defs.add_field(
                    &format!("{}#main", self.id),
                    Constraint::Regular,
                    e,
                    t.description(),
                );
            } else {
                file.doc = t.description().map(str::to_owned);
                if matches!(e, Expr::Struct(_)) {
                    // It's a definition, so close it up by defining it in
                    // _#def first and then embedding that.
                    file.decls.push(ast::Decl::Field(ast::Field {
                        label: ast::Label::Ident(SmolStr::new_static("_#def")),
                        constraint: Constraint::Regular,
                        value: e,
                        doc: None,
                    }));
                    file.decls.push(ast::Decl::Embed(ast::ident("_#def")));
                } else {
                    file.decls.push(ast::Decl::Embed(e));
                }
            }
        }

        for (name, t) in &doc.defs {
            if name == "main" {
                continue;
            }
            self.current_def = SmolStr::new(format!("#{name}"));
            let e = self
                .cue_for_type(t, true)
                .map_err(|err| CodegenError::definition(name.as_str(), err))?;
            if self.use_map {
                map_defs.add_field(
                    &format!("{}#{name}", self.id),
                    Constraint::Regular,
                    e,
                    t.description(),
                );
            } else {
                file.decls.push(ast::Decl::Field(ast::Field {
                    label: ast::Label::Ident(self.current_def.clone()),
                    constraint: Constraint::Regular,
                    value: e,
                    doc: t.description().map(str::to_owned),
                }));
            }
        }

        if self.use_map && !map_defs.is_empty() {
            file.decls.push(ast::Decl::Field(ast::Field {
                label: ast::Label::Ident(SmolStr::new_static("#def")),
                constraint: Constraint::Regular,
                value: Expr::Struct(map_defs),
                doc: None,
            }));
        }

        self.sanitize(&mut file);
        Ok(file)
    }

    /// Final pass over the lowered tree: assemble the import clause from
    /// every package the document referenced, ordered by path. Identifier
    /// collisions were already renamed at allocation time.
    fn sanitize(&self, file: &mut ast::File) {
        file.imports = self
            .imports_by_pkg
            .iter()
            .map(|(pkg, ident)| ast::ImportSpec {
                ident: ident.clone(),
                path: pkg.clone(),
            })
            .collect();
    }

    /// Lower a document-level definition. The kinds with richer surface
    /// shapes each build a struct unified with their prelude value; anything
    /// else is an ordinary type.
    fn cue_for_definition(&mut self, t: &LexType) -> Result<Expr> {
        match t {
            LexType::Query(query) => {
                let mut lit = StructLit::default();
                self.add_body_field(&mut lit, "output", query.output.as_ref())?;
                if let Some(parameters) = &query.parameters {
                    let e = self.cue_for_type(parameters, false)?;
                    lit.add_field("parameters", Constraint::Required, e, parameters.description());
                }
                Ok(self.lexicon_value("query", Some(Expr::Struct(lit))))
            }
            LexType::Procedure(procedure) => {
                let mut lit = StructLit::default();
                self.add_body_field(&mut lit, "input", procedure.input.as_ref())?;
                self.add_body_field(&mut lit, "output", procedure.output.as_ref())?;
                // TODO errors
                Ok(self.lexicon_value("procedure", Some(Expr::Struct(lit))))
            }
            LexType::Record(record) => {
                let mut lit = StructLit::default();
                if let Some(key) = record.key.as_deref().filter(|k| !k.is_empty()) {
                    lit.add_field("key", Constraint::Regular, ast::string(key), None);
                }
                let e = self.cue_for_type(&record.record, false)?;
                lit.add_field("record", Constraint::Required, e, record.record.description());
                Ok(self.lexicon_value("record", Some(Expr::Struct(lit))))
            }
            LexType::Subscription(subscription) => {
                let mut lit = StructLit::default();
                let parameters = self.cue_for_type(&subscription.parameters, false)?;
                lit.add_field(
                    "parameters",
                    Constraint::Required,
                    parameters,
                    subscription.parameters.description(),
                );
                if let Some(message) = &subscription.message {
                    let schema = self.cue_for_type(&message.schema, false)?;
                    let mut inner = StructLit::default();
                    inner.add_field("schema", Constraint::Regular, schema, None);
                    lit.add_field(
                        "message",
                        Constraint::Required,
                        Expr::Struct(inner),
                        message.schema.description(),
                    );
                }
                Ok(self.lexicon_value("subscription", Some(Expr::Struct(lit))))
            }
            LexType::Image(image) => {
                let mut lit = StructLit::default();
                add_max_constraint(&mut lit, image.max_width, "width", Constraint::Required);
                add_max_constraint(&mut lit, image.max_height, "height", Constraint::Required);
                add_max_constraint(&mut lit, image.max_size, "size", Constraint::Required);
                Ok(self.lexicon_value("image", Some(Expr::Struct(lit))))
            }
            LexType::Video(video) => {
                let mut lit = StructLit::default();
                add_max_constraint(&mut lit, video.max_width, "width", Constraint::Required);
                add_max_constraint(&mut lit, video.max_height, "height", Constraint::Required);
                add_max_constraint(&mut lit, video.max_length, "length", Constraint::Required);
                add_max_constraint(&mut lit, video.max_size, "size", Constraint::Required);
                Ok(self.lexicon_value("video", Some(Expr::Struct(lit))))
            }
            LexType::Audio(audio) => {
                let mut lit = StructLit::default();
                add_max_constraint(&mut lit, audio.max_length, "length", Constraint::Required);
                add_max_constraint(&mut lit, audio.max_size, "size", Constraint::Required);
                Ok(self.lexicon_value("audio", Some(Expr::Struct(lit))))
            }
            _ => self.cue_for_type(t, true),
        }
    }

    /// Lower one type node into a CUE expression.
    fn cue_for_type(&mut self, t: &LexType, top_level: bool) -> Result<Expr> {
        match t {
            LexType::Token(_) => {
                if !top_level {
                    return Err(CodegenError::TokenPlacement);
                }
                let mut name = self.id.to_owned();
                if self.current_def != "#main" {
                    name.push_str(&self.current_def);
                }
                Ok(self.lexicon_value("token", Some(ast::string(name))))
            }
            LexType::Ref(reference) => self.ref_expr(&reference.r#ref),
            LexType::Union(union) => {
                let mut folded: Option<Expr> = None;
                for r in &union.refs {
                    let e = self.ref_expr(r)?;
                    folded = Some(match folded {
                        Some(prev) => ast::or(prev, e),
                        None => e,
                    });
                }
                folded.ok_or(CodegenError::EmptyUnion)
            }
            // TODO what's the difference between params and object?
            LexType::Object(object) | LexType::Params(object) => self.cue_for_object(object),
            LexType::Blob(blob) => {
                let mut lit = StructLit::default();
                add_max_constraint(&mut lit, blob.max_size, "size", Constraint::Optional);
                add_mime_type(&mut lit, blob.accept.as_deref());
                Ok(self.lexicon_value("blob", Some(Expr::Struct(lit))))
            }
            LexType::CidLink(_) => Ok(self.lexicon_value("cidLink", None)),
            LexType::Array(array) => {
                let item = self.cue_for_type(&array.items, false)?;
                let mut e = ast::list_of(item);
                if let Some(min) = array.min_length {
                    e = ast::and(
                        e,
                        ast::call(
                            self.external_ref(LIST_PKG, "MinItems"),
                            vec![ast::int(min as i64)],
                        ),
                    );
                }
                if let Some(max) = array.max_length {
                    e = ast::and(
                        e,
                        ast::call(
                            self.external_ref(LIST_PKG, "MaxItems"),
                            vec![ast::int(max as i64)],
                        ),
                    );
                }
                Ok(e)
            }
            LexType::Boolean(boolean) => {
                if let Some(value) = boolean.r#const {
                    return Ok(ast::boolean(value));
                }
                let mut e = ast::ident("bool");
                if let Some(default) = boolean.default {
                    e = ast::with_default(e, ast::boolean(default));
                }
                Ok(e)
            }
            LexType::Integer(integer) => cue_for_integer(integer),
            LexType::Number(number) => cue_for_number(number),
            LexType::String(string) => cue_for_string(string),
            LexType::Bytes(_) => {
                // TODO MaxLength
                Ok(ast::ident("bytes"))
            }
            LexType::Unknown(_) => Ok(ast::ident("_")),
            other => Err(CodegenError::UnknownType {
                kind: other.kind().to_owned(),
            }),
        }
    }

    fn cue_for_object(&mut self, object: &LexObject) -> Result<Expr> {
        let required = object.required.as_deref().unwrap_or(&[]);
        let nullable = object.nullable.as_deref().unwrap_or(&[]);
        let mut lit = StructLit::default();
        for (name, property) in &object.properties {
            let mut e = self.cue_for_type(property, false)?;
            if nullable.contains(name) {
                e = ast::or(e, ast::null());
            }
            let constraint = if required.contains(name) {
                Constraint::Required
            } else {
                Constraint::Optional
            };
            lit.add_field(name, constraint, e, property.description());
        }
        Ok(Expr::Struct(lit))
    }

    fn add_body_field(
        &mut self,
        lit: &mut StructLit,
        name: &str,
        body: Option<&LexXrpcBody>,
    ) -> Result<()> {
        let Some(body) = body else { return Ok(()) };
        let e = self.cue_for_body(body)?;
        lit.add_field(name, Constraint::Regular, e, None);
        Ok(())
    }

    fn cue_for_body(&mut self, body: &LexXrpcBody) -> Result<Expr> {
        let mut lit = StructLit::default();
        lit.add_field("encoding", Constraint::Regular, ast::string(body.encoding.as_str()), None);
        if let Some(schema) = &body.schema {
            let e = self.cue_for_type(schema, false)?;
            lit.add_field("schema", Constraint::Regular, e, schema.description());
        }
        Ok(Expr::Struct(lit))
    }

    /// Unify a struct with its prelude kind value; an empty struct collapses
    /// to the prelude value alone.
    fn lexicon_value(&mut self, kind: &str, of: Option<Expr>) -> Expr {
        let def = self.external_ref(LEXICUE_PKG, kind);
        match of {
            None => def,
            Some(Expr::Struct(lit)) if lit.is_empty() => def,
            Some(e) => ast::and(def, e),
        }
    }

    /// Rewrite a lexicon reference string into a CUE expression, registering
    /// imports and dependency arcs as needed.
    fn ref_expr(&mut self, name: &str) -> Result<Expr> {
        if self.use_map {
            let full = match name.strip_prefix('#') {
                Some(local) => format!("{}#{local}", self.id),
                None => name.to_owned(),
            };
            return Ok(ast::index(ast::ident("#def"), ast::string(full)));
        }
        let (path, def, has_fragment) = match name.split_once('#') {
            Some((path, def)) => (path, def, true),
            None => (name, "", false),
        };
        if has_fragment && path.is_empty() {
            // Local reference.
            return Ok(ast::ident(format!("#{def}")));
        }
        let pkg = nsid::id_to_pkg(self.module_root, path)?;
        if pkg == self.pkg {
            return Ok(ast::ident(format!("#{def}")));
        }
        let sym = if has_fragment {
            format!("#{def}")
        } else {
            String::new()
        };
        Ok(self.external_ref(&pkg, &sym))
    }

    /// Reference a symbol in another package: records the dependency arc and
    /// returns `<importIdent>.<sym>`, or the bare import identifier when no
    /// symbol is named.
    fn external_ref(&mut self, pkg: &str, sym: &str) -> Expr {
        self.deps
            .record(&self.pkg, pkg, self.current_def.as_str(), sym);
        let ident = self.add_import(pkg);
        if sym.is_empty() {
            Expr::Ident(ident)
        } else {
            ast::selector(Expr::Ident(ident), sym)
        }
    }

    fn add_import(&mut self, pkg: &str) -> SmolStr {
        if let Some(ident) = self.imports_by_pkg.get(pkg) {
            return ident.clone();
        }
        let mut ident: SmolStr = if pkg == LEXICUE_PKG {
            // The prelude vocabulary always binds to `lex`.
            SmolStr::new_static(LEXICUE_IDENT)
        } else {
            let implied = nsid::implied_import_ident(pkg);
            if implied == "defs" {
                // defs is commonly used and meaningless, so try for a more
                // informative identifier.
                nsid::defs_import_ident(pkg).unwrap_or_else(|| SmolStr::new(implied))
            } else {
                SmolStr::new(implied)
            }
        };
        if self.imports_by_pkg.values().any(|taken| *taken == ident) {
            let base = ident.clone();
            for n in 1.. {
                let candidate = SmolStr::new(format!("{base}_{n}"));
                if !self.imports_by_pkg.values().any(|taken| *taken == candidate) {
                    ident = candidate;
                    break;
                }
            }
        }
        self.imports_by_pkg.insert(pkg.to_owned(), ident.clone());
        ident
    }
}

fn cue_for_integer(t: &LexInteger) -> Result<Expr> {
    if let Some(value) = t.r#const {
        return Ok(ast::int(value));
    }
    let mut e = match &t.r#enum {
        Some(values) => values
            .iter()
            .map(|v| ast::int(*v))
            .reduce(ast::or)
            .ok_or(CodegenError::EmptyEnum)?,
        None => ast::ident("int"),
    };
    if let Some(minimum) = t.minimum {
        e = ast::and(e, ast::unary(UnOp::GreaterEq, ast::int(minimum)));
    }
    if let Some(maximum) = t.maximum {
        e = ast::and(e, ast::unary(UnOp::LessEq, ast::int(maximum)));
    }
    if let Some(default) = t.default {
        e = ast::with_default(e, ast::int(default));
    }
    Ok(e)
}

fn cue_for_number(t: &LexNumber) -> Result<Expr> {
    if let Some(value) = t.r#const {
        return Ok(ast::float(value));
    }
    let mut e = match &t.r#enum {
        Some(values) => values
            .iter()
            .map(|v| ast::float(*v))
            .reduce(ast::or)
            .ok_or(CodegenError::EmptyEnum)?,
        None => ast::ident("number"),
    };
    if let Some(minimum) = t.minimum {
        e = ast::and(e, ast::unary(UnOp::GreaterEq, ast::float(minimum)));
    }
    if let Some(maximum) = t.maximum {
        e = ast::and(e, ast::unary(UnOp::LessEq, ast::float(maximum)));
    }
    if let Some(default) = t.default {
        e = ast::with_default(e, ast::float(default));
    }
    Ok(e)
}

fn cue_for_string(t: &LexString) -> Result<Expr> {
    // TODO MaxGraphemes
    // TODO KnownValues ("foo" | "bar" | string ?)
    // TODO Format
    if let Some(value) = &t.r#const {
        return Ok(ast::string(value.as_str()));
    }
    let mut e = match &t.r#enum {
        Some(values) => values
            .iter()
            .map(|v| ast::string(v.as_str()))
            .reduce(ast::or)
            .ok_or(CodegenError::EmptyEnum)?,
        None => ast::ident("string"),
    };
    // TODO MinLength
    // TODO MaxLength	(length in runes? bytes?)
    if let Some(default) = &t.default {
        e = ast::with_default(e, ast::string(default.as_str()));
    }
    Ok(e)
}

/// Emit `<name><constraint>: <=n` when the bound is present.
fn add_max_constraint(lit: &mut StructLit, n: Option<usize>, name: &str, constraint: Constraint) {
    let Some(n) = n else { return };
    lit.add_field(name, constraint, ast::unary(UnOp::LessEq, ast::int(n as i64)), None);
}

fn add_mime_type(lit: &mut StructLit, accept: Option<&[String]>) {
    let Some(accept) = accept else { return };
    let mut folded: Option<Expr> = None;
    for pattern in accept {
        // TODO what's the general matching pattern syntax here?
        let elt = match pattern.strip_suffix("/*") {
            Some(prefix) => ast::unary(
                UnOp::Match,
                ast::string(format!("^{}/", regex::escape(prefix))),
            ),
            None => ast::string(pattern.as_str()),
        };
        folded = Some(match folded {
            Some(prev) => ast::or(prev, elt),
            None => elt,
        });
    }
    if let Some(value) = folded {
        lit.add_field("mimeType", Constraint::Required, value, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cue::format;
    use crate::lexicon::LexiconDoc;
    use pretty_assertions::assert_eq;

    const ROOT: &str = "lexicon.me";
    const MAP_ROOT: &str = "lexicon.me/defs";

    fn lower(json: &str, use_map: bool, deps: &mut DependencyGraph) -> (String, String) {
        let doc: LexiconDoc = serde_json::from_str(json).expect("parse doc");
        let root = if use_map { MAP_ROOT } else { ROOT };
        let mut generator =
            Generator::new(&doc.id, use_map, root, deps).expect("build generator");
        let file = generator.lower(&doc).expect("lower doc");
        (generator.entry_name(), format::file(&file))
    }

    #[test]
    fn minimal_record_document() {
        let mut deps = DependencyGraph::new();
        let (entry, text) = lower(
            r#"{
              "lexicon": 1,
              "id": "com.example.foo.bar",
              "defs": {
                "main": {
                  "type": "record",
                  "key": "tid",
                  "record": {
                    "type": "object",
                    "properties": {"text": {"type": "string"}}
                  }
                }
              }
            }"#,
            false,
            &mut deps,
        );
        assert_eq!(entry, "foo.example.com/bar/defs.cue");
        assert_eq!(
            text,
            "package bar\n\
             \n\
             import lex \"cueschemas.org/lexicue\"\n\
             \n\
             lex.record & {\n\
             \tkey: \"tid\"\n\
             \trecord!: {\n\
             \t\ttext?: string\n\
             \t}\n\
             }\n"
        );
    }

    #[test]
    fn object_main_is_closed_up_in_def_alias() {
        let mut deps = DependencyGraph::new();
        let (_, text) = lower(
            r#"{
              "lexicon": 1,
              "id": "a.b.c",
              "defs": {
                "main": {
                  "type": "object",
                  "properties": {"text": {"type": "string"}}
                }
              }
            }"#,
            false,
            &mut deps,
        );
        assert_eq!(
            text,
            "package c\n\
             \n\
             _#def: {\n\
             \ttext?: string\n\
             }\n\
             _#def\n"
        );
    }

    #[test]
    fn main_description_becomes_package_doc() {
        let mut deps = DependencyGraph::new();
        let (_, text) = lower(
            r#"{
              "lexicon": 1,
              "id": "com.example.foo.bar",
              "defs": {
                "main": {"type": "token", "description": "A marker."}
              }
            }"#,
            false,
            &mut deps,
        );
        assert!(text.starts_with("// A marker.\npackage bar\n"));
        assert!(text.contains("lex.token & \"com.example.foo.bar\"\n"));
    }

    #[test]
    fn non_main_token_is_qualified() {
        let mut deps = DependencyGraph::new();
        let (_, text) = lower(
            r#"{
              "lexicon": 1,
              "id": "com.example.foo.bar",
              "defs": {"marker": {"type": "token"}}
            }"#,
            false,
            &mut deps,
        );
        assert!(text.contains("#marker: lex.token & \"com.example.foo.bar#marker\"\n"));
    }

    #[test]
    fn cross_document_reference_imports_and_records_arc() {
        let mut deps = DependencyGraph::new();
        let (_, text) = lower(
            r##"{
              "lexicon": 1,
              "id": "a.b.c",
              "defs": {
                "main": {
                  "type": "object",
                  "properties": {"view": {"type": "ref", "ref": "a.b.d#view"}}
                }
              }
            }"##,
            false,
            &mut deps,
        );
        assert!(text.contains("import \"lexicon.me/b.a/d\"\n"));
        assert!(text.contains("\tview?: d.#view\n"));
        let mermaid = deps.mermaid(ROOT);
        assert!(mermaid.contains("\tid0[b.a/c]\n"));
        assert!(mermaid.contains("\tid1[b.a/d]\n"));
        assert!(mermaid.contains("\tid0 --> id1\n"));
    }

    #[test]
    fn local_and_same_package_references_stay_bare() {
        let mut deps = DependencyGraph::new();
        let (_, text) = lower(
            r##"{
              "lexicon": 1,
              "id": "a.b.c",
              "defs": {
                "main": {
                  "type": "object",
                  "properties": {
                    "one": {"type": "ref", "ref": "#item"},
                    "two": {"type": "ref", "ref": "a.b.c#item"}
                  }
                },
                "item": {"type": "string"}
              }
            }"##,
            false,
            &mut deps,
        );
        assert!(text.contains("\tone?: #item\n"));
        assert!(text.contains("\ttwo?: #item\n"));
        assert!(!text.contains("import \"lexicon.me/b.a/c\""));
    }

    #[test]
    fn properties_sorted_with_required_and_nullable() {
        let mut deps = DependencyGraph::new();
        let (_, text) = lower(
            r#"{
              "lexicon": 1,
              "id": "a.b.c",
              "defs": {
                "main": {
                  "type": "object",
                  "required": ["zebra", "alpha"],
                  "nullable": ["zebra"],
                  "properties": {
                    "zebra": {"type": "string"},
                    "alpha": {"type": "integer"},
                    "mid": {"type": "boolean"}
                  }
                }
              }
            }"#,
            false,
            &mut deps,
        );
        let alpha = text.find("alpha!: int").expect("alpha field");
        let mid = text.find("mid?: bool").expect("mid field");
        let zebra = text.find("zebra!: string | null").expect("zebra field");
        assert!(alpha < mid && mid < zebra);
    }

    #[test]
    fn union_folds_refs() {
        let mut deps = DependencyGraph::new();
        let (_, text) = lower(
            r##"{
              "lexicon": 1,
              "id": "a.b.c",
              "defs": {
                "main": {
                  "type": "object",
                  "properties": {
                    "embed": {"type": "union", "refs": ["#image", "a.b.d#video"]}
                  }
                }
              }
            }"##,
            false,
            &mut deps,
        );
        assert!(text.contains("\tembed?: #image | d.#video\n"));
    }

    #[test]
    fn string_enum_with_default() {
        let expr = cue_for_string(
            &serde_json::from_str(r#"{"enum": ["one", "two"], "default": "one"}"#).unwrap(),
        )
        .unwrap();
        assert_eq!(format::expr(&expr), r#"*"one" | ("one" | "two")"#);
    }

    #[test]
    fn integer_bounds_and_default() {
        let expr = cue_for_integer(
            &serde_json::from_str(r#"{"minimum": 1, "maximum": 10, "default": 5}"#).unwrap(),
        )
        .unwrap();
        assert_eq!(format::expr(&expr), "*5 | int & >=1 & <=10");
    }

    #[test]
    fn integer_const_short_circuits() {
        let expr =
            cue_for_integer(&serde_json::from_str(r#"{"const": 42, "minimum": 1}"#).unwrap())
                .unwrap();
        assert_eq!(format::expr(&expr), "42");
    }

    #[test]
    fn number_uses_number_identifier() {
        let expr = cue_for_number(&serde_json::from_str(r#"{"minimum": 0.5}"#).unwrap()).unwrap();
        assert_eq!(format::expr(&expr), "number & >=0.5");
    }

    #[test]
    fn empty_enum_is_rejected() {
        let err = cue_for_string(&serde_json::from_str(r#"{"enum": []}"#).unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "empty enum");
    }

    #[test]
    fn array_bounds_use_list_package() {
        let mut deps = DependencyGraph::new();
        let (_, text) = lower(
            r##"{
              "lexicon": 1,
              "id": "a.b.c",
              "defs": {
                "main": {
                  "type": "object",
                  "properties": {
                    "items": {
                      "type": "array",
                      "items": {"type": "ref", "ref": "#foo"},
                      "minLength": 1,
                      "maxLength": 3
                    }
                  }
                },
                "foo": {"type": "string"}
              }
            }"##,
            false,
            &mut deps,
        );
        assert!(text.contains("\titems?: [...#foo] & list.MinItems(1) & list.MaxItems(3)\n"));
        assert!(text.contains("import \"list\"\n"));
        assert!(deps.mermaid(ROOT).contains("id1[list]"));
    }

    #[test]
    fn blob_accept_globs_become_patterns() {
        let mut deps = DependencyGraph::new();
        let (_, text) = lower(
            r#"{
              "lexicon": 1,
              "id": "a.b.c",
              "defs": {
                "main": {
                  "type": "object",
                  "properties": {
                    "avatar": {
                      "type": "blob",
                      "accept": ["image/png", "image/*"],
                      "maxSize": 1000000
                    }
                  }
                }
              }
            }"#,
            false,
            &mut deps,
        );
        assert!(text.contains(
            "\tavatar?: lex.blob & {\n\t\tsize?: <=1000000\n\t\tmimeType!: \"image/png\" | =~\"^image/\"\n\t}\n"
        ));
    }

    #[test]
    fn query_lowering() {
        let mut deps = DependencyGraph::new();
        let (_, text) = lower(
            r#"{
              "lexicon": 1,
              "id": "a.b.getThing",
              "defs": {
                "main": {
                  "type": "query",
                  "parameters": {
                    "type": "params",
                    "properties": {"limit": {"type": "integer", "minimum": 1}}
                  },
                  "output": {
                    "encoding": "application/json",
                    "schema": {"type": "object", "properties": {"thing": {"type": "unknown"}}}
                  }
                }
              }
            }"#,
            false,
            &mut deps,
        );
        assert!(text.contains("\nlex.query & {\n"));
        assert!(text.contains("\toutput: {\n\t\tencoding: \"application/json\"\n"));
        assert!(text.contains("\tparameters!: {\n\t\tlimit?: int & >=1\n\t}\n"));
    }

    #[test]
    fn subscription_lowering() {
        let mut deps = DependencyGraph::new();
        let (_, text) = lower(
            r##"{
              "lexicon": 1,
              "id": "a.b.subscribeThing",
              "defs": {
                "main": {
                  "type": "subscription",
                  "parameters": {
                    "type": "params",
                    "properties": {"cursor": {"type": "integer"}}
                  },
                  "message": {
                    "schema": {"type": "union", "refs": ["#event"]}
                  }
                },
                "event": {"type": "object", "properties": {}}
              }
            }"##,
            false,
            &mut deps,
        );
        assert!(text.contains("\nlex.subscription & {\n"));
        assert!(text.contains("\tparameters!: {\n\t\tcursor?: int\n\t}\n"));
        assert!(text.contains("\tmessage!: {\n\t\tschema: #event\n\t}\n"));
    }

    #[test]
    fn media_kinds_emit_required_bounds() {
        let mut deps = DependencyGraph::new();
        let (_, text) = lower(
            r#"{
              "lexicon": 1,
              "id": "a.b.pic",
              "defs": {
                "main": {"type": "image", "maxWidth": 500, "maxHeight": 300}
              }
            }"#,
            false,
            &mut deps,
        );
        assert!(text.contains("\nlex.image & {\n\twidth!: <=500\n\theight!: <=300\n}\n"));
    }

    #[test]
    fn cid_link_collapses_to_prelude_value() {
        let mut deps = DependencyGraph::new();
        let (_, text) = lower(
            r#"{
              "lexicon": 1,
              "id": "a.b.c",
              "defs": {
                "main": {
                  "type": "object",
                  "properties": {"link": {"type": "cid-link"}}
                }
              }
            }"#,
            false,
            &mut deps,
        );
        assert!(text.contains("\tlink?: lex.cidLink\n"));
    }

    #[test]
    fn document_kind_in_type_position_is_rejected() {
        let mut deps = DependencyGraph::new();
        let doc: LexiconDoc = serde_json::from_str(
            r#"{
              "lexicon": 1,
              "id": "a.b.c",
              "defs": {
                "aux": {
                  "type": "record",
                  "record": {"type": "object", "properties": {}}
                }
              }
            }"#,
        )
        .unwrap();
        let mut generator = Generator::new(&doc.id, false, ROOT, &mut deps).unwrap();
        let err = generator.lower(&doc).unwrap_err();
        assert_eq!(
            err.to_string(),
            "bad schema for \"aux\": unknown type \"record\""
        );
    }

    #[test]
    fn nested_token_is_rejected() {
        let mut deps = DependencyGraph::new();
        let doc: LexiconDoc = serde_json::from_str(
            r#"{
              "lexicon": 1,
              "id": "a.b.c",
              "defs": {
                "main": {
                  "type": "object",
                  "properties": {"bad": {"type": "token"}}
                }
              }
            }"#,
        )
        .unwrap();
        let mut generator = Generator::new(&doc.id, false, ROOT, &mut deps).unwrap();
        let err = generator.lower(&doc).unwrap_err();
        assert_eq!(
            err.to_string(),
            "bad schema for \"main\": token not defined at top level"
        );
    }

    #[test]
    fn short_reference_path_is_rejected() {
        let mut deps = DependencyGraph::new();
        let doc: LexiconDoc = serde_json::from_str(
            r##"{
              "lexicon": 1,
              "id": "a.b.c",
              "defs": {
                "main": {
                  "type": "object",
                  "properties": {"bad": {"type": "ref", "ref": "a.b#x"}}
                }
              }
            }"##,
        )
        .unwrap();
        let mut generator = Generator::new(&doc.id, false, ROOT, &mut deps).unwrap();
        let err = generator.lower(&doc).unwrap_err();
        assert_eq!(
            err.to_string(),
            "bad schema for \"main\": not enough elements in path \"a.b\""
        );
    }

    #[test]
    fn import_ident_collisions_get_suffixes() {
        let mut deps = DependencyGraph::new();
        let (_, text) = lower(
            r##"{
              "lexicon": 1,
              "id": "a.b.c",
              "defs": {
                "main": {
                  "type": "object",
                  "properties": {
                    "one": {"type": "ref", "ref": "a.b.d#x"},
                    "two": {"type": "ref", "ref": "x.y.d#x"}
                  }
                }
              }
            }"##,
            false,
            &mut deps,
        );
        assert!(text.contains("\tone?: d.#x\n"));
        assert!(text.contains("\ttwo?: d_1.#x\n"));
        assert!(text.contains("\td_1 \"lexicon.me/y.x/d\"\n"));
    }

    #[test]
    fn defs_package_import_uses_parent_ident() {
        let mut deps = DependencyGraph::new();
        let (_, text) = lower(
            r##"{
              "lexicon": 1,
              "id": "app.bsky.feed.post",
              "defs": {
                "main": {
                  "type": "object",
                  "properties": {"label": {"type": "ref", "ref": "app.bsky.actor.defs#profile"}}
                }
              }
            }"##,
            false,
            &mut deps,
        );
        assert!(text.contains("import actor_bsky_app \"lexicon.me/actor.bsky.app/defs\"\n"));
        assert!(text.contains("\tlabel?: actor_bsky_app.#profile\n"));
    }

    #[test]
    fn map_mode_emits_def_entries_without_imports() {
        let mut deps = DependencyGraph::new();
        let (entry, text) = lower(
            r##"{
              "lexicon": 1,
              "id": "com.example.foo.bar",
              "defs": {
                "main": {
                  "type": "record",
                  "key": "tid",
                  "record": {
                    "type": "object",
                    "properties": {
                      "other": {"type": "ref", "ref": "a.b.d#view"},
                      "self": {"type": "ref", "ref": "#aux"}
                    }
                  }
                },
                "aux": {"type": "string"}
              }
            }"##,
            true,
            &mut deps,
        );
        assert_eq!(entry, "lexicon.me/defs/com.example.foo.bar.cue");
        assert!(text.starts_with("package defs\n"));
        assert!(text.contains("#def: {\n"));
        assert!(text.contains("\t\"com.example.foo.bar#main\": lex.record & {\n"));
        assert!(text.contains("\t\t\tother?: #def[\"a.b.d#view\"]\n"));
        assert!(text.contains("\t\t\tself?: #def[\"com.example.foo.bar#aux\"]\n"));
        assert!(text.contains("\t\"com.example.foo.bar#aux\": string\n"));
        // The prelude import is the only import in map mode.
        assert!(text.contains("import lex \"cueschemas.org/lexicue\"\n"));
        assert!(!text.contains("import (\n"));
    }

    #[test]
    fn empty_union_is_rejected() {
        let mut deps = DependencyGraph::new();
        let doc: LexiconDoc = serde_json::from_str(
            r#"{
              "lexicon": 1,
              "id": "a.b.c",
              "defs": {
                "main": {
                  "type": "object",
                  "properties": {"u": {"type": "union", "refs": []}}
                }
              }
            }"#,
        )
        .unwrap();
        let mut generator = Generator::new(&doc.id, false, ROOT, &mut deps).unwrap();
        let err = generator.lower(&doc).unwrap_err();
        assert_eq!(
            err.to_string(),
            "bad schema for \"main\": no elements in union"
        );
    }
}
