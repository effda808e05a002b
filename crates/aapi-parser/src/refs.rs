//! # `$ref` Resolution
//!
//! Runs in two passes. [`load_external`] walks the root document and every
//! document it reaches, loading each external target once (breadth-first).
//! [`Dereferencer`] then inlines every reference from the in-memory store
//! without further I/O.
//!
//! Only JSON Pointer fragments (`#/a/b`) are supported. A reference that
//! loops back into the root document (a recursive schema) is expanded once
//! and then left as a fragment-only `$ref`; payload compilation resolves it
//! against the dereferenced document (see [`crate::schema`]). Loops inside
//! referenced documents are reported.

use std::collections::{HashMap, HashSet, VecDeque};

use serde_json::{Map, Value};

use crate::decode::decode_text;
use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::source::{DocumentFetcher, DocumentLocation};

/// External documents keyed by where they were loaded from.
pub(crate) type DocumentStore = HashMap<DocumentLocation, Value>;

/// A `$ref` found in a document, with the JSON path of the object holding it.
struct RefSite {
    path: Vec<String>,
    reference: String,
}

struct PendingLoad {
    target: DocumentLocation,
    referrer: DocumentLocation,
    path: Vec<String>,
}

fn split_reference(reference: &str) -> (&str, &str) {
    reference.split_once('#').unwrap_or((reference, ""))
}

fn collect_refs(value: &Value, path: &mut Vec<String>, out: &mut Vec<RefSite>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(reference)) = map.get("$ref") {
                out.push(RefSite {
                    path: path.clone(),
                    reference: reference.clone(),
                });
                return;
            }
            for (key, child) in map {
                path.push(key.clone());
                collect_refs(child, path, out);
                path.pop();
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                path.push(index.to_string());
                collect_refs(child, path, out);
                path.pop();
            }
        }
        _ => {}
    }
}

fn ref_diagnostic(
    message: String,
    path: &[String],
    referrer: &DocumentLocation,
    root: &DocumentLocation,
) -> Diagnostic {
    let diagnostic = Diagnostic::error(DiagnosticCode::InvalidRef, message, path);
    if referrer == root {
        diagnostic
    } else {
        diagnostic.with_source(referrer.to_string())
    }
}

/// Load every external document reachable from `root`.
///
/// Unloadable or undecodable targets become `invalid-ref` diagnostics;
/// they never abort the walk.
pub(crate) async fn load_external(
    root: &Value,
    root_location: &DocumentLocation,
    fetcher: &DocumentFetcher,
) -> (DocumentStore, Vec<Diagnostic>) {
    let mut store = DocumentStore::new();
    let mut diagnostics = Vec::new();
    let mut seen: HashSet<DocumentLocation> = HashSet::from([root_location.clone()]);
    let mut queue = VecDeque::new();

    enqueue(root, root_location, root_location, &mut seen, &mut queue, &mut diagnostics);

    while let Some(pending) = queue.pop_front() {
        let loaded = match fetcher.load(&pending.target).await {
            Ok(text) => decode_text(&text),
            Err(e) => Err(e.to_string()),
        };
        match loaded {
            Ok(value) => {
                tracing::debug!(location = %pending.target, "loaded referenced document");
                enqueue(&value, &pending.target, root_location, &mut seen, &mut queue, &mut diagnostics);
                store.insert(pending.target, value);
            }
            Err(reason) => diagnostics.push(ref_diagnostic(
                format!("cannot load referenced document {}: {reason}", pending.target),
                &pending.path,
                &pending.referrer,
                root_location,
            )),
        }
    }

    (store, diagnostics)
}

fn enqueue(
    document: &Value,
    location: &DocumentLocation,
    root_location: &DocumentLocation,
    seen: &mut HashSet<DocumentLocation>,
    queue: &mut VecDeque<PendingLoad>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut sites = Vec::new();
    collect_refs(document, &mut Vec::new(), &mut sites);
    for site in sites {
        let (document_part, _) = split_reference(&site.reference);
        if document_part.is_empty() {
            continue;
        }
        match location.join(document_part) {
            Ok(target) => {
                if seen.insert(target.clone()) {
                    queue.push_back(PendingLoad {
                        target,
                        referrer: location.clone(),
                        path: site.path,
                    });
                }
            }
            Err(reason) => {
                diagnostics.push(ref_diagnostic(reason, &site.path, location, root_location));
            }
        }
    }
}

/// `original` with its `$ref` rewritten to a fragment-only pointer into
/// the root document.
fn local_ref(original: &Value, pointer: &str) -> Value {
    let mut edge = original.clone();
    if let Value::Object(map) = &mut edge {
        map.insert("$ref".to_string(), Value::String(format!("#{pointer}")));
    }
    edge
}

/// Inlines `$ref`s from the root document and the preloaded store.
pub(crate) struct Dereferencer<'a> {
    root: &'a Value,
    root_location: &'a DocumentLocation,
    store: &'a DocumentStore,
    stack: Vec<(DocumentLocation, String)>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Dereferencer<'a> {
    pub(crate) fn new(
        root: &'a Value,
        root_location: &'a DocumentLocation,
        store: &'a DocumentStore,
    ) -> Self {
        Self {
            root,
            root_location,
            store,
            stack: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Produce the fully dereferenced root document.
    pub(crate) fn resolve(mut self) -> (Value, Vec<Diagnostic>) {
        let (root, location) = (self.root, self.root_location);
        let resolved = self.walk(root, location, &mut Vec::new());
        (resolved, self.diagnostics)
    }

    fn walk(&mut self, value: &'a Value, base: &'a DocumentLocation, path: &mut Vec<String>) -> Value {
        match value {
            Value::Object(map) => {
                if let Some(Value::String(reference)) = map.get("$ref") {
                    return self.follow(reference, value, base, path);
                }
                let mut out = Map::with_capacity(map.len());
                for (key, child) in map {
                    path.push(key.clone());
                    out.insert(key.clone(), self.walk(child, base, path));
                    path.pop();
                }
                Value::Object(out)
            }
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (index, child) in items.iter().enumerate() {
                    path.push(index.to_string());
                    out.push(self.walk(child, base, path));
                    path.pop();
                }
                Value::Array(out)
            }
            other => other.clone(),
        }
    }

    fn follow(
        &mut self,
        reference: &str,
        original: &Value,
        base: &'a DocumentLocation,
        path: &mut Vec<String>,
    ) -> Value {
        let (document_part, pointer) = split_reference(reference);

        // Location failures were already reported while loading.
        let Some((location, document)) = self.target_document(document_part, base) else {
            return original.clone();
        };

        if !pointer.is_empty() && !pointer.starts_with('/') {
            self.report(
                format!("unsupported fragment in '{reference}': only JSON pointers are resolved"),
                path,
                base,
            );
            return original.clone();
        }

        let Some(target) = document.pointer(pointer) else {
            self.report(format!("'{reference}' does not point to a value"), path, base);
            return original.clone();
        };

        let key = (location.clone(), pointer.to_string());
        if self.stack.contains(&key) {
            if location == self.root_location {
                // Recursive schema: keep the edge as a root-relative `$ref`.
                return local_ref(original, pointer);
            }
            self.report(
                format!("circular reference '{reference}' inside a referenced document"),
                path,
                base,
            );
            return original.clone();
        }

        self.stack.push(key);
        let resolved = self.walk(target, location, path);
        self.stack.pop();
        resolved
    }

    fn target_document(
        &self,
        document_part: &str,
        base: &'a DocumentLocation,
    ) -> Option<(&'a DocumentLocation, &'a Value)> {
        let location = if document_part.is_empty() {
            base.clone()
        } else {
            base.join(document_part).ok()?
        };
        if location == *self.root_location {
            return Some((self.root_location, self.root));
        }
        self.store.get_key_value(&location)
    }

    fn report(&mut self, message: String, path: &[String], base: &DocumentLocation) {
        let diagnostic = ref_diagnostic(message, path, base, self.root_location);
        self.diagnostics.push(diagnostic);
    }
}
