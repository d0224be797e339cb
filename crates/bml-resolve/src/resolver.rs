//! Cross-file resolver
//!
//! Resolution order for `resolve(name, file)`:
//! 1. a module-scope class named `name` in `file`
//! 2. an import binding for `name`, followed to the target module
//! 3. in the target module: local export aliases, exported classes, named
//!    re-exports, then `export *` re-exports, recursively
//!
//! Results are memoized per `(file, name)`. Each top-level call carries its
//! own visited set, so import cycles end in
//! [`UnresolvedReason::CircularImport`] instead of recursing forever.

use crate::reference::{ResolvedClass, ResolvedReference, UnresolvedReason};
use bml_model::{extract_module, ClassDecl, ImportBinding, ModuleIndex, ReExport};
use bml_syntax::{FileId, ModuleHost};
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Resolver cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverStats {
    /// Memo hits
    pub hits: u64,
    /// Memo misses (resolutions computed)
    pub misses: u64,
    /// Modules extracted on demand (seeded modules excluded)
    pub modules_extracted: u64,
}

/// Lookup mode: a name in a module's own scope, or a name the module exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Scope {
    Local,
    Export,
}

type Visited = HashSet<(FileId, String, Scope)>;

/// Memoizing cross-file resolver
pub struct Resolver {
    host: Arc<dyn ModuleHost>,
    modules: DashMap<FileId, Arc<ModuleIndex>>,
    memo: DashMap<(FileId, String), Arc<ResolvedReference>>,
    hits: AtomicU64,
    misses: AtomicU64,
    extracted: AtomicU64,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("modules", &self.modules.len())
            .field("memo", &self.memo.len())
            .finish_non_exhaustive()
    }
}

impl Resolver {
    /// Create resolver over a module host
    #[must_use]
    pub fn new(host: Arc<dyn ModuleHost>) -> Self {
        Self {
            host,
            modules: DashMap::new(),
            memo: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            extracted: AtomicU64::new(0),
        }
    }

    /// Register an already extracted module; the first registration wins
    pub fn seed(&self, index: Arc<ModuleIndex>) -> Arc<ModuleIndex> {
        let file = index.file().clone();
        Arc::clone(self.modules.entry(file).or_insert(index).value())
    }

    /// Module index for a file, extracting it through the host on first use
    #[must_use]
    pub fn module(&self, file: &FileId) -> Option<Arc<ModuleIndex>> {
        if let Some(index) = self.modules.get(file) {
            return Some(Arc::clone(index.value()));
        }

        let source = self.host.source(file)?;
        let index = Arc::new(extract_module(&source));
        self.extracted.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(file = %file, "extracted imported module");
        Some(self.seed(index))
    }

    /// Resolve an identifier as seen from `file`
    ///
    /// Repeated calls with the same arguments return the same `Arc`.
    pub fn resolve(&self, name: &str, file: &FileId) -> Arc<ResolvedReference> {
        let key = (file.clone(), name.to_string());
        if let Some(hit) = self.memo.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(hit.value());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let mut visited = Visited::new();
        let mut chain = Vec::new();
        let result = self.lookup(file, name, Scope::Local, &mut visited, &mut chain);
        tracing::trace!(file = %file, name, resolved = result.is_resolved(), "resolved reference");

        Arc::clone(self.memo.entry(key).or_insert(Arc::new(result)).value())
    }

    /// Cache statistics
    #[must_use]
    pub fn stats(&self) -> ResolverStats {
        ResolverStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            modules_extracted: self.extracted.load(Ordering::Relaxed),
        }
    }

    fn lookup(
        &self,
        file: &FileId,
        name: &str,
        scope: Scope,
        visited: &mut Visited,
        chain: &mut Vec<String>,
    ) -> ResolvedReference {
        let step = format!("{file}:{name}");
        if !visited.insert((file.clone(), name.to_string(), scope)) {
            let mut cycle = chain.clone();
            cycle.push(step);
            tracing::debug!(chain = ?cycle, "circular import");
            return ResolvedReference::unresolved(UnresolvedReason::CircularImport { chain: cycle });
        }

        chain.push(step);
        let result = match self.module(file) {
            None => ResolvedReference::unresolved(UnresolvedReason::ModuleNotFound {
                specifier: file.to_string(),
            }),
            Some(module) => match scope {
                Scope::Local => self.lookup_local(&module, name, visited, chain),
                Scope::Export => self.lookup_export(&module, name, visited, chain),
            },
        };
        chain.pop();
        result
    }

    fn lookup_local(
        &self,
        module: &ModuleIndex,
        name: &str,
        visited: &mut Visited,
        chain: &mut Vec<String>,
    ) -> ResolvedReference {
        if let Some(class) = module.class(name) {
            return class_reference(class, module.file());
        }

        match module.import(name) {
            Some(ImportBinding::Named {
                imported,
                specifier,
            }) => self.follow(module.file(), specifier, imported, visited, chain),
            Some(ImportBinding::Default { specifier }) => {
                self.follow(module.file(), specifier, "default", visited, chain)
            }
            Some(ImportBinding::Namespace { .. }) => {
                ResolvedReference::unresolved(UnresolvedReason::NamespaceImport {
                    name: name.to_string(),
                })
            }
            None => ResolvedReference::unresolved(UnresolvedReason::NotFound {
                name: name.to_string(),
            }),
        }
    }

    fn lookup_export(
        &self,
        module: &ModuleIndex,
        name: &str,
        visited: &mut Visited,
        chain: &mut Vec<String>,
    ) -> ResolvedReference {
        let file = module.file();
        if let Some(local) = module.local_export(name) {
            return self.lookup(file, local, Scope::Local, visited, chain);
        }

        for re_export in module.re_exports() {
            match re_export {
                ReExport::Named {
                    exported,
                    imported,
                    specifier,
                } if exported == name => {
                    return self.follow(file, specifier, imported, visited, chain);
                }
                ReExport::Namespace { exported, .. } if exported == name => {
                    return ResolvedReference::unresolved(UnresolvedReason::NamespaceImport {
                        name: name.to_string(),
                    });
                }
                _ => {}
            }
        }

        let mut fallback = None;
        for re_export in module.re_exports() {
            let ReExport::All { specifier } = re_export else {
                continue;
            };
            let result = self.follow(file, specifier, name, visited, chain);
            let found = matches!(
                result.reason(),
                None | Some(UnresolvedReason::NotAnnotated { .. })
            );
            let absent = matches!(result.reason(), Some(UnresolvedReason::NotFound { .. }));
            if found {
                return result;
            }
            if !absent && fallback.is_none() {
                fallback = Some(result);
            }
        }

        // a class declared without `export`; the host type-checker reports the
        // broken import, here it still names the class
        if let Some(class) = module.class(name) {
            return class_reference(class, file);
        }

        fallback.unwrap_or_else(|| {
            ResolvedReference::unresolved(UnresolvedReason::NotFound {
                name: name.to_string(),
            })
        })
    }

    fn follow(
        &self,
        from: &FileId,
        specifier: &str,
        exported: &str,
        visited: &mut Visited,
        chain: &mut Vec<String>,
    ) -> ResolvedReference {
        match self.host.resolve_import(from, specifier) {
            Some(target) => self.lookup(&target, exported, Scope::Export, visited, chain),
            None => ResolvedReference::unresolved(UnresolvedReason::ModuleNotFound {
                specifier: specifier.to_string(),
            }),
        }
    }
}

fn class_reference(class: &ClassDecl, file: &FileId) -> ResolvedReference {
    if class.is_annotated() {
        ResolvedReference::Annotated(ResolvedClass::new(
            class.name().to_string(),
            file.clone(),
            class.records().to_vec(),
        ))
    } else {
        ResolvedReference::unresolved(UnresolvedReason::NotAnnotated {
            class: class.name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bml_model::AnnotationKind;
    use bml_syntax::MemoryHost;

    fn resolver(files: &[(&str, &str)]) -> Resolver {
        let host = MemoryHost::new();
        for (path, text) in files {
            host.add(path, text).unwrap();
        }
        Resolver::new(Arc::new(host))
    }

    #[test]
    fn resolves_local_class() {
        let r = resolver(&[("a.ts", "@Persona({ name: 'P' }) class P {}")]);
        let resolved = r.resolve("P", &FileId::new("a.ts"));
        assert!(resolved.has_kind(AnnotationKind::Persona));
        assert_eq!(resolved.class().unwrap().file().as_str(), "a.ts");
    }

    #[test]
    fn memoizes_by_pointer() {
        let r = resolver(&[("a.ts", "@Persona({ name: 'P' }) class P {}")]);
        let file = FileId::new("a.ts");
        let first = r.resolve("P", &file);
        let second = r.resolve("P", &file);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(r.stats().hits, 1);
        assert_eq!(r.stats().misses, 1);
    }

    #[test]
    fn unannotated_class_is_unresolved() {
        let r = resolver(&[("a.ts", "class Helper {}")]);
        let resolved = r.resolve("Helper", &FileId::new("a.ts"));
        assert_eq!(
            resolved.reason(),
            Some(&UnresolvedReason::NotAnnotated {
                class: "Helper".into()
            })
        );
    }

    #[test]
    fn missing_module_is_reported() {
        let r = resolver(&[("a.ts", "import { X } from './missing';")]);
        let resolved = r.resolve("X", &FileId::new("a.ts"));
        assert_eq!(
            resolved.reason(),
            Some(&UnresolvedReason::ModuleNotFound {
                specifier: "./missing".into()
            })
        );
    }

    #[test]
    fn namespace_import_is_not_a_class() {
        let r = resolver(&[
            ("a.ts", "import * as model from './b';"),
            ("b.ts", "@Persona({ name: 'P' }) export class P {}"),
        ]);
        let resolved = r.resolve("model", &FileId::new("a.ts"));
        assert!(matches!(
            resolved.reason(),
            Some(UnresolvedReason::NamespaceImport { .. })
        ));
    }
}
