//! Cross-file resolution scenarios

use bml_model::AnnotationKind;
use bml_resolve::{Resolver, UnresolvedReason};
use bml_syntax::{FileId, MemoryHost};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn resolver(files: &[(&str, &str)]) -> Resolver {
    let host = MemoryHost::new();
    for (path, text) in files {
        host.add(path, text).unwrap();
    }
    Resolver::new(Arc::new(host))
}

#[test]
fn follows_named_import_with_alias() {
    let r = resolver(&[
        (
            "src/people/persona.ts",
            "@Persona({ name: 'Shopper' }) export class Shopper {}",
        ),
        (
            "src/journeys/checkout.ts",
            "import { Shopper as Buyer } from '../people/persona';",
        ),
    ]);

    let resolved = r.resolve("Buyer", &FileId::new("src/journeys/checkout.ts"));
    let class = resolved.class().unwrap();
    assert_eq!(class.name(), "Shopper");
    assert_eq!(class.file().as_str(), "src/people/persona.ts");
    assert!(class.has_kind(AnnotationKind::Persona));
    assert_eq!(r.stats().modules_extracted, 2);
}

#[test]
fn follows_barrel_re_exports() {
    let r = resolver(&[
        ("model/actions.ts", "@Action({ name: 'Pay' }) export class Pay {}"),
        ("model/metrics.ts", "@Metric({ name: 'Latency' }) class Latency {}\nexport { Latency as P95 };"),
        ("model/index.ts", "export * from './actions';\nexport { P95 } from './metrics';"),
        ("app.ts", "import { Pay, P95 } from './model';"),
    ]);

    let app = FileId::new("app.ts");
    assert!(r.resolve("Pay", &app).has_kind(AnnotationKind::Action));
    let metric = r.resolve("P95", &app);
    assert_eq!(metric.class().map(|c| c.name()), Some("Latency"));
}

#[test]
fn follows_default_imports() {
    let r = resolver(&[
        ("ops.ts", "@Stakeholder({ name: 'Ops' }) export default class Ops {}"),
        ("app.ts", "import Operations from './ops';"),
    ]);
    let resolved = r.resolve("Operations", &FileId::new("app.ts"));
    assert!(resolved.has_kind(AnnotationKind::Stakeholder));
}

#[test]
fn circular_re_exports_terminate() {
    let r = resolver(&[
        ("a.ts", "export { X } from './b';"),
        ("b.ts", "export { X } from './a';"),
        ("app.ts", "import { X } from './a';"),
    ]);

    let resolved = r.resolve("X", &FileId::new("app.ts"));
    match resolved.reason() {
        Some(UnresolvedReason::CircularImport { chain }) => {
            assert_eq!(chain.first().map(String::as_str), Some("app.ts:X"));
            assert_eq!(chain.last().map(String::as_str), Some("a.ts:X"));
        }
        other => panic!("expected circular import, got {other:?}"),
    }
}

#[test]
fn circular_star_exports_terminate() {
    let r = resolver(&[
        ("a.ts", "export * from './b';"),
        ("b.ts", "export * from './a';"),
        ("app.ts", "import { Missing } from './a';"),
    ]);

    let resolved = r.resolve("Missing", &FileId::new("app.ts"));
    assert!(matches!(
        resolved.reason(),
        Some(UnresolvedReason::CircularImport { .. })
    ));
}

#[test]
fn mutual_imports_resolve_without_cycle() {
    // each file imports the other; the annotated classes are still found
    let r = resolver(&[
        (
            "a.ts",
            "import { B } from './b';\n@Action({ name: 'A', triggers: [B] }) export class A {}",
        ),
        (
            "b.ts",
            "import { A } from './a';\n@Action({ name: 'B', triggers: [A] }) export class B {}",
        ),
    ]);

    assert!(r.resolve("B", &FileId::new("a.ts")).is_resolved());
    assert!(r.resolve("A", &FileId::new("b.ts")).is_resolved());
}

#[test]
fn seeded_modules_are_not_re_extracted() {
    let host = Arc::new(MemoryHost::new());
    let id = host.add("a.ts", "@Persona({ name: 'P' }) class P {}").unwrap();
    let r = Resolver::new(host.clone());

    let source = bml_syntax::ModuleHost::source(host.as_ref(), &id).unwrap();
    let seeded = r.seed(Arc::new(bml_model::extract_module(&source)));
    assert!(Arc::ptr_eq(&seeded, &r.module(&id).unwrap()));
    assert_eq!(r.stats().modules_extracted, 0);
}

#[test]
fn unknown_identifier_is_not_found() {
    let r = resolver(&[("a.ts", "@Persona({ name: 'P' }) class P {}")]);
    let resolved = r.resolve("Nobody", &FileId::new("a.ts"));
    assert_eq!(
        resolved.reason(),
        Some(&UnresolvedReason::NotFound {
            name: "Nobody".into()
        })
    );
}
