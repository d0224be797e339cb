//! Extraction tests over realistic TypeScript sources

use bml_model::{
    extract_module, AnnotationKind, FieldValue, ImportBinding, Malformed, ModuleIndex, OwnerKind,
    ReExport, SkipReason,
};
use bml_syntax::{FileId, SourceFile};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn extract(path: &str, text: &str) -> ModuleIndex {
    let file = SourceFile::parse_path(FileId::new(path), text).unwrap();
    extract_module(&file)
}

#[test]
fn records_in_declaration_order() {
    let index = extract(
        "src/checkout.ts",
        r"
        import { Action, Journey } from '@bml/annotations';

        @Journey({ name: 'Checkout', primaryStakeholder: Shopper, actions: [AddToCart, Pay] })
        export class CheckoutJourney {}

        @Action({ name: 'Add to cart', actor: Shopper })
        export class AddToCart {}

        export class Helpers {
          @Action({ name: 'Pay', actor: Shopper })
          pay() {}

          @Expectation({ name: 'Fast', priority: 'must' })
          @Witness({ name: 'Load test', kind: 'e2e' })
          confirm(): void {}
        }
        ",
    );

    let owners: Vec<_> = index
        .records()
        .iter()
        .map(|r| (r.kind(), r.owner_name().to_string()))
        .collect();
    assert_eq!(
        owners,
        vec![
            (AnnotationKind::Journey, "CheckoutJourney".to_string()),
            (AnnotationKind::Action, "AddToCart".to_string()),
            (AnnotationKind::Action, "Helpers.pay".to_string()),
            (AnnotationKind::Expectation, "Helpers.confirm".to_string()),
            (AnnotationKind::Witness, "Helpers.confirm".to_string()),
        ]
    );

    let pay = &index.records()[2];
    assert_eq!(pay.owner(), OwnerKind::Method);
    assert_eq!(pay.class_name(), "Helpers");

    // method records do not make the class annotated
    assert!(!index.class("Helpers").unwrap().is_annotated());
    assert!(index.class("AddToCart").unwrap().is_annotated());
}

#[test]
fn non_object_argument_yields_one_malformed_record() {
    let index = extract("a.ts", "@Persona('Shopper') class Shopper {}");
    assert_eq!(index.records().len(), 1);

    let record = &index.records()[0];
    assert_eq!(
        record.malformed(),
        Some(&Malformed::NotObjectLiteral {
            found: "string".into()
        })
    );
    assert!(record.fields().is_empty());
}

#[test]
fn bare_and_empty_calls_are_missing_argument() {
    let index = extract("a.ts", "@Persona class A {}\n@Metric() class B {}");
    assert_eq!(index.records().len(), 2);
    for record in index.records() {
        assert_eq!(record.malformed(), Some(&Malformed::MissingArgument));
        assert_eq!(record.args_span(), None);
    }
}

#[test]
fn extra_arguments_still_convert_first_object() {
    let index = extract("a.ts", "@Persona({ name: 'A' }, 42) class A {}");
    let record = &index.records()[0];
    assert_eq!(record.malformed(), Some(&Malformed::ExtraArguments { count: 1 }));
    assert_eq!(record.name(), Some("A"));
}

#[test]
fn spreads_and_computed_keys_are_skipped() {
    let index = extract(
        "a.ts",
        "@Persona({ ...base, [key]: 1, name: 'A', goals: [...more, 'x'], describe() { return 1 } }) class A {}",
    );
    let record = &index.records()[0];
    let reasons: Vec<_> = record.skipped().iter().map(|s| s.reason.clone()).collect();
    assert_eq!(
        reasons,
        vec![
            SkipReason::Spread,
            SkipReason::ComputedKey,
            SkipReason::Spread,
            SkipReason::Method
        ]
    );
    assert_eq!(record.fields().keys().collect::<Vec<_>>(), vec!["name", "goals"]);
    assert_eq!(record.fields().list("goals").map(<[_]>::len), Some(1));
}

#[test]
fn shorthand_properties_are_references() {
    let index = extract("a.ts", "const owner = 1;\n@Context({ name: 'Sales', owner }) class Sales {}");
    assert_eq!(
        index.records()[0].value("owner"),
        Some(&FieldValue::Reference("owner".into()))
    );
}

#[test]
fn decorators_before_export_keyword() {
    let index = extract(
        "a.ts",
        "@Stakeholder({ name: 'Ops' })\nexport class Ops {}\n@Metric({ name: 'M', unit: 'ms' })\nexport default class Latency {}",
    );
    assert_eq!(index.records().len(), 2);
    assert_eq!(index.local_export("Ops"), Some("Ops"));
    assert_eq!(index.local_export("default"), Some("Latency"));
    assert_eq!(index.local_export("Latency"), None);
}

#[test]
fn spans_point_at_source() {
    let text = "@Persona({ name: 'A' }) class A {}";
    let index = extract("a.ts", text);
    let record = &index.records()[0];
    assert_eq!(&text[record.span().range.start..record.span().range.end], "@Persona({ name: 'A' })");

    let name = record.field("name").unwrap();
    assert_eq!(&text[name.span.range.start..name.span.range.end], "name: 'A'");
    assert_eq!(&text[name.value.span.range.start..name.value.span.range.end], "'A'");
    assert_eq!(record.span().start.line, 1);
}

#[test]
fn import_and_export_bindings() {
    let index = extract(
        "src/index.ts",
        r"
        import Default from './default';
        import * as all from './all';
        import { A, B as Bee } from './ab';
        export { A as Alpha };
        export { C, D as Dee } from './cd';
        export * from './rest';
        export * as ns from './ns';
        ",
    );

    assert_eq!(
        index.import("Default"),
        Some(&ImportBinding::Default {
            specifier: "./default".into()
        })
    );
    assert_eq!(
        index.import("all"),
        Some(&ImportBinding::Namespace {
            specifier: "./all".into()
        })
    );
    assert_eq!(
        index.import("Bee"),
        Some(&ImportBinding::Named {
            imported: "B".into(),
            specifier: "./ab".into()
        })
    );
    assert_eq!(index.local_export("Alpha"), Some("A"));
    assert_eq!(
        index.re_exports(),
        &[
            ReExport::Named {
                exported: "C".into(),
                imported: "C".into(),
                specifier: "./cd".into()
            },
            ReExport::Named {
                exported: "Dee".into(),
                imported: "D".into(),
                specifier: "./cd".into()
            },
            ReExport::All {
                specifier: "./rest".into()
            },
            ReExport::Namespace {
                exported: "ns".into(),
                specifier: "./ns".into()
            },
        ]
    );
}

#[test]
fn nested_classes_are_not_module_scope() {
    let index = extract(
        "a.ts",
        "function make() {\n  @Persona({ name: 'Inner' }) class Inner {}\n  return Inner;\n}",
    );
    assert_eq!(index.records().len(), 1);
    assert!(index.class("Inner").is_none());
}

fn non_object_argument() -> impl Strategy<Value = String> {
    prop_oneof![
        "id_[a-z]{1,6}",
        "-?[1-9][0-9]{0,5}",
        "'[a-z ]{0,10}'",
        prop::collection::vec(0..100u32, 0..4).prop_map(|items| {
            let items: Vec<String> = items.iter().map(u32::to_string).collect();
            format!("[{}]", items.join(", "))
        }),
        Just("true".to_string()),
        Just("null".to_string()),
        Just("() => 1".to_string()),
    ]
}

proptest! {
    #[test]
    fn any_non_object_argument_is_one_malformed_record(arg in non_object_argument()) {
        let text = format!("@Strategy({arg})\nclass S {{}}");
        let index = extract("s.ts", &text);
        prop_assert_eq!(index.records().len(), 1);
        prop_assert!(index.records()[0].is_malformed());
    }

    #[test]
    fn garbage_never_panics(body in "[ -~]{0,60}") {
        let text = format!("@Persona({body}) class P {{}}");
        let index = extract("p.ts", &text);
        prop_assert_eq!(index.file().as_str(), "p.ts");
    }
}
