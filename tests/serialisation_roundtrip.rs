//! Invariant 7 (spec.md §8): `Module -> serialise -> deserialise -> Module`
//! yields a value equal to the original on every declared field.

use std::fs;

use layergraph::l1_module::extract_module;
use layergraph::parsing::{Language, Parser, TreeSitterParser};
use tempfile::tempdir;

#[test]
fn module_round_trips_through_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("widgets.ts");
    fs::write(
        &path,
        r#"
        import { helper } from './util';

        export interface Widget {
          id: string;
          render(): void;
        }

        export class Button implements Widget {
          id: string;
          private visible = true;
          constructor(id: string) { this.id = id; }
          render(): void { helper(); }
        }

        export async function* stream(): AsyncGenerator<number> {
          yield 1;
        }
        "#,
    )
    .unwrap();

    let parser = TreeSitterParser::new();
    let source = fs::read_to_string(&path).unwrap();
    let tree = parser.parse(&source, Language::TypeScript).unwrap();
    let module = extract_module(&tree, "widgets");

    let json = serde_json::to_string(&module).unwrap();
    let restored: layergraph::l1_module::Module = serde_json::from_str(&json).unwrap();

    assert_eq!(module, restored);
}
