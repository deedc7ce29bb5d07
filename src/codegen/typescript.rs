//! TypeScript bindings for HTML fragments

use super::html::OUTLET_ATTRIBUTE;
use super::{banner, binding_name};
use crate::translator::Translation;
use crate::value::pascal_case;

const INDENT: &str = "  ";

pub fn write(translation: &Translation) -> String {
    let interface = binding_name(&translation.name);

    let mut out = banner(translation);
    out.push('\n');
    out.push_str(&format!("export interface {interface} {{\n"));
    out.push_str(&format!("{INDENT}_root: HTMLElement;\n"));
    for outlet in &translation.outlets {
        let optional = if outlet.optional { "?" } else { "" };
        out.push_str(&format!("{INDENT}{}{}: {};\n", outlet.name, optional, outlet.type_name));
    }
    out.push_str("}\n\n");

    out.push_str(&format!(
        "export function bind{}(root: HTMLElement): {interface} {{\n",
        pascal_case(&translation.name)
    ));
    out.push_str(&format!("{INDENT}return {{\n"));
    out.push_str(&format!("{INDENT}{INDENT}_root: root,\n"));
    for outlet in &translation.outlets {
        let query = format!("root.querySelector('[{OUTLET_ATTRIBUTE}=\"{}\"]')", outlet.name);
        let lookup = if outlet.optional {
            format!("({query} as {} | null) ?? undefined", outlet.type_name)
        } else {
            format!("{query} as {}", outlet.type_name)
        };
        out.push_str(&format!("{INDENT}{INDENT}{}: {},\n", outlet.name, lookup));
    }
    out.push_str(&format!("{INDENT}}};\n}}\n"));
    out
}
