//! Swift binding classes for Interface Builder documents

use super::{banner, binding_name};
use crate::translator::Translation;
use crate::value::pascal_case;

const INDENT: &str = "    ";

pub fn write(translation: &Translation) -> String {
    let class = binding_name(&translation.name);
    let nib = pascal_case(&translation.name);

    let mut out = banner(translation);
    out.push_str("\nimport UIKit\n\n");
    out.push_str(&format!("final class {class}: NSObject {{\n"));
    out.push_str(&format!("{INDENT}static let nibName = \"{nib}\"\n"));

    if !translation.outlets.is_empty() {
        out.push('\n');
    }
    for outlet in &translation.outlets {
        // Outlets missing from some variant stay nil when that variant loads.
        let marker = if outlet.optional { '?' } else { '!' };
        out.push_str(&format!(
            "{INDENT}@IBOutlet var {}: {}{}\n",
            outlet.name, outlet.type_name, marker
        ));
    }

    out.push('\n');
    out.push_str(&format!(
        "{INDENT}@discardableResult\n{INDENT}static func load(into owner: {class} = {class}(), bundle: Bundle? = nil) -> {class} {{\n"
    ));
    out.push_str(&format!(
        "{INDENT}{INDENT}UINib(nibName: nibName, bundle: bundle).instantiate(withOwner: owner, options: nil)\n"
    ));
    out.push_str(&format!("{INDENT}{INDENT}return owner\n{INDENT}}}\n"));
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dest::DestTree;
    use crate::translator::Outlet;
    use std::collections::BTreeSet;

    fn outlet(name: &str, type_name: &str, optional: bool) -> Outlet {
        Outlet {
            name: name.to_string(),
            type_name: type_name.to_string(),
            node: None,
            optional,
        }
    }

    #[test]
    fn test_binding_class() {
        let translation = Translation {
            name: "activity_main".to_string(),
            file: "layout/activity_main.xml".to_string(),
            tree: DestTree::new("layout/activity_main.xml"),
            outlets: vec![outlet("title", "UILabel", false), outlet("sidebar", "UIView", true)],
            used_resources: BTreeSet::new(),
            element_count: 0,
            wrapper_count: 0,
            synthetic_count: 0,
        };
        let swift = write(&translation);

        assert!(swift.starts_with("// Generated by droidc"));
        assert!(swift.contains("final class ActivityMainBinding: NSObject {"));
        assert!(swift.contains("static let nibName = \"ActivityMain\""));
        assert!(swift.contains("@IBOutlet var title: UILabel!"));
        assert!(swift.contains("@IBOutlet var sidebar: UIView?"));
    }
}
