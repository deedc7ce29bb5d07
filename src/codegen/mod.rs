//! Output writers
//!
//! Each target turns a [`Translation`] into a document plus binding code:
//! Interface Builder XML and Swift for iOS, an HTML fragment and TypeScript
//! for the web. The project-wide CSS stylesheet is written separately by
//! [`css::write`].

pub mod css;
pub mod html;
pub mod swift;
pub mod typescript;
pub mod xib;

use crate::error::{Result, TranslateError};
use crate::resources::ResourceTable;
use crate::translator::Translation;
use crate::value::pascal_case;
use crate::Target;
use std::io::Cursor;

/// One file produced for a layout, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: String,
    pub contents: String,
}

/// `activity_main` → `ActivityMainBinding`.
pub fn binding_name(layout: &str) -> String {
    format!("{}Binding", pascal_case(layout))
}

pub fn generate(target: Target, translation: &Translation, resources: &ResourceTable) -> Result<Vec<GeneratedFile>> {
    let stem = pascal_case(&translation.name);
    let binding = binding_name(&translation.name);
    log::debug!("Generating {} output for {}", target.name(), translation.file);

    Ok(match target {
        Target::Ios => vec![
            GeneratedFile {
                path: format!("{stem}.xib"),
                contents: xib::write(translation, resources)?,
            },
            GeneratedFile {
                path: format!("{binding}.swift"),
                contents: swift::write(translation),
            },
        ],
        Target::Web => vec![
            GeneratedFile {
                path: format!("{}.html", translation.name),
                contents: html::write(translation)?,
            },
            GeneratedFile {
                path: format!("{binding}.ts"),
                contents: typescript::write(translation),
            },
        ],
    })
}

pub(crate) fn xml_error(error: impl std::fmt::Display) -> TranslateError {
    TranslateError::codegen(format!("XML writer error: {error}"))
}

pub(crate) fn into_string(buffer: Cursor<Vec<u8>>) -> Result<String> {
    String::from_utf8(buffer.into_inner()).map_err(|e| TranslateError::codegen(e.to_string()))
}

/// Header comment naming the layout file a generated source came from.
pub(crate) fn banner(translation: &Translation) -> String {
    format!(
        "// Generated by {} {} from {}. Do not edit.\n",
        crate::NAME,
        crate::VERSION,
        translation.file
    )
}
