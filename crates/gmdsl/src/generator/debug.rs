//! The built-in `debug` generator.
//!
//! Writes one text file listing the namespaces that were loaded and every
//! declaration by kind, qualified by namespace and sorted by name. Useful
//! for checking what an import graph actually pulls in.
//!
//! Options:
//!
//! | Key | Type | Default |
//! |---|---|---|
//! | `output` | string | `debug.txt` |
//! | `show_properties` | bool | `true` |

use std::fmt::Write as _;

use gmdsl_core::model::{AnnotationUsage, Declaration, DeclarationKind, PropertyDecl};
use gmdsl_parser::validate::ValidatedModel;

use super::{Artifact, GenerateError, Generator, GeneratorOptions};

/// Registry name of the generator.
pub const NAME: &str = "debug";

const DEFAULT_OUTPUT: &str = "debug.txt";

/// Deterministic text dump of a validated model.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugGenerator;

impl Generator for DebugGenerator {
    fn description(&self) -> &str {
        "Plain-text dump of namespaces and declarations"
    }

    fn generate(
        &self,
        model: &ValidatedModel,
        options: &GeneratorOptions,
    ) -> Result<Vec<Artifact>, GenerateError> {
        let output = options.get_str("output")?.unwrap_or(DEFAULT_OUTPUT);
        let show_properties = options.get_bool("show_properties")?.unwrap_or(true);

        let content = render(model, show_properties)
            .map_err(|err| GenerateError::Failed(format!("failed to format dump: {err}")))?;
        Ok(vec![Artifact::new(output, content)?])
    }
}

fn render(model: &ValidatedModel, show_properties: bool) -> Result<String, std::fmt::Error> {
    let mut out = String::new();

    writeln!(out, "namespaces:")?;
    for (_, entry) in model.model().namespaces() {
        match entry.name() {
            Some(name) => writeln!(out, "  {name}")?,
            None => writeln!(out, "  <root>")?,
        }
    }

    let sections = [
        (DeclarationKind::Type, "types"),
        (DeclarationKind::Node, "nodes"),
        (DeclarationKind::Edge, "edges"),
        (DeclarationKind::Annotation, "annotations"),
    ];

    for (kind, title) in sections {
        let mut entries: Vec<(String, &Declaration)> = model
            .declarations()
            .filter(|(_, declaration)| declaration.kind() == kind)
            .filter_map(|(reference, declaration)| {
                Some((model.qualified_name(reference)?, declaration))
            })
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        writeln!(out, "{title}:")?;
        for (name, declaration) in entries {
            write!(out, "  {name}")?;
            write_signature(&mut out, declaration)?;
            write_usages(&mut out, declaration.annotations())?;
            writeln!(out)?;

            if show_properties {
                write_properties(&mut out, declaration.properties())?;
            }
        }
    }

    Ok(out)
}

fn write_signature(out: &mut String, declaration: &Declaration) -> std::fmt::Result {
    match declaration {
        Declaration::Type(decl) if decl.is_primitive() => write!(out, " (primitive)"),
        Declaration::Edge(edge) => write!(
            out,
            " ({} {} {})",
            edge.source(),
            edge.direction(),
            edge.target()
        ),
        Declaration::Annotation(annotation) => {
            let parameters: Vec<String> = annotation
                .parameters()
                .iter()
                .map(|param| format!("{}: {}", param.name(), param.type_name()))
                .collect();
            write!(out, "({})", parameters.join(", "))
        }
        Declaration::Type(_) | Declaration::Node(_) => Ok(()),
    }
}

fn write_usages(out: &mut String, usages: &[AnnotationUsage]) -> std::fmt::Result {
    for usage in usages {
        write!(out, " @{}", usage.name())?;
        if !usage.arguments().is_empty() {
            let arguments: Vec<String> =
                usage.arguments().iter().map(ToString::to_string).collect();
            write!(out, "({})", arguments.join(", "))?;
        }
    }
    Ok(())
}

fn write_properties(out: &mut String, properties: &[PropertyDecl]) -> std::fmt::Result {
    for property in properties {
        write!(out, "    {}: {}", property.name(), property.type_ref())?;
        write_usages(out, property.annotations())?;
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use gmdsl_parser::{
        parse,
        resolve::{MemoryLoader, resolve},
        validate::ValidationPolicy,
    };

    use super::*;

    fn model(source: &str) -> ValidatedModel {
        let mut loader = MemoryLoader::new();
        loader.insert(
            "gm.core".parse().unwrap(),
            "namespace gm.core\ntype String\ntype Float",
        );
        let resolved = resolve(parse(source).unwrap(), &mut loader).unwrap();
        ValidatedModel::new(resolved, &ValidationPolicy::default()).unwrap()
    }

    const SOURCE: &str = r#"
        namespace geo
        import gm.core
        annotation Label(text: String)
        node Place { @Label("where") at: Point name: String }
        type Point { x: Float y: Float }
        edge Near(Place <-> Place)
    "#;

    #[test]
    fn test_dump() {
        let artifacts = DebugGenerator
            .generate(&model(SOURCE), &GeneratorOptions::default())
            .unwrap();

        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].path().to_str(), Some("debug.txt"));
        assert_eq!(
            artifacts[0].content(),
            "\
namespaces:
  geo
  gm.core
types:
  geo.Point
    x: Float
    y: Float
  gm.core.Float (primitive)
  gm.core.String (primitive)
nodes:
  geo.Place
    at: Point @Label(\"where\")
    name: String
edges:
  geo.Near (Place <-> Place)
annotations:
  geo.Label(text: String)
"
        );
    }

    #[test]
    fn test_options() {
        let options: toml::Table =
            toml::from_str("output = \"dump/model.txt\"\nshow_properties = false").unwrap();
        let artifacts = DebugGenerator
            .generate(&model(SOURCE), &GeneratorOptions::new(options))
            .unwrap();

        assert_eq!(artifacts[0].path().to_str(), Some("dump/model.txt"));
        assert!(!artifacts[0].content().contains("x: Float"));
    }

    #[test]
    fn test_bad_option_type() {
        let options: toml::Table = toml::from_str("show_properties = \"yes\"").unwrap();
        let err = DebugGenerator
            .generate(&model(SOURCE), &GeneratorOptions::new(options))
            .unwrap_err();

        assert!(matches!(err, GenerateError::InvalidOption { key, .. } if key == "show_properties"));
    }
}
