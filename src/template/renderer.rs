//! Builds a solver input deck from a case document.
//!
//! The deck starts as a copy of the version-specific base tree, is overlaid
//! with the case directory's own dictionaries and geometry, and every `.j2`
//! file in it is then rendered with the case's `flags`, `parameters` and
//! `meta` tables.

use minijinja::{context, path_loader, Environment};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::error::TemplateError;
use crate::config::CaseConfig;
use crate::tree;

//─────────────────────────────────────────────────────────────────────────────

/// Extension of template files inside a case tree.
pub const TEMPLATE_EXTENSION: &str = "j2";

/// Top-level directories of a solver case.
pub const CASE_SUBDIRS: [&str; 3] = ["system", "constant", "0"];

/// File suffixes treated as hull geometry next to a case document.
const GEOMETRY_SUFFIXES: [&str; 3] = [".stl", ".stl.gz", ".eMesh"];

/// Result of a successful case preparation.
#[derive(Debug, Clone)]
pub struct PreparedCase {
    pub name: String,
    pub output_dir: PathBuf,
    /// Files produced from templates, in rendering order.
    pub rendered: Vec<PathBuf>,
}

/// Prepares a case directory from `config_path` into `output_dir`.
///
/// # Arguments
/// * `config_path` - The case document (`case.toml`).
/// * `output_dir` - Destination; removed and recreated if it exists.
/// * `base_config_dir` - Directory holding one base tree per solver version.
///
/// # Errors
/// Returns `TemplateError::Config` if the document cannot be parsed (fatal),
/// `TemplateError::BaseNotFound` if the solver version has no base tree, and
/// `Io`/`Render` errors for failures while building the deck.
pub fn prepare_case(
    config_path: &Path,
    output_dir: &Path,
    base_config_dir: &Path,
) -> Result<PreparedCase, TemplateError> {
    let config = CaseConfig::load(config_path)?;
    let version = config.solver_version();
    info!(
        "Preparing case '{}' for OpenFOAM {}",
        config.name(),
        version
    );

    let base_root = base_config_dir.join(version);
    if !base_root.is_dir() {
        return Err(TemplateError::BaseNotFound {
            version: version.to_string(),
            path: base_root.display().to_string(),
        });
    }

    tree::recreate_dir(output_dir).map_err(|e| TemplateError::io(output_dir, e))?;

    // Base tree first, then the case directory's overrides.
    copy_case_subdirs(&base_root, output_dir)?;
    let case_dir = case_source_dir(config_path);
    copy_case_subdirs(case_dir, output_dir)?;
    copy_geometry(case_dir, output_dir)?;

    let rendered = render_tree(output_dir, &config)?;
    info!("Case preparation complete: {}", output_dir.display());

    Ok(PreparedCase {
        name: config.name().to_string(),
        output_dir: output_dir.to_path_buf(),
        rendered,
    })
}

/// Directory holding the case document; a bare file name means the current directory.
fn case_source_dir(config_path: &Path) -> &Path {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn copy_case_subdirs(from: &Path, output_dir: &Path) -> Result<(), TemplateError> {
    for folder in CASE_SUBDIRS {
        let src = from.join(folder);
        if src.is_dir() {
            let copied = tree::copy_dir_recursive(&src, &output_dir.join(folder))
                .map_err(|e| TemplateError::io(&src, e))?;
            debug!("Copied {} file(s) from {}", copied, src.display());
        }
    }
    Ok(())
}

/// Places geometry files found next to the case document in `constant/triSurface`.
fn copy_geometry(case_dir: &Path, output_dir: &Path) -> Result<(), TemplateError> {
    let entries = fs::read_dir(case_dir).map_err(|e| TemplateError::io(case_dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| TemplateError::io(case_dir, e))?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !path.is_file() || !GEOMETRY_SUFFIXES.iter().any(|s| name.ends_with(s)) {
            continue;
        }
        let target_dir = output_dir.join("constant").join("triSurface");
        fs::create_dir_all(&target_dir).map_err(|e| TemplateError::io(&target_dir, e))?;
        let target = target_dir.join(name);
        fs::copy(&path, &target).map_err(|e| TemplateError::io(&path, e))?;
        debug!("Copied geometry {}", target.display());
    }
    Ok(())
}

/// Renders every `.j2` file below `root` in place and removes the template.
///
/// Each template sees `flags`, `parameters` and `meta`, and may `include`
/// files from its own directory.
pub fn render_tree(root: &Path, config: &CaseConfig) -> Result<Vec<PathBuf>, TemplateError> {
    let templates =
        tree::files_with_extension(root, TEMPLATE_EXTENSION).map_err(|e| TemplateError::io(root, e))?;

    let mut rendered = Vec::with_capacity(templates.len());
    for template_path in templates {
        let target_path = template_path.with_extension("");
        let content = render_file(&template_path, config)?;
        fs::write(&target_path, content).map_err(|e| TemplateError::io(&target_path, e))?;
        fs::remove_file(&template_path).map_err(|e| TemplateError::io(&template_path, e))?;

        info!(
            "Rendered template: {}",
            target_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        );
        rendered.push(target_path);
    }
    Ok(rendered)
}

fn render_file(template_path: &Path, config: &CaseConfig) -> Result<String, TemplateError> {
    let render_err = |source| TemplateError::Render {
        path: template_path.display().to_string(),
        source,
    };
    let (Some(folder), Some(name)) = (
        template_path.parent(),
        template_path.file_name().and_then(|n| n.to_str()),
    ) else {
        return Err(TemplateError::io(
            template_path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a template file path"),
        ));
    };

    let mut env = Environment::new();
    env.set_loader(path_loader(folder));
    let template = env.get_template(name).map_err(render_err)?;
    template
        .render(context! {
            flags => &config.flags,
            parameters => &config.parameters,
            meta => &config.meta,
        })
        .map_err(render_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn project() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("config/base");
        write(
            &base.join("of13/system/controlDict.j2"),
            "endTime {{ parameters.endTime }};\n{% if flags.free_surface %}application interFoam;{% else %}application simpleFoam;{% endif %}\n",
        );
        write(&base.join("of13/system/fvSchemes"), "ddtSchemes {}\n");
        write(
            &base.join("of13/0/U.j2"),
            "{% include \"common\" %}\ninternalField uniform ({{ parameters.velocity }} 0 0);\n",
        );
        write(&base.join("of13/0/common"), "// {{ meta.name }}");

        let case_dir = dir.path().join("cases/dtc");
        write(
            &case_dir.join("case.toml"),
            "[meta]\nname = \"dtc\"\n[flags]\nfree_surface = true\n[parameters]\nvelocity = 1.5\nendTime = 20.0\n",
        );
        (dir, base, case_dir)
    }

    #[test]
    fn test_prepare_renders_templates() {
        let (dir, base, case_dir) = project();
        let output = dir.path().join("build/dtc");

        let prepared = prepare_case(&case_dir.join("case.toml"), &output, &base).unwrap();
        assert_eq!(prepared.name, "dtc");
        assert_eq!(prepared.rendered.len(), 2);

        let control = fs::read_to_string(output.join("system/controlDict")).unwrap();
        assert!(control.contains("endTime 20.0;"));
        assert!(control.contains("application interFoam;"));
        assert!(!output.join("system/controlDict.j2").exists());
        assert!(output.join("system/fvSchemes").is_file());

        let u = fs::read_to_string(output.join("0/U")).unwrap();
        assert!(u.contains("// dtc"));
        assert!(u.contains("internalField uniform (1.5 0 0);"));
    }

    #[test]
    fn test_prepare_overlays_case_files_and_geometry() {
        let (dir, base, case_dir) = project();
        write(&case_dir.join("system/fvSchemes"), "overridden\n");
        write(&case_dir.join("constant/polyMesh/points"), "()\n");
        write(&case_dir.join("dtc.stl.gz"), "geometry");
        let output = dir.path().join("build/dtc");

        prepare_case(&case_dir.join("case.toml"), &output, &base).unwrap();
        assert_eq!(
            fs::read_to_string(output.join("system/fvSchemes")).unwrap(),
            "overridden\n"
        );
        assert!(output.join("constant/polyMesh/points").is_file());
        assert!(output.join("constant/triSurface/dtc.stl.gz").is_file());
    }

    #[test]
    fn test_case_source_dir_of_bare_file_name() {
        assert_eq!(case_source_dir(Path::new("case.toml")), Path::new("."));
        assert_eq!(
            case_source_dir(Path::new("cases/dtc/case.toml")),
            Path::new("cases/dtc")
        );
        assert_eq!(case_source_dir(Path::new("/case.toml")), Path::new("/"));
    }

    #[test]
    fn test_prepare_cleans_existing_output() {
        let (dir, base, case_dir) = project();
        let output = dir.path().join("build/dtc");
        write(&output.join("stale"), "old");
        prepare_case(&case_dir.join("case.toml"), &output, &base).unwrap();
        assert!(!output.join("stale").exists());
    }

    #[test]
    fn test_missing_base_version() {
        let (dir, base, case_dir) = project();
        write(&case_dir.join("case.toml"), "[meta]\nversion = \"of99\"\n");
        let result = prepare_case(&case_dir.join("case.toml"), &dir.path().join("out"), &base);
        assert!(matches!(result, Err(TemplateError::BaseNotFound { version, .. }) if version == "of99"));
    }

    #[test]
    fn test_invalid_case_document_is_fatal() {
        let (dir, base, case_dir) = project();
        write(&case_dir.join("case.toml"), "[parameters\n");
        let result = prepare_case(&case_dir.join("case.toml"), &dir.path().join("out"), &base);
        assert!(matches!(result, Err(TemplateError::Config(_))));
    }
}
