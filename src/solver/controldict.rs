//! Force function-object repair and re-evaluation.
//!
//! Cases solved with `p_rgh` need the forces function object told which
//! pressure and velocity fields to use before `postProcess` can regenerate
//! `force.dat`.

use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

use super::error::SolverError;
use super::pipeline::ContainerPipeline;
use super::runner::CommandRunner;

//─────────────────────────────────────────────────────────────────────────────

const FIELD_NAMES: &str = "pName p_rgh;\n        UName U;\n        ";

/// Inserts `pName`/`UName` entries ahead of the forces block's `rhoInf`.
///
/// Returns `None` when nothing needs changing: `pName` is already present or
/// the dictionary has no forces block.
pub fn patch_force_fields(content: &str) -> Option<String> {
    if content.contains("pName") || !content.contains("rhoInf") {
        return None;
    }
    Some(content.replacen("rhoInf", &format!("{FIELD_NAMES}rhoInf"), 1))
}

/// Patches `<case_dir>/system/controlDict` in place. Returns whether the file changed.
pub fn patch_control_dict(case_dir: &Path) -> Result<bool, SolverError> {
    let path = case_dir.join("system").join("controlDict");
    let io_err = |e| SolverError::Io {
        path: path.display().to_string(),
        source: e,
    };
    let content = fs::read_to_string(&path).map_err(io_err)?;
    match patch_force_fields(&content) {
        Some(patched) => {
            fs::write(&path, patched).map_err(io_err)?;
            info!("Patched {}", path.display());
            Ok(true)
        }
        None => {
            info!("Skipping patch for {} (pName present or no forces block)", case_dir.display());
            Ok(false)
        }
    }
}

/// Regenerates force output for each case; returns the number of failures.
///
/// A failing case is logged and the remaining cases still run.
pub fn postprocess_cases(
    pipeline: &ContainerPipeline,
    runner: &dyn CommandRunner,
    cases: &[impl AsRef<Path>],
    time: f64,
) -> usize {
    let mut failures = 0;
    for case in cases {
        let case_dir = case.as_ref();
        info!("Processing {}...", case_dir.display());

        if let Err(e) = patch_control_dict(case_dir) {
            warn!("Error patching {}: {}", case_dir.display(), e);
        }

        // A standalone forces dictionary would shadow the controlDict entry.
        let stray = case_dir.join("system").join("forces");
        if stray.is_file() {
            if let Err(e) = fs::remove_file(&stray) {
                warn!("Could not remove {}: {}", stray.display(), e);
            }
        }

        if let Err(e) = pipeline.postprocess_case(runner, case_dir, time) {
            error!("Post-processing failed for {}: {}", case_dir.display(), e);
            failures += 1;
        }
    }
    failures
}

#[cfg(test)]
mod tests {
    use super::super::runner::mock::RecordingRunner;
    use super::*;
    use crate::config::ProjectConfig;

    const CONTROL_DICT: &str = "\
functions
{
    forces
    {
        type            forces;
        patches         (hull);
        rhoInf          998.8;
        CofR            (0 0 0);
    }
}
";

    #[test]
    fn test_patch_inserts_field_names() {
        let patched = patch_force_fields(CONTROL_DICT).unwrap();
        assert!(patched.contains("pName p_rgh;\n        UName U;\n        rhoInf          998.8;"));
        assert_eq!(patched.matches("rhoInf").count(), 1);
    }

    #[test]
    fn test_patch_is_idempotent() {
        let once = patch_force_fields(CONTROL_DICT).unwrap();
        assert!(patch_force_fields(&once).is_none());
        assert!(patch_force_fields("application interFoam;").is_none());
    }

    #[test]
    fn test_postprocess_continues_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("dtc_esi_fr180");
        let second = dir.path().join("dtc_esi_fr200");
        for case in [&first, &second] {
            fs::create_dir_all(case.join("system")).unwrap();
            fs::write(case.join("system/controlDict"), CONTROL_DICT).unwrap();
            fs::write(case.join("system/forces"), "stale").unwrap();
        }
        let missing = dir.path().join("dtc_esi_fr220");

        let pipeline = ContainerPipeline::from_config(&ProjectConfig::default());
        let runner = RecordingRunner::with_exit_codes(&[2, 0]);
        let failures = postprocess_cases(&pipeline, &runner, &[&first, &missing, &second], 35.0);

        // first fails in the container, missing never reaches it
        assert_eq!(failures, 2);
        assert_eq!(runner.recorded().len(), 2);
        assert!(!first.join("system/forces").exists());
        let patched = fs::read_to_string(second.join("system/controlDict")).unwrap();
        assert!(patched.contains("pName p_rgh;"));
    }
}
