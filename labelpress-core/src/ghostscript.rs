//! Ghostscript discovery and invocation arguments
//!
//! Discovery walks an ordered candidate list lazily and short-circuits on
//! the first existing executable: explicit override, then well-known install
//! locations, then the `PATH` search path. Tests inject their own list.

use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::inspect::PageGeometry;

#[derive(Debug, Error)]
#[error("ghostscript executable not found")]
pub struct ToolNotFound;

#[cfg(windows)]
const WELL_KNOWN: &[&str] = &[
    r"C:\Program Files\gs\gs10.04.0\bin\gswin64c.exe",
    r"C:\Program Files (x86)\gs\gs10.04.0\bin\gswin32c.exe",
    r"C:\Program Files\gs\gs10.03.1\bin\gswin64c.exe",
    r"C:\Program Files (x86)\gs\gs10.03.1\bin\gswin32c.exe",
];
#[cfg(not(windows))]
const WELL_KNOWN: &[&str] = &["/usr/bin/gs", "/usr/local/bin/gs"];

#[cfg(windows)]
const PATH_NAMES: &[&str] = &["gswin64c.exe", "gswin32c.exe"];
#[cfg(not(windows))]
const PATH_NAMES: &[&str] = &["gs"];

/// First existing candidate wins; later candidates are never touched.
pub fn first_existing<I>(candidates: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    candidates.into_iter().find(|path| path.is_file())
}

fn path_candidates() -> Vec<PathBuf> {
    let Some(raw) = env::var_os("PATH") else {
        return Vec::new();
    };
    env::split_paths(&raw)
        .flat_map(|dir| PATH_NAMES.iter().map(move |name| dir.join(name)))
        .collect()
}

/// Locate the rasterizer executable.
pub fn locate(override_path: Option<&Path>) -> Result<PathBuf, ToolNotFound> {
    let candidates = override_path
        .map(Path::to_path_buf)
        .into_iter()
        .chain(WELL_KNOWN.iter().map(PathBuf::from))
        .chain(path_candidates());
    first_existing(candidates).ok_or(ToolNotFound)
}

// Registration tuning carried over from the production printers: content
// shifted +2.8 mm / -1 mm and scaled to 98.2%.
const PAGE_OFFSET_X_MM: f64 = 2.8;
const PAGE_OFFSET_Y_MM: f64 = -1.0;
const PAGE_SCALE: f64 = 0.982;
const POINTS_PER_MM: f64 = 72.0 / 25.4;

/// Argument vector for one silent submission of `document` to `printer`.
///
/// Targets the printer device directly (`%printer%<name>`), bypassing any
/// preview or spooler dialog. Always one copy per invocation; callers loop
/// for multi-copy jobs.
pub fn raster_args(printer: &str, geometry: &PageGeometry, document: &Path) -> Vec<String> {
    let orient = if geometry.is_landscape { "1" } else { "0" };
    let offset_x = PAGE_OFFSET_X_MM * POINTS_PER_MM;
    let offset_y = PAGE_OFFSET_Y_MM * POINTS_PER_MM;

    vec![
        "-dNOPAUSE".to_string(),
        "-dBATCH".to_string(),
        "-dSAFER".to_string(),
        "-sDEVICE=mswinpr2".to_string(),
        format!("-sOutputFile=%printer%{printer}"),
        "-dNumCopies=1".to_string(),
        format!("-dDEVICEWIDTHPOINTS={:.2}", geometry.width_points()),
        format!("-dDEVICEHEIGHTPOINTS={:.2}", geometry.height_points()),
        format!("-dORIENT1={orient}"),
        "-c".to_string(),
        "<< /Policies << /PageSize 3 >> >> setpagedevice".to_string(),
        format!(
            "<< /PageOffset [{offset_x:.3} {offset_y:.3}] /BeginPage {{ {PAGE_SCALE} dup scale }} >> setpagedevice"
        ),
        "-f".to_string(),
        document.display().to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn first_existing_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        let hit = dir.path().join("gs-a");
        let later = dir.path().join("gs-b");
        fs::write(&hit, b"").unwrap();
        fs::write(&later, b"").unwrap();

        let found = first_existing(vec![
            dir.path().join("missing"),
            hit.clone(),
            later,
        ]);
        assert_eq!(found, Some(hit));
    }

    #[test]
    fn first_existing_empty_when_nothing_matches() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(first_existing(vec![dir.path().join("missing")]), None);
    }

    #[test]
    fn raster_args_target_the_device_silently() {
        let geometry = PageGeometry::from_points(204.0, 102.0);
        let args = raster_args("LabelPrinter1", &geometry, Path::new("/tmp/ABC123.pdf"));

        assert!(args.contains(&"-dNOPAUSE".to_string()));
        assert!(args.contains(&"-dBATCH".to_string()));
        assert!(args.contains(&"-sOutputFile=%printer%LabelPrinter1".to_string()));
        assert!(args.contains(&"-dNumCopies=1".to_string()));
        assert!(args.contains(&"-dORIENT1=1".to_string()));
        assert_eq!(args.last().unwrap(), "/tmp/ABC123.pdf");
    }

    #[test]
    fn raster_args_portrait_orientation() {
        let geometry = PageGeometry::from_points(102.0, 204.0);
        let args = raster_args("P", &geometry, Path::new("doc.pdf"));
        assert!(args.contains(&"-dORIENT1=0".to_string()));
    }
}
