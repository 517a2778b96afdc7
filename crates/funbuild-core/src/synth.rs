//! Wrapper synthesis: render an extracted unit through a dialect template.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{error, info};

use crate::error::{BuildError, Result};
use crate::template::Template;
use crate::unit::ExtractedUnit;

/// Render `unit` through `template` and write the result to `path`.
///
/// The template is rendered before the file is opened, so a template error
/// leaves the output path untouched. An existing file is overwritten from the
/// start but not truncated: bytes past the rendered length are left in place.
pub fn generate(path: &Path, template: &Template, unit: &ExtractedUnit) -> Result<()> {
    let rendered = template.render(unit).map_err(|e| {
        error!("Failed to render template {}: {}", template.name(), e);
        BuildError::Template(e)
    })?;

    write_rendered(path, &rendered).map_err(|e| {
        error!("Failed to generate {}: {}", path.display(), e);
        BuildError::write(path, e)
    })?;

    info!(path = %path.display(), "generate debugtalk success");
    Ok(())
}

fn write_rendered(path: &Path, rendered: &str) -> std::io::Result<()> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(rendered.as_bytes())?;
    writer.flush()
}
