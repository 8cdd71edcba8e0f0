//! Function packaging
//!
//! Function sources are templates with one placeholder line. Packaging swaps
//! the placeholder for the runtime value and zips the result as `handler.py`.

use crate::error::{CloudError, Result};
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Embedded login function source
pub const LOGIN_TEMPLATE: &str = include_str!("../functions/login.py");

/// Embedded start-session function source
pub const START_SESSION_TEMPLATE: &str = include_str!("../functions/start_session.py");

/// Entry file name inside the package
pub const HANDLER_FILE: &str = "handler.py";

/// Handler the runtime invokes
pub const HANDLER_ENTRY: &str = "handler.lambda_handler";

/// A single literal replacement applied to a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub placeholder: String,
    pub replacement: String,
}

impl Substitution {
    /// Login client id: `USER_POOL_APP_CLIENT_ID = ''`
    pub fn client_id(client_id: &str) -> Self {
        Self {
            placeholder: "USER_POOL_APP_CLIENT_ID = ''".to_string(),
            replacement: format!("USER_POOL_APP_CLIENT_ID = \"{}\"", client_id),
        }
    }

    /// Fleet id: `GAMELIFT_FLEET_ID = ""`
    pub fn fleet_id(fleet_id: &str) -> Self {
        Self {
            placeholder: "GAMELIFT_FLEET_ID = \"\"".to_string(),
            replacement: format!("GAMELIFT_FLEET_ID = \"{}\"", fleet_id),
        }
    }
}

/// Apply `substitution` to `template`.
///
/// A template without the placeholder is rejected; deploying it would give
/// a function that cannot reach its dependency.
pub fn render(template: &str, substitution: &Substitution) -> Result<String> {
    if !template.contains(&substitution.placeholder) {
        return Err(CloudError::Packaging(format!(
            "template does not contain placeholder `{}`",
            substitution.placeholder
        )));
    }
    Ok(template.replace(&substitution.placeholder, &substitution.replacement))
}

/// Render `template` and zip it as a deployable package.
pub fn package(template: &str, substitution: &Substitution) -> Result<Vec<u8>> {
    let source = render(template, substitution)?;

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    writer
        .start_file(HANDLER_FILE, options)
        .map_err(|e| CloudError::Packaging(e.to_string()))?;
    writer.write_all(source.as_bytes())?;
    let cursor = writer
        .finish()
        .map_err(|e| CloudError::Packaging(e.to_string()))?;

    Ok(cursor.into_inner())
}

/// Read a replacement template from `path`, or fall back to `embedded`.
pub async fn load_template(path: Option<&Path>, embedded: &str) -> Result<String> {
    match path {
        Some(path) => {
            tracing::debug!("Reading function source: {}", path.display());
            tokio::fs::read_to_string(path).await.map_err(|e| {
                CloudError::Packaging(format!("cannot read {}: {}", path.display(), e))
            })
        }
        None => Ok(embedded.to_string()),
    }
}
