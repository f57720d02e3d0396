//! JSON rendering of pipeline documents to stdout.

use std::io::Write;

use estuary_core::Document;

use crate::error::CliError;

pub fn render(document: &Document, pretty: bool) -> Result<(), CliError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(document)?
    } else {
        serde_json::to_string(document)?
    };

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{rendered}")?;
    Ok(())
}
