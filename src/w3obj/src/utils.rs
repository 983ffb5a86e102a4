use std::{
    fs,
    io::{BufWriter, Write},
    path::Path,
};

use eyre::Context;
use serde::Serialize;

/// Serializes the given value as pretty-printed JSON into a new file
/// at `path`.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> eyre::Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("failed to create '{}'", path.display()))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;

    Ok(())
}
