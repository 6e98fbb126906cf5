use std::io::Write;

use color_eyre::Result;
use color_eyre::eyre::WrapErr;

use crate::system::snapshot::Snapshot;

/// Write one snapshot as a single JSON document followed by a newline, then flush.
pub fn write_snapshot<W: Write>(mut out: W, snapshot: &Snapshot, pretty: bool) -> Result<()> {
    let written = if pretty {
        serde_json::to_writer_pretty(&mut out, snapshot)
    } else {
        serde_json::to_writer(&mut out, snapshot)
    };
    written.wrap_err("failed to serialize snapshot")?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}
