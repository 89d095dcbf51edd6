use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use crate::{SpindeckError, sessions::Session};

pub fn write_sessions(file: &Path, sessions: &[Session]) -> Result<(), SpindeckError> {
    if let Some(parent) = file.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| SpindeckError::SessionWrite { source: e })?;
    }

    let sessions_file = File::create(file).map_err(|e| SpindeckError::SessionWrite { source: e })?;
    let mut sessions_file_writer = BufWriter::new(sessions_file);
    serde_json::to_writer_pretty(&mut sessions_file_writer, sessions)
        .map_err(|e| SpindeckError::SessionSerialize { source: e })?;
    writeln!(sessions_file_writer).map_err(|e| SpindeckError::SessionWrite { source: e })?;
    sessions_file_writer
        .flush()
        .map_err(|e| SpindeckError::SessionWrite { source: e })?;
    Ok(())
}
