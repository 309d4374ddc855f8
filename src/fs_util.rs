use std::{io::BufWriter, path::Path};

use anyhow::Context;
use fs_err::File;
use log::info;

pub fn create_writer<P: AsRef<Path>>(path: P) -> anyhow::Result<BufWriter<File>> {
    let path = path.as_ref();
    Ok(BufWriter::new(
        File::create(path).with_context(|| format!("While creating {path:?}"))?,
    ))
}

pub fn ensure_dir<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    if !path.is_dir() {
        info!("Creating the output directory {path:?}.");
        fs_err::create_dir_all(path)?;
    }
    Ok(())
}
