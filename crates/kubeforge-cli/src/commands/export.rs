//! Export command - re-serialize manifests in canonical form
//!
//! Export is never blocked by validation: invalid resources are written as
//! they are. Fields the model does not carry are listed on stderr.

use console::style;
use kubeforge_core::codec;
use std::path::{Path, PathBuf};

use crate::error::{CliError, Result};
use crate::util;

pub fn run(files: &[PathBuf], output_dir: Option<&Path>, split: bool) -> Result<()> {
    let loaded = util::load_resources(files)?;
    for item in &loaded {
        for field in &item.dropped {
            eprintln!(
                "{} {}: {} is not supported and was dropped",
                style("⚠").yellow(),
                item.source,
                field
            );
        }
    }
    let resources: Vec<_> = loaded.into_iter().map(|item| item.resource).collect();
    if resources.is_empty() {
        return Err(CliError::usage(
            "No resources found in input",
            Some("pass at least one file containing a manifest".to_string()),
        ));
    }

    let Some(dir) = output_dir else {
        print!("{}", codec::to_yaml_all(&resources)?);
        return Ok(());
    };

    std::fs::create_dir_all(dir)?;
    let outputs = if split {
        resources
            .iter()
            .map(|r| Ok((dir.join(codec::export_file_name(r)), codec::to_yaml(r)?)))
            .collect::<Result<Vec<_>>>()?
    } else {
        vec![(
            dir.join(codec::combined_file_name(resources.len())),
            codec::to_yaml_all(&resources)?,
        )]
    };

    for (path, content) in outputs {
        std::fs::write(&path, content)?;
        println!("{} Wrote {}", style("✓").green(), path.display());
    }
    Ok(())
}
