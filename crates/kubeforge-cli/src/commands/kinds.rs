//! Kinds command - list supported resource kinds

use console::style;
use kubeforge_core::Kind;

use crate::error::Result;

pub fn run() -> Result<()> {
    println!(
        "{:<26} {:<22} {}",
        style("KIND").bold(),
        style("API VERSION").bold(),
        style("LAYER").bold()
    );
    for kind in Kind::ALL {
        println!(
            "{:<26} {:<22} {}",
            kind.as_str(),
            kind.default_api_version(),
            kind.layer()
        );
    }
    Ok(())
}
