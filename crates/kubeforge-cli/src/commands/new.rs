//! New command - print the default template of a kind

use kubeforge_core::{ForgeConfig, Kind, codec, templates};

use crate::error::{CliError, Result};

pub fn run(
    kind: &str,
    name: &str,
    namespace: Option<&str>,
    comment: Option<&str>,
    config: &ForgeConfig,
) -> Result<()> {
    let kind: Kind = kind.parse().map_err(|e: kubeforge_core::model::ParseKindError| {
        let help = match &e.suggestion {
            Some(s) => format!("did you mean `{}`? Run `kubeforge kinds` for the full list", s),
            None => "run `kubeforge kinds` for the full list".to_string(),
        };
        CliError::usage(e.to_string(), Some(help))
    })?;

    let namespace = namespace.unwrap_or(&config.defaults.namespace);
    let mut resource = templates::new_resource(kind, name, namespace);
    if let Some(comment) = comment {
        resource = resource.with_comment(comment);
    }

    print!("{}", codec::to_yaml(&resource)?);
    Ok(())
}
