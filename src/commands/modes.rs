use crate::{
    libs::{config::Config, messages::Message, view::View},
    msg_info, msg_print,
};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct ModesArgs {
    /// Taxonomy to show (defaults to the configured one)
    taxonomy: Option<String>,
}

pub fn cmd(args: ModesArgs) -> Result<()> {
    let config = Config::read()?;
    let taxonomy = config.taxonomy(args.taxonomy.as_deref())?;

    msg_print!(Message::TaxonomyHeader(taxonomy.name.clone()), true);
    View::taxonomy(&taxonomy)?;

    let names = config.available_taxonomies()?.names().join(", ");
    msg_info!(Message::TaxonomyNames(names));
    Ok(())
}
