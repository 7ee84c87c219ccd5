use crate::cli::GermlinesArgs;
use crate::error::Result;
use abgraft::core::germlines::registry::GermlineSet;
use abgraft::core::models::chain::ChainType;
use abgraft::core::numbering::engine::AnchorNumberer;
use tracing::info;

pub fn run(args: GermlinesArgs) -> Result<()> {
    let numberer = AnchorNumberer::new();
    let set = match &args.germlines {
        Some(path) => {
            info!("Loading germline reference set from {:?}", path);
            GermlineSet::load(path, &numberer)?
        }
        None => GermlineSet::builtin(&numberer)?,
    };
    for line in listing(&set, args.chain) {
        println!("{line}");
    }
    Ok(())
}

/// One line per germline: identifier, chain type, segment and length.
fn listing(set: &GermlineSet, chain: Option<ChainType>) -> Vec<String> {
    set.iter()
        .filter(|r| chain.is_none_or(|c| r.chain_type() == c))
        .map(|r| {
            format!(
                "{:<14} {:<7} {} {:>4}",
                r.id(),
                r.chain_type().as_str(),
                r.segment(),
                r.sequence().len()
            )
        })
        .collect()
}
