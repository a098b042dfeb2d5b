use crate::cli::InspectArgs;
use crate::error::Result;
use ssakit::core::io::network_file::NetworkFile;
use ssakit::core::models::ids::ReactionId;
use tracing::info;

pub fn run(args: InspectArgs) -> Result<()> {
    info!("Loading reaction network from {:?}", &args.network);
    let (network, rates) = NetworkFile::load(&args.network)?;
    let catalog = network.catalog();

    println!("Species ({}):", catalog.len());
    for (id, species) in catalog.iter() {
        println!(
            "  {:>4}  {:<12} size {:<3} [{}]",
            id.0,
            catalog.name(id),
            species.size(),
            species.composition().join(", ")
        );
    }

    println!("Reactions ({}):", network.reaction_count());
    for (index, reaction) in network.reactions().iter().enumerate() {
        let id = ReactionId(index);
        println!(
            "  {:>4}  {:<16} {:<32} {} = {:.6e}",
            index,
            reaction.label,
            network.describe(id),
            reaction.rate_key(),
            rates.get(id)
        );
    }

    let pairs = network.reversible_pairs();
    println!("Reversible pairs ({}):", pairs.len());
    for pair in &pairs {
        let forward = rates.get(pair.forward);
        let backward = rates.get(pair.backward);
        println!(
            "  {:<32} K = k+/k- = {:.6e}",
            network.describe(pair.forward),
            if backward > 0.0 { forward / backward } else { f64::INFINITY }
        );
    }
    Ok(())
}
