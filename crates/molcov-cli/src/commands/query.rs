use molcov::store::patterns::{self, PatternSet};
use tracing::info;

use crate::cli::QueryArgs;
use crate::error::Result;

pub fn run(args: QueryArgs) -> Result<()> {
    info!("Loading parameter file from {:?}", &args.params);
    let patterns = PatternSet::from_toml(&args.params)?;

    let want = match &args.want {
        Some(path) => {
            let want = patterns::load_want(path)?;
            info!(requested = want.len(), "Restricting to a want list.");
            Some(want)
        }
        None => None,
    };

    crate::commands::execute(&patterns, want.as_ref(), &args.run)
}
