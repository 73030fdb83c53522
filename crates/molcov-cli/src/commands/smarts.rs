use molcov::store::patterns::PatternSet;
use tracing::info;

use crate::cli::SmartsArgs;
use crate::error::Result;

pub fn run(args: SmartsArgs) -> Result<()> {
    info!("Loading pattern list from {:?}", &args.patterns);
    let patterns = PatternSet::from_smarts_file(&args.patterns)?;
    crate::commands::execute(&patterns, None, &args.run)
}
