//! Print the static route list

use anyhow::Result;

use crate::Site;

/// One slug per line, in index order
pub fn run(site: &Site) -> Result<()> {
    let index = site.loader().load()?;
    for route in index.routes() {
        println!("{}", route);
    }
    Ok(())
}
