//! List posts in display order

use anyhow::Result;

use crate::content::PostIndex;
use crate::Site;

/// Print the listing view
pub fn run(site: &Site) -> Result<()> {
    let index = site.loader().load()?;
    print!("{}", render(&index, site.config.words_per_minute));
    Ok(())
}

/// One line per post, newest first: date, title, slug and reading time
pub fn render(index: &PostIndex, words_per_minute: usize) -> String {
    let mut out = format!("Posts ({}):\n", index.len());

    for post in index.listing() {
        let date = post
            .published_on()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "----------".to_string());
        out.push_str(&format!(
            "  {} - {} [{}] {} min\n",
            date,
            post.title(),
            post.slug,
            post.reading_time(words_per_minute)
        ));
    }

    out
}
