//! Show a single post

use anyhow::Result;

use crate::content::Post;
use crate::Site;

/// Print one post's metadata and body; an unknown slug is an error
pub fn run(site: &Site, slug: &str) -> Result<()> {
    let index = site.loader().load()?;
    let post = index.find(slug)?;
    print!("{}", render(site, post));
    Ok(())
}

pub fn render(site: &Site, post: &Post) -> String {
    let mut out = String::new();

    out.push_str(&format!("slug: {}\n", post.slug));
    out.push_str(&format!("url: {}\n", site.post_url(&post.slug)));
    out.push_str(&format!("source: {}\n", post.source.display()));
    out.push_str(&format!(
        "reading time: {} min\n",
        post.reading_time(site.config.words_per_minute)
    ));
    for issue in post.metadata.validate() {
        out.push_str(&format!("warning: {}\n", issue));
    }
    out.push('\n');
    out.push_str(&post.metadata.to_front_matter());
    out.push_str(&post.content);
    if !post.content.ends_with('\n') {
        out.push('\n');
    }

    out
}
