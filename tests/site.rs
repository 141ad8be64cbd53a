use chrono::NaiveDate;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use folio_rs::config::SiteConfig;
use folio_rs::content::{ContentError, ContentLoader};
use folio_rs::generator::Generator;
use folio_rs::seo::sitemap;
use folio_rs::Site;

fn write_post(dir: &Path, name: &str, title: &str, date: &str) {
    let doc = format!(
        "---\ntitle: {}\npublishedAt: {}\nsummary: About {}\n---\n\n## Intro\n\nBody of {}.\n",
        title, date, title, title
    );
    fs::write(dir.join(name), doc).unwrap();
}

fn fixture() -> (TempDir, Site) {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("_config.yml"),
        "title: Fixture\nurl: https://fixture.dev\n",
    )
    .unwrap();

    let posts = dir.path().join("posts");
    fs::create_dir_all(&posts).unwrap();
    write_post(&posts, "middle.mdx", "Middle", "2024-01-01");
    write_post(&posts, "newest.mdx", "Newest", "2024-06-01");
    write_post(&posts, "oldest.md", "Oldest", "2023-12-01");
    write_post(&posts, "spring.mdx", "Spring", "2023-04-10");
    write_post(&posts, "winter.mdx", "Winter", "2022-12-24");
    fs::write(posts.join("notes.txt"), "not a post").unwrap();

    let config = SiteConfig::load(dir.path().join("_config.yml")).unwrap();
    let site = Site::with_config(dir.path(), config);
    (dir, site)
}

#[test]
fn index_serves_routes_listing_and_lookup() {
    let (_dir, site) = fixture();
    let index = site.loader().load().unwrap();

    assert_eq!(
        index.routes(),
        vec!["middle", "newest", "oldest", "spring", "winter"]
    );

    let listing: Vec<_> = index.listing().iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(listing, vec!["newest", "middle", "oldest", "spring", "winter"]);

    let post = index.find("oldest").unwrap();
    assert_eq!(post.title(), "Oldest");
    assert_eq!(post.summary(), Some("About Oldest"));
    assert!(post.content.starts_with("## Intro"));

    for slug in ["missing", "", "Newest", "newest.mdx"] {
        assert!(matches!(index.find(slug), Err(ContentError::NotFound(_))));
    }
}

#[test]
fn export_writes_pages_and_sitemap() {
    let (dir, site) = fixture();
    let index = site.loader().load().unwrap();
    let today = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();

    Generator::new(&site).with_today(today).generate(&index).unwrap();

    let public = dir.path().join("public");
    let listing = fs::read_to_string(public.join("blog/index.html")).unwrap();
    let newest = listing.find("/blog/newest").unwrap();
    let winter = listing.find("/blog/winter").unwrap();
    assert!(newest < winter);

    let post = fs::read_to_string(public.join("blog/middle/index.html")).unwrap();
    assert!(post.contains("<link rel=\"canonical\" href=\"https://fixture.dev/blog/middle\">"));
    assert!(post.contains("<meta property=\"og:description\" content=\"About Middle\">"));
    assert!(post.contains("id=\"intro\""));

    let xml = fs::read_to_string(public.join("sitemap.xml")).unwrap();
    let expected = sitemap::to_xml(&sitemap::entries(&index, &site.config, today));
    assert_eq!(xml, expected);
    assert_eq!(xml.matches("<url>").count(), 7);

    let robots = fs::read_to_string(public.join("robots.txt")).unwrap();
    assert!(robots.contains("Sitemap: https://fixture.dev/sitemap.xml"));
}

#[test]
fn cache_picks_up_new_posts_on_reload() {
    let (dir, site) = fixture();
    let cache = site.index_cache();
    let before = cache.get().unwrap();
    assert_eq!(before.len(), 5);

    write_post(&dir.path().join("posts"), "fresh.mdx", "Fresh", "2024-07-01");
    assert!(cache.refresh().unwrap());

    let after = cache.get().unwrap();
    assert_eq!(after.len(), 6);
    assert_eq!(after.listing()[0].slug, "fresh");
    assert_eq!(before.len(), 5);
}

#[test]
fn strict_loader_rejects_incomplete_posts() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("draft.md"), "---\nsummary: no title\n---\n").unwrap();

    let lenient = ContentLoader::from_dir(dir.path(), &["md"]).load().unwrap();
    assert_eq!(lenient.get("draft").unwrap().title(), "draft");

    let err = ContentLoader::from_dir(dir.path(), &["md"])
        .strict(true)
        .load()
        .unwrap_err();
    assert!(matches!(err, ContentError::Invalid { ref slug, .. } if slug == "draft"));
}
