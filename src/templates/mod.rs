//! Built-in page templates
//!
//! Pages are plain HTML shells: a head carrying the [`PageMeta`] tags, a
//! small header, and the page body. Styling is left to `static/`.

use chrono::NaiveDate;
use serde_json::json;

use crate::config::SiteConfig;
use crate::content::Post;
use crate::helpers::{blog_index_path, escape_html, format_date, post_path};
use crate::seo::PageMeta;

/// Renders the site's pages against one configuration and one "today"
pub struct TemplateRenderer<'a> {
    config: &'a SiteConfig,
    today: NaiveDate,
}

impl<'a> TemplateRenderer<'a> {
    pub fn new(config: &'a SiteConfig, today: NaiveDate) -> Self {
        Self { config, today }
    }

    /// Listing page for posts already in display order
    pub fn listing(&self, posts: &[&Post]) -> String {
        let mut body = String::new();
        body.push_str("<section class=\"listing\">\n");
        body.push_str(&format!(
            "<h1 class=\"title\">{}</h1>\n",
            escape_html(&self.config.title)
        ));

        if posts.is_empty() {
            body.push_str("<p class=\"empty\">No posts yet.</p>\n");
        } else {
            body.push_str("<ul class=\"posts\">\n");
            for post in posts {
                body.push_str(&self.listing_item(post));
            }
            body.push_str("</ul>\n");
        }
        body.push_str("</section>\n");

        self.layout(&PageMeta::for_listing(self.config), &body)
    }

    fn listing_item(&self, post: &Post) -> String {
        let date = post
            .metadata
            .published_at()
            .map(|raw| format_date(raw, self.today, false))
            .unwrap_or_default();

        format!(
            "<li><a href=\"{href}\"><time>{date}</time> <span class=\"title\">{title}</span></a></li>\n",
            href = escape_html(&post_path(self.config, &post.slug)),
            date = escape_html(&date),
            title = escape_html(post.title()),
        )
    }

    /// Detail page with the rendered body and links to the neighbouring posts
    pub fn post(
        &self,
        post: &Post,
        body_html: &str,
        newer: Option<&Post>,
        older: Option<&Post>,
    ) -> String {
        let meta = PageMeta::for_post(post, self.config);
        let mut body = String::new();

        body.push_str("<article class=\"post\">\n");
        body.push_str(&format!(
            "<h1 class=\"title\">{}</h1>\n",
            escape_html(post.title())
        ));

        body.push_str("<p class=\"meta\">");
        if let Some(raw) = post.metadata.published_at() {
            let date = format_date(raw, self.today, self.config.date_format_relative);
            body.push_str(&format!("<time>{}</time> &middot; ", escape_html(&date)));
        }
        body.push_str(&format!(
            "{} min read</p>\n",
            post.reading_time(self.config.words_per_minute)
        ));

        let tags = post.tags();
        if !tags.is_empty() {
            body.push_str("<ul class=\"tags\">");
            for tag in &tags {
                body.push_str(&format!("<li>{}</li>", escape_html(tag)));
            }
            body.push_str("</ul>\n");
        }

        body.push_str("<div class=\"prose\">\n");
        body.push_str(body_html);
        body.push_str("</div>\n</article>\n");

        if newer.is_some() || older.is_some() {
            body.push_str("<nav class=\"pager\">\n");
            if let Some(newer) = newer {
                body.push_str(&self.pager_link("newer", newer));
            }
            if let Some(older) = older {
                body.push_str(&self.pager_link("older", older));
            }
            body.push_str("</nav>\n");
        }

        let mut html = self.layout(&meta, &body);
        let structured = self.structured_data(post, &meta);
        html = html.replacen("</head>", &format!("{}</head>", structured), 1);
        html
    }

    fn pager_link(&self, rel: &str, post: &Post) -> String {
        format!(
            "<a class=\"{rel}\" href=\"{href}\">{title}</a>\n",
            rel = rel,
            href = escape_html(&post_path(self.config, &post.slug)),
            title = escape_html(post.title()),
        )
    }

    /// Page served for unknown slugs
    pub fn not_found(&self, path: &str) -> String {
        let body = format!(
            "<section class=\"not-found\">\n<h1 class=\"title\">404 - Page Not Found</h1>\n\
             <p>Nothing lives at <code>{}</code>.</p>\n\
             <p><a href=\"{}\">Back to all posts</a></p>\n</section>\n",
            escape_html(path),
            escape_html(&blog_index_path(self.config)),
        );
        self.layout(&PageMeta::not_found(self.config, path), &body)
    }

    fn layout(&self, meta: &PageMeta, body: &str) -> String {
        let config = self.config;
        format!(
            "<!DOCTYPE html>\n<html lang=\"{lang}\">\n<head>\n{head}</head>\n<body>\n\
             <header><nav><a href=\"/\">{site}</a> <a href=\"{blog}\">blog</a></nav></header>\n\
             <main>\n{body}</main>\n</body>\n</html>\n",
            lang = escape_html(&config.language),
            head = head(meta),
            site = escape_html(&config.title),
            blog = escape_html(&blog_index_path(config)),
            body = body,
        )
    }

    /// BlogPosting JSON-LD block for a post
    fn structured_data(&self, post: &Post, meta: &PageMeta) -> String {
        let mut data = json!({
            "@context": "https://schema.org",
            "@type": "BlogPosting",
            "headline": meta.title,
            "description": meta.description,
            "image": meta.image,
            "url": meta.url,
            "author": {
                "@type": "Person",
                "name": self.config.author,
            },
        });
        if let Some(published) = &meta.published_time {
            data["datePublished"] = json!(published);
            data["dateModified"] = json!(published);
        }
        if !post.tags().is_empty() {
            data["keywords"] = json!(post.tags().join(", "));
        }

        // `</script>` inside a string would end the block early
        let encoded = data.to_string().replace("</", "<\\/");
        format!(
            "<script type=\"application/ld+json\">{}</script>\n",
            encoded
        )
    }
}

/// Head tags for one page
pub fn head(meta: &PageMeta) -> String {
    let mut head = String::new();
    head.push_str("<meta charset=\"utf-8\">\n");
    head.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    head.push_str(&format!("<title>{}</title>\n", escape_html(&meta.title)));

    let mut property = |name: &str, value: &str| {
        head.push_str(&format!(
            "<meta property=\"{}\" content=\"{}\">\n",
            name,
            escape_html(value)
        ));
    };
    property("og:title", &meta.title);
    if let Some(description) = &meta.description {
        property("og:description", description);
    }
    property("og:type", meta.kind);
    property("og:url", &meta.url);
    property("og:image", &meta.image);
    if let Some(published) = &meta.published_time {
        property("article:published_time", published);
    }

    if let Some(description) = &meta.description {
        head.push_str(&format!(
            "<meta name=\"description\" content=\"{}\">\n",
            escape_html(description)
        ));
    }
    head.push_str("<meta name=\"twitter:card\" content=\"summary_large_image\">\n");
    head.push_str(&format!(
        "<link rel=\"canonical\" href=\"{}\">\n",
        escape_html(&meta.url)
    ));
    head.push_str("<link rel=\"stylesheet\" href=\"/style.css\">\n");
    head
}
