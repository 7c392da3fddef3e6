//! Feed fixtures and test configuration

use livestream_grabber::Config;
use std::path::Path;

/// One `<item>` of a generated RSS fixture
pub struct FixtureItem {
    pub n: u32,
    pub pub_date: &'static str,
}

/// Five items with distinct dates, listed out of date order
pub const FIVE_ITEMS: [FixtureItem; 5] = [
    FixtureItem {
        n: 1,
        pub_date: "Mon, 01 Jan 2024 12:00:00 GMT",
    },
    FixtureItem {
        n: 4,
        pub_date: "Thu, 04 Jan 2024 12:00:00 GMT",
    },
    FixtureItem {
        n: 2,
        pub_date: "Tue, 02 Jan 2024 12:00:00 GMT",
    },
    FixtureItem {
        n: 5,
        pub_date: "Fri, 05 Jan 2024 12:00:00 GMT",
    },
    FixtureItem {
        n: 3,
        pub_date: "Wed, 03 Jan 2024 12:00:00 GMT",
    },
];

/// Link used for fixture item `n`
pub fn link(n: u32) -> String {
    format!("https://videos.example.com/w/{}", n)
}

/// Build an RSS 2.0 document for the given items
pub fn rss_feed(items: &[FixtureItem]) -> String {
    let body: String = items
        .iter()
        .map(|item| {
            format!(
                r#"
        <item>
            <title>Live Episode {n}</title>
            <link>{link}</link>
            <description>Live Episode {n}: show notes &amp; links</description>
            <pubDate>{date}</pubDate>
        </item>"#,
                n = item.n,
                link = link(item.n),
                date = item.pub_date,
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
    <channel>
        <title>Livestreams</title>
        <link>https://videos.example.com</link>
        <description>All livestreams</description>{body}
    </channel>
</rss>"#
    )
}

/// Configuration rooted in a temporary directory
pub fn test_config(
    root: &Path,
    feed_url: &str,
    concurrency_limit: usize,
    newest_count: usize,
) -> Config {
    let mut config = Config {
        feed_url: feed_url.to_string(),
        record_path: root.join("processed_items.txt"),
        output_dir: root.join("podcasts"),
        concurrency_limit,
        newest_count,
        ..Default::default()
    };
    config.publish.base_url = "https://media.example.com/podcasts/".to_string();
    config
}

/// Links recorded in the processed-items file, in file order
pub fn recorded_links(config: &Config) -> Vec<String> {
    std::fs::read_to_string(&config.record_path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}
