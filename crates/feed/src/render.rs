use std::fmt::Write as _;

use rss::{Channel, ChannelBuilder, GuidBuilder, Item, ItemBuilder};
use seadex_rss_core::constants::{ANILIST_ANIME_URL, SEADEX_SITE_URL};
use seadex_rss_core::{Snapshot, TrackedId};

use crate::FeedError;
use crate::html::{escape, flag};
use crate::payload::{EntryPayload, Release};

const NOT_AVAILABLE: &str = "N/A";
const GENERATOR: &str = concat!("seadex-rss ", env!("CARGO_PKG_VERSION"));

/// Builds the channel for `id` from snapshots ordered newest first. Items
/// keep the input order.
#[must_use]
pub fn build_channel(snapshots: &[Snapshot], id: TrackedId) -> Channel {
    let title = snapshots
        .first()
        .map_or_else(|| id.placeholder_title(), |s| s.display_title.clone());

    let items: Vec<Item> = snapshots.iter().map(|s| build_item(s, id)).collect();

    ChannelBuilder::default()
        .title(format!("SeaDex Updates for {title}"))
        .link(format!("{SEADEX_SITE_URL}/{id}/"))
        .description(format!("SeaDex updates for {title} (Anilist ID: {id})"))
        .generator(Some(GENERATOR.to_owned()))
        .last_build_date(snapshots.first().map(|s| s.timestamp.to_rfc2822()))
        .items(items)
        .build()
}

/// Serializes [`build_channel`] as XML.
///
/// # Errors
/// Returns an error if the XML writer fails.
pub fn render_feed(snapshots: &[Snapshot], id: TrackedId) -> Result<String, FeedError> {
    let channel = build_channel(snapshots, id);
    let bytes = channel.write_to(Vec::new())?;
    Ok(String::from_utf8(bytes)?)
}

fn build_item(snapshot: &Snapshot, id: TrackedId) -> Item {
    let guid = GuidBuilder::default()
        .value(format!("seadex-rss:{id}:{}", snapshot.id))
        .permalink(false)
        .build();

    ItemBuilder::default()
        .title(Some(format!("Update on {}", snapshot.timestamp.format("%d/%m/%Y"))))
        .link(Some(format!("{ANILIST_ANIME_URL}/{id}")))
        .description(Some(render_description(snapshot)))
        .pub_date(Some(snapshot.timestamp.to_rfc2822()))
        .guid(Some(guid))
        .build()
}

/// HTML summary of one snapshot. An unparseable payload yields a single
/// diagnostic line.
#[must_use]
pub fn render_description(snapshot: &Snapshot) -> String {
    let payload = match EntryPayload::parse(&snapshot.payload) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(
                tracked_id = %snapshot.tracked_id,
                snapshot_id = snapshot.id,
                error = %e,
                "stored payload does not parse"
            );
            return format!(
                "Error: Unable to parse snapshot data for Anilist ID {}",
                snapshot.tracked_id
            );
        },
    };

    let title = escape(&snapshot.display_title);
    let mut out = String::new();

    if let Some(cover) = snapshot.cover_image_url.as_deref() {
        let _ = writeln!(
            out,
            r#"<img src="{}" alt="{title}" style="float: left; margin-right: 10px;"/>"#,
            escape(cover)
        );
    }
    let _ = writeln!(
        out,
        "<h2>There has been an update for the SeaDex entry for {title}.</h2>\n\
         <p>Below is the latest version of the SeaDex entry.</p>\n<br>\n<ul>"
    );
    let _ = writeln!(
        out,
        "    <li><strong>Updated:</strong> {}</li>",
        escape(payload.updated.as_deref().unwrap_or(NOT_AVAILABLE))
    );
    let _ = writeln!(
        out,
        "    <li><strong>Comparison:</strong> {}</li>",
        comparison_links(&payload.comparison_urls())
    );
    let _ = writeln!(out, "    <li><strong>Complete?:</strong> {}</li>", flag(payload.is_complete()));
    let _ = writeln!(
        out,
        "    <br>\n    <li><strong>Notes:</strong> {}</li>\n</ul>",
        escape(payload.notes.as_deref().unwrap_or(NOT_AVAILABLE))
    );
    let _ = writeln!(
        out,
        "<div style=\"clear: both\">\n<br>\n<h3><strong>Torrents:</strong></h3>\n</div>\n<br>"
    );

    for release in payload.releases() {
        out.push_str(&release_block(release));
    }

    out
}

/// `<a>` per URL joined with `" | "`, or `N/A` when there are none.
pub(crate) fn comparison_links(urls: &[String]) -> String {
    if urls.is_empty() {
        return NOT_AVAILABLE.to_owned();
    }
    urls.iter()
        .enumerate()
        .map(|(i, url)| format!(r#"<a href="{}">Comparison {}</a>"#, escape(url), i + 1))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn release_block(release: &Release) -> String {
    let group = release.release_group.as_deref().unwrap_or("Unknown Group");
    let tracker = release.tracker.as_deref().unwrap_or(NOT_AVAILABLE);
    let url = release.url.as_deref().unwrap_or("#");

    format!(
        "<h4><u>{}</u></h4>\n<ul>\n\
         \x20   <li><strong>Size:</strong> {:.2} GiB</li>\n\
         \x20   <li><strong>Is Best?:</strong> {}</li>\n\
         \x20   <li><strong>Dual Audio?:</strong> {}</li>\n\
         \x20   <li><strong>Tracker:</strong> {}</li>\n\
         \x20   <li><strong>Torrent Url:</strong> <a href=\"{}\">Link</a></li>\n\
         </ul>\n<br>\n",
        escape(group),
        release.total_size_gib(),
        flag(release.is_best.unwrap_or(false)),
        flag(release.dual_audio.unwrap_or(false)),
        escape(tracker),
        escape(url),
    )
}
