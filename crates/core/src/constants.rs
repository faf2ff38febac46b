//! Shared constants for seadex-rss.

/// Default minimum time between two upstream checks of the same entry.
pub const DEFAULT_UPDATE_INTERVAL_MINUTES: i64 = 240;

/// Default timeout applied to every outbound upstream request.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Number of snapshots rendered into one feed.
pub const DEFAULT_FEED_LIMIT: usize = 10;

/// Hard upper bound for snapshot listings (DoS protection).
pub const MAX_HISTORY_LIMIT: usize = 500;

/// SQLite connection pool size.
pub const DEFAULT_DB_POOL_SIZE: u32 = 4;

/// SeaDex REST API base (PocketBase).
pub const DEFAULT_CATALOG_URL: &str = "https://releases.moe/api";

/// PocketBase collection holding SeaDex entries.
pub const CATALOG_COLLECTION: &str = "entries";

/// AniList GraphQL endpoint used for titles and cover images.
pub const DEFAULT_METADATA_URL: &str = "https://graphql.anilist.co";

/// Public SeaDex page for an entry, suffixed with `{id}/`.
pub const SEADEX_SITE_URL: &str = "https://releases.moe";

/// Public AniList page for an anime, suffixed with `{id}`.
pub const ANILIST_ANIME_URL: &str = "https://anilist.co/anime";

/// Directory name under the platform data dir.
pub const DATA_DIR_NAME: &str = "seadex-rss";

/// SQLite file name.
pub const DB_FILE_NAME: &str = "seadexrss.db";

/// User agent sent with upstream requests.
pub const USER_AGENT: &str = concat!("seadex-rss/", env!("CARGO_PKG_VERSION"));
