use std::sync::Arc;

use super::table::{self, Field};
use super::{BroadcastList, BroadcastRecord, Console, prompt_for_index};
use crate::api::BroadcastApi;
use crate::common::ChannelLogin;
use crate::sources::{StreamResolver, StreamSet, VOD_PREFIX};

/// Knobs the host exposes for the past-broadcast fallback.
#[derive(Debug, Clone)]
pub struct VodOptions {
    /// Look for past broadcasts when the channel is not live.
    pub check_vods: bool,
    /// Take the most recent resolvable broadcast without asking.
    pub pick_most_recent: bool,
    /// Upper bound on broadcasts fetched from the API.
    pub limit: usize,
    /// Text-cell cap for the selection table.
    pub table_width: usize,
    /// Column whitelist; empty means the canonical set.
    pub fields: Vec<Field>,
}

impl Default for VodOptions {
    fn default() -> Self {
        Self {
            check_vods: false,
            pick_most_recent: false,
            limit: 10,
            table_width: table::FALLBACK_WIDTH,
            fields: Vec::new(),
        }
    }
}

/// Orchestrates "try live, then fall back to a past broadcast".
///
/// Wraps a caller-supplied engine and API client; every failure past the
/// live attempt degrades to `None` rather than surfacing. The engine is
/// always handed the identifier explicitly, so a failed broadcast round
/// cannot leak into a later live resolution.
pub struct VodResolver {
    engine: Arc<dyn StreamResolver>,
    api: Arc<dyn BroadcastApi>,
    console: Box<dyn Console>,
    options: VodOptions,
}

impl VodResolver {
    pub fn new(
        engine: Arc<dyn StreamResolver>,
        api: Arc<dyn BroadcastApi>,
        console: Box<dyn Console>,
        options: VodOptions,
    ) -> Self {
        Self {
            engine,
            api,
            console,
            options,
        }
    }

    /// Resolve streams for `channel`: the live stream when there is one,
    /// otherwise a past broadcast per the configured options. `None` means
    /// nothing could be resolved; the host reports it and moves on.
    pub async fn resolve_for_channel(&mut self, channel: &ChannelLogin) -> Option<StreamSet> {
        match self.engine.resolve(channel.as_str()).await {
            Ok(streams) if !streams.is_empty() => {
                tracing::debug!("{} is live with {} qualities", channel, streams.len());
                return Some(streams);
            }
            Ok(_) => tracing::info!("{} is not live", channel),
            Err(e) => tracing::warn!("live stream check for {} failed: {}", channel, e),
        }

        if !self.options.check_vods {
            return None;
        }

        tracing::info!("querying past broadcasts for {}", channel);
        let records = match self.api.fetch_broadcasts(channel, self.options.limit).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("past broadcast listing for {} failed: {}", channel, e);
                return None;
            }
        };

        let list = BroadcastList::new(records).sorted_by_recency();
        if list.is_empty() {
            tracing::info!("{} has no past broadcasts", channel);
            return None;
        }

        if self.options.pick_most_recent {
            self.pick_most_recent(&list).await
        } else {
            self.pick_interactively(&list).await
        }
    }

    /// Walks the recency-ordered list and takes the first broadcast that
    /// actually resolves.
    async fn pick_most_recent(&self, list: &BroadcastList) -> Option<StreamSet> {
        for record in list.records() {
            if let Some(streams) = self.resolve_record(record).await {
                return Some(streams);
            }
        }
        tracing::info!("none of {} past broadcasts resolved", list.len());
        None
    }

    async fn pick_interactively(&mut self, list: &BroadcastList) -> Option<StreamSet> {
        let listing = table::render(list.records(), &self.options.fields, self.options.table_width);
        let _ = self.console.write_line(listing.text.trim_end());

        let index = prompt_for_index(self.console.as_mut(), 1, listing.rows)?;
        let record = list.by_index(index)?;
        self.resolve_record(record).await
    }

    /// One broadcast resolution attempt. Failure of any kind means "no
    /// stream for this candidate", never a fallback to live resolution.
    async fn resolve_record(&self, record: &BroadcastRecord) -> Option<StreamSet> {
        let identifier = format!("{}{}", VOD_PREFIX, record.id);
        match self.engine.resolve(&identifier).await {
            Ok(streams) if !streams.is_empty() => Some(streams),
            Ok(_) => {
                tracing::info!("broadcast {} has no playable streams", record.id);
                None
            }
            Err(e) => {
                tracing::warn!("resolving broadcast {} failed: {}", record.id, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{ApiError, ResolveError, VideoId};
    use crate::vods::parse_timestamp;
    use crate::vods::prompt::testing::ScriptedConsole;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Engine stub: canned responses per identifier, full call log.
    #[derive(Default)]
    struct StubEngine {
        streams: HashMap<String, StreamSet>,
        failing: Vec<String>,
        calls: Mutex<Vec<String>>,
    }

    impl StubEngine {
        fn with_streams(entries: &[(&str, &str)]) -> Self {
            let mut streams = HashMap::new();
            for (identifier, url) in entries {
                let mut set = StreamSet::new();
                set.insert("best", *url);
                streams.insert(identifier.to_string(), set);
            }
            Self {
                streams,
                ..Default::default()
            }
        }

        fn failing_on(mut self, identifier: &str) -> Self {
            self.failing.push(identifier.to_string());
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StreamResolver for StubEngine {
        fn name(&self) -> &str {
            "stub"
        }

        fn can_handle(&self, _identifier: &str) -> bool {
            true
        }

        async fn resolve(&self, identifier: &str) -> Result<StreamSet, ResolveError> {
            self.calls.lock().unwrap().push(identifier.to_string());
            if self.failing.iter().any(|f| f == identifier) {
                return Err(ResolveError::Upstream("stub failure".to_string()));
            }
            Ok(self.streams.get(identifier).cloned().unwrap_or_default())
        }
    }

    /// API stub: one canned listing (or error), fetch counter.
    struct StubApi {
        records: Result<Vec<BroadcastRecord>, String>,
        fetches: AtomicUsize,
    }

    impl StubApi {
        fn with_records(records: Vec<BroadcastRecord>) -> Self {
            Self {
                records: Ok(records),
                fetches: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                records: Err("api down".to_string()),
                fetches: AtomicUsize::new(0),
            }
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BroadcastApi for StubApi {
        async fn fetch_broadcasts(
            &self,
            _channel: &ChannelLogin,
            limit: usize,
        ) -> Result<Vec<BroadcastRecord>, ApiError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            match &self.records {
                Ok(records) => Ok(records.iter().take(limit).cloned().collect()),
                Err(message) => Err(ApiError::Protocol(message.clone())),
            }
        }
    }

    fn broadcast(id: &str, published_at: &str) -> BroadcastRecord {
        BroadcastRecord {
            id: VideoId(id.to_string()),
            title: format!("broadcast {}", id),
            game: "Unknown".to_string(),
            published_at: parse_timestamp(published_at),
            length_seconds: 3600,
            viewable: true,
        }
    }

    fn channel() -> ChannelLogin {
        ChannelLogin::new("somechannel").unwrap()
    }

    fn options(check_vods: bool, pick_most_recent: bool) -> VodOptions {
        VodOptions {
            check_vods,
            pick_most_recent,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_live_stream_short_circuits() {
        let engine = Arc::new(StubEngine::with_streams(&[(
            "somechannel",
            "https://edge.example/live.m3u8",
        )]));
        let api = Arc::new(StubApi::with_records(vec![broadcast(
            "1",
            "2026-08-01T00:00:00Z",
        )]));
        let console = Box::new(ScriptedConsole::default());
        let mut resolver =
            VodResolver::new(engine.clone(), api.clone(), console, options(true, false));

        let streams = resolver.resolve_for_channel(&channel()).await.unwrap();
        assert_eq!(streams.get("best"), Some("https://edge.example/live.m3u8"));
        assert_eq!(api.fetch_count(), 0, "no broadcast listing fetched");
        assert_eq!(engine.calls(), vec!["somechannel"]);
    }

    #[tokio::test]
    async fn test_gate_off_skips_fetch() {
        let engine = Arc::new(StubEngine::default());
        let api = Arc::new(StubApi::with_records(vec![broadcast(
            "1",
            "2026-08-01T00:00:00Z",
        )]));
        let console = Box::new(ScriptedConsole::default());
        let mut resolver =
            VodResolver::new(engine, api.clone(), console, options(false, false));

        assert!(resolver.resolve_for_channel(&channel()).await.is_none());
        assert_eq!(api.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_listing_is_none_in_both_modes() {
        for pick_most_recent in [false, true] {
            let engine = Arc::new(StubEngine::default());
            let api = Arc::new(StubApi::with_records(Vec::new()));
            let console = Box::new(ScriptedConsole::default());
            let mut resolver =
                VodResolver::new(engine, api, console, options(true, pick_most_recent));

            assert!(resolver.resolve_for_channel(&channel()).await.is_none());
        }
    }

    #[tokio::test]
    async fn test_api_failure_degrades_to_none() {
        let engine = Arc::new(StubEngine::default());
        let api = Arc::new(StubApi::failing());
        let console = Box::new(ScriptedConsole::default());
        let mut resolver = VodResolver::new(engine, api, console, options(true, true));

        assert!(resolver.resolve_for_channel(&channel()).await.is_none());
    }

    #[tokio::test]
    async fn test_auto_pick_stops_at_first_resolving() {
        // b1 newest but errors, b2 resolves, b3 must never be attempted.
        let engine = Arc::new(
            StubEngine::with_streams(&[("vod:b2", "https://edge.example/b2.m3u8")])
                .failing_on("vod:b1"),
        );
        let api = Arc::new(StubApi::with_records(vec![
            broadcast("b1", "2026-08-03T00:00:00Z"),
            broadcast("b2", "2026-08-02T00:00:00Z"),
            broadcast("b3", "2026-08-01T00:00:00Z"),
        ]));
        let console = Box::new(ScriptedConsole::default());
        let mut resolver =
            VodResolver::new(engine.clone(), api, console, options(true, true));

        let streams = resolver.resolve_for_channel(&channel()).await.unwrap();
        assert_eq!(streams.get("best"), Some("https://edge.example/b2.m3u8"));
        assert_eq!(engine.calls(), vec!["somechannel", "vod:b1", "vod:b2"]);
    }

    #[tokio::test]
    async fn test_auto_pick_exhausted_list_is_none() {
        let engine = Arc::new(StubEngine::default());
        let api = Arc::new(StubApi::with_records(vec![
            broadcast("b1", "2026-08-02T00:00:00Z"),
            broadcast("b2", "2026-08-01T00:00:00Z"),
        ]));
        let console = Box::new(ScriptedConsole::default());
        let mut resolver =
            VodResolver::new(engine.clone(), api, console, options(true, true));

        assert!(resolver.resolve_for_channel(&channel()).await.is_none());
        assert_eq!(engine.calls(), vec!["somechannel", "vod:b1", "vod:b2"]);
    }

    #[tokio::test]
    async fn test_manual_selection_resolves_chosen_broadcast() {
        // Listing is recency-ordered b1, b2, b3; the user picks row 2.
        let engine = Arc::new(StubEngine::with_streams(&[(
            "vod:b2",
            "https://edge.example/b2.m3u8",
        )]));
        let api = Arc::new(StubApi::with_records(vec![
            broadcast("b1", "2026-08-03T00:00:00Z"),
            broadcast("b2", "2026-08-02T00:00:00Z"),
            broadcast("b3", "2026-08-01T00:00:00Z"),
        ]));
        let console = Box::new(ScriptedConsole::with_inputs(&["2"]));
        let mut resolver =
            VodResolver::new(engine.clone(), api, console, options(true, false));

        let streams = resolver.resolve_for_channel(&channel()).await.unwrap();
        assert_eq!(streams.get("best"), Some("https://edge.example/b2.m3u8"));
        assert_eq!(engine.calls(), vec!["somechannel", "vod:b2"]);
    }

    #[tokio::test]
    async fn test_manual_cancel_resolves_nothing() {
        let engine = Arc::new(StubEngine::default());
        let api = Arc::new(StubApi::with_records(vec![broadcast(
            "b1",
            "2026-08-01T00:00:00Z",
        )]));
        let console = Box::new(ScriptedConsole::with_inputs(&[""]));
        let mut resolver =
            VodResolver::new(engine.clone(), api, console, options(true, false));

        assert!(resolver.resolve_for_channel(&channel()).await.is_none());
        assert_eq!(
            engine.calls(),
            vec!["somechannel"],
            "no broadcast resolution after cancel"
        );
    }

    #[tokio::test]
    async fn test_failed_round_leaves_live_identifier_clean() {
        // The chosen broadcast fails to resolve; the round yields None
        // without retrying live, and a later invocation still resolves
        // the channel identifier, not the broadcast one.
        let engine = Arc::new(StubEngine::default().failing_on("vod:b1"));
        let api = Arc::new(StubApi::with_records(vec![broadcast(
            "b1",
            "2026-08-01T00:00:00Z",
        )]));
        let console = Box::new(ScriptedConsole::with_inputs(&["1", "1"]));
        let mut resolver =
            VodResolver::new(engine.clone(), api, console, options(true, false));

        assert!(resolver.resolve_for_channel(&channel()).await.is_none());
        assert_eq!(engine.calls(), vec!["somechannel", "vod:b1"]);

        assert!(resolver.resolve_for_channel(&channel()).await.is_none());
        assert_eq!(
            engine.calls()[2],
            "somechannel",
            "second round starts from the channel identifier again"
        );
    }

    #[tokio::test]
    async fn test_listing_rendered_before_prompt() {
        let engine = Arc::new(StubEngine::with_streams(&[(
            "vod:b1",
            "https://edge.example/b1.m3u8",
        )]));
        let api = Arc::new(StubApi::with_records(vec![broadcast(
            "b1",
            "2026-08-01T00:00:00Z",
        )]));
        let console = ScriptedConsole::with_inputs(&["1"]);
        let written = console.written_handle();
        let mut resolver =
            VodResolver::new(engine, api, Box::new(console), options(true, false));

        assert!(resolver.resolve_for_channel(&channel()).await.is_some());

        let written = written.lock().unwrap();
        assert!(
            written.iter().any(|l| l.contains("broadcast b1")),
            "selection table shown before the prompt"
        );
        assert!(
            written.iter().any(|l| l.contains("Select a broadcast")),
            "prompt line shown"
        );
    }
}
