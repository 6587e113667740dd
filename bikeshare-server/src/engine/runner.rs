//! The per-deployment event loop.
//!
//! Every state transition (document arrival, timer firing, query) is a
//! [`Message`] on one unbounded channel, handled one at a time by the
//! [`StationEngine`] task. Fetches run on their own tasks and post their
//! result back into the same channel, so cache tables are only ever
//! replaced between messages and a query sees a whole table or none.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::domain::{CircularArea, StationInformation, StationStatus, SystemId};
use crate::gbfs::{FeedClient, FeedError, InformationDocument, LanguageFeeds, Manifest, StatusDocument};

use super::config::EngineConfig;
use super::error::{ManifestError, QueryError};
use super::names::NameShortener;
use super::select::{
    AvailabilitySummary, Candidate, ChallengeRequest, InformationTable, StatusTable,
    select_challenge, summarize,
};
use super::timers::{FeedKind, PendingTimers, RefreshTimers, TimerToken};

/// What a station-document refresh needs in order to repeat itself.
#[derive(Debug, Clone)]
pub struct RefreshContext {
    pub manifest: Arc<Manifest>,
    pub language: String,
    feeds: LanguageFeeds,
}

impl RefreshContext {
    /// Resolve the working language of `manifest`.
    pub fn from_manifest(manifest: Manifest, preferred: &str) -> Result<Self, ManifestError> {
        let language = manifest
            .select_language(preferred)
            .ok_or(ManifestError::AmbiguousLanguage)?
            .to_string();
        let feeds = manifest
            .feeds(&language)
            .cloned()
            .ok_or(ManifestError::AmbiguousLanguage)?;

        Ok(Self {
            manifest: Arc::new(manifest),
            language,
            feeds,
        })
    }
}

/// A refresh to perform now or when a timer fires.
#[derive(Debug, Clone)]
enum Refresh {
    Manifest,
    Information(Arc<RefreshContext>),
    Status(Arc<RefreshContext>),
}

impl Refresh {
    fn kind(&self) -> FeedKind {
        match self {
            Refresh::Manifest => FeedKind::Manifest,
            Refresh::Information(_) => FeedKind::Information,
            Refresh::Status(_) => FeedKind::Status,
        }
    }
}

/// Messages processed by the engine loop.
enum Message {
    Trigger(Refresh),
    TimerFired(TimerToken, Refresh),
    ManifestFetched(Result<Manifest, FeedError>),
    InformationFetched(Arc<RefreshContext>, Result<InformationDocument, FeedError>),
    StatusFetched(Arc<RefreshContext>, Result<StatusDocument, FeedError>),
    Challenge(ChallengeRequest, oneshot::Sender<Result<Challenge, QueryError>>),
    Status(CircularArea, oneshot::Sender<AvailabilitySummary>),
    Snapshot(oneshot::Sender<EngineSnapshot>),
    Shutdown,
}

/// One end of a challenge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChallengeStop {
    pub station: StationInformation,
    pub status: StationStatus,
    /// Station name after display-name shortening.
    pub display_name: String,
}

/// A selected (from, to) station pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Challenge {
    pub from: ChallengeStop,
    pub to: ChallengeStop,
}

/// Metadata about one cached table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TableMeta {
    pub rows: usize,
    pub ttl_secs: u64,
    /// `last_updated` as published by the feed.
    pub last_updated: Option<DateTime<Utc>>,
    pub fetched_at: DateTime<Utc>,
}

/// Point-in-time view of an engine, for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineSnapshot {
    pub system: SystemId,
    pub language: Option<String>,
    pub information: Option<TableMeta>,
    pub status: Option<TableMeta>,
    pub pending: PendingTimers,
}

/// Handle to a running engine.
///
/// Cheap to clone; every clone addresses the same event loop.
#[derive(Clone)]
pub struct EngineHandle {
    system: SystemId,
    tx: mpsc::UnboundedSender<Message>,
}

impl EngineHandle {
    /// Start an engine for one deployment.
    ///
    /// The engine requests its manifest immediately. Must be called from
    /// within a tokio runtime.
    pub fn spawn<C: FeedClient>(system: SystemId, config: EngineConfig, client: Arc<C>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let engine = StationEngine::new(system.clone(), config, client, tx.clone());
        tokio::spawn(engine.run(rx));
        Self { system, tx }
    }

    pub fn system(&self) -> &SystemId {
        &self.system
    }

    async fn ask<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Message) -> Result<T, QueryError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .map_err(|_| QueryError::EngineStopped)?;
        rx.await.map_err(|_| QueryError::EngineStopped)
    }

    /// Select a challenge pair from the current cache.
    pub async fn request_challenge(&self, request: ChallengeRequest) -> Result<Challenge, QueryError> {
        self.ask(|reply| Message::Challenge(request, reply)).await?
    }

    /// Aggregate availability over an area from the current cache.
    pub async fn request_status(&self, area: CircularArea) -> Result<AvailabilitySummary, QueryError> {
        self.ask(|reply| Message::Status(area, reply)).await
    }

    pub async fn snapshot(&self) -> Result<EngineSnapshot, QueryError> {
        self.ask(Message::Snapshot).await
    }

    /// Refresh the manifest now, and with it both station documents.
    ///
    /// This is the only way to restart a feed whose refresh stalled after
    /// a failed fetch.
    pub fn refresh(&self) -> Result<(), QueryError> {
        self.tx
            .send(Message::Trigger(Refresh::Manifest))
            .map_err(|_| QueryError::EngineStopped)
    }

    /// Cancel all timers and stop the event loop.
    pub fn shutdown(&self) {
        let _ = self.tx.send(Message::Shutdown);
    }
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("system", &self.system)
            .finish()
    }
}

/// State owned by one engine task.
struct StationEngine<C> {
    system: SystemId,
    config: EngineConfig,
    shortener: NameShortener,
    client: Arc<C>,
    tx: mpsc::UnboundedSender<Message>,
    timers: RefreshTimers,
    language: Option<String>,
    information: InformationTable,
    status: StatusTable,
    information_meta: Option<TableMeta>,
    status_meta: Option<TableMeta>,
}

impl<C: FeedClient> StationEngine<C> {
    fn new(
        system: SystemId,
        config: EngineConfig,
        client: Arc<C>,
        tx: mpsc::UnboundedSender<Message>,
    ) -> Self {
        let shortener = NameShortener::new(config.name_replacements.iter().cloned());
        Self {
            system,
            config,
            shortener,
            client,
            tx,
            timers: RefreshTimers::new(),
            language: None,
            information: HashMap::new(),
            status: HashMap::new(),
            information_meta: None,
            status_meta: None,
        }
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Message>) {
        info!(system = %self.system, url = %self.config.manifest_url, "engine started");
        self.trigger(Refresh::Manifest);

        while let Some(message) = rx.recv().await {
            if matches!(message, Message::Shutdown) {
                break;
            }
            self.handle(message);
        }

        self.timers.cancel_all();
        info!(system = %self.system, "engine stopped");
    }

    fn handle(&mut self, message: Message) {
        match message {
            Message::Trigger(refresh) => self.trigger(refresh),
            Message::TimerFired(token, refresh) => {
                if self.timers.claim(token) {
                    self.trigger(refresh);
                } else {
                    debug!(system = %self.system, kind = ?refresh.kind(), "ignoring superseded timer");
                }
            }
            Message::ManifestFetched(result) => self.on_manifest(result),
            Message::InformationFetched(context, result) => self.on_information(context, result),
            Message::StatusFetched(context, result) => self.on_status(context, result),
            Message::Challenge(request, reply) => {
                let _ = reply.send(self.challenge(&request));
            }
            Message::Status(area, reply) => {
                let _ = reply.send(summarize(&self.information, &self.status, &area));
            }
            Message::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            Message::Shutdown => {}
        }
    }

    /// Start fetching the document behind `refresh`.
    fn trigger(&mut self, refresh: Refresh) {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();

        match refresh {
            Refresh::Manifest => {
                // A new manifest may point at new URLs
                self.timers.cancel_all();
                let url = self.config.manifest_url.clone();
                debug!(system = %self.system, %url, "fetching manifest");
                tokio::spawn(async move {
                    let result = client.fetch_manifest(&url).await;
                    let _ = tx.send(Message::ManifestFetched(result));
                });
            }
            Refresh::Information(context) => {
                debug!(system = %self.system, url = %context.feeds.station_information, "fetching station information");
                tokio::spawn(async move {
                    let result = client
                        .fetch_station_information(&context.feeds.station_information)
                        .await;
                    let _ = tx.send(Message::InformationFetched(context, result));
                });
            }
            Refresh::Status(context) => {
                debug!(system = %self.system, url = %context.feeds.station_status, "fetching station status");
                tokio::spawn(async move {
                    let result = client
                        .fetch_station_status(&context.feeds.station_status)
                        .await;
                    let _ = tx.send(Message::StatusFetched(context, result));
                });
            }
        }
    }

    /// Arrange for `refresh` to run again after `ttl`.
    fn schedule(&mut self, refresh: Refresh, ttl: Duration) {
        let delay = ttl.max(self.config.min_refresh_interval);
        let kind = refresh.kind();
        let tx = self.tx.clone();
        debug!(system = %self.system, ?kind, delay_secs = delay.as_secs(), "scheduling refresh");
        self.timers.schedule(kind, delay, move |token| {
            let _ = tx.send(Message::TimerFired(token, refresh));
        });
    }

    fn on_manifest(&mut self, result: Result<Manifest, FeedError>) {
        let manifest = match result {
            Ok(manifest) => manifest,
            Err(e) => {
                warn!(system = %self.system, url = %self.config.manifest_url, error = %e, "manifest fetch failed");
                return;
            }
        };

        info!(
            system = %self.system,
            ttl_secs = manifest.ttl.as_secs(),
            languages = manifest.languages.len(),
            "received manifest"
        );
        self.schedule(Refresh::Manifest, manifest.ttl);

        match RefreshContext::from_manifest(manifest, &self.config.preferred_language) {
            Ok(context) => {
                info!(system = %self.system, language = %context.language, "using manifest language");
                self.language = Some(context.language.clone());
                let context = Arc::new(context);
                self.trigger(Refresh::Information(Arc::clone(&context)));
                self.trigger(Refresh::Status(context));
            }
            Err(e) => warn!(system = %self.system, error = %e, "cannot refresh stations"),
        }
    }

    fn on_information(
        &mut self,
        context: Arc<RefreshContext>,
        result: Result<InformationDocument, FeedError>,
    ) {
        let document = match result {
            Ok(document) => document,
            Err(e) => {
                warn!(system = %self.system, url = %context.feeds.station_information, error = %e, "station information fetch failed");
                return;
            }
        };

        self.information = document
            .data
            .into_iter()
            .map(|s| (s.station_id.clone(), s))
            .collect();
        self.information_meta = Some(TableMeta {
            rows: self.information.len(),
            ttl_secs: document.ttl.as_secs(),
            last_updated: document.last_updated,
            fetched_at: Utc::now(),
        });
        info!(system = %self.system, stations = self.information.len(), ttl_secs = document.ttl.as_secs(), "station information updated");

        self.schedule(Refresh::Information(context), document.ttl);
    }

    fn on_status(&mut self, context: Arc<RefreshContext>, result: Result<StatusDocument, FeedError>) {
        let document = match result {
            Ok(document) => document,
            Err(e) => {
                warn!(system = %self.system, url = %context.feeds.station_status, error = %e, "station status fetch failed");
                return;
            }
        };

        self.status = document
            .data
            .into_iter()
            .map(|s| (s.station_id.clone(), s))
            .collect();
        self.status_meta = Some(TableMeta {
            rows: self.status.len(),
            ttl_secs: document.ttl.as_secs(),
            last_updated: document.last_updated,
            fetched_at: Utc::now(),
        });
        info!(system = %self.system, stations = self.status.len(), ttl_secs = document.ttl.as_secs(), "station status updated");

        self.schedule(Refresh::Status(context), document.ttl);
    }

    fn challenge(&self, request: &ChallengeRequest) -> Result<Challenge, QueryError> {
        let pick = select_challenge(
            &self.information,
            &self.status,
            request,
            &self.config.selection,
        )?;

        Ok(Challenge {
            from: self.stop(pick.from),
            to: self.stop(pick.to),
        })
    }

    fn stop(&self, candidate: Candidate<'_>) -> ChallengeStop {
        ChallengeStop {
            station: candidate.information.clone(),
            status: candidate.status.clone(),
            display_name: self.shortener.shorten(&candidate.information.name),
        }
    }

    fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            system: self.system.clone(),
            language: self.language.clone(),
            information: self.information_meta,
            status: self.status_meta,
            pending: self.timers.pending(),
        }
    }
}
