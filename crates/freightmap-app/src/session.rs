//! Polling runtime around a [`LiveMap`]
//!
//! One task owns the live map. It fetches immediately, then once per poll
//! interval; every fetch runs as its own detached task tagged with a
//! sequence number, so a slow request never delays the next one. Each
//! admitted notification gets its own expiry timer. Results, timers and
//! user events all come back over one channel, so the live map is only
//! ever touched by the owning task.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use freightmap_domain::repository::{LocationProvider, MarkerSource};
use freightmap_domain::service::ProximityNotification;
use freightmap_types::{Error, FeedError, FilterState, GeoPoint, LocationError, Marker, Result, RouteSearch};

use crate::live_map::{LiveMap, MapView, SnapshotOutcome};

/// Shortest poll interval the session will run with
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub poll_interval: Duration,
    pub notification_ttl: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(5000),
            notification_ttl: Duration::from_millis(5000),
        }
    }
}

/// User interactions forwarded to the live map
#[derive(Debug, Clone)]
pub enum SessionEvent {
    SetFilters(FilterState),
    SetRouteSearch(RouteSearch),
    SetRoutePath(Vec<GeoPoint>),
    SetUserLocation(GeoPoint),
    /// Query the location provider again
    Locate,
    ClickMarker(String),
    ClearSelection,
    DismissNotification(String),
    BackendFailed(String),
    ToggleBackend,
}

enum Message {
    User(SessionEvent),
    Fetched {
        seq: u64,
        result: std::result::Result<Vec<Marker>, FeedError>,
    },
    Located(std::result::Result<GeoPoint, LocationError>),
    Expired {
        id: String,
        ticket: u64,
    },
}

pub struct LiveMapSession;

impl LiveMapSession {
    /// Start polling `source` on the current tokio runtime
    pub fn spawn<S, L>(source: S, location: L, live_map: LiveMap, settings: SessionSettings) -> LiveMapHandle
    where
        S: MarkerSource + 'static,
        L: LocationProvider + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let (views_tx, views_rx) = watch::channel(live_map.view());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let worker = Worker {
            live_map,
            source: Arc::new(source),
            location: Arc::new(location),
            settings,
            tx: tx.clone(),
            views: views_tx,
            next_seq: 0,
        };
        let task = tokio::spawn(worker.run(rx, shutdown_rx));

        LiveMapHandle {
            tx,
            views: views_rx,
            shutdown: shutdown_tx,
            task,
        }
    }
}

pub struct LiveMapHandle {
    tx: mpsc::UnboundedSender<Message>,
    views: watch::Receiver<MapView>,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<LiveMap>,
}

impl LiveMapHandle {
    /// Forward a user event. Returns false once the session has ended.
    pub fn send(&self, event: SessionEvent) -> bool {
        self.tx.send(Message::User(event)).is_ok()
    }

    /// Receiver of the view published after every state change
    pub fn views(&self) -> watch::Receiver<MapView> {
        self.views.clone()
    }

    pub fn current_view(&self) -> MapView {
        self.views.borrow().clone()
    }

    /// Stop polling and hand back the live map. Fetches still in flight
    /// are discarded when they complete.
    pub async fn shutdown(self) -> Result<LiveMap> {
        // The worker may already be gone; joining reports why
        let _ = self.shutdown.send(());
        self.task.await.map_err(|e| Error::Session(e.to_string()))
    }
}

struct Worker<S, L> {
    live_map: LiveMap,
    source: Arc<S>,
    location: Arc<L>,
    settings: SessionSettings,
    tx: mpsc::UnboundedSender<Message>,
    views: watch::Sender<MapView>,
    next_seq: u64,
}

impl<S, L> Worker<S, L>
where
    S: MarkerSource + 'static,
    L: LocationProvider + 'static,
{
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Message>, mut shutdown: oneshot::Receiver<()>) -> LiveMap {
        self.locate();

        let period = if self.settings.poll_interval < MIN_POLL_INTERVAL {
            log::warn!(
                "Poll interval {:?} too short, using {:?}",
                self.settings.poll_interval,
                MIN_POLL_INTERVAL
            );
            MIN_POLL_INTERVAL
        } else {
            self.settings.poll_interval
        };
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => self.fetch(),
                Some(message) = rx.recv() => {
                    self.handle(message);
                    self.views.send_replace(self.live_map.view());
                }
            }
        }

        log::debug!("Live map session stopped after {} fetches", self.next_seq);
        drop(rx);
        self.live_map
    }

    fn fetch(&mut self) {
        self.next_seq += 1;
        let seq = self.next_seq;
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = source.fetch_markers().await;
            // Receiver gone means the session ended
            let _ = tx.send(Message::Fetched { seq, result });
        });
    }

    fn locate(&self) {
        let location = Arc::clone(&self.location);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = location.locate().await;
            let _ = tx.send(Message::Located(result));
        });
    }

    fn arm_expiry(&self, notifications: Vec<ProximityNotification>) {
        for notification in notifications {
            let tx = self.tx.clone();
            let ttl = self.settings.notification_ttl;
            tokio::spawn(async move {
                tokio::time::sleep(ttl).await;
                let _ = tx.send(Message::Expired {
                    id: notification.id,
                    ticket: notification.ticket,
                });
            });
        }
    }

    fn handle(&mut self, message: Message) {
        match message {
            Message::Fetched { seq, result } => {
                if let SnapshotOutcome::Applied(admitted) = self.live_map.apply_snapshot(seq, result) {
                    self.arm_expiry(admitted);
                }
            }
            Message::Located(Ok(point)) => {
                let admitted = self.live_map.set_user_location(point);
                self.arm_expiry(admitted);
            }
            Message::Located(Err(e)) => self.live_map.location_unavailable(&e),
            Message::Expired { id, ticket } => {
                self.live_map.expire_notification(&id, ticket);
            }
            Message::User(event) => self.handle_event(event),
        }
    }

    fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::SetFilters(filters) => self.live_map.set_filters(filters),
            SessionEvent::SetRouteSearch(route_search) => self.live_map.set_route_search(route_search),
            SessionEvent::SetRoutePath(path) => self.live_map.set_route_path(path),
            SessionEvent::SetUserLocation(point) => {
                let admitted = self.live_map.set_user_location(point);
                self.arm_expiry(admitted);
            }
            SessionEvent::Locate => self.locate(),
            SessionEvent::ClickMarker(id) => {
                let outcome = self.live_map.click_marker(&id);
                log::debug!("Marker {} clicked: {:?}", id, outcome);
            }
            SessionEvent::ClearSelection => self.live_map.clear_selection(),
            SessionEvent::DismissNotification(id) => {
                self.live_map.dismiss_notification(&id);
            }
            SessionEvent::BackendFailed(reason) => self.live_map.backend_failed(reason),
            SessionEvent::ToggleBackend => {
                self.live_map.toggle_backend();
            }
        }
    }
}
