//! Background worker that performs R2 API requests for the UI.

use r2ctl_api::R2Client;
use r2ctl_core::{HistorySource, RollupRule};
use r2ctl_monitor::{FetchEvent, RuleHandlers};
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::{MissedTickBehavior, interval};

/// Work requested by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRequest {
    LoadRules,
    LoadHistory(HistorySource),
    Save(RollupRule),
    Delete(RollupRule),
}

/// Performs requests against one namespace and reports back to the UI.
pub struct ApiWorker {
    client: R2Client,
    namespace: String,
    events: Sender<FetchEvent>,
    refresh_interval: Option<Duration>,
}

impl ApiWorker {
    pub fn new(
        client: R2Client,
        namespace: String,
        events: Sender<FetchEvent>,
        refresh_interval: Option<Duration>,
    ) -> Self {
        Self {
            client,
            namespace,
            events,
            refresh_interval,
        }
    }

    /// Main request loop. Each request runs in its own task; the loop ends
    /// when the UI drops its sender.
    pub async fn run(self, mut requests: UnboundedReceiver<ApiRequest>) {
        let refresh_enabled = self.refresh_interval.is_some();
        let mut refresh_ticker = interval(self.refresh_interval.unwrap_or(Duration::from_secs(3600)));
        refresh_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // Skip the first tick (fires immediately)
        refresh_ticker.tick().await;

        let worker = Arc::new(self);
        loop {
            tokio::select! {
                request = requests.recv() => {
                    let Some(request) = request else {
                        tracing::debug!("Request channel closed, stopping API worker");
                        break;
                    };
                    let worker = Arc::clone(&worker);
                    tokio::spawn(async move {
                        worker.handle(request).await;
                    });
                }
                _ = refresh_ticker.tick(), if refresh_enabled => {
                    let worker = Arc::clone(&worker);
                    tokio::spawn(async move {
                        worker.handle(ApiRequest::LoadRules).await;
                    });
                }
            }
        }
    }

    async fn handle(&self, request: ApiRequest) {
        match request {
            ApiRequest::LoadRules => self.load_rules().await,
            ApiRequest::LoadHistory(source) => self.load_history(source).await,
            ApiRequest::Save(rule) => self.save(rule).await,
            ApiRequest::Delete(rule) => self.delete(rule).await,
        }
    }

    async fn load_rules(&self) {
        let result = self.client.rollup_rules(&self.namespace).await.map_err(|e| {
            tracing::error!("Error fetching rollup rules for {}: {}", self.namespace, e);
            e.to_string()
        });
        if let Ok(ref rules) = result {
            tracing::info!("Loaded {} rollup rules for {}", rules.len(), self.namespace);
        }
        self.send(FetchEvent::RulesLoaded(result));
    }

    async fn load_history(&self, source: HistorySource) {
        let result = self.client.history(&source).await.map_err(|e| {
            tracing::error!("Error fetching history {}: {}", source, e);
            e.to_string()
        });
        self.send(FetchEvent::HistoryLoaded { source, result });
    }

    async fn save(&self, rule: RollupRule) {
        let action = if rule.is_new() { "create" } else { "update" };
        match self.client.save_rollup_rule(&self.namespace, &rule).await {
            Ok(saved) => {
                tracing::info!("Rollup rule {} ({}) {}d", saved.name, saved.id, action);
                self.send(FetchEvent::RuleSaved(Ok(saved)));
                self.load_rules().await;
            }
            Err(e) => {
                tracing::error!("Failed to {} rollup rule {}: {}", action, rule.name, e);
                self.send(FetchEvent::RuleSaved(Err(e.to_string())));
            }
        }
    }

    async fn delete(&self, rule: RollupRule) {
        match self.client.delete_rollup_rule(&self.namespace, &rule.id).await {
            Ok(()) => {
                tracing::info!("Rollup rule {} ({}) deleted", rule.name, rule.id);
                self.send(FetchEvent::RuleDeleted(Ok(rule)));
                self.load_rules().await;
            }
            Err(e) => {
                tracing::error!("Failed to delete rollup rule {}: {}", rule.name, e);
                self.send(FetchEvent::RuleDeleted(Err(e.to_string())));
            }
        }
    }

    fn send(&self, event: FetchEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("UI is gone, dropping fetch event");
        }
    }
}

/// Rule callbacks that forward to the API worker.
pub struct ChannelHandlers {
    requests: UnboundedSender<ApiRequest>,
}

impl ChannelHandlers {
    pub fn new(requests: UnboundedSender<ApiRequest>) -> Self {
        Self { requests }
    }

    fn send(&self, request: ApiRequest) {
        if let Err(e) = self.requests.send(request) {
            tracing::warn!("API worker stopped, dropping request {:?}", e.0);
        }
    }
}

impl RuleHandlers for ChannelHandlers {
    fn save_rollup_rule(&mut self, rule: RollupRule) {
        self.send(ApiRequest::Save(rule));
    }

    fn delete_rollup_rule(&mut self, rule: &RollupRule) {
        self.send(ApiRequest::Delete(rule.clone()));
    }

    fn load_history(&mut self, source: &HistorySource) {
        self.send(ApiRequest::LoadHistory(source.clone()));
    }

    fn load_rules(&mut self) {
        self.send(ApiRequest::LoadRules);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn test_channel_handlers_forward_requests() {
        let (tx, mut rx) = unbounded_channel();
        let mut handlers = ChannelHandlers::new(tx);
        let rule = RollupRule {
            id: "r1".to_string(),
            ..Default::default()
        };
        let source = HistorySource::rollup_rule("prod", "r1");

        handlers.load_rules();
        handlers.load_history(&source);
        handlers.save_rollup_rule(rule.clone());
        handlers.delete_rollup_rule(&rule);

        assert_eq!(rx.try_recv().unwrap(), ApiRequest::LoadRules);
        assert_eq!(rx.try_recv().unwrap(), ApiRequest::LoadHistory(source));
        assert_eq!(rx.try_recv().unwrap(), ApiRequest::Save(rule.clone()));
        assert_eq!(rx.try_recv().unwrap(), ApiRequest::Delete(rule));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_send_after_worker_stopped_is_ignored() {
        let (tx, rx) = unbounded_channel();
        drop(rx);
        let mut handlers = ChannelHandlers::new(tx);
        handlers.load_rules();
    }

    /// Accepts connections, reports each request line, and never answers.
    async fn stalled_server() -> (String, UnboundedReceiver<String>) {
        use tokio::io::AsyncReadExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let (lines_tx, lines_rx) = unbounded_channel();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let lines_tx = lines_tx.clone();
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 4096];
                    let n = stream.read(&mut buf).await.unwrap_or(0);
                    let text = String::from_utf8_lossy(&buf[..n]).to_string();
                    let _ = lines_tx.send(text.lines().next().unwrap_or_default().to_string());
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    drop(stream);
                });
            }
        });
        (url, lines_rx)
    }

    #[tokio::test]
    async fn test_history_starts_while_refresh_is_in_flight() {
        let (url, mut lines) = stalled_server().await;
        let client = R2Client::new(&url).unwrap();
        let (events_tx, _events_rx) = std::sync::mpsc::channel();
        let (tx, rx) = unbounded_channel();
        let worker = ApiWorker::new(
            client,
            "prod".to_string(),
            events_tx,
            Some(Duration::from_millis(50)),
        );
        tokio::spawn(worker.run(rx));

        let first = tokio::time::timeout(Duration::from_secs(5), lines.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(first.starts_with("GET /namespaces/prod "), "{first}");

        tx.send(ApiRequest::LoadHistory(HistorySource::rollup_rule("prod", "r1")))
            .unwrap();
        let history = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match lines.recv().await {
                    Some(line) if line.contains("/history") => return line,
                    Some(_) => continue,
                    None => panic!("server stopped"),
                }
            }
        })
        .await
        .unwrap();
        assert!(history.starts_with("GET /namespaces/prod/rollup-rules/r1/history"));
    }

    #[tokio::test]
    async fn test_worker_stops_when_ui_drops_sender() {
        let client = R2Client::new("http://127.0.0.1:9").unwrap();
        let (events_tx, _events_rx) = std::sync::mpsc::channel();
        let (tx, rx) = unbounded_channel();
        let worker = ApiWorker::new(client, "prod".to_string(), events_tx, None);
        drop(tx);
        tokio::time::timeout(Duration::from_secs(5), worker.run(rx))
            .await
            .unwrap();
    }
}
