//! Collaborator doubles shared by unit tests

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::oneshot;

use crate::gateway::{GatewayRequest, RequestGateway, RequestOutcome};
use crate::notify::{EditorEvent, EventChannel, NotificationSink};
use crate::reconciler::SubmitReconciler;

enum Reply {
    Now(RequestOutcome),
    Later(oneshot::Receiver<RequestOutcome>),
}

/// Gateway that records requests and answers from a script
#[derive(Default)]
pub struct ScriptedGateway {
    replies:  Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<GatewayRequest>>,
}

impl ScriptedGateway {
    /// Answer the next request immediately with `outcome`
    pub fn reply(&self, outcome: RequestOutcome) {
        self.replies.lock().unwrap().push_back(Reply::Now(outcome));
    }

    /// Hold the next request open until the returned sender fires
    pub fn reply_later(&self) -> oneshot::Sender<RequestOutcome> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().unwrap().push_back(Reply::Later(rx));
        tx
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<GatewayRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Yield to spawned tasks until `count` requests have arrived
    pub async fn wait_for_requests(&self, count: usize) {
        for _ in 0..1000 {
            if self.requests.lock().unwrap().len() >= count {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("gateway never received {count} requests");
    }
}

#[async_trait]
impl RequestGateway for ScriptedGateway {
    async fn send(&self, request: GatewayRequest) -> RequestOutcome {
        self.requests.lock().unwrap().push(request);
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Now(outcome)) => outcome,
            Some(Reply::Later(rx)) => rx
                .await
                .unwrap_or_else(|_| RequestOutcome::failure("scripted reply dropped")),
            None => RequestOutcome::failure("no scripted reply"),
        }
    }
}

/// A reconciler wired to a scripted gateway and an event channel
pub struct Harness {
    pub gateway:    Arc<ScriptedGateway>,
    pub reconciler: SubmitReconciler,
    events:         UnboundedReceiver<EditorEvent>,
}

impl Harness {
    pub fn new(origin: Option<&str>) -> Self {
        let gateway = Arc::new(ScriptedGateway::default());
        let (channel, events) = EventChannel::new();
        let channel = Arc::new(channel);
        let dyn_gateway: Arc<dyn RequestGateway> = gateway.clone();
        let sink: Arc<dyn NotificationSink> = channel.clone();
        let reconciler = SubmitReconciler::new(
            dyn_gateway,
            sink,
            channel,
            origin.map(ToString::to_string),
        );

        Self {
            gateway,
            reconciler,
            events,
        }
    }

    /// Everything emitted since the last drain
    pub fn drain(&mut self) -> Vec<EditorEvent> {
        let mut drained = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            drained.push(event);
        }
        drained
    }
}
