use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use rumqttc::{AsyncClient, ConnectReturnCode, ConnectionError, Event, MqttOptions, Packet, QoS};
use thiserror::Error;
use tokio::sync::mpsc;

use meshbridge_core::error::{MeshBridgeError, Result};

use crate::app_state::AppState;
use crate::bus::Publisher;
use crate::config::BrokerSection;
use crate::policy::Throttle;
use crate::relay::Relay;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);
const CLIENT_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum TransportError {
    /// Broker rejected the connection (bad credentials, banned client id).
    #[error("broker refused connection: {0:?}")]
    Refused(ConnectReturnCode),
    #[error("relay worker stopped")]
    WorkerStopped,
}

/// `Publisher` over a shared rumqttc client handle.
#[derive(Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
}

impl MqttPublisher {
    pub fn new(client: AsyncClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Publisher for MqttPublisher {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()> {
        self.client
            .publish(topic, QoS::AtMostOnce, false, payload)
            .await
            .map_err(|e| MeshBridgeError::PublishFailure(e.to_string()))
    }
}

#[derive(Debug)]
struct Inbound {
    topic: String,
    payload: Bytes,
}

fn mqtt_options(b: &BrokerSection) -> MqttOptions {
    let mut opts = MqttOptions::new(b.client_id.clone(), b.address.clone(), b.port);
    opts.set_keep_alive(Duration::from_secs(b.keepalive_secs));
    if let Some(user) = &b.user {
        opts.set_credentials(user.clone(), b.password.clone().unwrap_or_default());
    }
    opts
}

/// Connect, subscribe to every namespace and relay until the connection is
/// refused or the worker exits. Transient errors reconnect after a delay.
pub async fn run(state: AppState) -> std::result::Result<(), TransportError> {
    let cfg = state.cfg();
    let (client, mut eventloop) = AsyncClient::new(mqtt_options(&cfg.broker), CLIENT_CAPACITY);

    let (tx, rx) = mpsc::channel::<Inbound>(cfg.relay.queue_depth);
    let throttle = Throttle::new(cfg.relay.rate_limit_rps, cfg.relay.rate_limit_burst);
    let relay = state.relay();
    let subscriptions: Vec<String> = relay.namespaces().iter().map(|ns| ns.subscription()).collect();
    let worker = tokio::spawn(relay_worker(
        relay,
        MqttPublisher::new(client.clone()),
        rx,
        throttle,
    ));

    tracing::info!(broker = %cfg.broker.address, port = cfg.broker.port, "connecting to broker");

    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                tracing::info!("connected to broker");
                // re-subscribe on every (re)connect
                for topic in &subscriptions {
                    match client.try_subscribe(topic.as_str(), QoS::AtMostOnce) {
                        Ok(()) => tracing::info!(%topic, "subscribed"),
                        Err(e) => tracing::error!(%topic, error = %e, "subscribe failed"),
                    }
                }
            }
            Ok(Event::Incoming(Packet::Publish(p))) => {
                let msg = Inbound {
                    topic: p.topic,
                    payload: p.payload,
                };
                match tx.try_send(msg) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(m)) => {
                        tracing::warn!(topic = %m.topic, "relay queue full; dropping message")
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        return Err(TransportError::WorkerStopped);
                    }
                }
            }
            Ok(_) => {}
            Err(ConnectionError::ConnectionRefused(code)) => {
                tracing::error!(?code, "broker refused connection");
                worker.abort();
                return Err(TransportError::Refused(code));
            }
            Err(e) => {
                tracing::warn!(error = %e, delay = ?RECONNECT_DELAY, "broker connection error; reconnecting");
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}

async fn relay_worker(
    relay: Arc<Relay>,
    bus: MqttPublisher,
    mut rx: mpsc::Receiver<Inbound>,
    mut throttle: Throttle,
) {
    while let Some(msg) = rx.recv().await {
        throttle.acquire().await;
        let outcome = relay.handle(&msg.topic, &msg.payload, &bus).await;
        tracing::trace!(topic = %msg.topic, ?outcome, "message handled");
    }
}
