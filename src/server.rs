//! WebSocket bridge to display clients.
//!
//! Each connection gets the route polyline once, then every published position and sample
//! window. Text frames `start`, `stop`, `toggle` and `reset` are forwarded to the feed.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};

use crate::feed::FeedSnapshot;
use crate::model::Coordinate;
use crate::task::{AnimatorHandle, FeedCommand, FeedControl, FeedHandle};

/// Messages pushed to display clients, tagged by `"type"`.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DisplayMessage {
    Route { waypoints: Vec<Coordinate> },
    Position { position: Coordinate },
    Samples(FeedSnapshot),
}

pub fn parse_command(text: &str) -> Option<FeedCommand> {
    match text.trim().to_ascii_lowercase().as_str() {
        "start" => Some(FeedCommand::Start),
        "stop" => Some(FeedCommand::Stop),
        "toggle" => Some(FeedCommand::Toggle),
        "reset" => Some(FeedCommand::Reset),
        _ => None,
    }
}

/// Read side of both components plus the feed's command channel. Cheap to clone.
#[derive(Clone)]
pub struct Bridge {
    route: Arc<[Coordinate]>,
    positions: watch::Receiver<Coordinate>,
    samples: watch::Receiver<FeedSnapshot>,
    control: FeedControl,
}

impl Bridge {
    pub fn new(animator: &AnimatorHandle, feed: &FeedHandle) -> Self {
        Self {
            route: animator.route(),
            positions: animator.subscribe(),
            samples: feed.subscribe(),
            control: feed.control(),
        }
    }
}

/// Accept display clients forever, one task per connection.
pub async fn serve(listener: TcpListener, bridge: Bridge) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                tracing::info!(%peer, "display client connected");
                let bridge = bridge.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, bridge).await {
                        tracing::warn!(%peer, "connection closed with error: {:#}", e);
                    } else {
                        tracing::info!(%peer, "display client disconnected");
                    }
                });
            }
            Err(e) => {
                tracing::error!("accept error: {}", e);
                // small delay to avoid tight loop in case of persistent errors
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
        }
    }
}

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;

async fn send(write: &mut WsSink, msg: &DisplayMessage) -> Result<()> {
    let json = serde_json::to_string(msg)?;
    write.send(Message::Text(json)).await?;
    Ok(())
}

async fn handle_connection(stream: TcpStream, bridge: Bridge) -> Result<()> {
    let ws_stream = accept_async(stream).await?;
    let (mut write, mut read) = ws_stream.split();
    let Bridge {
        route,
        mut positions,
        mut samples,
        control,
    } = bridge;

    send(
        &mut write,
        &DisplayMessage::Route {
            waypoints: route.to_vec(),
        },
    )
    .await?;
    let position = *positions.borrow_and_update();
    send(&mut write, &DisplayMessage::Position { position }).await?;
    let snapshot = samples.borrow_and_update().clone();
    send(&mut write, &DisplayMessage::Samples(snapshot)).await?;

    loop {
        tokio::select! {
            changed = positions.changed() => {
                if changed.is_err() {
                    break;
                }
                let position = *positions.borrow_and_update();
                send(&mut write, &DisplayMessage::Position { position }).await?;
            }
            changed = samples.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = samples.borrow_and_update().clone();
                send(&mut write, &DisplayMessage::Samples(snapshot)).await?;
            }
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => match parse_command(&text) {
                        Some(cmd) => {
                            control.send(cmd);
                        }
                        None => tracing::debug!(%text, "ignoring unknown command"),
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                }
            }
        }
    }
    Ok(())
}
