use async_trait::async_trait;
use futures::stream::StreamExt;
use futures::SinkExt;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use super::{Transport, TransportEvent, TransportLink};
use crate::types::constants::{INBOUND_BUFFER_SIZE, OUTBOUND_BUFFER_SIZE};
use crate::types::Result;

/// Production transport over `tokio-tungstenite`.
///
/// A connect spawns two pump tasks that bridge the split WebSocket halves
/// onto the link channels. Both pumps terminate on their own when the link
/// dies or the client lets go of its end.
pub struct WebSocketTransport;

#[async_trait]
impl Transport for WebSocketTransport {
    async fn connect(&self, url: &str) -> Result<TransportLink> {
        tracing::debug!("Opening WebSocket connection to {}", url);
        let (ws_stream, _response) = connect_async(url).await?;
        let (mut write_half, mut read_half) = ws_stream.split();

        let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(OUTBOUND_BUFFER_SIZE);
        let (inbound_tx, inbound_rx) = mpsc::channel::<TransportEvent>(INBOUND_BUFFER_SIZE);

        // Writer pump: drains queued frames; a dropped sender means the
        // client is done with this link, so close the socket.
        tokio::spawn(async move {
            while let Some(frame) = outbound_rx.recv().await {
                if let Err(e) = write_half.send(Message::text(frame)).await {
                    tracing::debug!("WebSocket write failed: {}", e);
                    break;
                }
            }
            let _ = write_half.close().await;
        });

        // Reader pump: surfaces text frames and the close/error that ends
        // the link. Protocol-level ping/pong is handled by tungstenite.
        tokio::spawn(async move {
            while let Some(msg_result) = read_half.next().await {
                match msg_result {
                    Ok(Message::Text(text)) => {
                        if inbound_tx
                            .send(TransportEvent::Message(text.as_str().to_owned()))
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                    Ok(Message::Close(frame)) => {
                        let reason = frame.map(|f| {
                            format!("code={:?}, reason='{}'", f.code, f.reason.as_str())
                        });
                        let _ = inbound_tx.send(TransportEvent::Closed(reason)).await;
                        break;
                    }
                    Ok(Message::Ping(data)) => {
                        tracing::debug!("Received ws ping ({} bytes)", data.len());
                    }
                    Ok(Message::Pong(data)) => {
                        tracing::debug!("Received ws pong ({} bytes)", data.len());
                    }
                    Ok(Message::Binary(data)) => {
                        tracing::warn!("Ignoring unexpected binary frame ({} bytes)", data.len());
                    }
                    Ok(Message::Frame(_)) => {
                        tracing::debug!("Received raw frame (internal)");
                    }
                    Err(e) => {
                        let _ = inbound_tx
                            .send(TransportEvent::Closed(Some(e.to_string())))
                            .await;
                        break;
                    }
                }
            }
        });

        Ok(TransportLink {
            outbound: outbound_tx,
            inbound: inbound_rx,
        })
    }
}
