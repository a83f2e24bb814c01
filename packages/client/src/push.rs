use futures::{sink::SinkExt, stream::StreamExt};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{info, warn};

use crate::error::ClientError;
use crate::models::events::GameEvent;

/// ルームごとに1本のプッシュチャネル。オーケストレータとリコンサイラが
/// 購読を分け合い、切断はteardown時以外に起こさない
pub struct PushChannel {
    events: broadcast::Sender<GameEvent>,
    outgoing: mpsc::Sender<String>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl PushChannel {
    /// WS_URL環境変数の接続先でチャネルを張る
    pub async fn connect_from_env(room_id: &str) -> Result<Self, ClientError> {
        Self::connect(&crate::utils::config::CONFIG.ws_url, room_id).await
    }

    pub async fn connect(ws_url: &str, room_id: &str) -> Result<Self, ClientError> {
        let url = format!("{}/game/{}/ws", ws_url, room_id);
        let (ws, _) = connect_async(&url)
            .await
            .map_err(|_| ClientError::PushChannelDisconnected)?;

        info!("push channel connected for room {}", room_id);

        let (mut sink, mut stream) = ws.split();
        let (events, _) = broadcast::channel(1000);
        let (outgoing, mut outgoing_rx) = mpsc::channel::<String>(100);

        let events_for_reader = events.clone();
        let reader = tokio::spawn(async move {
            while let Some(Ok(message)) = stream.next().await {
                if let Message::Text(text) = message {
                    match GameEvent::parse(&text) {
                        Ok(event) => {
                            let _ = events_for_reader.send(event);
                        }
                        Err(e) => {
                            warn!("dropping malformed push message: {}", e);
                        }
                    }
                }
            }
            // 切断は可視なステータス変化として通知する
            let _ = events_for_reader.send(GameEvent::Disconnected);
        });

        let writer = tokio::spawn(async move {
            while let Some(text) = outgoing_rx.recv().await {
                if let Err(e) = sink.send(Message::Text(text)).await {
                    warn!("failed to send push message: {}", e);
                    break;
                }
            }
        });

        Ok(PushChannel {
            events,
            outgoing,
            reader,
            writer,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe()
    }

    pub async fn send_raw(&self, text: String) -> Result<(), ClientError> {
        self.outgoing
            .send(text)
            .await
            .map_err(|_| ClientError::PushChannelDisconnected)
    }

    /// コンポーネント破棄時のみ呼ぶ
    pub fn close(self) {
        self.reader.abort();
        self.writer.abort();
    }
}
