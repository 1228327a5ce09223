//! WebSocket connection loop.
//!
//! Drives one [`ChatSocketHandler`]: runs the connect callback, then
//! multiplexes inbound frames and channel events until either side goes
//! away, and always finishes with the disconnect callback.

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};

use super::consumer::{ChatSocketHandler, ConnectContext, ConnectOutcome};
use super::messages::close_code;
use crate::domain::ChannelInbox;
use crate::error::ChatError;

/// Why the serve loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    /// The client closed or dropped the socket.
    Client(u16),
    /// The server ends the connection with this close code.
    Server(u16),
}

impl Exit {
    const fn code(self) -> u16 {
        match self {
            Self::Client(code) | Self::Server(code) => code,
        }
    }
}

/// Runs a single chat connection to completion.
pub async fn run_connection(
    socket: WebSocket,
    mut handler: ChatSocketHandler,
    mut inbox: ChannelInbox,
    ctx: ConnectContext,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let room_name = ctx.room_name.clone();

    let exit = match handler.on_connect(ctx).await {
        Ok(ConnectOutcome::Accepted) => {
            serve(&handler, &mut inbox, &mut ws_tx, &mut ws_rx).await
        }
        Ok(ConnectOutcome::Rejected) => Exit::Server(close_code::UNAUTHORIZED),
        Err(ChatError::RoomNotFound(_)) => {
            tracing::info!(room = %room_name, "connection to unknown room rejected");
            Exit::Server(close_code::ROOM_NOT_FOUND)
        }
        Err(err) => {
            tracing::error!(room = %room_name, error = %err, "connect failed");
            Exit::Server(close_code::INTERNAL_ERROR)
        }
    };

    if let Exit::Server(code) = exit {
        let frame = CloseFrame {
            code,
            reason: close_reason(code).into(),
        };
        let _ = ws_tx.send(Message::Close(Some(frame))).await;
    }

    handler.on_disconnect(exit.code()).await;
}

/// Forwards frames between the socket and the handler while the
/// connection is open.
async fn serve(
    handler: &ChatSocketHandler,
    inbox: &mut ChannelInbox,
    ws_tx: &mut SplitSink<WebSocket, Message>,
    ws_rx: &mut SplitStream<WebSocket>,
) -> Exit {
    loop {
        tokio::select! {
            // Incoming frame from the client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match handler.on_receive(text.as_str()).await {
                            Ok(Some(reply)) => {
                                if ws_tx.send(Message::text(reply)).await.is_err() {
                                    return Exit::Client(close_code::ABNORMAL);
                                }
                            }
                            Ok(None) => {}
                            Err(err) => {
                                tracing::error!(channel = %handler.channel().name(), error = %err, "receive failed");
                                return Exit::Server(close_code::INTERNAL_ERROR);
                            }
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        return Exit::Client(frame.map_or(close_code::NO_STATUS, |f| f.code));
                    }
                    Some(Err(err)) => {
                        tracing::debug!(error = %err, "ws read failed");
                        return Exit::Client(close_code::ABNORMAL);
                    }
                    None => return Exit::Client(close_code::ABNORMAL),
                    Some(Ok(Message::Binary(data))) => {
                        tracing::debug!(channel = %handler.channel().name(), len = data.len(), "ignoring binary frame");
                    }
                    Some(Ok(_)) => {}
                }
            }
            // Event fanned out to this connection's channel
            event = inbox.recv() => {
                let Some(event) = event else {
                    return Exit::Server(close_code::INTERNAL_ERROR);
                };
                match handler.on_group_event(event).await {
                    Ok(html) => {
                        if ws_tx.send(Message::text(html)).await.is_err() {
                            return Exit::Client(close_code::ABNORMAL);
                        }
                    }
                    Err(err) => {
                        tracing::error!(channel = %handler.channel().name(), error = %err, "group event failed");
                        return Exit::Server(close_code::INTERNAL_ERROR);
                    }
                }
            }
        }
    }
}

/// Human-readable reason attached to server-initiated close frames.
const fn close_reason(code: u16) -> &'static str {
    match code {
        close_code::UNAUTHORIZED => "authentication required",
        close_code::ROOM_NOT_FOUND => "chat room not found",
        _ => "internal error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_reports_code() {
        assert_eq!(Exit::Client(1000).code(), 1000);
        assert_eq!(Exit::Server(close_code::UNAUTHORIZED).code(), 4403);
    }

    #[test]
    fn close_reasons() {
        assert_eq!(close_reason(close_code::ROOM_NOT_FOUND), "chat room not found");
        assert_eq!(close_reason(close_code::INTERNAL_ERROR), "internal error");
    }
}
