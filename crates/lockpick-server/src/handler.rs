//! Per-connection handling: the read loop, request dispatch, and the
//! disconnect grace dance.
//!
//! Every store operation and its resulting event pushes happen under
//! one hold of the store lock, so all clients observe room transitions
//! in a single global order.

use std::sync::Arc;

use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use lockpick_protocol::{
    ClientRequest, Codec, RoomCode, ServerEvent,
};
use lockpick_rooms::JoinOutcome;
use lockpick_transport::{Connection, ConnectionId, WebSocketConnection};

use crate::server::ServerState;

/// Drives one connection from accept to teardown.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) {
    let conn_id = conn.id();
    debug!(%conn_id, "connection opened");

    // Writer task: drain queued events onto the socket. The reader
    // below never touches the send half, so a slow client cannot
    // block its own request handling.
    let mut rx = state.registry.register(conn_id).await;
    let writer_conn = conn.clone();
    let codec = state.codec;
    let writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let bytes = match codec.encode(&event) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(error = %e, "failed to encode event");
                    continue;
                }
            };
            if writer_conn.send(&bytes).await.is_err() {
                break;
            }
        }
    });

    loop {
        let data = match timeout(
            state.config.recv_idle_timeout,
            conn.recv(),
        )
        .await
        {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                debug!(%conn_id, "connection closed");
                break;
            }
            Ok(Err(e)) => {
                debug!(%conn_id, error = %e, "recv error");
                break;
            }
            Err(_) => {
                info!(%conn_id, "connection idle, dropping");
                break;
            }
        };

        let request: ClientRequest = match state.codec.decode(&data) {
            Ok(request) => request,
            Err(e) => {
                debug!(%conn_id, error = %e, "undecodable request");
                state
                    .registry
                    .send(
                        conn_id,
                        ServerEvent::Error {
                            message: "Invalid message".to_string(),
                        },
                    )
                    .await;
                continue;
            }
        };

        dispatch(&state, conn_id, request).await;
    }

    state.registry.unregister(conn_id).await;
    writer.abort();
    handle_disconnect(state, conn_id).await;
}

/// Routes one request into the store and queues the resulting events.
async fn dispatch(
    state: &Arc<ServerState>,
    conn_id: ConnectionId,
    request: ClientRequest,
) {
    match request {
        ClientRequest::CreateRoom { player_name, player_id } => {
            let mut store = state.store.lock().await;
            match store.create_room(conn_id, &player_name, player_id) {
                Ok(created) => {
                    state
                        .registry
                        .send(
                            conn_id,
                            ServerEvent::RoomCreated {
                                room_code: created.room_code,
                                player_id: created.player_id,
                                players: created.roster,
                            },
                        )
                        .await;
                }
                Err(e) => send_error(state, conn_id, &e).await,
            }
        }

        ClientRequest::JoinRoom { room_code, player_name, player_id } => {
            let mut store = state.store.lock().await;
            match store.join_room(
                conn_id,
                &room_code,
                &player_name,
                player_id,
            ) {
                Ok(JoinOutcome::AlreadyInRoom) => {}
                Ok(JoinOutcome::Joined(j)) => {
                    state
                        .registry
                        .broadcast(
                            &j.others,
                            &ServerEvent::PlayerJoined {
                                player_name: j.player_name,
                                players: j.roster.clone(),
                            },
                        )
                        .await;
                    state
                        .registry
                        .send(
                            conn_id,
                            ServerEvent::RoomJoined {
                                room_code: j.room_code,
                                player_id: j.player_id,
                                players: j.roster,
                                game_state: j.game_state,
                                status: j.status,
                            },
                        )
                        .await;
                }
                Err(e) => send_error(state, conn_id, &e).await,
            }
        }

        ClientRequest::ReserveName { room_code, player_name } => {
            let mut store = state.store.lock().await;
            match store.reserve_name(&room_code, &player_name) {
                Ok(reserved) => {
                    state
                        .registry
                        .send(
                            conn_id,
                            ServerEvent::NameReserved {
                                player_id: reserved.player_id,
                                expires_in_secs: reserved
                                    .expires_in_secs,
                            },
                        )
                        .await;
                }
                Err(e) => send_error(state, conn_id, &e).await,
            }
        }

        ClientRequest::ValidateName { room_code, player_name } => {
            let store = state.store.lock().await;
            match store.validate_name(&room_code, &player_name) {
                Ok(check) => {
                    state
                        .registry
                        .send(
                            conn_id,
                            ServerEvent::NameValidated {
                                valid: check.valid,
                                is_taken: check.is_taken,
                            },
                        )
                        .await;
                }
                Err(e) => send_error(state, conn_id, &e).await,
            }
        }

        ClientRequest::StartGame { room_code } => {
            let mut store = state.store.lock().await;
            match store.start_game(conn_id, &room_code) {
                Ok(started) => {
                    state
                        .registry
                        .broadcast(
                            &started.recipients,
                            &ServerEvent::GameStarted {
                                game_state: started.game_state,
                                status: started.status,
                                players: started.roster,
                            },
                        )
                        .await;
                }
                Err(e) => send_error(state, conn_id, &e).await,
            }
        }

        ClientRequest::PlayCard { room_code, card, pile_index } => {
            let mut store = state.store.lock().await;
            match store.play_card(conn_id, &room_code, card, pile_index)
            {
                // Card not in hand: deliberately silent.
                Ok(None) => {}
                Ok(Some(played)) => {
                    state
                        .registry
                        .broadcast(
                            &played.recipients,
                            &ServerEvent::CardPlayed {
                                game_state: played.game_state,
                                status: played.status,
                                player_name: played.player_name,
                                card: played.card,
                                pile_index: played.pile_index,
                            },
                        )
                        .await;
                }
                Err(e) => send_error(state, conn_id, &e).await,
            }
        }

        ClientRequest::EndTurn { room_code } => {
            let mut store = state.store.lock().await;
            match store.end_turn(conn_id, &room_code) {
                Ok(ended) => {
                    state
                        .registry
                        .broadcast(
                            &ended.recipients,
                            &ServerEvent::TurnEnded {
                                game_state: ended.game_state,
                                status: ended.status,
                                player_name: ended.player_name,
                            },
                        )
                        .await;
                }
                Err(e) => send_error(state, conn_id, &e).await,
            }
        }

        ClientRequest::CantPlay { room_code } => {
            let mut store = state.store.lock().await;
            match store.cant_play(conn_id, &room_code) {
                Ok(broadcast) => {
                    state
                        .registry
                        .broadcast(
                            &broadcast.recipients,
                            &ServerEvent::CantPlay {
                                game_state: broadcast.game_state,
                                status: broadcast.status,
                                player_name: broadcast.player_name,
                            },
                        )
                        .await;
                }
                Err(e) => send_error(state, conn_id, &e).await,
            }
        }

        ClientRequest::SortHand { room_code } => {
            let mut store = state.store.lock().await;
            match store.sort_hand(conn_id, &room_code) {
                Ok(sorted) => {
                    state
                        .registry
                        .send(
                            conn_id,
                            ServerEvent::HandSorted {
                                game_state: sorted.game_state,
                                status: sorted.status,
                            },
                        )
                        .await;
                }
                Err(e) => send_error(state, conn_id, &e).await,
            }
        }

        ClientRequest::LeaveRoom { .. } => {
            let mut store = state.store.lock().await;
            if let Some(left) = store.leave_room(conn_id) {
                state
                    .registry
                    .broadcast(
                        &left.remaining,
                        &ServerEvent::PlayerLeft {
                            player_name: left.player_name,
                            players: left.roster,
                            new_host_id: left.new_host_id,
                        },
                    )
                    .await;
                if left.room_empty {
                    schedule_purge(
                        Arc::clone(state),
                        left.room_code,
                    );
                }
            }
        }

        ClientRequest::Ping => {
            state.registry.send(conn_id, ServerEvent::Pong).await;
        }
    }
}

async fn send_error(
    state: &Arc<ServerState>,
    conn_id: ConnectionId,
    error: &lockpick_rooms::RoomError,
) {
    debug!(%conn_id, %error, "request rejected");
    state
        .registry
        .send(
            conn_id,
            ServerEvent::Error { message: error.to_string() },
        )
        .await;
}

/// After a transport drop: mark the participant disconnected, then
/// leave on their behalf once the grace delay passes. A reconnection
/// in the meantime rebinds the identity to a new connection, which
/// makes the delayed leave a no-op.
async fn handle_disconnect(
    state: Arc<ServerState>,
    conn_id: ConnectionId,
) {
    let in_room = {
        let mut store = state.store.lock().await;
        store.mark_player_disconnected(conn_id)
    };
    let Some(room_code) = in_room else { return };

    info!(%conn_id, room_code = %room_code, "participant disconnected, leave pending");
    tokio::spawn(async move {
        sleep(state.config.disconnect_leave_delay).await;
        let mut store = state.store.lock().await;
        let Some(left) = store.leave_room(conn_id) else { return };
        state
            .registry
            .broadcast(
                &left.remaining,
                &ServerEvent::PlayerLeft {
                    player_name: left.player_name.clone(),
                    players: left.roster.clone(),
                    new_host_id: left.new_host_id.clone(),
                },
            )
            .await;
        drop(store);
        if left.room_empty {
            schedule_purge(Arc::clone(&state), left.room_code);
        }
    });
}

/// Deletes a room after the empty-room grace window, unless someone
/// came back in the meantime.
fn schedule_purge(state: Arc<ServerState>, room_code: RoomCode) {
    tokio::spawn(async move {
        let grace =
            { state.store.lock().await.config().empty_room_grace };
        sleep(grace).await;
        let mut store = state.store.lock().await;
        if store.purge_empty_room(&room_code) {
            debug!(room_code = %room_code, "empty room purged");
        }
    });
}
