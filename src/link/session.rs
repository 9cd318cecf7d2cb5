//! TCP session against the server's query interface.
//!
//! One writer task serializes outbound commands; one reader task matches
//! replies to their commands in FIFO order (the protocol answers strictly
//! in order) and routes unsolicited `notify*` frames to the event channel.

use super::types::{ChannelId, ChannelView, ClientId, ClientView, Event};
use super::{ControlLink, LinkResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};
use vsq_proto::{parse_records, Command, EventFrame, QueryError, Record, Status};

type ReplySender = oneshot::Sender<Result<Vec<Record>, QueryError>>;

/// Reply slots shared between the writer and reader tasks. `closed` lives
/// under the same lock so a request can never be queued after the reader
/// has drained the queue for the last time (it would hang forever).
#[derive(Default)]
struct Shared {
    closed: bool,
    queue: VecDeque<ReplySender>,
}

impl Shared {
    fn drain(&mut self) {
        self.closed = true;
        while let Some(sender) = self.queue.pop_front() {
            let _ = sender.send(Err(QueryError::Closed));
        }
    }
}

type Pending = Arc<Mutex<Shared>>;

struct Outbound {
    line: String,
    reply: ReplySender,
}

/// An authenticated administrative session.
pub struct QuerySession {
    commands: mpsc::Sender<Outbound>,
}

impl QuerySession {
    /// Connect to the query port. Returns the session and the stream of
    /// lifecycle events; the stream ends when the connection is lost.
    pub async fn connect(
        host: &str,
        port: u16,
    ) -> Result<(Self, mpsc::Receiver<Event>), QueryError> {
        let stream = TcpStream::connect((host, port)).await?;
        let (reader, writer) = stream.into_split();

        let (command_tx, command_rx) = mpsc::channel(32);
        let (event_tx, event_rx) = mpsc::channel(256);
        let pending: Pending = Arc::new(Mutex::new(Shared::default()));

        tokio::spawn(write_loop(writer, command_rx, Arc::clone(&pending)));
        tokio::spawn(read_loop(reader, pending, event_tx));

        Ok((Self { commands: command_tx }, event_rx))
    }

    /// Authenticate the query session.
    pub async fn login(&self, username: &str, password: &str) -> LinkResult<()> {
        self.request(
            Command::new("login")
                .arg("client_login_name", username)
                .arg("client_login_password", password),
        )
        .await?;
        Ok(())
    }

    /// Select the virtual server by voice port and claim the bot nickname.
    pub async fn select_server(&self, port: i64, nickname: &str) -> LinkResult<()> {
        self.request(Command::new("use").arg("port", port)).await?;
        self.request(Command::new("clientupdate").arg("client_nickname", nickname))
            .await?;
        Ok(())
    }

    /// Register for the server and channel event classes the daemon
    /// consumes (join/leave, moves, channel create/edit).
    pub async fn register_events(&self) -> LinkResult<()> {
        self.request(Command::new("servernotifyregister").arg("event", "server"))
            .await?;
        self.request(
            Command::new("servernotifyregister")
                .arg("event", "channel")
                .arg("id", 0),
        )
        .await?;
        Ok(())
    }

    /// The session's own client id and current channel.
    pub async fn whoami(&self) -> LinkResult<(ClientId, ChannelId)> {
        let records = self.request(Command::new("whoami")).await?;
        let record = first(&records, "whoami")?;
        let id = record
            .id("client_id")
            .ok_or_else(|| QueryError::Protocol("whoami reply without client_id".into()))?;
        Ok((id, record.id("client_channel_id").unwrap_or(0)))
    }

    async fn request(&self, command: Command) -> Result<Vec<Record>, QueryError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let outbound = Outbound {
            line: command.encode(),
            reply: reply_tx,
        };
        self.commands
            .send(outbound)
            .await
            .map_err(|_| QueryError::Closed)?;
        reply_rx.await.map_err(|_| QueryError::Closed)?
    }
}

fn first<'r>(records: &'r [Record], what: &str) -> Result<&'r Record, QueryError> {
    records
        .first()
        .ok_or_else(|| QueryError::Protocol(format!("{what} reply without data")))
}

async fn write_loop(
    mut writer: OwnedWriteHalf,
    mut commands: mpsc::Receiver<Outbound>,
    pending: Pending,
) {
    while let Some(outbound) = commands.recv().await {
        let mut line = outbound.line;
        trace!(line = %line, "query >>");
        line.push('\n');
        // Queue the reply slot before writing so the reader can never see
        // a reply without a waiting sender.
        {
            let mut shared = pending.lock();
            if shared.closed {
                drop(shared);
                let _ = outbound.reply.send(Err(QueryError::Closed));
                continue;
            }
            shared.queue.push_back(outbound.reply);
        }
        if let Err(error) = writer.write_all(line.as_bytes()).await {
            warn!(error = %error, "query write failed");
            pending.lock().drain();
            break;
        }
    }
}

async fn read_loop(reader: OwnedReadHalf, pending: Pending, events: mpsc::Sender<Event>) {
    let mut lines = BufReader::new(reader).lines();
    let mut records: Vec<Record> = Vec::new();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(error) => {
                warn!(error = %error, "query read failed");
                break;
            }
        };
        let line = line.trim();
        trace!(line = %line, "query <<");
        if line.is_empty() || line.starts_with("TS3") || line.starts_with("Welcome") {
            continue; // greeting banner
        }

        if let Some(frame) = EventFrame::parse(line) {
            match Event::from_frame(&frame) {
                // A full dispatch queue blocks the reader; replies stall
                // until the dispatcher catches up.
                Some(event) => {
                    let _ = events.send(event).await;
                }
                None => debug!(kind = %frame.kind, "ignoring unsubscribed event frame"),
            }
            continue;
        }

        if let Some(status) = Status::parse(line) {
            let reply = std::mem::take(&mut records);
            let sender = pending.lock().queue.pop_front();
            if let Some(sender) = sender {
                let result = if status.is_ok() {
                    Ok(reply)
                } else {
                    Err(QueryError::Rejected {
                        id: status.id,
                        msg: status.msg,
                    })
                };
                let _ = sender.send(result);
            } else {
                debug!(id = status.id, "status line with no pending command");
            }
            continue;
        }

        records.extend(parse_records(line));
    }

    // Connection gone: fail whatever is still waiting and refuse anything
    // queued later. Dropping the event sender ends the dispatch loop.
    pending.lock().drain();
}

#[async_trait]
impl ControlLink for QuerySession {
    async fn client_info(&self, id: ClientId) -> LinkResult<ClientView> {
        let records = self.request(Command::new("clientinfo").arg("clid", id)).await?;
        Ok(ClientView::from_record(id, first(&records, "clientinfo")?))
    }

    async fn channel_info(&self, id: ChannelId) -> LinkResult<ChannelView> {
        let records = self.request(Command::new("channelinfo").arg("cid", id)).await?;
        Ok(ChannelView::from_record(id, first(&records, "channelinfo")?))
    }

    async fn clients(&self) -> LinkResult<Vec<ClientView>> {
        let records = self
            .request(
                Command::new("clientlist")
                    .option("uid")
                    .option("times")
                    .option("groups")
                    .option("voice")
                    .option("country")
                    .option("ip")
                    .option("info"),
            )
            .await?;
        Ok(records
            .iter()
            .filter_map(|record| {
                let id = record.id("clid")?;
                Some(ClientView::from_record(id, record))
            })
            .collect())
    }

    async fn channels(&self) -> LinkResult<Vec<ChannelView>> {
        let records = self.request(Command::new("channellist")).await?;
        Ok(records
            .iter()
            .filter_map(|record| {
                let id = record.id("cid")?;
                Some(ChannelView::from_record(id, record))
            })
            .collect())
    }

    async fn private_message(&self, id: ClientId, text: &str) -> LinkResult<()> {
        self.request(
            Command::new("sendtextmessage")
                .arg("targetmode", 1)
                .arg("target", id)
                .arg("msg", text),
        )
        .await?;
        Ok(())
    }

    async fn poke(&self, id: ClientId, text: &str) -> LinkResult<()> {
        self.request(Command::new("clientpoke").arg("clid", id).arg("msg", text))
            .await?;
        Ok(())
    }

    async fn broadcast(&self, text: &str) -> LinkResult<()> {
        self.request(
            Command::new("sendtextmessage")
                .arg("targetmode", 3)
                .arg("msg", text),
        )
        .await?;
        Ok(())
    }

    async fn move_client(&self, id: ClientId, channel: ChannelId) -> LinkResult<()> {
        self.request(Command::new("clientmove").arg("clid", id).arg("cid", channel))
            .await?;
        Ok(())
    }

    async fn kick_from_channel(&self, id: ClientId) -> LinkResult<()> {
        self.request(Command::new("clientkick").arg("clid", id).arg("reasonid", 4))
            .await?;
        Ok(())
    }

    async fn kick_from_server(&self, id: ClientId, reason: &str) -> LinkResult<()> {
        self.request(
            Command::new("clientkick")
                .arg("clid", id)
                .arg("reasonid", 5)
                .arg("reasonmsg", reason),
        )
        .await?;
        Ok(())
    }

    async fn rename_channel(&self, id: ChannelId, name: &str) -> LinkResult<()> {
        self.request(
            Command::new("channeledit")
                .arg("cid", id)
                .arg("channel_name", name),
        )
        .await?;
        Ok(())
    }

    async fn create_channel(&self, name: &str, parent: ChannelId) -> LinkResult<ChannelId> {
        let records = self
            .request(
                Command::new("channelcreate")
                    .arg("channel_name", name)
                    .arg("cpid", parent)
                    .arg("channel_flag_permanent", 0)
                    .arg("channel_flag_maxclients_unlimited", 1),
            )
            .await?;
        first(&records, "channelcreate")?
            .id("cid")
            .ok_or_else(|| QueryError::Protocol("channelcreate reply without cid".into()))
    }

    async fn delete_channel(&self, id: ChannelId) -> LinkResult<()> {
        self.request(Command::new("channeldelete").arg("cid", id).arg("force", 1))
            .await?;
        Ok(())
    }
}
