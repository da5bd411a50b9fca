//! Line-oriented control protocol.
//!
//! Every message is one UTF-8 line terminated by `\n`, at most
//! [`MAX_LINE_LEN`] bytes including the terminator.
//!
//! | request  | response                                   |
//! |----------|--------------------------------------------|
//! | `start`  | `ok` or `err <message>`                    |
//! | `stop`   | `ok` or `err <message>`, then the server exits |
//! | `status` | `ok not-started` / `ok running` / `ok stopped` |

use crate::{ControlError, ControlResult};

use std::fmt;
use std::str::FromStr;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

pub const MAX_LINE_LEN: usize = 256;

const VERB_START: &str = "start";
const VERB_STOP: &str = "stop";
const VERB_STATUS: &str = "status";
const REPLY_OK: &str = "ok";
const REPLY_ERR: &str = "err";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Start,
    Stop,
    Status,
}

impl Request {
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Start => VERB_START,
            Self::Stop => VERB_STOP,
            Self::Status => VERB_STATUS,
        }
    }

    pub fn encode(&self) -> String {
        format!("{}\n", self.verb())
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

impl FromStr for Request {
    type Err = ControlError;

    #[track_caller]
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        match line.trim() {
            VERB_START => Ok(Self::Start),
            VERB_STOP => Ok(Self::Stop),
            VERB_STATUS => Ok(Self::Status),
            other => Err(ControlError::protocol(format!("unknown request: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Ok(Option<String>),
    Err(String),
}

impl Response {
    pub fn ok() -> Self {
        Self::Ok(None)
    }

    pub fn ok_with(detail: impl Into<String>) -> Self {
        Self::Ok(Some(Self::single_line(detail.into())))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Err(Self::single_line(message.into()))
    }

    pub fn encode(&self) -> String {
        let line = match self {
            Self::Ok(None) => REPLY_OK.to_string(),
            Self::Ok(Some(detail)) => format!("{REPLY_OK} {detail}"),
            Self::Err(message) => format!("{REPLY_ERR} {message}"),
        };
        format!("{}\n", Self::truncate(line))
    }

    #[track_caller]
    pub fn parse(line: &str) -> ControlResult<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (word, rest) = match line.split_once(' ') {
            Some((word, rest)) => (word, Some(rest)),
            None => (line, None),
        };

        match (word, rest) {
            (REPLY_OK, None) => Ok(Self::Ok(None)),
            (REPLY_OK, Some(detail)) => Ok(Self::Ok(Some(detail.to_string()))),
            (REPLY_ERR, message) => Ok(Self::Err(message.unwrap_or_default().to_string())),
            _ => Err(ControlError::protocol(format!(
                "malformed response: {line:?}"
            ))),
        }
    }

    fn single_line(text: String) -> String {
        text.replace(['\r', '\n'], " ")
    }

    /// Keep the encoded line within MAX_LINE_LEN (newline included).
    fn truncate(mut line: String) -> String {
        let limit = MAX_LINE_LEN - 1;
        if line.len() > limit {
            let mut cut = limit;
            while !line.is_char_boundary(cut) {
                cut -= 1;
            }
            line.truncate(cut);
        }
        line
    }
}

/// Read one message. `Ok(None)` means the peer closed without sending anything.
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> ControlResult<Option<String>> {
    let mut limited = BufReader::new(reader.take(MAX_LINE_LEN as u64));
    let mut buf = Vec::with_capacity(64);
    let read = limited.read_until(b'\n', &mut buf).await?;

    if read == 0 {
        return Ok(None);
    }

    if buf.last() != Some(&b'\n') {
        return Err(if read >= MAX_LINE_LEN {
            ControlError::protocol(format!("message exceeds {MAX_LINE_LEN} bytes"))
        } else {
            ControlError::protocol("connection closed mid-message")
        });
    }

    String::from_utf8(buf)
        .map(Some)
        .map_err(|_| ControlError::protocol("message is not valid UTF-8"))
}

pub async fn write_message<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> ControlResult<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
