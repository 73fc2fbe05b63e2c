//! Line-oriented console for poking at a running cache.

use anyhow::bail;
use interceptor_cache::CacheHandle;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

pub(crate) const USAGE: &str = "\
commands:
  set <METHOD> <URL> <BODY...>   store BODY (rest of the line) for METHOD URL
  get <METHOD> <URL>             show the stored body, or MISS
  help                           this text
  quit | exit                    stop the cache and leave
";

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Command {
    Set {
        method: String,
        url: String,
        body: String,
    },
    Get {
        method: String,
        url: String,
    },
    Help,
    Quit,
}

/// Parse one console line. Blank lines yield `None`.
pub(crate) fn parse_line(line: &str) -> anyhow::Result<Option<Command>> {
    let line = line.trim();
    let Some((verb, rest)) = split_word(line) else {
        return Ok(None);
    };

    let cmd = match verb.to_ascii_lowercase().as_str() {
        "set" => {
            let Some((method, rest)) = split_word(rest) else {
                bail!("set needs <METHOD> <URL> <BODY...>");
            };
            let Some((url, body)) = split_word(rest) else {
                bail!("set needs <URL> after the method");
            };
            Command::Set {
                method: method.to_string(),
                url: url.to_string(),
                body: body.to_string(),
            }
        }
        "get" => {
            let Some((method, rest)) = split_word(rest) else {
                bail!("get needs <METHOD> <URL>");
            };
            let Some((url, extra)) = split_word(rest) else {
                bail!("get needs <URL> after the method");
            };
            if !extra.is_empty() {
                bail!("get takes exactly <METHOD> <URL>");
            }
            Command::Get {
                method: method.to_string(),
                url: url.to_string(),
            }
        }
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => bail!("unknown command '{other}'"),
    };

    Ok(Some(cmd))
}

/// First whitespace-delimited word and the trimmed remainder.
fn split_word(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    match s.find(char::is_whitespace) {
        Some(idx) => Some((&s[..idx], s[idx..].trim_start())),
        None => Some((s, "")),
    }
}

/// Read commands until EOF or `quit`, writing one reply per command.
pub(crate) async fn run<R, W>(cache: &CacheHandle, input: R, out: &mut W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        let cmd = match parse_line(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(err) => {
                out.write_all(format!("ERR {err}\n").as_bytes()).await?;
                out.flush().await?;
                continue;
            }
        };
        debug!(target: "interceptor::console", ?cmd, "Console command");

        let reply = match cmd {
            Command::Quit => break,
            Command::Help => USAGE.to_string(),
            Command::Set { method, url, body } => match cache.set(method, url, body).await {
                Ok(()) => "OK\n".to_string(),
                Err(err) => format!("ERR {err}\n"),
            },
            Command::Get { method, url } => match cache.lookup(method, url).await {
                Ok((true, body)) => format!(
                    "HIT {} bytes: {}\n",
                    body.len(),
                    String::from_utf8_lossy(&body)
                ),
                Ok((false, _)) => "MISS\n".to_string(),
                Err(err) => format!("ERR {err}\n"),
            },
        };

        out.write_all(reply.as_bytes()).await?;
        out.flush().await?;
    }

    Ok(())
}
